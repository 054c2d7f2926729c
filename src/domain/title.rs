// src/domain/title.rs

use crate::domain::coerce::{coerce_area, strip_station_suffix};
use crate::domain::fields::rules;
use crate::reference::areas::extract_ward;
use crate::upstream::models::Fields;

/// A name column is only trusted when it is longer than this.
pub const NAME_MIN_EXCLUSIVE: usize = 3;
/// Synthesized titles shorter than this get the id-based placeholder instead.
pub const SYNTHESIZED_MIN_CHARS: usize = 8;
/// Generic listing term appended to every synthesized title.
pub const GENERIC_SUFFIX: &str = "店舗物件";
const RECORD_ID_PREFIX: &str = "rec";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    PropertyName,
    BuildingName,
    Synthesized,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub text: String,
    pub source: TitleSource,
}

/// Picks or builds a display title, in priority order:
/// property-name column, building-name column, station + ward + area, id placeholder.
///
/// Returns `None` when the record has neither a name nor any of station/ward/area,
/// since such a record cannot be told apart from any other on screen.
pub fn synthesize_title(fields: &Fields, record_id: &str) -> Option<Title> {
    let named = [
        (rules::PROPERTY_NAME, TitleSource::PropertyName),
        (rules::BUILDING_NAME, TitleSource::BuildingName),
    ];
    for (rule, source) in named {
        let text = rule.text(fields);
        if text.chars().count() > NAME_MIN_EXCLUSIVE {
            return Some(Title { text, source });
        }
    }

    let station = rules::TITLE_STATION.text(fields);
    let station = strip_station_suffix(&station);
    let address = rules::TITLE_ADDRESS.text(fields);
    let area = coerce_area(rules::TITLE_AREA.resolve(fields));

    let mut parts: Vec<String> = Vec::new();
    if !station.is_empty() {
        parts.push(format!("{station}駅"));
    }
    if let Some(ward) = extract_ward(&address) {
        if !parts.iter().any(|p| p.contains(ward)) {
            parts.push(ward.to_string());
        }
    }
    if let Some(area) = area {
        parts.push(format!("{}㎡", area.round() as i64));
    }

    if parts.is_empty() {
        return None;
    }

    parts.push(GENERIC_SUFFIX.to_string());
    let text = parts.join(" ");

    if text.chars().count() < SYNTHESIZED_MIN_CHARS {
        return Some(placeholder(record_id));
    }

    Some(Title {
        text,
        source: TitleSource::Synthesized,
    })
}

/// Distinct per record because record ids are: the whole id goes in, minus the
/// `rec` prefix every upstream id shares.
fn placeholder(record_id: &str) -> Title {
    let id = record_id.trim();
    let id = id.strip_prefix(RECORD_ID_PREFIX).filter(|rest| !rest.is_empty()).unwrap_or(id);
    Title {
        text: format!("{GENERIC_SUFFIX} {id}").trim().to_string(),
        source: TitleSource::Placeholder,
    }
}
