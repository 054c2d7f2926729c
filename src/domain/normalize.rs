// src/domain/normalize.rs

use tracing::debug;

use crate::config::NormalizeSettings;
use crate::domain::coerce::{
    coerce_area, coerce_flag, coerce_minutes, coerce_money, coerce_number, extract_images, infer_property_type,
    parse_train_lines, strip_station_suffix, validate_coordinates, TEN_THOUSAND,
};
use crate::domain::fields::{rules, FieldRule};
use crate::domain::property::{property_code, CanonicalProperty, PropertyDetails};
use crate::domain::title::synthesize_title;
use crate::errors::RecordRejected;
use crate::upstream::models::{Fields, RawRecord};

/// Availability text that means the listing is gone.
const CLOSED_TOKENS: &[&str] = &["成約", "契約済", "募集終了", "unavailable", "closed"];

/// Result of normalizing one batch, in fetch order.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub properties: Vec<CanonicalProperty>,
    pub rejected: Vec<RecordRejected>,
}

/// Turns one raw row into a canonical property, or says why it can't.
pub fn normalize_record(record: &RawRecord, settings: &NormalizeSettings) -> Result<CanonicalProperty, RecordRejected> {
    let fields = &record.fields;
    let reject = |reason: String| RecordRejected {
        record_id: record.id.clone(),
        reason,
    };

    if record.id.trim().is_empty() {
        return Err(reject("record has no id".into()));
    }

    let title = synthesize_title(fields, &record.id)
        .ok_or_else(|| reject("no name, station, ward or area to build a title from".into()))?
        .text;

    let title_len = title.chars().count();
    if title_len < settings.min_title_len {
        return Err(reject(format!(
            "title {title:?} is {title_len} chars, minimum is {}",
            settings.min_title_len
        )));
    }

    let address = rules::ADDRESS.text(fields);
    let ward = rules::WARD.text(fields);
    let location = if ward.is_empty() {
        address.split_whitespace().next().unwrap_or_default().to_string()
    } else {
        ward.clone()
    };

    let station_raw = rules::STATION.text(fields);
    let nearest_station = strip_station_suffix(&station_raw).to_string();

    let train_lines = rules::TRAIN_LINES
        .resolve(fields)
        .map(|v| parse_train_lines(&v.to_text()))
        .unwrap_or_default();

    let lat = rules::LATITUDE.resolve(fields).and_then(coerce_number);
    let lng = rules::LONGITUDE.resolve(fields).and_then(coerce_number);
    let coordinates = validate_coordinates(lat, lng, &settings.bounds);

    let rent = coerce_money(rules::RENT.resolve(fields));
    let deposit = coerce_money(rules::DEPOSIT.resolve(fields));
    let area = coerce_area(rules::AREA.resolve(fields));

    let property_type = infer_property_type(
        rules::PROPERTY_TYPE
            .resolve(fields)
            .map(|v| v.to_text())
            .as_deref(),
    );

    let availability = rules::AVAILABILITY.text(fields);
    let is_available = is_available(&availability);

    let details = PropertyDetails {
        property_code: property_code(&record.id),
        rent_man_yen: rent.map(|r| (r as f64 / TEN_THOUSAND * 100.0).round() / 100.0),
        security_deposit: deposit,
        management_fee: number(fields, rules::MANAGEMENT_FEE),
        move_in_timing: optional_text(fields, rules::MOVE_IN),
        contract_period: optional_text(fields, rules::CONTRACT_PERIOD),
        other_monthly_fee_name: optional_text(fields, rules::OTHER_FEE_NAME),
        other_monthly_fee_amount: number(fields, rules::OTHER_FEE_AMOUNT),
        renewal_category: optional_text(fields, rules::RENEWAL_CATEGORY),
        renewal_fee: number(fields, rules::RENEWAL_FEE),
        insurance_obligation: optional_text(fields, rules::INSURANCE),
        raw_fields: fields.clone(),
    };

    Ok(CanonicalProperty {
        id: record.id.clone(),
        title,
        property_type,
        address,
        ward,
        location,
        nearest_station,
        walking_minutes: coerce_minutes(rules::WALKING_MINUTES.resolve(fields)),
        train_lines,
        coordinates,
        rent,
        deposit,
        area,
        floor: rules::FLOOR.text(fields),
        structure: rules::STRUCTURE.text(fields),
        availability,
        is_available,
        featured: coerce_flag(rules::FEATURED.resolve(fields)),
        notes: rules::NOTES.text(fields),
        images: extract_images(fields),
        details,
    })
}

/// Normalizes every record, keeping fetch order. Rejections are collected, not raised.
pub fn normalize_all(records: &[RawRecord], settings: &NormalizeSettings) -> NormalizedBatch {
    let mut batch = NormalizedBatch {
        properties: Vec::with_capacity(records.len()),
        rejected: Vec::new(),
    };

    for record in records {
        match normalize_record(record, settings) {
            Ok(property) => batch.properties.push(property),
            Err(rejected) => {
                debug!(record_id = %rejected.record_id, reason = %rejected.reason, "record rejected");
                batch.rejected.push(rejected);
            }
        }
    }

    batch
}

pub fn is_available(availability: &str) -> bool {
    let lowered = availability.to_lowercase();
    !CLOSED_TOKENS.iter().any(|t| lowered.contains(t))
}

fn optional_text(fields: &Fields, rule: FieldRule) -> Option<String> {
    Some(rule.text(fields)).filter(|s| !s.is_empty())
}

fn number(fields: &Fields, rule: FieldRule) -> Option<f64> {
    rule.resolve(fields).and_then(coerce_number)
}
