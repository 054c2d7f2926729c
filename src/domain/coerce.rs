// src/domain/coerce.rs
//
// Value coercions applied after field resolution. Each one is a fixed business rule;
// the thresholds here are relied on by stored data and must not drift.

use crate::config::BoundingBox;
use crate::domain::property::{Coordinates, PropertyType};
use crate::upstream::models::{FieldValue, Fields};

/// Raw money values below this are in units of 10,000 yen.
pub const TEN_THOUSAND_UNIT_THRESHOLD: f64 = 1_000.0;
pub const TEN_THOUSAND: f64 = 10_000.0;

pub const MAX_TRAIN_LINES: usize = 3;
const TRAIN_LINE_DELIMITERS: &[char] = &['、', ',', '，', '・'];

const STATION_SUFFIX: &str = "駅";

/// Keyword groups in priority order. First group with any hit wins.
const TYPE_KEYWORDS: &[(PropertyType, &[&str])] = &[
    (
        PropertyType::Restaurant,
        &["店舗", "飲食", "restaurant", "shop", "カフェ", "レストラン", "小売", "retail", "商業"],
    ),
    (PropertyType::Office, &["事務所", "オフィス", "office", "業務"]),
    (PropertyType::Warehouse, &["倉庫", "工場", "warehouse", "factory", "物流"]),
    (
        PropertyType::Residential,
        &["住宅", "居住", "マンション", "アパート", "residential", "住居"],
    ),
    (PropertyType::Service, &["サービス", "service"]),
];

/// Full-width digits and separators to their ASCII forms.
fn to_half_width(c: char) -> char {
    match c {
        '０'..='９' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        '．' => '.',
        '－' | '−' => '-',
        other => other,
    }
}

/// Parses a number out of whatever the cell holds. Numbers pass through; text is
/// normalized to half-width, stripped to digits/period/minus, and its leading
/// numeric part parsed. Non-finite results are absent.
pub fn coerce_number(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) => n.is_finite().then_some(*n),
        FieldValue::Text(s) => parse_numeric_text(s),
        // Lookup and rollup cells arrive as arrays; read them through their text form.
        FieldValue::Other(_) => parse_numeric_text(&value.to_text()),
        FieldValue::Bool(_) | FieldValue::Attachments(_) => None,
    }
}

pub fn parse_numeric_text(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .map(to_half_width)
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    leading_float(&cleaned).filter(|n| n.is_finite())
}

/// Longest prefix of the form `-?digits(.digits)?`, so "12-3" reads as 12 and
/// "1.2.3" as 1.2.
fn leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        }
    }

    if !has_digits {
        return None;
    }
    s[..end].parse().ok()
}

/// Rent/deposit to whole yen. Below 1,000 the figure is in 10,000-yen units;
/// from 1,000 up it is already yen. Zero and negative figures mean "not listed".
pub fn normalize_money(raw: f64) -> Option<u64> {
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }
    let yen = if raw < TEN_THOUSAND_UNIT_THRESHOLD {
        raw * TEN_THOUSAND
    } else {
        raw
    };
    Some(yen.round() as u64)
}

pub fn coerce_money(value: Option<&FieldValue>) -> Option<u64> {
    value.and_then(coerce_number).and_then(normalize_money)
}

pub fn coerce_area(value: Option<&FieldValue>) -> Option<f64> {
    value.and_then(coerce_number).filter(|a| *a > 0.0)
}

pub fn coerce_minutes(value: Option<&FieldValue>) -> Option<u32> {
    value
        .and_then(coerce_number)
        .map(f64::round)
        .filter(|m| *m >= 1.0 && *m <= u32::MAX as f64)
        .map(|m| m as u32)
}

/// Accepts the pair only inside the bounding region. Out-of-region is a data error,
/// so it becomes absent rather than clamped.
pub fn validate_coordinates(lat: Option<f64>, lng: Option<f64>, bounds: &BoundingBox) -> Option<Coordinates> {
    let (lat, lng) = (lat?, lng?);
    bounds.contains(lat, lng).then_some(Coordinates { lat, lng })
}

pub fn parse_train_lines(raw: &str) -> Vec<String> {
    raw.split(TRAIN_LINE_DELIMITERS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_TRAIN_LINES)
        .map(str::to_string)
        .collect()
}

pub fn infer_property_type(raw: Option<&str>) -> PropertyType {
    let Some(raw) = raw else {
        return PropertyType::Restaurant;
    };
    let lowered = raw.trim().to_lowercase();

    TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(kind, _)| *kind)
        .unwrap_or(PropertyType::Restaurant)
}

/// Every attachment URL in every field, in field order then item order.
pub fn extract_images(fields: &Fields) -> Vec<String> {
    fields
        .iter()
        .filter_map(|(_, value)| match value {
            FieldValue::Attachments(items) => Some(items),
            _ => None,
        })
        .flatten()
        .filter_map(|a| a.url.as_deref())
        .filter(|url| !url.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub fn strip_station_suffix(station: &str) -> &str {
    let trimmed = station.trim();
    trimmed.strip_suffix(STATION_SUFFIX).unwrap_or(trimmed)
}

/// Truthy cell for flag-like columns.
pub fn coerce_flag(value: Option<&FieldValue>) -> bool {
    match value {
        Some(FieldValue::Bool(b)) => *b,
        Some(FieldValue::Number(n)) => *n != 0.0,
        Some(FieldValue::Text(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "y" | "1" | "○" | "◯" | "はい" | "有" | "あり" | "注目"
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::models::Attachment;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn full_width_commas_and_currency_match_plain_digits() {
        let plain = parse_numeric_text("120000");
        assert_eq!(plain, Some(120000.0));
        assert_eq!(parse_numeric_text("１２００００"), plain);
        assert_eq!(parse_numeric_text("120,000"), plain);
        assert_eq!(parse_numeric_text("¥120,000円"), plain);
        assert_eq!(parse_numeric_text("￥１２０，０００"), plain);
    }

    #[test]
    fn decimals_and_units() {
        assert_eq!(parse_numeric_text("45.3㎡"), Some(45.3));
        assert_eq!(parse_numeric_text("４５．３"), Some(45.3));
        assert_eq!(parse_numeric_text("徒歩5分"), Some(5.0));
        assert_eq!(parse_numeric_text("-3"), Some(-3.0));
    }

    #[test]
    fn junk_text_is_absent() {
        assert_eq!(parse_numeric_text("応相談"), None);
        assert_eq!(parse_numeric_text(""), None);
        assert_eq!(parse_numeric_text("-"), None);
        assert_eq!(parse_numeric_text("."), None);
    }

    #[test]
    fn numbers_pass_through_unchanged() {
        assert_eq!(coerce_number(&FieldValue::Number(35.5)), Some(35.5));
        assert_eq!(coerce_number(&FieldValue::Number(f64::NAN)), None);
        assert_eq!(coerce_number(&FieldValue::Bool(true)), None);
    }

    #[test]
    fn single_value_arrays_read_as_their_element() {
        let number = FieldValue::Other(serde_json::json!([35]));
        let area = FieldValue::Other(serde_json::json!(["45.3㎡"]));
        assert_eq!(coerce_number(&number), Some(35.0));
        assert_eq!(coerce_number(&area), Some(45.3));
        assert_eq!(coerce_money(Some(&number)), Some(350_000));
        assert_eq!(coerce_area(Some(&area)), Some(45.3));
        assert_eq!(coerce_number(&FieldValue::Other(serde_json::Value::Null)), None);
    }

    #[test]
    fn money_boundary_at_one_thousand() {
        assert_eq!(normalize_money(999.0), Some(9_990_000));
        assert_eq!(normalize_money(1000.0), Some(1000));
        assert_eq!(normalize_money(35.5), Some(355_000));
        assert_eq!(normalize_money(250_000.0), Some(250_000));
        assert_eq!(normalize_money(0.0), None);
        assert_eq!(normalize_money(-5.0), None);
    }

    #[test]
    fn money_from_text_cell() {
        assert_eq!(coerce_money(Some(&text("35万円"))), Some(350_000));
        assert_eq!(coerce_money(Some(&text("¥1,200,000"))), Some(1_200_000));
        assert_eq!(coerce_money(None), None);
    }

    #[test]
    fn tokyo_accepted_london_rejected() {
        let bounds = BoundingBox::TARGET_REGION;
        assert_eq!(
            validate_coordinates(Some(35.6762), Some(139.6503), &bounds),
            Some(Coordinates {
                lat: 35.6762,
                lng: 139.6503
            })
        );
        assert_eq!(validate_coordinates(Some(51.5), Some(-0.1), &bounds), None);
        assert_eq!(validate_coordinates(Some(35.6), None, &bounds), None);
    }

    #[test]
    fn train_lines_split_trim_and_cap() {
        assert_eq!(
            parse_train_lines("ＪＲ山手線、 東京メトロ銀座線,京王井の頭線・東急東横線"),
            vec!["ＪＲ山手線", "東京メトロ銀座線", "京王井の頭線"]
        );
        assert_eq!(parse_train_lines("、、ＪＲ山手線、"), vec!["ＪＲ山手線"]);
        assert!(parse_train_lines("").is_empty());
    }

    #[test]
    fn property_type_priority_and_default() {
        assert_eq!(infer_property_type(Some("飲食店舗")), PropertyType::Restaurant);
        assert_eq!(infer_property_type(Some("事務所")), PropertyType::Office);
        assert_eq!(infer_property_type(Some("Office / Warehouse")), PropertyType::Office);
        assert_eq!(infer_property_type(Some("倉庫・工場")), PropertyType::Warehouse);
        assert_eq!(infer_property_type(Some("マンション")), PropertyType::Residential);
        assert_eq!(infer_property_type(Some("サービス業")), PropertyType::Service);
        assert_eq!(infer_property_type(Some("店舗・事務所")), PropertyType::Restaurant);
        assert_eq!(infer_property_type(Some("駐車場")), PropertyType::Restaurant);
        assert_eq!(infer_property_type(None), PropertyType::Restaurant);
    }

    #[test]
    fn images_collected_across_fields_in_order() {
        let att = |u: &str| Attachment {
            url: Some(u.to_string()),
            filename: None,
        };
        let fields: Fields = vec![
            ("外観", FieldValue::Attachments(vec![att("https://a/1.jpg"), att("https://a/2.jpg")])),
            ("物件名", text("テスト")),
            (
                "間取り図",
                FieldValue::Attachments(vec![
                    att("https://a/3.png"),
                    Attachment {
                        url: None,
                        filename: Some("broken".into()),
                    },
                ]),
            ),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            extract_images(&fields),
            vec!["https://a/1.jpg", "https://a/2.jpg", "https://a/3.png"]
        );
    }

    #[test]
    fn station_suffix_stripped_once() {
        assert_eq!(strip_station_suffix("渋谷駅"), "渋谷");
        assert_eq!(strip_station_suffix(" 渋谷 "), "渋谷");
        assert_eq!(strip_station_suffix("駅前駅"), "駅前");
    }

    #[test]
    fn minutes_must_be_positive() {
        assert_eq!(coerce_minutes(Some(&text("徒歩5分"))), Some(5));
        assert_eq!(coerce_minutes(Some(&FieldValue::Number(0.0))), None);
        assert_eq!(coerce_minutes(Some(&FieldValue::Number(7.6))), Some(8));
    }

    #[test]
    fn flags() {
        assert!(coerce_flag(Some(&FieldValue::Bool(true))));
        assert!(coerce_flag(Some(&text("○"))));
        assert!(coerce_flag(Some(&FieldValue::Number(1.0))));
        assert!(!coerce_flag(Some(&text("no"))));
        assert!(!coerce_flag(None));
    }
}
