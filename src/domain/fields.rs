// src/domain/fields.rs

use crate::upstream::models::{FieldValue, Fields};

/// Strings the upstream uses to mean "nothing here".
const PLACEHOLDER_TOKENS: &[&str] = &["無し", "なし", "ナシ", "-", "－", "ー", "\u{2014}"];

/// How to find one canonical attribute in a record with unknown column names.
///
/// `exact` names are tried first, in order. Only if none of them holds a value are
/// the record's column names scanned for a case-insensitive substring match against
/// each `fallback` pattern, again in order.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub exact: &'static [&'static str],
    pub fallback: &'static [&'static str],
}

impl FieldRule {
    pub fn resolve<'f>(&self, fields: &'f Fields) -> Option<&'f FieldValue> {
        resolve(fields, self.exact, self.fallback)
    }

    /// Resolved value rendered as trimmed text, empty when absent.
    pub fn text(&self, fields: &Fields) -> String {
        self.resolve(fields).map(FieldValue::to_text).unwrap_or_default()
    }
}

/// The rule table. One entry per canonical attribute.
pub mod rules {
    use super::FieldRule;

    pub const PROPERTY_NAME: FieldRule = FieldRule {
        exact: &["物件名", "タイトル", "title"],
        fallback: &["物件名", "name", "title"],
    };
    pub const BUILDING_NAME: FieldRule = FieldRule {
        exact: &["建物名", "name"],
        fallback: &["建物", "building"],
    };
    pub const ADDRESS: FieldRule = FieldRule {
        exact: &["住所", "所在地", "address"],
        fallback: &["住所", "所在", "address", "location"],
    };
    pub const WARD: FieldRule = FieldRule {
        exact: &["区", "市区町村", "行政区"],
        fallback: &["区", "市", "行政区", "ward"],
    };
    pub const RENT: FieldRule = FieldRule {
        exact: &["賃料", "家賃", "月額", "rent"],
        fallback: &["賃料", "家賃", "rent", "price"],
    };
    pub const DEPOSIT: FieldRule = FieldRule {
        exact: &["敷金", "保証金", "礼金", "deposit"],
        fallback: &["敷金", "保証金", "deposit"],
    };
    pub const AREA: FieldRule = FieldRule {
        exact: &["面積", "専有面積", "使用面積", "area"],
        fallback: &["面積", "area", "size", "広さ"],
    };

    // Title synthesis looks columns up with its own, slightly different lists.
    pub const TITLE_ADDRESS: FieldRule = FieldRule {
        exact: &["住所", "所在地", "address", "location"],
        fallback: &["住所", "所在", "address"],
    };
    pub const TITLE_STATION: FieldRule = FieldRule {
        exact: &["最寄駅", "駅", "station", "access"],
        fallback: &["駅", "station", "最寄"],
    };
    pub const TITLE_AREA: FieldRule = FieldRule {
        exact: &["面積", "専有面積", "使用面積", "area"],
        fallback: &["面積", "area", "size"],
    };
    pub const FLOOR: FieldRule = FieldRule {
        exact: &["階", "所在階", "floor"],
        fallback: &["階", "floor", "フロア"],
    };
    pub const STRUCTURE: FieldRule = FieldRule {
        exact: &["構造", "建物構造", "structure"],
        fallback: &["構造", "RC", "SRC", "鉄筋"],
    };
    pub const STATION: FieldRule = FieldRule {
        exact: &["最寄駅", "駅", "station"],
        fallback: &["駅", "station", "最寄", "access"],
    };
    pub const WALKING_MINUTES: FieldRule = FieldRule {
        exact: &["徒歩", "徒歩時間", "walk"],
        fallback: &["徒歩", "walk", "walking", "分"],
    };
    pub const TRAIN_LINES: FieldRule = FieldRule {
        exact: &["沿線", "路線", "交通", "アクセス"],
        fallback: &["train", "line", "access", "沿線", "路線"],
    };
    pub const PROPERTY_TYPE: FieldRule = FieldRule {
        exact: &["種別", "用途", "type"],
        fallback: &["種別", "type", "用途", "category"],
    };
    pub const AVAILABILITY: FieldRule = FieldRule {
        exact: &["現況", "状態", "status"],
        fallback: &["現況", "status", "状態"],
    };
    pub const NOTES: FieldRule = FieldRule {
        exact: &["備考", "メモ", "notes"],
        fallback: &["備考", "memo", "notes", "comment"],
    };
    pub const LATITUDE: FieldRule = FieldRule {
        exact: &["緯度", "Latitude", "lat"],
        fallback: &["lat", "latitude", "緯度", "GPS緯度"],
    };
    pub const LONGITUDE: FieldRule = FieldRule {
        exact: &["経度", "Longitude", "lng"],
        fallback: &["lng", "lon", "longitude", "経度", "GPS経度"],
    };
    pub const FEATURED: FieldRule = FieldRule {
        exact: &["注目", "おすすめ", "featured"],
        fallback: &["注目", "おすすめ", "featured", "pickup"],
    };

    // Secondary attributes, display only.
    pub const MOVE_IN: FieldRule = FieldRule {
        exact: &["入居時期", "契約可能時期"],
        fallback: &["入居", "契約"],
    };
    pub const CONTRACT_PERIOD: FieldRule = FieldRule {
        exact: &["契約期間", "契約年数"],
        fallback: &["契約期間", "年数"],
    };
    pub const MANAGEMENT_FEE: FieldRule = FieldRule {
        exact: &["管理費", "共益費"],
        fallback: &["管理費", "共益費"],
    };
    pub const OTHER_FEE_NAME: FieldRule = FieldRule {
        exact: &["その他費用名"],
        fallback: &["その他"],
    };
    pub const OTHER_FEE_AMOUNT: FieldRule = FieldRule {
        exact: &["その他費用"],
        fallback: &["その他費用"],
    };
    pub const RENEWAL_CATEGORY: FieldRule = FieldRule {
        exact: &["更新区分"],
        fallback: &["更新"],
    };
    pub const RENEWAL_FEE: FieldRule = FieldRule {
        exact: &["更新料"],
        fallback: &["更新料"],
    };
    pub const INSURANCE: FieldRule = FieldRule {
        exact: &["保険加入義務"],
        fallback: &["保険"],
    };
}

/// Two-tier lookup: exact names first, then case-insensitive substring patterns over
/// every column name. Empty and placeholder values are skipped, never returned.
pub fn resolve<'f>(fields: &'f Fields, exact: &[&str], fallback: &[&str]) -> Option<&'f FieldValue> {
    for name in exact {
        if let Some(value) = fields.get(name).filter(|v| !is_empty_value(v)) {
            return Some(value);
        }
    }

    for pattern in fallback {
        let pattern = pattern.to_lowercase();
        let hit = fields
            .iter()
            .find(|(name, value)| name.to_lowercase().contains(&pattern) && !is_empty_value(value));
        if let Some((_, value)) = hit {
            return Some(value);
        }
    }

    None
}

pub fn is_empty_value(value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(s) => {
            let s = s.trim();
            s.is_empty() || PLACEHOLDER_TOKENS.contains(&s)
        }
        FieldValue::Number(n) => !n.is_finite(),
        FieldValue::Bool(_) => false,
        FieldValue::Attachments(items) => items.is_empty(),
        FieldValue::Other(serde_json::Value::Null) => true,
        FieldValue::Other(serde_json::Value::Array(items)) => items.is_empty(),
        FieldValue::Other(_) => false,
    }
}
