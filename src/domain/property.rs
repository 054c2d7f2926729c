// src/domain/property.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::upstream::models::Fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Restaurant,
    Retail,
    Office,
    Warehouse,
    Service,
    Residential,
    Other,
}

impl PropertyType {
    pub const ALL: [PropertyType; 7] = [
        PropertyType::Restaurant,
        PropertyType::Retail,
        PropertyType::Office,
        PropertyType::Warehouse,
        PropertyType::Service,
        PropertyType::Residential,
        PropertyType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Restaurant => "restaurant",
            PropertyType::Retail => "retail",
            PropertyType::Office => "office",
            PropertyType::Warehouse => "warehouse",
            PropertyType::Service => "service",
            PropertyType::Residential => "residential",
            PropertyType::Other => "other",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown property type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Secondary attributes shown on the detail page. Nothing in the pipeline reads these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetails {
    /// `MY-` plus the last 8 characters of the record id.
    pub property_code: String,
    /// Rent in 10,000-yen units, two decimals.
    pub rent_man_yen: Option<f64>,
    pub security_deposit: Option<u64>,
    pub management_fee: Option<f64>,
    pub move_in_timing: Option<String>,
    pub contract_period: Option<String>,
    pub other_monthly_fee_name: Option<String>,
    pub other_monthly_fee_amount: Option<f64>,
    pub renewal_category: Option<String>,
    pub renewal_fee: Option<f64>,
    pub insurance_obligation: Option<String>,
    pub raw_fields: Fields,
}

/// The normalized listing every downstream consumer works with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalProperty {
    pub id: String,
    pub title: String,
    pub property_type: PropertyType,
    pub address: String,
    pub ward: String,
    /// Ward, or the first token of the address when the ward is unknown.
    pub location: String,
    pub nearest_station: String,
    pub walking_minutes: Option<u32>,
    pub train_lines: Vec<String>,
    pub coordinates: Option<Coordinates>,
    pub rent: Option<u64>,
    pub deposit: Option<u64>,
    pub area: Option<f64>,
    pub floor: String,
    pub structure: String,
    pub availability: String,
    pub is_available: bool,
    pub featured: bool,
    pub notes: String,
    pub images: Vec<String>,
    pub details: PropertyDetails,
}

impl CanonicalProperty {
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }
}

pub fn property_code(record_id: &str) -> String {
    format!("MY-{}", tail_chars(record_id, 8))
}

/// Last `n` characters, char-boundary safe.
pub fn tail_chars(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    let start = s.char_indices().nth(count - n).map(|(i, _)| i).unwrap_or(0);
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_round_trips_through_str() {
        for t in PropertyType::ALL {
            assert_eq!(t.as_str().parse::<PropertyType>().unwrap(), t);
        }
        assert!("parking".parse::<PropertyType>().is_err());
    }

    #[test]
    fn type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PropertyType::Warehouse).unwrap(), "\"warehouse\"");
    }

    #[test]
    fn code_uses_last_eight_chars() {
        assert_eq!(property_code("recAbCdEfGh1234"), "MY-EfGh1234");
        assert_eq!(property_code("rec1"), "MY-rec1");
    }

    #[test]
    fn tail_is_char_safe() {
        assert_eq!(tail_chars("東京都渋谷区", 3), "渋谷区");
        assert_eq!(tail_chars("abc", 6), "abc");
    }
}
