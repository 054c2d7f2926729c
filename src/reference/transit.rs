//! Static rail network reference for the target region.
//!
//! The table ships inside the binary and is parsed once on first use. It is never
//! refreshed from live data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

const TRANSIT_LINES_JSON: &str = include_str!("../../data/transit_lines.json");

static TRANSIT_LINES: OnceLock<Vec<TransitLine>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitKind {
    Rail,
    Shinkansen,
    /// Automated guideway lines.
    Liner,
    Metro,
    Tram,
    Monorail,
    Cable,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitLine {
    pub id: String,
    pub name: String,
    pub company: String,
    pub kind: TransitKind,
    pub stations: Vec<String>,
}

impl TransitLine {
    pub fn serves(&self, station: &str) -> bool {
        self.stations.iter().any(|s| s == station)
    }
}

/// All lines. An unparseable embedded table logs an error and yields no lines.
pub fn transit_lines() -> &'static [TransitLine] {
    TRANSIT_LINES.get_or_init(|| {
        serde_json::from_str(TRANSIT_LINES_JSON).unwrap_or_else(|e| {
            tracing::error!("embedded transit table is invalid: {e}");
            Vec::new()
        })
    })
}

pub fn line_by_id(id: &str) -> Option<&'static TransitLine> {
    transit_lines().iter().find(|l| l.id == id)
}

/// Stations of the line with exactly this name; empty for unknown names.
pub fn stations_by_line_name(name: &str) -> &'static [String] {
    transit_lines()
        .iter()
        .find(|l| l.name == name.trim())
        .map(|l| l.stations.as_slice())
        .unwrap_or(&[])
}

/// Id or exact name, whichever matches first.
pub fn stations_by_line(id_or_name: &str) -> &'static [String] {
    transit_lines()
        .iter()
        .find(|l| l.id == id_or_name || l.name == id_or_name)
        .map(|l| l.stations.as_slice())
        .unwrap_or(&[])
}

pub fn lines_by_station(station: &str) -> Vec<&'static TransitLine> {
    transit_lines().iter().filter(|l| l.serves(station)).collect()
}

pub fn lines_by_company(company: &str) -> Vec<&'static TransitLine> {
    transit_lines().iter().filter(|l| l.company == company).collect()
}

/// Case-insensitive substring search over line and company names. Empty query returns all.
pub fn search_lines(query: &str) -> Vec<&'static TransitLine> {
    let query = query.trim().to_lowercase();
    transit_lines()
        .iter()
        .filter(|l| query.is_empty() || l.name.to_lowercase().contains(&query) || l.company.to_lowercase().contains(&query))
        .collect()
}

/// Distinct station names, sorted.
pub fn all_stations() -> Vec<&'static str> {
    transit_lines()
        .iter()
        .flat_map(|l| l.stations.iter().map(String::as_str))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Conventional rail and subway only; what the search form offers.
pub fn major_lines() -> Vec<&'static TransitLine> {
    transit_lines()
        .iter()
        .filter(|l| matches!(l.kind, TransitKind::Rail | TransitKind::Metro))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_parses() {
        assert!(transit_lines().len() > 80);
        assert!(transit_lines().iter().all(|l| !l.stations.is_empty()));
    }

    #[test]
    fn ids_are_unique() {
        let ids: BTreeSet<_> = transit_lines().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), transit_lines().len());
    }

    #[test]
    fn lookup_by_name_and_id() {
        let by_name = stations_by_line_name("ＪＲ山手線");
        assert!(by_name.iter().any(|s| s == "渋谷"));
        assert_eq!(stations_by_line("jr_yamanote_line"), by_name);
        assert!(stations_by_line_name("存在しない線").is_empty());
        assert_eq!(line_by_id("tama_monorail").map(|l| l.kind), Some(TransitKind::Monorail));
    }

    #[test]
    fn station_served_by_several_lines() {
        let lines = lines_by_station("渋谷");
        assert!(lines.len() >= 4);
        assert!(lines.iter().any(|l| l.id == "metro_ginza_line"));
    }

    #[test]
    fn search_matches_company_and_name() {
        assert!(search_lines("東京メトロ").iter().all(|l| l.company == "東京メトロ" || l.name.contains("東京メトロ")));
        assert!(!search_lines("京王").is_empty());
        assert_eq!(search_lines("").len(), transit_lines().len());
    }

    #[test]
    fn major_lines_are_conventional_rail_and_metro() {
        let major = major_lines();
        assert_eq!(major.len(), 80);
        assert!(major.iter().all(|l| matches!(l.kind, TransitKind::Rail | TransitKind::Metro)));
        assert!(major.iter().all(|l| l.id != "jr_tokaido_shinkansen" && l.id != "nippori_toneri_liner"));
        assert_eq!(line_by_id("jr_tokaido_shinkansen").map(|l| l.kind), Some(TransitKind::Shinkansen));
        assert_eq!(line_by_id("nippori_toneri_liner").map(|l| l.kind), Some(TransitKind::Liner));
    }

    #[test]
    fn major_lines_exclude_cable_and_monorail() {
        assert!(major_lines()
            .iter()
            .all(|l| !matches!(l.kind, TransitKind::Cable | TransitKind::Monorail)));
        assert!(lines_by_company("高尾登山電鉄").iter().all(|l| l.kind == TransitKind::Cable));
    }

    #[test]
    fn stations_are_distinct_and_sorted() {
        let stations = all_stations();
        let mut sorted = stations.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(stations, sorted);
    }
}
