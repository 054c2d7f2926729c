// src/domain/stats.rs

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::property::{CanonicalProperty, PropertyType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total: usize,
    pub available: usize,
    pub by_type: BTreeMap<PropertyType, usize>,
    pub by_ward: BTreeMap<String, usize>,
    /// Mean rent over available listings that state a rent, rounded. 0 when there are none.
    pub average_rent: u64,
    /// Mean area over listings that state an area, rounded. 0 when there are none.
    pub average_area: u64,
    pub with_images: usize,
    pub with_coordinates: usize,
}

/// How complete the upstream data was, for the run log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub total: usize,
    pub with_coordinates: usize,
    pub with_images: usize,
    pub with_rent: usize,
    pub with_address: usize,
    pub with_station: usize,
    pub with_train_lines: usize,
}

/// Addresses this short are usually just a ward name.
const MEANINGFUL_ADDRESS_CHARS: usize = 5;

/// Single pass over the set. Pure; safe to call on any slice, including an empty one.
pub fn compute_stats(properties: &[CanonicalProperty]) -> StatsSummary {
    let mut stats = StatsSummary {
        total: properties.len(),
        ..StatsSummary::default()
    };

    let mut rent_sum: u128 = 0;
    let mut rent_count: u64 = 0;
    let mut area_sum = 0.0_f64;
    let mut area_count: u64 = 0;

    for p in properties {
        *stats.by_type.entry(p.property_type).or_insert(0) += 1;

        if !p.ward.is_empty() {
            *stats.by_ward.entry(p.ward.clone()).or_insert(0) += 1;
        }

        if p.is_available {
            stats.available += 1;
            if let Some(rent) = p.rent {
                rent_sum += rent as u128;
                rent_count += 1;
            }
        }

        if let Some(area) = p.area {
            area_sum += area;
            area_count += 1;
        }

        if p.has_images() {
            stats.with_images += 1;
        }
        if p.has_coordinates() {
            stats.with_coordinates += 1;
        }
    }

    stats.average_rent = if rent_count > 0 {
        (rent_sum as f64 / rent_count as f64).round() as u64
    } else {
        0
    };
    stats.average_area = if area_count > 0 {
        (area_sum / area_count as f64).round() as u64
    } else {
        0
    };

    stats
}

pub fn quality_report(properties: &[CanonicalProperty]) -> QualityReport {
    let count = |pred: fn(&CanonicalProperty) -> bool| properties.iter().filter(|p| pred(p)).count();

    QualityReport {
        total: properties.len(),
        with_coordinates: count(|p| p.coordinates.is_some()),
        with_images: count(|p| !p.images.is_empty()),
        with_rent: count(|p| p.rent.is_some()),
        with_address: count(|p| p.address.chars().count() > MEANINGFUL_ADDRESS_CHARS),
        with_station: count(|p| !p.nearest_station.is_empty()),
        with_train_lines: count(|p| !p.train_lines.is_empty()),
    }
}
