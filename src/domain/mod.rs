pub mod coerce;
pub mod fields;
pub mod normalize;
pub mod price;
pub mod property;
pub mod stats;
pub mod title;

pub use fields::{resolve, FieldRule};
pub use normalize::{normalize_all, normalize_record, NormalizedBatch};
pub use property::{CanonicalProperty, Coordinates, PropertyDetails, PropertyType};
pub use stats::{compute_stats, quality_report, QualityReport, StatsSummary};
