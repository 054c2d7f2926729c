pub mod areas;
pub mod transit;

pub use areas::{extract_ward, TOKYO_AREAS};
pub use transit::{transit_lines, TransitKind, TransitLine};
