//! Component catalog
//!
//! Component records, the ordered lookup table, query normalization and the
//! resolver that maps a clicked BOM entry to a storage location.

mod normalize;
mod record;
mod resolver;
mod table;

pub use record::{ComponentRecord, Slot};
pub use resolver::{resolve, MatchReason, Resolution, SearchQuery};
pub use table::LookupTable;
