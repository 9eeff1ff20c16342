//! Street resolution for housenumbers.
//!
//! Matches each housenumber to a street linestring sharing its parent and
//! carrying exactly its `addr:street` name, then follows street merges.

mod index;
mod resolver;

pub use index::StreetIndex;
pub use resolver::{StreetPassReport, StreetResolution, StreetResolver};
