//! Display-name and alternative-name resolution for place records.

mod normalize;
mod resolver;

pub use normalize::normalize_whitespace;
pub use resolver::{NamePassReport, NameResolver, ResolvedNames, ALTERNATIVE_NAMES_DELIMITER};
