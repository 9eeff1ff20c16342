//! Placenames - batch enrichment passes over an imported OSM place-name store.
//!
//! This library provides the name and street resolvers together with the
//! record store they run against. The `enrich` binary wires them to a config
//! file and an on-disk sled store.

pub mod config;
pub mod error;
pub mod models;
pub mod names;
pub mod store;
pub mod streets;

pub use config::Config;
pub use error::{EnrichError, Result};
pub use models::{AddressRecord, PlaceKind, PlaceRecord, StreetRecord, Table};
pub use names::{NamePassReport, NameResolver};
pub use store::{MemoryStore, RecordStore, SledStore};
pub use streets::{StreetPassReport, StreetResolver};
