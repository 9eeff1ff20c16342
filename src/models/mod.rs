//! Record types read from and written back to the store.

mod fields;
pub mod place;
pub mod street;

pub(crate) use fields::RecordReader;
pub use place::{PlaceKind, PlaceRecord, Table, TagBag};
pub use street::{AddressRecord, StreetRecord};
