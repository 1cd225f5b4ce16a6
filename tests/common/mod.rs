//! Common test helpers shared across the integration test suite.

use chrono::{DateTime, TimeZone, Utc};
use oai_records::{Item, NoSets, RecordAssembler, RepositoryConfig};

/// Repository base used throughout the tests.
pub const BASE: &str = "library.example.org";

/// The creation time `2020-01-02T03:04:05Z`.
pub fn created() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
}

/// Assembler for [`BASE`] with no sets and the default formats.
#[allow(dead_code)]
pub fn assembler() -> RecordAssembler {
    RecordAssembler::new(RepositoryConfig::new(BASE), NoSets).expect("valid base")
}

/// An item with no fields.
#[allow(dead_code)]
pub fn empty_item(id: &str) -> Item {
    Item::new(id, created())
}

/// A realistic monograph loaded from the JSON fixture.
#[allow(dead_code)]
pub fn moby_dick() -> Item {
    serde_json::from_str(include_str!("../data/items/moby_dick.json")).expect("valid fixture")
}
