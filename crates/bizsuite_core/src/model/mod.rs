//! Record types persisted by the suite modules.
//!
//! # Responsibility
//! - Define one typed record per entity and one document per module.
//! - Keep the on-disk field names stable (`nombre`, `estado`, ...) while
//!   exposing English names in Rust.
//!
//! # Invariants
//! - Record ids are sequential per collection, start at 1 and are never
//!   reused: a new id is always `len(collection) + 1`.
//! - Cross-collection references are soft: `Option<RecordId>` values that
//!   are never validated on write.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub mod contact;
pub mod form;
pub mod project;
pub mod report;

/// Sequential per-collection record id.
pub type RecordId = u64;

/// Id for the next record appended to `records`.
pub fn next_id<T>(records: &[T]) -> RecordId {
    records.len() as RecordId + 1
}

/// Current UTC time as an RFC 3339 string.
pub fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
