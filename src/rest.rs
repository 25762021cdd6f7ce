//! Hosted content store over the PostgREST interface.

mod client;

pub use client::{RestStore, RestStoreBuilder, in_filter, parse_content_range_total, row_from_json};
