pub mod config;
pub mod coverage;
pub mod db;
pub mod dedup;
pub mod models;
pub mod placeholder;
pub mod remap;
pub mod rest;
pub mod sql;
pub mod store;
pub mod utils;

pub use config::{ConfigError, StoreConfig};
pub use db::Database;
pub use models::{ContentKind, ContentRow, Difficulty, Hierarchy, NewContent, RowId, SubtopicId};
pub use rest::{RestStore, RestStoreBuilder};
pub use store::{ContentStore, StoreError};
