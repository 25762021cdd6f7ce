//! SQL script handling: statement splitting, chunking for staged import, and
//! statement-by-statement import into a content store.

mod chunker;
mod import;
mod splitter;

pub use chunker::{DEFAULT_BATCH_SIZE, chunk_file_name, chunk_statements, render_chunk, write_chunks};
pub use import::{ImportReport, StatementFailure, import_file, import_statements, is_benign_failure};
pub use splitter::{SqlSplitError, split_statements};
