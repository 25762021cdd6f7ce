use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use super::split_statements;

/// Statements per chunk file unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Groups statements into batches of at most `batch_size`.
///
/// Only the final batch may be smaller. A `batch_size` of zero is treated as one.
pub fn chunk_statements(statements: &[String], batch_size: usize) -> Vec<&[String]> {
    statements.chunks(batch_size.max(1)).collect()
}

/// Renders a batch as a script, one terminated statement per line.
pub fn render_chunk(batch: &[String]) -> String {
    batch.iter().map(|stmt| format!("{stmt};\n")).collect()
}

/// File name for chunk `part` (1-based) of `input`: `<stem>_part<N>.sql`.
pub fn chunk_file_name(input: &Path, part: usize) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chunk".to_string());
    format!("{stem}_part{part}.sql")
}

/// Splits the script at `input` and writes one file per batch.
///
/// Files land in `out_dir`, or next to `input` when `None`. Returns the
/// written paths in part order.
///
/// # Errors
///
/// Returns an error if `batch_size` is zero, the input cannot be read or
/// tokenized, or a chunk cannot be written.
pub fn write_chunks(input: &Path, out_dir: Option<&Path>, batch_size: usize) -> Result<Vec<PathBuf>> {
    if batch_size == 0 {
        bail!("Batch size must be greater than zero");
    }

    let sql = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read SQL file: {}", input.display()))?;
    let statements = split_statements(&sql)
        .with_context(|| format!("Failed to tokenize SQL file: {}", input.display()))?;

    let out_dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let mut written = Vec::new();
    for (index, batch) in chunk_statements(&statements, batch_size).into_iter().enumerate() {
        let path = out_dir.join(chunk_file_name(input, index + 1));
        std::fs::write(&path, render_chunk(batch))
            .with_context(|| format!("Failed to write chunk: {}", path.display()))?;
        info!(path = %path.display(), statements = batch.len(), "wrote chunk");
        written.push(path);
    }

    Ok(written)
}
