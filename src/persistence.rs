//! Writes response documents to disk

use crate::{error::HarvestResult, types::WriteMode};
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Write `content` to `path` using the given mode.
///
/// [`WriteMode::Write`] truncates an existing file, [`WriteMode::Append`]
/// adds to its end. Parent directories are not created. The file handle is
/// dropped on every return path, including a failed write.
pub async fn save_file_data(content: &str, path: &Path, mode: WriteMode) -> HarvestResult<()> {
    let mut options = OpenOptions::new();
    match mode {
        WriteMode::Write => options.write(true).create(true).truncate(true),
        WriteMode::Append => options.append(true).create(true),
    };

    let mut file = options.open(path).await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;

    log::debug!("Wrote {} bytes to {} (mode {mode})", content.len(), path.display());
    Ok(())
}

/// Same as [`save_file_data`] with the mode given as `"w"` or `"a"`
pub async fn save_file_data_with_mode(content: &str, path: &Path, mode: &str) -> HarvestResult<()> {
    let mode: WriteMode = mode.parse()?;
    save_file_data(content, path, mode).await
}
