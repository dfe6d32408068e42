// src/utils/fs.rs

//! Filesystem helpers. Every write creates or truncates the target file.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Create a directory and its parents; an existing directory is not an error.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

/// Write bytes to a file, creating or truncating it.
pub async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

/// Write one entry per line, each line terminated by `\n`.
pub async fn write_lines<I, S>(path: &Path, lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }
    write_bytes(path, content.as_bytes()).await
}

/// Write a value as pretty printed JSON.
pub async fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes(path, &bytes).await
}
