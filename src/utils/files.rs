//! Line-oriented file reading and writing.

use std::fmt::Display;
use std::io::ErrorKind;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

/// Reads every non-blank line of `path`, trimmed.
pub async fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut out = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
    }
    Ok(out)
}

/// Like [`read_lines`], but a missing file reads as empty.
///
/// Engines may skip creating an output file when they have nothing to write.
pub async fn read_lines_if_exists(path: &Path) -> std::io::Result<Vec<String>> {
    match read_lines(path).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        other => other,
    }
}

/// Writes one item per line, replacing any existing file.
pub async fn write_lines<I, T>(path: &Path, items: I) -> std::io::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let file = File::create(path).await?;
    let mut writer = BufWriter::new(file);
    for item in items {
        writer.write_all(format!("{}\n", item).as_bytes()).await?;
    }
    writer.flush().await?;
    Ok(())
}
