//! Archive store module
//!
//! Indexes a directory of plain-text article files. The summary list and
//! per-article detail are produced on demand; file contents are never
//! cached across requests, so articles can be dropped into the directory
//! while the server runs.

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;

use crate::error::ServerError;
use crate::logger;

/// Number of leading characters used for the index excerpt
const EXCERPT_CHARS: usize = 200;

/// One entry of the archive index, serialized for the client-side list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSummary {
    pub file_name: String,
    pub title: String,
    pub content: String,
    pub date: String,
}

/// A fully loaded article
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveDetail {
    pub file_name: String,
    pub content: String,
}

/// Lazy index over the archive directory. Holds only the path; all reads
/// happen per request.
pub struct ArchiveStore {
    dir: PathBuf,
}

impl ArchiveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// List articles in directory order (not sorted).
    ///
    /// Fails open: unreadable entries and subdirectories are skipped, a
    /// missing archive directory yields an empty list.
    pub async fn summary_list(&self) -> Vec<ArchiveSummary> {
        let mut summaries = Vec::new();
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to list archive directory '{}': {e}",
                    self.dir.display()
                ));
                return summaries;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    logger::log_warning(&format!("Archive directory walk aborted: {e}"));
                    break;
                }
            };
            match summarize(&entry).await {
                Ok(Some(summary)) => summaries.push(summary),
                Ok(None) => {} // not a regular file
                Err(e) => logger::log_warning(&format!(
                    "Skipping unreadable archive entry '{}': {e}",
                    entry.file_name().to_string_lossy()
                )),
            }
        }
        summaries
    }

    /// Read the named article fully.
    ///
    /// Fails with `NotFound` when the file does not exist or is
    /// unreadable; the underlying I/O message is preserved verbatim for
    /// diagnostic display.
    pub async fn detail(&self, file_name: &str) -> Result<ArchiveDetail, ServerError> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
            return Err(ServerError::NotFound(format!(
                "invalid archive name '{file_name}'"
            )));
        }
        match fs::read_to_string(self.dir.join(file_name)).await {
            Ok(content) => Ok(ArchiveDetail {
                file_name: file_name.to_string(),
                content,
            }),
            Err(e) => Err(ServerError::NotFound(e.to_string())),
        }
    }
}

/// Build the summary for one directory entry: title from the first
/// non-empty line (or the file name), a leading excerpt, and the file
/// mtime as the footnote date.
async fn summarize(entry: &fs::DirEntry) -> io::Result<Option<ArchiveSummary>> {
    let stat = entry.metadata().await?;
    if !stat.is_file() {
        return Ok(None);
    }
    let file_name = entry.file_name().to_string_lossy().into_owned();
    let text = fs::read_to_string(entry.path()).await?;
    let title = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .map_or_else(|| file_name.clone(), |line| line.trim().to_string());
    let date = stat
        .modified()
        .map(|time| DateTime::<Utc>::from(time).to_rfc3339())
        .unwrap_or_default();
    Ok(Some(ArchiveSummary {
        file_name,
        title,
        content: excerpt(&text),
        date,
    }))
}

/// Leading excerpt, cut on a char boundary so multi-byte text never splits
fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
