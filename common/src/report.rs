//! Opaque text reports written by the analysis tools.
//!
//! The pipeline never parses these; it only needs to know whether anything was found
//! and to show the operator a short preview.

use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    content: String,
}

impl Report {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }

    /// Reads the report at `path`; `Ok(None)` if the tool never created it.
    pub fn read(path: &Path) -> io::Result<Option<Self>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(Self::new(String::from_utf8_lossy(&bytes)))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Non-blank lines of the report.
    pub fn findings(&self) -> impl Iterator<Item = &str> {
        self.content.lines().map(str::trim).filter(|line| !line.is_empty())
    }

    pub fn finding_count(&self) -> usize {
        self.findings().count()
    }

    /// First `lines` findings, each cut to at most `width` characters.
    pub fn preview(&self, lines: usize, width: usize) -> Vec<String> {
        self.findings()
            .take(lines)
            .map(|line| match line.char_indices().nth(width) {
                Some((idx, _)) => format!("{}...", &line[..idx]),
                None => line.to_string(),
            })
            .collect()
    }
}
