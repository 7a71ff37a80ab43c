//! Final record of a run, persisted as JSON in the output directory.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::results::ResultSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub target: String,
    pub timestamp: DateTime<Local>,
    pub subdomains_found: usize,
    pub live_domains_found: usize,
    pub js_files_found: usize,
    pub subdomains: Vec<String>,
    pub live_domains: Vec<String>,
    pub js_files: Vec<String>,
}

impl Summary {
    /// Takes an immutable snapshot of `results` stamped with the current time.
    pub fn snapshot(results: &ResultSet) -> Self {
        let subdomains: Vec<String> = results.subdomains().map(str::to_string).collect();
        let live_domains: Vec<String> = results.live_domains().map(str::to_string).collect();
        let js_files: Vec<String> = results.js_files().map(str::to_string).collect();

        Self {
            target: results.target().to_string(),
            timestamp: Local::now(),
            subdomains_found: subdomains.len(),
            live_domains_found: live_domains.len(),
            js_files_found: js_files.len(),
            subdomains,
            live_domains,
            js_files,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), crate::error::PipelineError> {
        let json: String = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
