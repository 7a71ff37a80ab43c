//! # Scan Target Model
//!
//! The apex domain a run is pointed at. Accepts the same loose forms an operator tends to
//! paste (`https://Example.com/`, `example.com.`) and reduces them to the canonical host.

use std::fmt;
use std::str::FromStr;

use crate::host;

/// Canonical apex domain; set once when the pipeline starts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    apex: String,
}

impl Target {
    pub fn as_str(&self) -> &str {
        &self.apex
    }

    /// Directory name used when no explicit output directory is configured.
    pub fn default_output_dir(&self) -> String {
        format!("jsearch_{}", self.apex.replace('.', "_"))
    }
}

impl FromStr for Target {
    type Err = String;

    /// Parses a domain, tolerating a scheme, a path and surrounding whitespace.
    ///
    /// Fails for input without a host and for hosts containing whitespace, which would
    /// otherwise be split into several arguments by the tools.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let apex: String = host::normalize(s);

        if apex.is_empty() {
            return Err(format!("invalid target: {s:?}"));
        }

        if apex.chars().any(char::is_whitespace) {
            return Err(format!("invalid target {s:?}: hosts cannot contain whitespace"));
        }

        Ok(Self { apex })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.apex)
    }
}
