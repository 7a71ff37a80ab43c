//! Operator-facing lines that bypass the `[LEVEL]` prefix.
//!
//! The front-end formatter recognises [`PRINT_TARGET`](crate::PRINT_TARGET) events and
//! renders the `raw_msg` field verbatim, coloured according to the optional `tag`.

use std::fmt;

/// Marks a line as a discovery of a particular kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    Subdomain,
    Live,
    JsFile,
    Vuln,
    /// Numbered stage banner such as `[1/5] Gathering Subdomains`.
    Stage,
}

impl LineTag {
    pub fn label(&self) -> &'static str {
        match self {
            LineTag::Subdomain => "SUBDOMAIN",
            LineTag::Live => "LIVE",
            LineTag::JsFile => "JS FILE",
            LineTag::Vuln => "VULN",
            LineTag::Stage => "STAGE",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "SUBDOMAIN" => Some(LineTag::Subdomain),
            "LIVE" => Some(LineTag::Live),
            "JS FILE" => Some(LineTag::JsFile),
            "VULN" => Some(LineTag::Vuln),
            "STAGE" => Some(LineTag::Stage),
            _ => None,
        }
    }
}

impl fmt::Display for LineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Prints a line exactly as given.
pub fn print(msg: &str) {
    tracing::info!(target: crate::PRINT_TARGET, raw_msg = msg);
}

/// Prints a line behind a `[TAG]` marker.
pub fn tagged(tag: LineTag, msg: &str) {
    tracing::info!(target: crate::PRINT_TARGET, tag = tag.label(), raw_msg = msg);
}
