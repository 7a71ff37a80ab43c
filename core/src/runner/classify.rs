//! Per-stage display policies for streamed tool output.

use jsearch_common::host;
use jsearch_common::print::{self, LineTag};
use jsearch_common::tools::Tool;

use crate::stage::StageId;

/// What to do with one line of tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    Show(String),
    Tagged(LineTag, String),
    Hide,
}

impl LineAction {
    pub fn emit(self) {
        match self {
            LineAction::Show(line) => print::print(&line),
            LineAction::Tagged(tag, line) => print::tagged(tag, &line),
            LineAction::Hide => {}
        }
    }
}

/// How lines from a particular tool in a particular stage are shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPolicy {
    Passthrough,
    /// Non-blank lines are shown behind a `[TAG]` marker.
    Tagged(LineTag),
    /// Only lines starting with the marker are shown; banners and errors are dropped.
    FindingsOnly(&'static str),
}

impl DisplayPolicy {
    pub fn for_invocation(stage: StageId, tool: Tool) -> Self {
        match (stage, tool) {
            (StageId::DiscoverSubdomains, Tool::Subfinder | Tool::Ffuf) => {
                DisplayPolicy::Tagged(LineTag::Subdomain)
            }
            (StageId::CheckLive, Tool::Httpx) => DisplayPolicy::Tagged(LineTag::Live),
            (StageId::DiscoverJs, Tool::Gau | Tool::Katana) => DisplayPolicy::Tagged(LineTag::JsFile),
            (StageId::AnalyzeSecrets, Tool::Mantra) => DisplayPolicy::FindingsOnly("[+]"),
            (StageId::ScanVulnerabilities, Tool::Nuclei) => DisplayPolicy::Tagged(LineTag::Vuln),
            _ => DisplayPolicy::Passthrough,
        }
    }

    pub fn apply(&self, line: &str) -> LineAction {
        let trimmed: &str = line.trim();
        match self {
            DisplayPolicy::Passthrough => LineAction::Show(line.trim_end().to_string()),
            DisplayPolicy::Tagged(_) if trimmed.is_empty() => LineAction::Hide,
            DisplayPolicy::Tagged(tag) => LineAction::Tagged(*tag, trimmed.to_string()),
            DisplayPolicy::FindingsOnly(marker) => {
                if host::strip_ansi(trimmed).starts_with(marker) {
                    LineAction::Show(trimmed.to_string())
                } else {
                    LineAction::Hide
                }
            }
        }
    }
}
