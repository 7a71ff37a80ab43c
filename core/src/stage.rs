//! The shared vocabulary of the pipeline steps.

use std::fmt;

use async_trait::async_trait;
use jsearch_common::config::Config;
use jsearch_common::results::ResultSet;

use crate::runner::ProcessRunner;
use crate::toolbox::Toolbox;
use crate::workspace::Workspace;

/// Identifies a pipeline step.
///
/// Travels with every tool invocation so output classification never depends on
/// human-readable descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    DiscoverSubdomains,
    CheckLive,
    DiscoverJs,
    AnalyzeSecrets,
    ScanVulnerabilities,
    Finalize,
}

impl StageId {
    /// Execution order; the sequencer never deviates from it.
    pub const ORDER: [StageId; 6] = [
        StageId::DiscoverSubdomains,
        StageId::CheckLive,
        StageId::DiscoverJs,
        StageId::AnalyzeSecrets,
        StageId::ScanVulnerabilities,
        StageId::Finalize,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            StageId::DiscoverSubdomains => "Gathering Subdomains",
            StageId::CheckLive => "Checking Live Domains",
            StageId::DiscoverJs => "Discovering JS Files",
            StageId::AnalyzeSecrets => "Analyzing for Secrets",
            StageId::ScanVulnerabilities => "Scanning for Vulnerabilities",
            StageId::Finalize => "Finalizing Results",
        }
    }

    /// 1-based position among the numbered stages; `None` for [`StageId::Finalize`].
    pub fn step(&self) -> Option<usize> {
        match self {
            StageId::Finalize => None,
            _ => StageId::ORDER.iter().position(|s| s == self).map(|idx| idx + 1),
        }
    }

    /// Banner printed when the stage starts, e.g. `[2/5] Checking Live Domains`.
    pub fn banner(&self) -> String {
        let numbered: usize = StageId::ORDER.len() - 1;
        match self.step() {
            Some(step) => format!("[{step}/{numbered}] {}", self.title()),
            None => self.title().to_string(),
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageId::DiscoverSubdomains => "discover_subdomains",
            StageId::CheckLive => "check_live",
            StageId::DiscoverJs => "discover_js",
            StageId::AnalyzeSecrets => "analyze_secrets",
            StageId::ScanVulnerabilities => "scan_vulnerabilities",
            StageId::Finalize => "finalize",
        };
        f.write_str(name)
    }
}

/// How a stage ended. Stages never fail the pipeline; at worst they degrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Ran; `new` entries were added to the result set or reported.
    Completed { new: usize },
    /// Did nothing: skip flag, unmet precondition or missing optional tool.
    Skipped(String),
    /// Ran but its tooling failed; contributed nothing further.
    Degraded(String),
}

/// Everything a stage may use besides the result set.
pub struct StageContext<'a> {
    pub config: &'a Config,
    pub runner: &'a ProcessRunner,
    pub toolbox: &'a Toolbox,
    pub workspace: &'a Workspace,
}

/// One step of the pipeline.
///
/// Implementations swallow and log their own tool-level errors.
#[async_trait]
pub trait StageHandler: Send + Sync {
    fn id(&self) -> StageId;

    async fn run(&self, ctx: &StageContext<'_>, results: &mut ResultSet) -> StageOutcome;
}
