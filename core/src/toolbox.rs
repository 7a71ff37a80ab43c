//! Locating the external tools and checking that the mandatory ones are installed.

use std::path::PathBuf;
use std::time::Duration;

use jsearch_common::config::{Config, SkipFlags, ToolPaths};
use jsearch_common::error::PipelineError;
use jsearch_common::tools::Tool;
use jsearch_common::{debug, error, info, success};

use crate::runner::{self, Invocation};
use crate::stage::StageId;

#[derive(Debug, Clone)]
pub struct Toolbox {
    paths: ToolPaths,
    probe_timeout: Duration,
}

impl Toolbox {
    pub fn new(config: &Config) -> Self {
        Self {
            paths: config.tools.clone(),
            probe_timeout: config.probe_timeout,
        }
    }

    pub fn program(&self, tool: Tool) -> PathBuf {
        self.paths.program(tool)
    }

    /// Starts an invocation of `tool` on behalf of `stage`.
    pub fn invocation(&self, tool: Tool, stage: StageId, description: impl Into<String>) -> Invocation {
        Invocation::new(tool, stage, self.program(tool), description)
    }

    pub async fn is_available(&self, tool: Tool) -> bool {
        let available: bool = runner::probe(&self.program(tool), self.probe_timeout).await;
        debug!("{} available: {}", tool, available);
        available
    }

    /// Probes every known tool.
    pub async fn survey(&self) -> Availability {
        let mut entries: Vec<(Tool, bool)> = Vec::with_capacity(Tool::ALL.len());
        for tool in Tool::ALL {
            entries.push((tool, self.is_available(tool).await));
        }
        Availability { entries }
    }

    /// Fails the run when a mandatory tool that is going to be used cannot be started.
    pub async fn precheck(&self, skip: &SkipFlags) -> Result<(), PipelineError> {
        info!("Checking tool availability...");

        let mut missing: Vec<Tool> = Vec::new();
        for tool in Tool::ALL {
            if !tool.is_mandatory() || skip.is_skipped(tool) {
                continue;
            }
            if !self.is_available(tool).await {
                missing.push(tool);
            }
        }

        if missing.is_empty() {
            success!("All required tools are available");
            return Ok(());
        }

        let names: Vec<String> = missing.iter().map(Tool::to_string).collect();
        error!("Missing tools: {}", names.join(", "));
        error!("Please install missing tools before running jsearch");
        for tool in &missing {
            if let Some(hint) = tool.install_hint() {
                info!("Install {} from {}", tool, hint);
            }
        }
        Err(PipelineError::MissingTools(names))
    }
}

/// Result of probing every tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub entries: Vec<(Tool, bool)>,
}

impl Availability {
    pub fn missing_required(&self) -> Vec<Tool> {
        self.missing(true)
    }

    pub fn missing_optional(&self) -> Vec<Tool> {
        self.missing(false)
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    fn missing(&self, mandatory: bool) -> Vec<Tool> {
        self.entries
            .iter()
            .filter(|(tool, available)| !available && tool.is_mandatory() == mandatory)
            .map(|(tool, _)| *tool)
            .collect()
    }
}
