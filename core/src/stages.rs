//! The concrete pipeline steps, in execution order.
//!
//! Each stage stages its merges on a copy of the result set and only commits them once
//! the tool has exited cleanly, so a tool that dies half-way contributes nothing.

use std::path::PathBuf;

use jsearch_common::error::ToolError;
use jsearch_common::error;
use jsearch_common::tools::Tool;

use crate::stage::{StageContext, StageHandler};
use crate::workspace::ScratchFile;

mod javascript;
mod live;
mod secrets;
mod subdomains;
mod vulns;

pub use javascript::JsDiscovery;
pub use live::LivenessCheck;
pub use secrets::SecretAnalysis;
pub use subdomains::SubdomainDiscovery;
pub use vulns::VulnerabilityScan;

/// Every numbered stage, in the order the sequencer runs them.
pub fn standard() -> Vec<Box<dyn StageHandler>> {
    vec![
        Box::new(SubdomainDiscovery),
        Box::new(LivenessCheck),
        Box::new(JsDiscovery),
        Box::new(SecretAnalysis),
        Box::new(VulnerabilityScan),
    ]
}

/// Output path for `tool`, cleared of results from a previous run.
fn prepare_output(ctx: &StageContext<'_>, tool: Tool, name: &str) -> Option<PathBuf> {
    match ctx.workspace.fresh_output(name) {
        Ok(path) => Some(path),
        Err(source) => {
            error!("{}", ToolError::Io { tool: tool.to_string(), source });
            None
        }
    }
}

fn prepare_scratch<I, S>(ctx: &StageContext<'_>, tool: Tool, name: &str, lines: I) -> Option<ScratchFile>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match ctx.workspace.scratch(name, lines) {
        Ok(scratch) => Some(scratch),
        Err(source) => {
            error!("{}", ToolError::Io { tool: tool.to_string(), source });
            None
        }
    }
}

/// Reads a tool's output file, logging instead of failing.
fn read_output(ctx: &StageContext<'_>, tool: Tool, name: &str) -> Vec<String> {
    ctx.workspace.read_lines(name).unwrap_or_else(|source| {
        error!("{}", ToolError::Io { tool: tool.to_string(), source });
        Vec::new()
    })
}
