use std::path::Path;

use async_trait::async_trait;
use jsearch_common::report::Report;
use jsearch_common::results::ResultSet;
use jsearch_common::tools::Tool;
use jsearch_common::{error, host, info, success, warn};

use super::{prepare_output, prepare_scratch};
use crate::runner::Invocation;
use crate::stage::{StageContext, StageHandler, StageId, StageOutcome};
use crate::workspace::{JS_SCRATCH, MANTRA_OUTPUT};

/// Prefix mantra puts in front of every finding.
const FINDING_MARKER: &str = "[+]";

/// `cat <list> | mantra | tee <report>`, with the paths passed as positional parameters.
///
/// Bails out before `tee` creates the report when the scanner cannot be found, and exits
/// with the scanner's status rather than `tee`'s.
const PIPELINE_SCRIPT: &str = r#"command -v "$1" >/dev/null 2>&1 || { echo "$1: not found" >&2; exit 127; }
exec 3>&1
status=$({ { cat "$0" | "$1"; echo $? >&4; } | tee "$2" >&3; } 4>&1)
exit "$status""#;

/// Feeds every JavaScript URL to the secret scanner.
pub struct SecretAnalysis;

#[async_trait]
impl StageHandler for SecretAnalysis {
    fn id(&self) -> StageId {
        StageId::AnalyzeSecrets
    }

    async fn run(&self, ctx: &StageContext<'_>, results: &mut ResultSet) -> StageOutcome {
        if ctx.config.skip.mantra {
            info!("Skipping mantra secret analysis");
            return StageOutcome::Skipped("mantra skipped".into());
        }
        info!("Analyzing JS files for secrets with mantra...");

        if results.js_count() == 0 {
            warn!("No JS files to analyze");
            return StageOutcome::Skipped("no JS files".into());
        }

        let Some(scratch) = prepare_scratch(ctx, Tool::Mantra, JS_SCRATCH, results.js_files()) else {
            return StageOutcome::Degraded("could not write JS file list".into());
        };

        let mut produced: bool = false;
        for invocation in self.candidates(ctx, scratch.path()) {
            let Some(output) = prepare_output(ctx, Tool::Mantra, MANTRA_OUTPUT) else {
                break;
            };
            info!("Trying command: {}", invocation.command_line());

            let policy = invocation.policy();
            let outcome = ctx.runner.run_streaming(&invocation, |line| policy.apply(line)).await;
            if outcome.is_interrupted() {
                warn!("Secret analysis interrupted");
                return StageOutcome::Skipped("interrupted".into());
            }
            if !outcome.is_failed() && output.exists() {
                produced = true;
                break;
            }
        }
        drop(scratch);

        if !produced {
            error!("Could not execute mantra with any known command format");
            return StageOutcome::Degraded("mantra could not be run".into());
        }

        match Report::read(&ctx.workspace.path(MANTRA_OUTPUT)) {
            Ok(Some(report)) if !report.is_empty() => {
                success!("Mantra analysis complete! Check {} for results", MANTRA_OUTPUT);
                let findings: usize = report
                    .findings()
                    .filter(|line| host::strip_ansi(line).starts_with(FINDING_MARKER))
                    .count();
                StageOutcome::Completed { new: findings }
            }
            Ok(Some(_)) => {
                info!("No secrets found");
                StageOutcome::Completed { new: 0 }
            }
            Ok(None) => {
                warn!("No mantra output file generated");
                StageOutcome::Degraded("no mantra output".into())
            }
            Err(e) => {
                error!("Could not read {}: {}", MANTRA_OUTPUT, e);
                StageOutcome::Degraded("unreadable mantra output".into())
            }
        }
    }
}

impl SecretAnalysis {
    /// Invocation syntaxes tried in order until one leaves a report behind.
    fn candidates(&self, ctx: &StageContext<'_>, list: &Path) -> Vec<Invocation> {
        let program = ctx.toolbox.program(Tool::Mantra);
        let report = ctx.workspace.path(MANTRA_OUTPUT);

        let piped = Invocation::new(Tool::Mantra, self.id(), "sh", "mantra secret analysis")
            .arg("-c")
            .arg(PIPELINE_SCRIPT)
            .arg(list)
            .arg(&program)
            .arg(&report)
            .deadline(ctx.config.command_timeout);

        let direct = ctx
            .toolbox
            .invocation(Tool::Mantra, self.id(), "mantra secret analysis")
            .stdin_from(list)
            .tee_to(&report)
            .deadline(ctx.config.command_timeout);

        vec![piped, direct]
    }
}
