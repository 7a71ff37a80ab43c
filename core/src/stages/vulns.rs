use async_trait::async_trait;
use jsearch_common::print::{self, LineTag};
use jsearch_common::report::Report;
use jsearch_common::results::ResultSet;
use jsearch_common::tools::Tool;
use jsearch_common::{error, info, success, warn};

use super::{prepare_output, prepare_scratch};
use crate::stage::{StageContext, StageHandler, StageId, StageOutcome};
use crate::workspace::{NUCLEI_OUTPUT, NUCLEI_SCRATCH};

const PREVIEW_LINES: usize = 3;
const PREVIEW_WIDTH: usize = 100;

/// Optional template scan of every live domain.
pub struct VulnerabilityScan;

#[async_trait]
impl StageHandler for VulnerabilityScan {
    fn id(&self) -> StageId {
        StageId::ScanVulnerabilities
    }

    async fn run(&self, ctx: &StageContext<'_>, results: &mut ResultSet) -> StageOutcome {
        if ctx.config.skip.nuclei {
            info!("Skipping nuclei vulnerability scanning");
            return StageOutcome::Skipped("nuclei skipped".into());
        }
        if !ctx.toolbox.is_available(Tool::Nuclei).await {
            warn!("Nuclei not found, skipping nuclei analysis");
            return StageOutcome::Skipped("nuclei not installed".into());
        }
        info!("Running nuclei scans...");

        if results.live_count() == 0 {
            warn!("No live domains to scan");
            return StageOutcome::Skipped("no live domains".into());
        }

        let Some(scratch) = prepare_scratch(ctx, Tool::Nuclei, NUCLEI_SCRATCH, results.live_domains()) else {
            return StageOutcome::Degraded("could not write live domain list".into());
        };
        let Some(output) = prepare_output(ctx, Tool::Nuclei, NUCLEI_OUTPUT) else {
            return StageOutcome::Degraded("could not prepare output file".into());
        };

        let invocation = ctx
            .toolbox
            .invocation(Tool::Nuclei, self.id(), "nuclei vulnerability scanning")
            .arg("-list")
            .arg(scratch.path())
            .arg("-o")
            .arg(&output)
            .arg("-severity")
            .arg(ctx.config.severity.join(","))
            .deadline(ctx.config.command_timeout);
        let outcome = ctx.runner.run_capturing(&invocation).await;
        drop(scratch);

        if outcome.is_failed() {
            return StageOutcome::Degraded("nuclei failed".into());
        }

        match Report::read(&output) {
            Ok(Some(report)) if !report.is_empty() => {
                let total: usize = report.finding_count();
                for line in report.preview(PREVIEW_LINES, PREVIEW_WIDTH) {
                    print::tagged(LineTag::Vuln, &line);
                }
                if total > PREVIEW_LINES {
                    let more = format!("... and {} more vulnerabilities found", total - PREVIEW_LINES);
                    print::tagged(LineTag::Vuln, &more);
                }
                success!("Found {} potential vulnerabilities with nuclei", total);
                StageOutcome::Completed { new: total }
            }
            Ok(Some(_)) => {
                info!("No vulnerabilities found with nuclei");
                StageOutcome::Completed { new: 0 }
            }
            Ok(None) => {
                warn!("No nuclei output file generated");
                StageOutcome::Degraded("no nuclei output".into())
            }
            Err(e) => {
                error!("Could not read {}: {}", NUCLEI_OUTPUT, e);
                StageOutcome::Degraded("unreadable nuclei output".into())
            }
        }
    }
}
