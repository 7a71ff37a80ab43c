use async_trait::async_trait;
use jsearch_common::results::ResultSet;
use jsearch_common::tools::Tool;
use jsearch_common::{info, success, warn};

use super::{prepare_output, prepare_scratch, read_output};
use crate::stage::{StageContext, StageHandler, StageId, StageOutcome};
use crate::workspace::{LIVE_OUTPUT, SUBDOMAINS_SCRATCH};

/// Probes every known subdomain and keeps the reachable ones in prober order.
pub struct LivenessCheck;

#[async_trait]
impl StageHandler for LivenessCheck {
    fn id(&self) -> StageId {
        StageId::CheckLive
    }

    async fn run(&self, ctx: &StageContext<'_>, results: &mut ResultSet) -> StageOutcome {
        info!("Checking live domains with httpx...");

        if results.subdomain_count() == 0 {
            warn!("No subdomains to check");
            return StageOutcome::Skipped("no subdomains".into());
        }

        let Some(scratch) = prepare_scratch(ctx, Tool::Httpx, SUBDOMAINS_SCRATCH, results.subdomains()) else {
            return StageOutcome::Degraded("could not write subdomain list".into());
        };
        let Some(output) = prepare_output(ctx, Tool::Httpx, LIVE_OUTPUT) else {
            return StageOutcome::Degraded("could not prepare output file".into());
        };

        let invocation = ctx
            .toolbox
            .invocation(Tool::Httpx, self.id(), "httpx live domain check")
            .arg("-l")
            .arg(scratch.path())
            .arg("-o")
            .arg(&output)
            .deadline(ctx.config.command_timeout);
        let outcome = ctx.runner.run_capturing(&invocation).await;
        drop(scratch);

        if outcome.is_failed() {
            return StageOutcome::Degraded("httpx failed".into());
        }
        if !output.exists() {
            warn!("No live domains found");
            return StageOutcome::Completed { new: 0 };
        }

        let policy = invocation.policy();
        let before: usize = results.live_count();
        for line in read_output(ctx, Tool::Httpx, LIVE_OUTPUT) {
            if let Some(merge) = results.merge_live(&line).filter(|merge| merge.was_new) {
                policy.apply(&merge.canonical).emit();
            }
        }

        success!("Found {} live domains", results.live_count());
        StageOutcome::Completed {
            new: results.live_count() - before,
        }
    }
}
