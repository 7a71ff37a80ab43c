use async_trait::async_trait;
use indexmap::IndexSet;
use jsearch_common::results::ResultSet;
use jsearch_common::tools::Tool;
use jsearch_common::{info, success, warn};

use super::{prepare_output, prepare_scratch, read_output};
use crate::runner::{DisplayPolicy, LineAction};
use crate::stage::{StageContext, StageHandler, StageId, StageOutcome};
use crate::workspace::{KATANA_OUTPUT, LIVE_SCRATCH};

/// Collects JavaScript URLs for every live domain.
///
/// The URL-history tool is run once per domain, in the order the domains were confirmed
/// live. The optional crawler then gets the whole list in one go.
pub struct JsDiscovery;

#[async_trait]
impl StageHandler for JsDiscovery {
    fn id(&self) -> StageId {
        StageId::DiscoverJs
    }

    async fn run(&self, ctx: &StageContext<'_>, results: &mut ResultSet) -> StageOutcome {
        let skip = ctx.config.skip;
        if skip.gau && skip.katana {
            info!("Skipping gau and katana JS file discovery");
            return StageOutcome::Skipped("gau and katana skipped".into());
        }
        if results.live_count() == 0 {
            warn!("No live domains to scan");
            return StageOutcome::Skipped("no live domains".into());
        }

        let before: usize = results.js_count();

        if skip.gau {
            info!("Skipping gau JS file discovery");
        } else {
            self.history(ctx, results).await;
        }

        if skip.katana {
            info!("Skipping katana JS file discovery");
        } else {
            self.crawl(ctx, results).await;
        }

        StageOutcome::Completed {
            new: results.js_count() - before,
        }
    }
}

impl JsDiscovery {
    async fn history(&self, ctx: &StageContext<'_>, results: &mut ResultSet) {
        info!("Discovering JS files with gau...");

        let domains: Vec<String> = results.live_domains().map(str::to_string).collect();
        let mut total: usize = 0;

        for domain in &domains {
            if ctx.runner.stop_signal().is_triggered() {
                break;
            }

            let invocation = ctx
                .toolbox
                .invocation(Tool::Gau, self.id(), format!("gau JS discovery for {domain}"))
                .arg(domain)
                .deadline(ctx.config.command_timeout);
            let policy = invocation.policy();

            let mut staged: IndexSet<String> = IndexSet::new();
            let outcome = ctx
                .runner
                .run_streaming(&invocation, |line| stage_js(results, &mut staged, &policy, line))
                .await;
            if outcome.is_failed() {
                continue;
            }

            let found: usize = commit_js(results, staged);
            total += found;

            if found > 0 {
                success!("Found {} JS files for {}", found, domain);
            } else {
                info!("No JS files found for {}", domain);
            }
        }

        if total > 0 {
            success!("Found {} total JS files with gau", total);
        } else {
            warn!("No JS files found with gau");
        }
    }

    async fn crawl(&self, ctx: &StageContext<'_>, results: &mut ResultSet) {
        if !ctx.toolbox.is_available(Tool::Katana).await {
            warn!("Katana not found, skipping katana JS discovery");
            return;
        }
        info!("Discovering JS files with katana...");

        let Some(scratch) = prepare_scratch(ctx, Tool::Katana, LIVE_SCRATCH, results.live_domains()) else {
            return;
        };
        let Some(output) = prepare_output(ctx, Tool::Katana, KATANA_OUTPUT) else {
            return;
        };

        let invocation = ctx
            .toolbox
            .invocation(Tool::Katana, self.id(), "katana JS discovery")
            .arg("-list")
            .arg(scratch.path())
            .arg("-jc")
            .arg("-o")
            .arg(&output)
            .deadline(ctx.config.command_timeout);
        let policy = invocation.policy();

        let mut staged: IndexSet<String> = IndexSet::new();
        let outcome = ctx
            .runner
            .run_streaming(&invocation, |line| stage_js(results, &mut staged, &policy, line))
            .await;
        drop(scratch);
        if outcome.is_failed() {
            return;
        }
        let before: usize = results.js_count();
        commit_js(results, staged);

        if !output.exists() {
            warn!("No JS files found with katana");
            return;
        }
        for line in read_output(ctx, Tool::Katana, KATANA_OUTPUT) {
            results.merge_js(&line);
        }
        success!("Found {} new JS files with katana", results.js_count() - before);
    }
}

/// Collects a streamed URL that is new to both `results` and this run, showing it once.
fn stage_js(results: &ResultSet, staged: &mut IndexSet<String>, policy: &DisplayPolicy, line: &str) -> LineAction {
    match results.unseen_js(line) {
        Some(canonical) if !staged.contains(&canonical) => {
            let action: LineAction = policy.apply(&canonical);
            staged.insert(canonical);
            action
        }
        _ => LineAction::Hide,
    }
}

/// Merges the URLs a tool produced once it is known to have exited cleanly.
fn commit_js(results: &mut ResultSet, staged: IndexSet<String>) -> usize {
    staged
        .into_iter()
        .filter_map(|url| results.merge_js(&url))
        .filter(|merge| merge.was_new)
        .count()
}
