use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use async_trait::async_trait;
use jsearch_common::error::ToolError;
use jsearch_common::print::{self, LineTag};
use jsearch_common::results::ResultSet;
use jsearch_common::tools::Tool;
use jsearch_common::{error, info, success, warn};
use serde::Deserialize;

use super::{prepare_output, read_output};
use crate::runner::LineAction;
use crate::stage::{StageContext, StageHandler, StageId, StageOutcome};
use crate::workspace::{FFUF_OUTPUT, SUBFINDER_OUTPUT};

/// Marker ffuf puts after every matched word on stdout.
const FUZZ_HIT_MARKER: &str = "[Status:";

/// Passive enumeration followed by wordlist fuzzing.
pub struct SubdomainDiscovery;

#[async_trait]
impl StageHandler for SubdomainDiscovery {
    fn id(&self) -> StageId {
        StageId::DiscoverSubdomains
    }

    async fn run(&self, ctx: &StageContext<'_>, results: &mut ResultSet) -> StageOutcome {
        let before: usize = results.subdomain_count();

        let seed = results.seed_target();
        if seed.was_new {
            print::tagged(LineTag::Subdomain, &seed.canonical);
        }

        self.passive(ctx, results).await;

        if ctx.config.skip.ffuf {
            info!("Skipping ffuf subdomain discovery");
        } else {
            self.fuzz(ctx, results).await;
        }

        StageOutcome::Completed {
            new: results.subdomain_count() - before,
        }
    }
}

impl SubdomainDiscovery {
    async fn passive(&self, ctx: &StageContext<'_>, results: &mut ResultSet) {
        info!("Starting subdomain discovery with subfinder...");

        let Some(output) = prepare_output(ctx, Tool::Subfinder, SUBFINDER_OUTPUT) else {
            return;
        };
        let apex: String = results.target().to_string();
        let invocation = ctx
            .toolbox
            .invocation(Tool::Subfinder, self.id(), "subfinder subdomain discovery")
            .args(["-d", apex.as_str(), "-o"])
            .arg(&output)
            .deadline(ctx.config.command_timeout);
        let policy = invocation.policy();

        let mut staged: ResultSet = results.clone();
        let outcome = ctx
            .runner
            .run_streaming(&invocation, |line| match staged.merge_subdomain(line) {
                Some(merge) if merge.was_new => policy.apply(&merge.canonical),
                _ => LineAction::Hide,
            })
            .await;
        if outcome.is_failed() {
            return;
        }
        *results = staged;

        if !output.exists() {
            warn!("No subfinder results file found");
            return;
        }
        // Streamed lines were already shown; the file only fills gaps.
        for line in read_output(ctx, Tool::Subfinder, SUBFINDER_OUTPUT) {
            results.merge_subdomain(&line);
        }
        success!("Found {} subdomains with subfinder", results.subdomain_count());
    }

    async fn fuzz(&self, ctx: &StageContext<'_>, results: &mut ResultSet) {
        info!("Starting subdomain fuzzing with ffuf...");

        let Some(wordlist) = ctx.config.resolve_wordlist() else {
            match &ctx.config.wordlist {
                Some(path) => warn!("Wordlist not found at {}", path.display()),
                None => warn!("No wordlist found in the default locations"),
            }
            warn!("Skipping ffuf subdomain discovery");
            return;
        };
        let Some(output) = prepare_output(ctx, Tool::Ffuf, FFUF_OUTPUT) else {
            return;
        };

        let before: usize = results.subdomain_count();
        let invocation = ctx
            .toolbox
            .invocation(Tool::Ffuf, self.id(), "ffuf subdomain fuzzing")
            .arg("-w")
            .arg(&wordlist)
            .arg("-u")
            .arg(format!("https://FUZZ.{}", results.target()))
            .arg("-o")
            .arg(&output)
            .args(["-of", "json", "-t"])
            .arg(ctx.config.threads.to_string())
            .arg("-timeout")
            .arg(ctx.config.request_timeout_secs.to_string())
            .deadline(ctx.config.command_timeout);
        let policy = invocation.policy();

        let mut staged: ResultSet = results.clone();
        let outcome = ctx
            .runner
            .run_streaming(&invocation, |line| {
                if !line.contains(FUZZ_HIT_MARKER) {
                    return LineAction::Hide;
                }
                match staged.merge_fuzz_hit(line) {
                    Some(merge) if merge.was_new => policy.apply(&merge.canonical),
                    _ => LineAction::Hide,
                }
            })
            .await;
        if outcome.is_failed() {
            return;
        }
        *results = staged;

        match read_fuzz_report(&output) {
            Ok(Some(hits)) => {
                for hit in hits {
                    let merged = match hit {
                        FuzzHit::Url(url) => results.merge_subdomain(&url),
                        FuzzHit::Word(word) => results.merge_fuzz_hit(&word),
                    };
                    if let Some(merge) = merged.filter(|merge| merge.was_new) {
                        policy.apply(&merge.canonical).emit();
                    }
                }
                success!(
                    "Found {} new subdomains with ffuf",
                    results.subdomain_count() - before
                );
            }
            Ok(None) => warn!("No ffuf results file found"),
            Err(err) => error!("{}", err),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FuzzReport {
    #[serde(default)]
    results: Vec<FuzzResult>,
}

#[derive(Debug, Deserialize)]
struct FuzzResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    input: HashMap<String, serde_json::Value>,
}

#[derive(Debug, PartialEq, Eq)]
enum FuzzHit {
    Url(String),
    Word(String),
}

/// Hits recorded in ffuf's JSON report; `Ok(None)` when ffuf did not write one.
fn read_fuzz_report(path: &Path) -> Result<Option<Vec<FuzzHit>>, ToolError> {
    let bytes: Vec<u8> = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(ToolError::Io { tool: Tool::Ffuf.to_string(), source }),
    };
    parse_fuzz_report(&bytes).map(Some)
}

fn parse_fuzz_report(bytes: &[u8]) -> Result<Vec<FuzzHit>, ToolError> {
    let report: FuzzReport = serde_json::from_slice(bytes).map_err(|e| ToolError::MalformedOutput {
        tool: Tool::Ffuf.to_string(),
        reason: e.to_string(),
    })?;

    Ok(report
        .results
        .into_iter()
        .filter_map(|result| {
            if !result.url.trim().is_empty() {
                return Some(FuzzHit::Url(result.url));
            }
            match result.input.get("FUZZ") {
                Some(serde_json::Value::String(word)) if !word.trim().is_empty() => {
                    Some(FuzzHit::Word(word.clone()))
                }
                _ => None,
            }
        })
        .collect())
}
