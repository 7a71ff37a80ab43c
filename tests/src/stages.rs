use jsearch_common::config::Config;
use jsearch_common::results::ResultSet;
use jsearch_common::tools::Tool;
use jsearch_core::StopSignal;
use jsearch_core::runner::ProcessRunner;
use jsearch_core::stage::{StageContext, StageHandler, StageOutcome};
use jsearch_core::stages::{
    JsDiscovery, LivenessCheck, SecretAnalysis, SubdomainDiscovery, VulnerabilityScan,
};
use jsearch_core::toolbox::Toolbox;
use jsearch_core::workspace::{
    JS_SCRATCH, KATANA_OUTPUT, LIVE_SCRATCH, MANTRA_OUTPUT, NUCLEI_SCRATCH, SUBDOMAINS_SCRATCH, Workspace,
};
use std::time::Duration;

use tempfile::TempDir;

use crate::util::FakeTools;

/// Everything a single stage needs, wired to a set of fake tools.
struct Harness {
    config: Config,
    stop: StopSignal,
    runner: ProcessRunner,
    toolbox: Toolbox,
    workspace: Workspace,
    _out: TempDir,
}

impl Harness {
    fn new(tools: &FakeTools, adjust: impl FnOnce(&mut Config)) -> Self {
        let out = tempfile::tempdir().unwrap();
        let mut config = tools.config(out.path());
        adjust(&mut config);

        let stop = StopSignal::new();
        Self {
            runner: ProcessRunner::new(stop.clone()),
            stop,
            toolbox: Toolbox::new(&config),
            workspace: Workspace::create(out.path()).unwrap(),
            config,
            _out: out,
        }
    }

    fn ctx(&self) -> StageContext<'_> {
        StageContext {
            config: &self.config,
            runner: &self.runner,
            toolbox: &self.toolbox,
            workspace: &self.workspace,
        }
    }
}

fn results() -> ResultSet {
    ResultSet::new("example.com".parse().unwrap())
}

#[tokio::test]
async fn liveness_check_without_subdomains_never_runs_prober() {
    let mut tools = FakeTools::all_silent();
    tools.install(Tool::Httpx, r#"touch "$DIR/httpx_ran""#);
    let harness = Harness::new(&tools, |_| {});

    let mut results = results();
    let outcome = LivenessCheck.run(&harness.ctx(), &mut results).await;

    assert!(matches!(outcome, StageOutcome::Skipped(_)));
    assert!(!tools.dir().join("httpx_ran").exists());
    assert_eq!(results.live_count(), 0);
    assert!(!harness.workspace.path(SUBDOMAINS_SCRATCH).exists());
}

#[tokio::test]
async fn failing_prober_still_cleans_up_scratch() {
    let mut tools = FakeTools::all_silent();
    tools.install(
        Tool::Httpx,
        r#"
cp "$list" "$DIR/httpx_input"
echo "fatal: could not resolve" >&2
exit 3
"#,
    );
    let harness = Harness::new(&tools, |_| {});

    let mut results = results();
    results.seed_target();
    let outcome = LivenessCheck.run(&harness.ctx(), &mut results).await;

    assert!(matches!(outcome, StageOutcome::Degraded(_)));
    assert_eq!(tools.read("httpx_input"), "example.com\n");
    assert!(!harness.workspace.path(SUBDOMAINS_SCRATCH).exists());
    assert_eq!(results.live_count(), 0);
}

#[tokio::test]
async fn benign_config_warning_keeps_history_results() {
    let mut tools = FakeTools::all_silent();
    tools.install(
        Tool::Gau,
        r#"
echo https://example.com/app.js
echo "warning: config file not found, using defaults" >&2
exit 1
"#,
    );
    let harness = Harness::new(&tools, |cfg| cfg.skip.katana = true);

    let mut results = results();
    results.merge_live("https://example.com");
    let outcome = JsDiscovery.run(&harness.ctx(), &mut results).await;

    assert_eq!(outcome, StageOutcome::Completed { new: 1 });
    assert_eq!(results.js_files().collect::<Vec<_>>(), vec!["https://example.com/app.js"]);
}

#[tokio::test]
async fn fatal_history_failure_contributes_nothing() {
    let mut tools = FakeTools::all_silent();
    tools.install(
        Tool::Gau,
        r#"
echo https://example.com/app.js
echo "panic: runtime error" >&2
exit 2
"#,
    );
    let harness = Harness::new(&tools, |cfg| cfg.skip.katana = true);

    let mut results = results();
    results.merge_live("example.com");
    let outcome = JsDiscovery.run(&harness.ctx(), &mut results).await;

    assert_eq!(outcome, StageOutcome::Completed { new: 0 });
    assert_eq!(results.js_count(), 0);
}

#[tokio::test]
async fn secret_scanner_failure_degrades_and_cleans_up() {
    let mut tools = FakeTools::all_silent();
    tools.install(Tool::Mantra, r#"echo "mantra: crashed" >&2; exit 1"#);
    let harness = Harness::new(&tools, |_| {});

    let mut results = results();
    results.merge_js("https://example.com/app.js");
    let outcome = SecretAnalysis.run(&harness.ctx(), &mut results).await;

    assert!(matches!(outcome, StageOutcome::Degraded(_)));
    assert!(!harness.workspace.path(JS_SCRATCH).exists());
}

#[tokio::test]
async fn malformed_fuzz_report_adds_nothing() {
    let mut tools = FakeTools::all_silent();
    tools.install(Tool::Ffuf, r#"echo '{"results": [' > "$out""#);
    let harness = Harness::new(&tools, |_| {});

    let mut results = results();
    let outcome = SubdomainDiscovery.run(&harness.ctx(), &mut results).await;

    assert_eq!(outcome, StageOutcome::Completed { new: 1 });
    assert_eq!(results.subdomains().collect::<Vec<_>>(), vec!["example.com"]);
}

#[tokio::test]
async fn silent_non_zero_history_exit_keeps_results() {
    let mut tools = FakeTools::all_silent();
    tools.install(Tool::Gau, "echo https://example.com/app.js\nexit 1");
    let harness = Harness::new(&tools, |cfg| cfg.skip.katana = true);

    let mut results = results();
    results.merge_live("example.com");
    let outcome = JsDiscovery.run(&harness.ctx(), &mut results).await;

    assert_eq!(outcome, StageOutcome::Completed { new: 1 });
    assert_eq!(results.js_files().collect::<Vec<_>>(), vec!["https://example.com/app.js"]);
}

#[tokio::test]
async fn failing_crawler_cleans_up_and_merges_nothing() {
    let mut tools = FakeTools::all_silent();
    tools.install(
        Tool::Katana,
        r#"
cp "$list" "$DIR/katana_input"
echo https://example.com/crawled.js
echo https://example.com/crawled.js > "$out"
echo "fatal: crawler crashed" >&2
exit 2
"#,
    );
    let harness = Harness::new(&tools, |cfg| cfg.skip.gau = true);

    let mut results = results();
    results.merge_live("example.com");
    let outcome = JsDiscovery.run(&harness.ctx(), &mut results).await;

    assert_eq!(outcome, StageOutcome::Completed { new: 0 });
    assert_eq!(tools.read("katana_input"), "example.com\n");
    assert_eq!(results.js_count(), 0);
    assert!(!harness.workspace.path(LIVE_SCRATCH).exists());
    assert!(harness.workspace.path(KATANA_OUTPUT).exists());
}

#[tokio::test]
async fn failing_vulnerability_scan_cleans_up() {
    let mut tools = FakeTools::all_silent();
    tools.install(
        Tool::Nuclei,
        r#"
cp "$list" "$DIR/nuclei_input"
echo "[a] [http] [high] https://example.com" > "$out"
echo "could not load templates" >&2
exit 1
"#,
    );
    let harness = Harness::new(&tools, |_| {});

    let mut results = results();
    results.merge_live("example.com");
    let outcome = VulnerabilityScan.run(&harness.ctx(), &mut results).await;

    assert!(matches!(outcome, StageOutcome::Degraded(_)));
    assert_eq!(tools.read("nuclei_input"), "example.com\n");
    assert!(!harness.workspace.path(NUCLEI_SCRATCH).exists());
    assert_eq!(results.live_count(), 1);
    assert_eq!(results.js_count(), 0);
}

#[tokio::test]
async fn interrupted_secret_scan_is_not_a_failure_and_leaves_no_process() {
    let mut tools = FakeTools::all_silent();
    tools.install(
        Tool::Mantra,
        r#"
cat >/dev/null
sleep 2
touch "$DIR/mantra_survived"
"#,
    );
    let harness = Harness::new(&tools, |_| {});
    let stop = harness.stop.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        stop.trigger();
    });

    let mut results = results();
    results.merge_js("https://example.com/app.js");
    let outcome = SecretAnalysis.run(&harness.ctx(), &mut results).await;

    assert_eq!(outcome, StageOutcome::Skipped("interrupted".into()));
    assert!(!harness.workspace.path(JS_SCRATCH).exists());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!tools.dir().join("mantra_survived").exists());
}

#[tokio::test]
async fn unstartable_secret_scanner_leaves_no_empty_report() {
    let mut tools = FakeTools::all_silent();
    tools.remove(Tool::Mantra);
    let harness = Harness::new(&tools, |_| {});

    let mut results = results();
    results.merge_js("https://example.com/app.js");
    let outcome = SecretAnalysis.run(&harness.ctx(), &mut results).await;

    assert!(matches!(outcome, StageOutcome::Degraded(_)));
    assert!(!harness.workspace.path(MANTRA_OUTPUT).exists());
}
