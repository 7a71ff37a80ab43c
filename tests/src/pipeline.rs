use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use jsearch_common::error::PipelineError;
use jsearch_common::summary::Summary;
use jsearch_common::tools::Tool;
use jsearch_core::Pipeline;
use jsearch_core::workspace::{
    JS_SCRATCH, LIVE_SCRATCH, MANTRA_OUTPUT, NUCLEI_SCRATCH, SUBDOMAINS_SCRATCH, SUMMARY_FILE,
};

use crate::util::FakeTools;

fn recon_tools() -> FakeTools {
    let mut tools = FakeTools::new();
    tools.install(
        Tool::Subfinder,
        r#"
echo docs.example.com
echo api.example.com
printf 'docs.example.com\napi.example.com\nold.example.com.\n' > "$out"
"#,
    );
    tools.install(
        Tool::Ffuf,
        r#"
echo "helpdesk                [Status: 200, Size: 1234, Words: 10, Lines: 5]"
cat > "$out" <<'JSON'
{"results": [
  {"input": {"FUZZ": "helpdesk"}, "url": "https://helpdesk.example.com"},
  {"input": {"FUZZ": "docs"}, "url": ""}
]}
JSON
"#,
    );
    tools.install(
        Tool::Httpx,
        r#"
cp "$list" "$DIR/httpx_input"
printf 'https://docs.example.com\nhttps://example.com\n' > "$out"
"#,
    );
    tools.install(
        Tool::Gau,
        r#"
echo "$first" >> "$DIR/gau_calls"
case "$first" in
  docs.example.com)
    echo https://docs.example.com/static/app.js
    echo https://docs.example.com/index.html ;;
  example.com)
    echo https://example.com/main.js
    echo https://docs.example.com/static/app.js ;;
esac
"#,
    );
    tools.remove(Tool::Katana);
    tools.install(
        Tool::Mantra,
        r#"
echo "  __  __   _   _  _ _____ ___    _   "
while read url; do echo "[+] $url [AWS access key]"; done
"#,
    );
    tools.install(
        Tool::Nuclei,
        r#"
cp "$list" "$DIR/nuclei_input"
printf '[a] [http] [high] https://docs.example.com\n[b] x\n[c] y\n[d] z\n' > "$out"
"#,
    );
    tools
}

fn assert_no_scratch(out: &Path) {
    for name in [SUBDOMAINS_SCRATCH, LIVE_SCRATCH, JS_SCRATCH, NUCLEI_SCRATCH] {
        assert!(!out.join(name).exists(), "{name} was left behind");
    }
}

#[tokio::test]
async fn full_run_merges_every_stage() {
    let tools = recon_tools();
    let scratch = tempfile::tempdir().unwrap();
    let out = scratch.path().join("out");
    let copy = scratch.path().join("results.json");

    let mut config = tools.config(&out);
    config.output_file = Some(copy.clone());

    let summary = Pipeline::new("example.com".parse().unwrap(), config)
        .run()
        .await
        .expect("pipeline run");

    assert_eq!(
        summary.subdomains,
        vec![
            "api.example.com",
            "docs.example.com",
            "example.com",
            "helpdesk.example.com",
            "old.example.com",
        ]
    );
    assert_eq!(summary.live_domains, vec!["docs.example.com", "example.com"]);
    assert_eq!(
        summary.js_files,
        vec!["https://docs.example.com/static/app.js", "https://example.com/main.js"]
    );
    assert_eq!(summary.subdomains_found, 5);
    assert_eq!(summary.live_domains_found, 2);
    assert_eq!(summary.js_files_found, 2);

    // One history lookup per live domain, in the order the prober confirmed them.
    assert_eq!(tools.read("gau_calls"), "docs.example.com\nexample.com\n");

    let mut probed: Vec<String> = tools.read("httpx_input").lines().map(str::to_string).collect();
    probed.sort();
    assert_eq!(probed, summary.subdomains);
    assert_eq!(tools.read("nuclei_input"), "docs.example.com\nexample.com\n");

    let secrets = fs::read_to_string(out.join(MANTRA_OUTPUT)).unwrap();
    assert!(secrets.contains("[+] https://example.com/main.js [AWS access key]"));

    let saved: Summary = serde_json::from_str(&fs::read_to_string(out.join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(saved.js_files, summary.js_files);
    assert!(copy.exists());

    assert_no_scratch(&out);
}

#[tokio::test]
async fn unwritable_results_copy_still_saves_summary() {
    let tools = FakeTools::all_silent();
    let scratch = tempfile::tempdir().unwrap();
    let out = scratch.path().join("out");

    let mut config = tools.config(&out);
    config.output_file = Some(scratch.path().join("no/such/dir/copy.json"));

    let summary = Pipeline::new("example.com".parse().unwrap(), config)
        .run()
        .await
        .expect("a bad copy path does not fail the run");

    assert_eq!(summary.subdomains, vec!["example.com"]);
    let saved: Summary = serde_json::from_str(&fs::read_to_string(out.join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(saved.target, "example.com");
}

#[tokio::test]
async fn missing_mandatory_tool_fails_before_any_output() {
    let mut tools = FakeTools::all_silent();
    tools.remove(Tool::Mantra);
    let scratch = tempfile::tempdir().unwrap();
    let out = scratch.path().join("out");

    let verdict = Pipeline::new("example.com".parse().unwrap(), tools.config(&out))
        .run()
        .await;

    match verdict {
        Err(PipelineError::MissingTools(names)) => assert_eq!(names, vec!["mantra"]),
        other => panic!("unexpected verdict: {other:?}"),
    }
    assert!(!out.exists());
}

#[tokio::test]
async fn skipped_tool_is_not_required() {
    let mut tools = FakeTools::all_silent();
    tools.remove(Tool::Ffuf);
    let scratch = tempfile::tempdir().unwrap();
    let out = scratch.path().join("out");

    let mut config = tools.config(&out);
    config.skip.ffuf = true;

    let summary = Pipeline::new("example.com".parse().unwrap(), config)
        .run()
        .await
        .expect("pipeline run");

    assert_eq!(summary.subdomains, vec!["example.com"]);
    assert!(summary.live_domains.is_empty());
    assert!(out.join(SUMMARY_FILE).exists());
    assert_no_scratch(&out);
}

#[tokio::test]
async fn interrupt_stops_run_and_keeps_partial_summary() {
    let mut tools = FakeTools::all_silent();
    tools.install(Tool::Subfinder, "exec sleep 30");
    let scratch = tempfile::tempdir().unwrap();
    let out = scratch.path().join("out");

    let pipeline = Pipeline::new("example.com".parse().unwrap(), tools.config(&out));
    let stop = pipeline.stop_signal();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        stop.trigger();
    });

    let started = Instant::now();
    let verdict = pipeline.run().await;

    assert!(matches!(verdict, Err(PipelineError::Interrupted)));
    assert!(started.elapsed() < Duration::from_secs(10));

    let saved: Summary = serde_json::from_str(&fs::read_to_string(out.join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(saved.target, "example.com");
    assert!(saved.live_domains.is_empty());
    assert_no_scratch(&out);
}
