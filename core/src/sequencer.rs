//! # Stage Sequencer
//!
//! Runs the stages strictly one after another. A stage can skip itself or degrade, but the
//! sequencer always moves on to the next one; only the stop signal ends the walk early.

use jsearch_common::error::PipelineError;
use jsearch_common::print::{self, LineTag};
use jsearch_common::results::ResultSet;
use jsearch_common::summary::Summary;
use jsearch_common::{debug, warn};

use crate::stage::{StageContext, StageHandler, StageId, StageOutcome};
use crate::stages;

pub struct Sequencer {
    stages: Vec<Box<dyn StageHandler>>,
}

impl Sequencer {
    pub fn new(stages: Vec<Box<dyn StageHandler>>) -> Self {
        Self { stages }
    }

    /// The fixed recon order, subdomains through vulnerabilities.
    pub fn standard() -> Self {
        Self::new(stages::standard())
    }

    /// Walks every stage, then snapshots the results.
    ///
    /// Returns [`PipelineError::Interrupted`] as soon as the stop signal is seen between
    /// stages; whatever was merged up to that point stays in `results`.
    pub async fn run(
        &self,
        ctx: &StageContext<'_>,
        results: &mut ResultSet,
    ) -> Result<Summary, PipelineError> {
        for stage in &self.stages {
            let id: StageId = stage.id();
            if ctx.runner.stop_signal().is_triggered() {
                warn!("Stopping before {}", id.title());
                return Err(PipelineError::Interrupted);
            }

            print::tagged(LineTag::Stage, &id.banner());
            let outcome: StageOutcome = stage.run(ctx, results).await;
            log_outcome(id, &outcome);
        }

        if ctx.runner.stop_signal().is_triggered() {
            return Err(PipelineError::Interrupted);
        }

        print::tagged(LineTag::Stage, &StageId::Finalize.banner());
        Ok(Summary::snapshot(results))
    }
}

fn log_outcome(id: StageId, outcome: &StageOutcome) {
    match outcome {
        StageOutcome::Completed { new } => debug!("{} completed, {} new", id, new),
        StageOutcome::Skipped(reason) => debug!("{} skipped: {}", id, reason),
        StageOutcome::Degraded(reason) => warn!("{} degraded: {}", id.title(), reason),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use jsearch_common::config::Config;

    use super::*;
    use crate::runner::ProcessRunner;
    use crate::signal::StopSignal;
    use crate::toolbox::Toolbox;
    use crate::workspace::Workspace;

    struct Recorder {
        id: StageId,
        log: Arc<Mutex<Vec<StageId>>>,
        outcome: StageOutcome,
        stop_after: Option<StopSignal>,
    }

    #[async_trait]
    impl StageHandler for Recorder {
        fn id(&self) -> StageId {
            self.id
        }

        async fn run(&self, _ctx: &StageContext<'_>, results: &mut ResultSet) -> StageOutcome {
            self.log.lock().unwrap().push(self.id);
            if self.id == StageId::DiscoverSubdomains {
                results.seed_target();
            }
            if let Some(stop) = &self.stop_after {
                stop.trigger();
            }
            self.outcome.clone()
        }
    }

    fn recorder(id: StageId, log: &Arc<Mutex<Vec<StageId>>>, outcome: StageOutcome) -> Box<dyn StageHandler> {
        Box::new(Recorder {
            id,
            log: Arc::clone(log),
            outcome,
            stop_after: None,
        })
    }

    #[tokio::test]
    async fn degraded_stages_do_not_stop_the_walk() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let runner = ProcessRunner::new(StopSignal::new());
        let toolbox = Toolbox::new(&config);
        let workspace = Workspace::create(dir.path()).unwrap();
        let ctx = StageContext { config: &config, runner: &runner, toolbox: &toolbox, workspace: &workspace };

        let log = Arc::new(Mutex::new(Vec::new()));
        let sequencer = Sequencer::new(vec![
            recorder(StageId::DiscoverSubdomains, &log, StageOutcome::Completed { new: 1 }),
            recorder(StageId::CheckLive, &log, StageOutcome::Degraded("httpx failed".into())),
            recorder(StageId::DiscoverJs, &log, StageOutcome::Skipped("no live domains".into())),
        ]);

        let mut results = ResultSet::new("example.com".parse().unwrap());
        let summary = sequencer.run(&ctx, &mut results).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![StageId::DiscoverSubdomains, StageId::CheckLive, StageId::DiscoverJs]
        );
        assert_eq!(summary.subdomains, vec!["example.com"]);
        assert_eq!(summary.live_domains_found, 0);
    }

    #[tokio::test]
    async fn stop_signal_ends_walk_before_next_stage() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let stop = StopSignal::new();
        let runner = ProcessRunner::new(stop.clone());
        let toolbox = Toolbox::new(&config);
        let workspace = Workspace::create(dir.path()).unwrap();
        let ctx = StageContext { config: &config, runner: &runner, toolbox: &toolbox, workspace: &workspace };

        let log = Arc::new(Mutex::new(Vec::new()));
        let sequencer = Sequencer::new(vec![
            Box::new(Recorder {
                id: StageId::DiscoverSubdomains,
                log: Arc::clone(&log),
                outcome: StageOutcome::Completed { new: 1 },
                stop_after: Some(stop),
            }),
            recorder(StageId::CheckLive, &log, StageOutcome::Completed { new: 0 }),
        ]);

        let mut results = ResultSet::new("example.com".parse().unwrap());
        let verdict = sequencer.run(&ctx, &mut results).await;

        assert!(matches!(verdict, Err(PipelineError::Interrupted)));
        assert_eq!(*log.lock().unwrap(), vec![StageId::DiscoverSubdomains]);
        assert_eq!(results.subdomain_count(), 1);
    }
}
