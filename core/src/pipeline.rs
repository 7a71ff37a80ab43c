//! # Pipeline Controller
//!
//! Owns the run state for one target: checks the mandatory tools, prepares the output
//! directory, drives the [`Sequencer`] and persists the summary. The summary is written
//! even when the run is interrupted, so a stopped scan still leaves its partial results.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use jsearch_common::config::Config;
use jsearch_common::error::PipelineError;
use jsearch_common::results::ResultSet;
use jsearch_common::summary::Summary;
use jsearch_common::target::Target;
use jsearch_common::{error, info, success, warn};

use crate::runner::ProcessRunner;
use crate::sequencer::Sequencer;
use crate::signal::StopSignal;
use crate::stage::StageContext;
use crate::toolbox::Toolbox;
use crate::workspace::{SUMMARY_FILE, Workspace};

pub struct Pipeline {
    target: Target,
    config: Config,
    stop: StopSignal,
    sequencer: Sequencer,
}

/// Everything one run accumulates.
struct RunState {
    results: ResultSet,
    output_dir: PathBuf,
    started_at: DateTime<Local>,
}

impl RunState {
    fn new(target: Target, output_dir: PathBuf) -> Self {
        Self {
            results: ResultSet::new(target),
            output_dir,
            started_at: Local::now(),
        }
    }

    fn elapsed_secs(&self) -> i64 {
        (Local::now() - self.started_at).num_seconds()
    }
}

impl Pipeline {
    pub fn new(target: Target, config: Config) -> Self {
        Self {
            target,
            config,
            stop: StopSignal::new(),
            sequencer: Sequencer::standard(),
        }
    }

    /// Handle for cancelling the run from outside, e.g. on Ctrl-C.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.target.default_output_dir()))
    }

    /// Runs every stage against the target.
    ///
    /// Fails with [`PipelineError::MissingTools`] before anything touches the disk, and
    /// with [`PipelineError::Interrupted`] after saving partial results if stopped.
    pub async fn run(&self) -> Result<Summary, PipelineError> {
        let toolbox = Toolbox::new(&self.config);
        toolbox.precheck(&self.config.skip).await?;

        let mut state = RunState::new(self.target.clone(), self.output_dir());
        let workspace = Workspace::create(&state.output_dir)?;
        info!("Output directory: {}", workspace.root().display());

        let runner = ProcessRunner::new(self.stop.clone());
        let ctx = StageContext {
            config: &self.config,
            runner: &runner,
            toolbox: &toolbox,
            workspace: &workspace,
        };

        match self.sequencer.run(&ctx, &mut state.results).await {
            Ok(summary) => {
                self.persist(&workspace, &summary)?;
                success!("Scan completed in {} seconds", state.elapsed_secs());
                Ok(summary)
            }
            Err(PipelineError::Interrupted) => {
                warn!("Scan interrupted by user");
                let partial = Summary::snapshot(&state.results);
                if let Err(e) = self.persist(&workspace, &partial) {
                    error!("Could not save partial results: {}", e);
                }
                Err(PipelineError::Interrupted)
            }
            Err(e) => Err(e),
        }
    }

    /// Writes the summary into the output directory, then the optional extra copy.
    ///
    /// Only the canonical file can fail the run; a bad `--output` path is just reported.
    fn persist(&self, workspace: &Workspace, summary: &Summary) -> Result<(), PipelineError> {
        let path: PathBuf = workspace.path(SUMMARY_FILE);
        summary.write_json(&path)?;
        success!("Summary saved to {}", path.display());

        if let Some(file) = &self.config.output_file {
            match summary.write_json(file) {
                Ok(()) => success!("Results saved to {}", file.display()),
                Err(e) => warn!("Could not save results to {}: {}", file.display(), e),
            }
        }
        Ok(())
    }
}
