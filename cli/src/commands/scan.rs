use std::process::ExitCode;

use jsearch_common::config::Config;
use jsearch_common::error::PipelineError;
use jsearch_common::target::Target;
use jsearch_common::{error, warn};
use jsearch_core::Pipeline;

use crate::terminal::print;

/// Exit code conventionally used for a run stopped by SIGINT.
const INTERRUPTED: u8 = 130;

pub async fn scan(target: Target, cfg: Config, quiet: bool) -> anyhow::Result<ExitCode> {
    let pipeline = Pipeline::new(target, cfg);

    if !quiet {
        print::aligned_line("Target", pipeline.target(), 6);
        print::aligned_line("Output", pipeline.output_dir().display(), 6);
    }

    let stop = pipeline.stop_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping the current tool...");
            stop.trigger();
        }
    });

    match pipeline.run().await {
        Ok(summary) => {
            print::summary(&summary, &pipeline.output_dir());
            Ok(ExitCode::SUCCESS)
        }
        Err(PipelineError::MissingTools(_)) => Ok(ExitCode::FAILURE),
        Err(PipelineError::Interrupted) => Ok(ExitCode::from(INTERRUPTED)),
        Err(e) => {
            error!("Unexpected error: {}", e);
            Err(e.into())
        }
    }
}
