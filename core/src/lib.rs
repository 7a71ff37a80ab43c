//! # jsearch core
//!
//! Drives the external reconnaissance tools and merges what they report.
//!
//! * [`runner`] launches one tool, streams or captures its output and classifies its exit.
//! * [`workspace`] owns the run's output directory and its self-deleting scratch files.
//! * [`toolbox`] resolves executables and performs the availability checks.
//! * [`stages`] holds one handler per pipeline step.
//! * [`sequencer`] walks the fixed list of stages.
//! * [`pipeline`] ties it together into a single run with a final verdict.

pub mod pipeline;
pub mod runner;
pub mod sequencer;
pub mod signal;
pub mod stage;
pub mod stages;
pub mod toolbox;
pub mod workspace;

pub use pipeline::Pipeline;
pub use signal::StopSignal;
