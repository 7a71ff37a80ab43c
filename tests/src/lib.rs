//! End-to-end scenarios for the recon pipeline, run against fake tool executables.
#![cfg(unix)]

#[cfg(test)]
mod util;

#[cfg(test)]
mod pipeline;
#[cfg(test)]
mod stages;
