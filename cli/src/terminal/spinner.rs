use indicatif::ProgressStyle;
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::filter::IndicatifFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::terminal::logging::{JsearchFormatter, Palette, Verbosity};

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {span_fields}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

fn default_directives(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "warn,jsearch=warn,jsearch::success=info,jsearch::print=info",
        Verbosity::Normal => "warn,jsearch=info,jsearch_core=info",
        Verbosity::Verbose => "warn,jsearch=debug,jsearch_core=debug",
    }
}

/// Installs the global subscriber: formatted lines on stdout, spinners for silent tools.
///
/// `RUST_LOG` takes precedence over `verbosity`.
pub fn init_logging(palette: Palette, verbosity: Verbosity) {
    let filter: EnvFilter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    let indicatif_layer = IndicatifLayer::new().with_progress_style(spinner_style());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(palette.is_enabled())
        .event_format(JsearchFormatter::new(palette))
        .with_writer(indicatif_layer.get_stdout_writer());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(indicatif_layer.with_filter(IndicatifFilter::new(false)))
        .init();
}
