use std::fmt;

use chrono::Local;
use colored::*;
use jsearch_common::print::LineTag;
use jsearch_common::{PRINT_TARGET, SUCCESS_TARGET, host};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;

use crate::terminal::colors;

/// How much the operator wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Successes, warnings, errors and discoveries only.
    Quiet,
    Normal,
    /// Adds command lines and exit details.
    Verbose,
}

/// Colour decision for everything written to the terminal.
///
/// Built once from `--no-color` and handed to the formatter. When disabled, the formatter
/// strips escape codes from every line, including those coming verbatim from the tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn finish(&self, line: String) -> String {
        if self.enabled {
            line
        } else {
            host::strip_ansi(&line)
        }
    }
}

pub struct JsearchFormatter {
    palette: Palette,
}

impl JsearchFormatter {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }
}

impl<S, N> FormatEvent<S, N> for JsearchFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let mut fields = LineFields::default();
        event.record(&mut fields);

        if meta.target() == PRINT_TARGET {
            let raw: String = fields.raw_msg.unwrap_or_default();
            let line: String = match fields.tag.as_deref().and_then(LineTag::from_label) {
                Some(LineTag::Stage) => format!("\n{}", raw.color(colors::STAGE).bold()),
                Some(tag) => format!("{} {}", format!("[{}]", tag.label()).color(tag_color(tag)), raw),
                None => raw,
            };
            return writeln!(writer, "{}", self.palette.finish(line));
        }

        let (label, color): (&str, Color) = if meta.target() == SUCCESS_TARGET {
            ("SUCCESS", colors::SUCCESS)
        } else {
            match *meta.level() {
                Level::TRACE => ("TRACE", colors::DEBUG),
                Level::DEBUG => ("DEBUG", colors::DEBUG),
                Level::INFO => ("INFO", colors::INFO),
                Level::WARN => ("WARNING", colors::WARNING),
                Level::ERROR => ("ERROR", colors::ERROR),
            }
        };

        let timestamp = Local::now().format("%H:%M:%S");
        let mut message: String = fields.message.unwrap_or_default();
        for (name, value) in fields.extra {
            message.push_str(&format!(" {name}={value}"));
        }

        let line: String = format!(
            "{} {}",
            format!("[{timestamp}]").color(colors::TIMESTAMP),
            format!("[{label}] {message}").color(color)
        );
        writeln!(writer, "{}", self.palette.finish(line))
    }
}

fn tag_color(tag: LineTag) -> Color {
    match tag {
        LineTag::Subdomain => colors::SUBDOMAIN,
        LineTag::Live => colors::LIVE,
        LineTag::JsFile => colors::JS_FILE,
        LineTag::Vuln => colors::VULN,
        LineTag::Stage => colors::STAGE,
    }
}

#[derive(Default)]
struct LineFields {
    message: Option<String>,
    raw_msg: Option<String>,
    tag: Option<String>,
    extra: Vec<(&'static str, String)>,
}

impl LineFields {
    fn set(&mut self, name: &'static str, value: String) {
        match name {
            "message" => self.message = Some(value),
            "raw_msg" => self.raw_msg = Some(value),
            "tag" => self.tag = Some(value),
            other => self.extra.push((other, value)),
        }
    }
}

impl Visit for LineFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.set(field.name(), format!("{value:?}"));
    }
}
