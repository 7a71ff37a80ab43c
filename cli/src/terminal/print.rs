use std::path::Path;

use colored::*;
use jsearch_common::summary::Summary;
use unicode_width::UnicodeWidthStr;

use crate::terminal::{banner, colors};

pub const TOTAL_WIDTH: usize = 64;

pub use jsearch_common::print::print;

pub fn banner(no_banner: bool, quiet: bool) {
    if no_banner || quiet {
        return;
    }

    let text_content: String = format!("⟦ JSEARCH v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.color(colors::PRIMARY).bold();
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2).color(colors::SEPARATOR);

    print(&format!("{}{}{}", sep, text, sep));
    banner::print();
}

pub fn header(msg: &str, quiet: bool) {
    if quiet {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().color(colors::PRIMARY),
        "─".repeat(right)
    )
    .color(colors::SEPARATOR);

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR);
    print(&format!("{}", sep));
}

/// `key.....: value`, with keys padded to `key_width`.
pub fn aligned_line(key: &str, value: impl std::fmt::Display, key_width: usize) {
    let dots: String = ".".repeat((key_width + 1).saturating_sub(key.len()));
    print(&format!(
        "{} {}{}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value.to_string().color(colors::TEXT_DEFAULT)
    ));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

/// The closing block of a scan. Printed even when every stage came back empty.
pub fn summary(summary: &Summary, output_dir: &Path) {
    const KEY_WIDTH: usize = 16;

    print("");
    header("jsearch summary", false);
    aligned_line("Target", &summary.target, KEY_WIDTH);
    aligned_line("Subdomains found", summary.subdomains_found, KEY_WIDTH);
    aligned_line("Live domains", summary.live_domains_found, KEY_WIDTH);
    aligned_line("JS files found", summary.js_files_found, KEY_WIDTH);
    aligned_line("Output directory", output_dir.display(), KEY_WIDTH);
    fat_separator();
}
