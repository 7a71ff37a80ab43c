use std::process::ExitCode;

use colored::*;
use jsearch_common::config::{Config, WORDLIST_PATHS};
use jsearch_common::tools::Tool;
use jsearch_core::toolbox::{Availability, Toolbox};

use crate::terminal::{colors, print};

/// Probes every tool and reports what is missing. Fails if a required tool is absent.
pub async fn check_tools(cfg: &Config) -> anyhow::Result<ExitCode> {
    let availability: Availability = Toolbox::new(cfg).survey().await;

    report_group("required", &availability.missing_required());
    report_group("optional", &availability.missing_optional());

    match cfg.resolve_wordlist() {
        Some(path) => print::print(&format!(
            "{}",
            format!("Wordlist found: {}", path.display()).color(colors::SUCCESS)
        )),
        None => {
            print::print(&format!(
                "{}",
                "No wordlist found in the default locations".color(colors::WARNING)
            ));
            print::print("   Expected locations:");
            for path in WORDLIST_PATHS {
                print::print(&format!("   • {}", path));
            }
        }
    }

    if availability.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn report_group(kind: &str, missing: &[Tool]) {
    if missing.is_empty() {
        print::print(&format!(
            "{}",
            format!("All {} tools are available", kind).color(colors::SUCCESS)
        ));
        return;
    }

    let color = if kind == "required" { colors::ERROR } else { colors::WARNING };
    print::print(&format!("{}", format!("Missing {} tools:", kind).color(color)));
    for tool in missing {
        let mut line: String = format!("   • {} ({})", tool, tool.role());
        if let Some(hint) = tool.install_hint() {
            line.push_str(&format!(", install from {}", hint));
        }
        print::print(&line);
    }
}
