mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, check_tools, scan};
use terminal::logging::Palette;
use terminal::{print, spinner};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let commands = CommandLine::parse_args();

    spinner::init_logging(Palette::new(!commands.no_color), commands.verbosity());
    print::banner(commands.no_banner, commands.quiet);

    let cfg = commands.config();

    if commands.check_tools {
        print::header("tool availability", false);
        return check_tools::check_tools(&cfg).await;
    }

    let Some(target) = commands.url.clone() else {
        anyhow::bail!("a target is required, pass it with -u/--url");
    };

    print::header("starting scan", commands.quiet);
    scan::scan(target, cfg, commands.quiet).await
}
