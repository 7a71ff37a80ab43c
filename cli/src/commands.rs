pub mod check_tools;
pub mod scan;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use jsearch_common::config::{
    Config, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_THREADS, SkipFlags, ToolPaths,
};
use jsearch_common::target::Target;

use crate::terminal::logging::Verbosity;

#[derive(Parser)]
#[command(name = "jsearch", version)]
#[command(about = "Finds JavaScript files across a domain's attack surface and hunts them for secrets.")]
pub struct CommandLine {
    /// Target domain, e.g. example.com
    #[arg(short = 'u', long = "url", required_unless_present = "check_tools")]
    pub url: Option<Target>,

    /// Output directory (default: jsearch_<target>)
    #[arg(short = 'p', long = "path")]
    pub path: Option<PathBuf>,

    /// Extra file the JSON summary is written to
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Skip katana JS crawling
    #[arg(long)]
    pub skip_katana: bool,

    /// Skip nuclei vulnerability scanning
    #[arg(long)]
    pub skip_nuclei: bool,

    /// Skip ffuf subdomain fuzzing
    #[arg(long)]
    pub skip_ffuf: bool,

    /// Skip gau JS discovery
    #[arg(long)]
    pub skip_gau: bool,

    /// Skip mantra secret analysis
    #[arg(long)]
    pub skip_mantra: bool,

    /// Wordlist for ffuf
    #[arg(long)]
    pub wordlist: Option<PathBuf>,

    /// Per-request timeout passed to ffuf, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Give up on any single tool after this many seconds (default: wait as long as it runs)
    #[arg(long, value_name = "SECONDS")]
    pub command_timeout: Option<u64>,

    /// Number of threads for ffuf
    #[arg(long, default_value_t = DEFAULT_THREADS)]
    pub threads: u32,

    /// Severities reported by nuclei
    #[arg(long, value_delimiter = ',', default_value = "medium,high,critical")]
    pub severity: Vec<String>,

    /// Directory holding the tool executables (default: search PATH)
    #[arg(long)]
    pub tools_dir: Option<PathBuf>,

    /// Reduce output verbosity
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show command lines and exit details
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Do not print the banner
    #[arg(long)]
    pub no_banner: bool,

    /// Check which tools are installed and exit
    #[arg(long)]
    pub check_tools: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> Verbosity {
        match (self.quiet, self.verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        }
    }

    pub fn config(&self) -> Config {
        let tools: ToolPaths = match &self.tools_dir {
            Some(dir) => ToolPaths::in_dir(dir),
            None => ToolPaths::default(),
        };

        Config {
            output_dir: self.path.clone(),
            output_file: self.output.clone(),
            skip: SkipFlags {
                ffuf: self.skip_ffuf,
                gau: self.skip_gau,
                katana: self.skip_katana,
                mantra: self.skip_mantra,
                nuclei: self.skip_nuclei,
            },
            wordlist: self.wordlist.clone(),
            threads: self.threads,
            request_timeout_secs: self.timeout,
            command_timeout: self.command_timeout.map(Duration::from_secs),
            severity: self.severity.clone(),
            tools,
            ..Config::default()
        }
    }
}
