use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::tools::Tool;

/// Wordlists tried in order when no explicit wordlist is configured.
pub const WORDLIST_PATHS: [&str; 4] = [
    "/usr/share/wordlists/seclists/Discovery/DNS/bug-bounty-program-subdomains-trickest-inventory.txt",
    "/opt/SecLists/Discovery/DNS/bug-bounty-program-subdomains-trickest-inventory.txt",
    "/usr/share/wordlists/seclists/Discovery/DNS/deepmagic.com-prefixes-top500.txt",
    "./wordlists/subdomains.txt",
];

pub const DEFAULT_THREADS: u32 = 50;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_SEVERITY: [&str; 3] = ["medium", "high", "critical"];

/// Immutable settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding tool output, scratch files and the summary.
    ///
    /// Derived from the target when unset.
    pub output_dir: Option<PathBuf>,
    /// Extra location the summary is copied to.
    pub output_file: Option<PathBuf>,
    pub skip: SkipFlags,
    /// Wordlist for subdomain fuzzing; [`WORDLIST_PATHS`] are searched when unset.
    pub wordlist: Option<PathBuf>,
    /// Concurrency passed to the fuzzing tool.
    pub threads: u32,
    /// Per-request timeout passed to the fuzzing tool.
    pub request_timeout_secs: u64,
    /// Deadline for a single tool invocation. `None` waits as long as the tool runs.
    pub command_timeout: Option<Duration>,
    /// Deadline for the `-h` invocation that checks whether a tool exists.
    pub probe_timeout: Duration,
    /// Severities reported by the vulnerability scanner.
    pub severity: Vec<String>,
    pub tools: ToolPaths,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            output_file: None,
            skip: SkipFlags::default(),
            wordlist: None,
            threads: DEFAULT_THREADS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            command_timeout: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            severity: DEFAULT_SEVERITY.iter().map(|s| s.to_string()).collect(),
            tools: ToolPaths::default(),
        }
    }
}

impl Config {
    /// The configured wordlist if it exists, otherwise the first existing built-in one.
    pub fn resolve_wordlist(&self) -> Option<PathBuf> {
        match &self.wordlist {
            Some(path) => path.exists().then(|| path.clone()),
            None => WORDLIST_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|path| path.exists()),
        }
    }
}

/// Tools the operator asked not to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipFlags {
    pub ffuf: bool,
    pub gau: bool,
    pub katana: bool,
    pub mantra: bool,
    pub nuclei: bool,
}

impl SkipFlags {
    pub fn is_skipped(&self, tool: Tool) -> bool {
        match tool {
            Tool::Ffuf => self.ffuf,
            Tool::Gau => self.gau,
            Tool::Katana => self.katana,
            Tool::Mantra => self.mantra,
            Tool::Nuclei => self.nuclei,
            Tool::Subfinder | Tool::Httpx => false,
        }
    }
}

/// Where each tool's executable lives.
///
/// Explicit overrides win, then `dir/<binary>`, then the bare binary name resolved
/// through `PATH` at spawn time.
#[derive(Debug, Clone, Default)]
pub struct ToolPaths {
    pub dir: Option<PathBuf>,
    overrides: HashMap<Tool, PathBuf>,
}

impl ToolPaths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            overrides: HashMap::new(),
        }
    }

    pub fn with_program(mut self, tool: Tool, program: impl Into<PathBuf>) -> Self {
        self.overrides.insert(tool, program.into());
        self
    }

    pub fn program(&self, tool: Tool) -> PathBuf {
        if let Some(program) = self.overrides.get(&tool) {
            return program.clone();
        }
        match &self.dir {
            Some(dir) => dir.join(tool.binary()),
            None => Path::new(tool.binary()).to_path_buf(),
        }
    }
}
