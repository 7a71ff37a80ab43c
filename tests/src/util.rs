use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use jsearch_common::config::{Config, ToolPaths};
use jsearch_common::tools::Tool;
use tempfile::TempDir;

/// Answers the availability probe and collects the arguments every tool script needs:
/// the first positional argument, the `-o` output file and the `-l`/`-list` input file.
const PRELUDE: &str = r#"#!/bin/sh
[ "$1" = "-h" ] && exit 0
first="$1"
out=""
list=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    -l|-list) list="$2"; shift 2 ;;
    *) shift ;;
  esac
done
"#;

/// A directory of shell scripts standing in for the real recon tools.
pub struct FakeTools {
    dir: TempDir,
    paths: ToolPaths,
}

impl FakeTools {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create fake tool dir"),
            paths: ToolPaths::default(),
        }
    }

    /// A set where every tool succeeds silently without producing anything.
    pub fn all_silent() -> Self {
        let mut tools = Self::new();
        for tool in Tool::ALL {
            tools.install(tool, ":");
        }
        tools
    }

    /// Installs `body` as the script for `tool`. `$DIR` expands to [`FakeTools::dir`].
    pub fn install(&mut self, tool: Tool, body: &str) -> PathBuf {
        let path: PathBuf = self.dir.path().join(format!("fake-{}", tool.binary()));
        let script = format!("{PRELUDE}DIR=\"{}\"\n{body}\n", self.dir.path().display());
        fs::write(&path, script).expect("write fake tool");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");

        self.paths = self.paths.clone().with_program(tool, &path);
        path
    }

    /// Points `tool` at a path that does not exist.
    pub fn remove(&mut self, tool: Tool) {
        let path: PathBuf = self.dir.path().join(format!("missing-{}", tool.binary()));
        self.paths = self.paths.clone().with_program(tool, path);
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn paths(&self) -> ToolPaths {
        self.paths.clone()
    }

    /// A config wired to these tools and a wordlist, writing into `output_dir`.
    pub fn config(&self, output_dir: &Path) -> Config {
        let wordlist: PathBuf = self.dir.path().join("words.txt");
        fs::write(&wordlist, "helpdesk\ndocs\n").expect("write wordlist");

        Config {
            output_dir: Some(output_dir.to_path_buf()),
            wordlist: Some(wordlist),
            tools: self.paths(),
            ..Config::default()
        }
    }

    /// Contents of a file a script wrote into [`FakeTools::dir`], empty if absent.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).unwrap_or_default()
    }
}

impl Default for FakeTools {
    fn default() -> Self {
        Self::new()
    }
}
