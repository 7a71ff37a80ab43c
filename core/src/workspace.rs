//! The per-run output directory.
//!
//! Tool results land here under fixed names. Scratch inputs are handed out as
//! [`ScratchFile`] guards that delete themselves when dropped, so no exit path of a stage
//! can leave one behind for the next run of the same target.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jsearch_common::debug;

pub const SUBDOMAINS_SCRATCH: &str = "temp_subdomains.txt";
pub const LIVE_SCRATCH: &str = "temp_live_domains.txt";
pub const JS_SCRATCH: &str = "temp_js_files.txt";
pub const NUCLEI_SCRATCH: &str = "temp_live_domains_nuclei.txt";

pub const SUBFINDER_OUTPUT: &str = "subfinder_results.txt";
pub const FFUF_OUTPUT: &str = "ffuf_results.json";
pub const LIVE_OUTPUT: &str = "live_domains.txt";
pub const KATANA_OUTPUT: &str = "katana_js_files.txt";
pub const MANTRA_OUTPUT: &str = "mantra_secrets.txt";
pub const NUCLEI_OUTPUT: &str = "nuclei_results.txt";
pub const SUMMARY_FILE: &str = "jsearch_summary.json";

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Creates the directory (and parents) if needed.
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root: PathBuf = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Path for a tool output file, with any leftover from an earlier run removed.
    pub fn fresh_output(&self, name: &str) -> io::Result<PathBuf> {
        let path: PathBuf = self.path(name);
        match fs::remove_file(&path) {
            Ok(()) => debug!("Removed stale {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Ok(path)
    }

    /// Writes `lines` newline-delimited into a scratch file owned by the returned guard.
    pub fn scratch<I, S>(&self, name: &str, lines: I) -> io::Result<ScratchFile>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let path: PathBuf = self.path(name);
        let mut content: String = String::new();
        for line in lines {
            content.push_str(line.as_ref());
            content.push('\n');
        }

        // Guard first: a half-written file is still removed.
        let guard = ScratchFile { path };
        fs::write(&guard.path, content)?;
        Ok(guard)
    }

    /// Non-blank, trimmed lines of a tool output file; empty if the tool never wrote it.
    pub fn read_lines(&self, name: &str) -> io::Result<Vec<String>> {
        match fs::read(self.path(name)) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

/// A transient tool input, removed on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Cleaned up {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => debug!("Could not remove {}: {}", self.path.display(), e),
        }
    }
}
