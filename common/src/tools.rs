//! Catalogue of the external executables the pipeline drives.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tool {
    Subfinder,
    Ffuf,
    Httpx,
    Gau,
    Katana,
    Mantra,
    Nuclei,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Subfinder,
        Tool::Ffuf,
        Tool::Httpx,
        Tool::Gau,
        Tool::Katana,
        Tool::Mantra,
        Tool::Nuclei,
    ];

    /// Name of the executable looked up on `PATH`.
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::Subfinder => "subfinder",
            Tool::Ffuf => "ffuf",
            Tool::Httpx => "httpx",
            Tool::Gau => "gau",
            Tool::Katana => "katana",
            Tool::Mantra => "mantra",
            Tool::Nuclei => "nuclei",
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Tool::Subfinder => "passive subdomain discovery",
            Tool::Ffuf => "active subdomain fuzzing",
            Tool::Httpx => "live domain verification",
            Tool::Gau => "JavaScript file discovery",
            Tool::Katana => "additional JS crawling",
            Tool::Mantra => "secret analysis",
            Tool::Nuclei => "vulnerability scanning",
        }
    }

    /// Mandatory tools have no fallback and are checked before any stage runs.
    /// Optional ones are probed by their stage, which degrades to a no-op without them.
    pub fn is_mandatory(&self) -> bool {
        !matches!(self, Tool::Katana | Tool::Nuclei)
    }

    pub fn install_hint(&self) -> Option<&'static str> {
        match self {
            Tool::Mantra => Some("https://github.com/brosck/mantra"),
            _ => None,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}
