//! # Host Normalizer
//!
//! Different tools describe the same host in different ways: with or without a scheme,
//! upper-cased, followed by a path, wrapped in terminal escape codes from a live-redrawing
//! progress display, or with a trailing DNS dot. Every comparison in the pipeline goes
//! through [`normalize`] so that all of these collapse onto one canonical key.

use std::sync::LazyLock;

use regex::Regex;

/// `ESC [` followed by `;`-separated digits and a single command letter.
///
/// Covers style codes (`\x1b[2m`) as well as cursor control (`\x1b[2K`).
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("ANSI escape pattern is valid")
});

const SCHEMES: [&str; 2] = ["http://", "https://"];

/// File suffixes that mark a URL as a JavaScript resource.
pub const JS_EXTENSIONS: [&str; 1] = [".js"];

/// Marker that separates the fuzzed word from the response statistics in a fuzzing hit.
const FUZZ_STATUS_MARKER: &str = "[Status:";

/// Returns the canonical host key for a raw tool-emitted string.
///
/// Total and deterministic; anything that does not contain a host yields `""`, which
/// callers must never insert into a collection.
pub fn normalize(raw: &str) -> String {
    let lowered: String = raw.trim().to_lowercase();
    let without_scheme: &str = strip_scheme(&lowered);
    let plain: String = strip_ansi(without_scheme);

    let host: &str = match plain.find(['/', '?', '#']) {
        Some(idx) => &plain[..idx],
        None => &plain,
    };

    trim_host(host).to_string()
}

/// Removes every ANSI escape sequence from `raw`.
///
/// Repeats until nothing matches so that a sequence split by another one cannot survive.
pub fn strip_ansi(raw: &str) -> String {
    let mut current: String = raw.to_string();
    loop {
        let next: String = ANSI_ESCAPE.replace_all(&current, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Turns one line of fuzzing output into a full host name under `apex`.
///
/// A fuzzing tool reports the fuzzed word (`helpdesk   [Status: 200, ...]`) rather than a
/// host; a word without a dot is qualified as `word.apex`, anything with a dot is taken
/// as an already complete host.
pub fn qualify_label(raw: &str, apex: &str) -> String {
    let plain: String = strip_ansi(raw);
    let left: &str = match plain.find(FUZZ_STATUS_MARKER) {
        Some(idx) => &plain[..idx],
        None => &plain,
    };
    let label: &str = trim_host(left);

    if label.is_empty() {
        return String::new();
    }

    if label.contains('.') {
        normalize(label)
    } else {
        normalize(&format!("{label}.{apex}"))
    }
}

/// Returns the canonical form of a URL, or `None` if `raw` is not an absolute http(s) URL.
///
/// Scheme and host are lower-cased and the fragment is dropped; path and query keep
/// their case because servers treat them as case-sensitive.
pub fn normalize_url(raw: &str) -> Option<String> {
    let plain: String = strip_ansi(raw.trim());
    let plain: &str = plain.trim();
    let without_fragment: &str = match plain.find('#') {
        Some(idx) => &plain[..idx],
        None => plain,
    };

    let (scheme, rest) = without_fragment.split_once("://")?;
    let scheme: String = scheme.to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return None;
    }

    let split_at: usize = rest.find(['/', '?']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(split_at);
    let authority: String = authority.trim_end_matches('.').to_lowercase();
    if authority.is_empty() || authority.chars().any(char::is_whitespace) {
        return None;
    }

    Some(format!("{scheme}://{authority}{tail}"))
}

/// Whether the path of `url` ends in one of [`JS_EXTENSIONS`].
///
/// The query string is ignored, so `app.js?v=3` counts.
pub fn is_js_url(url: &str) -> bool {
    let path: &str = match url.find(['?', '#']) {
        Some(idx) => &url[..idx],
        None => url,
    };
    let path: String = path.to_ascii_lowercase();
    JS_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn strip_scheme(host: &str) -> &str {
    SCHEMES
        .iter()
        .find_map(|scheme| host.strip_prefix(scheme))
        .unwrap_or(host)
}

fn trim_host(host: &str) -> &str {
    host.trim_matches(|c: char| c == '.' || c.is_whitespace())
}
