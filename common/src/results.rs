//! # Result Set Aggregator
//!
//! Holds every entity discovered during a run, keyed by canonical form. Merges only ever
//! add: a merge reports whether the entry was genuinely new so callers can print and
//! count discoveries without re-announcing hosts another tool already confirmed.

use std::collections::BTreeSet;

use indexmap::IndexSet;

use crate::host;
use crate::target::Target;

/// Result of merging one raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub canonical: String,
    pub was_new: bool,
}

/// Subdomains, live domains and JavaScript URLs found so far.
///
/// Live domains keep their discovery order: later per-domain stages iterate them in the
/// order the liveness prober confirmed them, each exactly once.
#[derive(Debug, Clone)]
pub struct ResultSet {
    target: Target,
    subdomains: BTreeSet<String>,
    live_domains: IndexSet<String>,
    js_files: IndexSet<String>,
}

impl ResultSet {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            subdomains: BTreeSet::new(),
            live_domains: IndexSet::new(),
            js_files: IndexSet::new(),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Adds the apex domain itself as a subdomain.
    pub fn seed_target(&mut self) -> Merge {
        let apex: String = self.target.as_str().to_string();
        let was_new: bool = self.subdomains.insert(apex.clone());
        Merge { canonical: apex, was_new }
    }

    /// Merges a host reported by a discovery tool.
    ///
    /// Returns `None` when nothing host-like remains after normalisation.
    pub fn merge_subdomain(&mut self, raw: &str) -> Option<Merge> {
        let canonical: String = host::normalize(raw);
        insert_into(&mut self.subdomains, canonical)
    }

    /// Merges a hit from a fuzzing tool, qualifying a bare word with the target apex.
    pub fn merge_fuzz_hit(&mut self, raw: &str) -> Option<Merge> {
        let canonical: String = host::qualify_label(raw, self.target.as_str());
        insert_into(&mut self.subdomains, canonical)
    }

    /// Merges a host confirmed reachable by the liveness prober.
    pub fn merge_live(&mut self, raw: &str) -> Option<Merge> {
        let canonical: String = host::normalize(raw);
        if canonical.is_empty() {
            return None;
        }
        let was_new: bool = self.live_domains.insert(canonical.clone());
        Some(Merge { canonical, was_new })
    }

    /// Merges a URL if it points at a JavaScript file.
    pub fn merge_js(&mut self, raw: &str) -> Option<Merge> {
        let canonical: String = host::normalize_url(raw)?;
        if !host::is_js_url(&canonical) {
            return None;
        }
        let was_new: bool = self.js_files.insert(canonical.clone());
        Some(Merge { canonical, was_new })
    }

    /// Canonical form of `raw` when it is a JavaScript URL not yet in the set.
    ///
    /// Lets a caller collect candidates without touching the set until it decides to keep them.
    pub fn unseen_js(&self, raw: &str) -> Option<String> {
        let canonical: String = host::normalize_url(raw)?;
        (host::is_js_url(&canonical) && !self.js_files.contains(&canonical)).then_some(canonical)
    }

    pub fn subdomains(&self) -> impl Iterator<Item = &str> {
        self.subdomains.iter().map(String::as_str)
    }

    /// Live domains in discovery order.
    pub fn live_domains(&self) -> impl Iterator<Item = &str> {
        self.live_domains.iter().map(String::as_str)
    }

    pub fn js_files(&self) -> impl Iterator<Item = &str> {
        self.js_files.iter().map(String::as_str)
    }

    pub fn is_live(&self, host: &str) -> bool {
        self.live_domains.contains(host)
    }

    pub fn subdomain_count(&self) -> usize {
        self.subdomains.len()
    }

    pub fn live_count(&self) -> usize {
        self.live_domains.len()
    }

    pub fn js_count(&self) -> usize {
        self.js_files.len()
    }
}

fn insert_into(set: &mut BTreeSet<String>, canonical: String) -> Option<Merge> {
    if canonical.is_empty() {
        return None;
    }
    let was_new: bool = set.insert(canonical.clone());
    Some(Merge { canonical, was_new })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> ResultSet {
        ResultSet::new("example.com".parse().unwrap())
    }

    #[test]
    fn fuzz_hit_duplicate_of_passive_result() {
        let mut set = results();
        set.merge_subdomain("docs.example.com");

        let dup = set.merge_fuzz_hit("docs   [Status: 200, Size: 3637, Words: 447]").unwrap();
        assert_eq!(dup.canonical, "docs.example.com");
        assert!(!dup.was_new);
        assert_eq!(set.subdomain_count(), 1);

        let fresh = set.merge_fuzz_hit("helpdesk   [Status: 200, Size: 13901]").unwrap();
        assert_eq!(fresh.canonical, "helpdesk.example.com");
        assert!(fresh.was_new);
        assert_eq!(set.subdomain_count(), 2);
    }

    #[test]
    fn decorated_duplicates_collapse() {
        let mut set = results();
        assert!(set.merge_subdomain("docs.example.com").unwrap().was_new);
        assert!(!set.merge_subdomain("\x1b[2KDOCS.example.com.").unwrap().was_new);
        assert!(!set.merge_subdomain("https://docs.example.com/login").unwrap().was_new);
        assert_eq!(set.subdomain_count(), 1);
    }

    #[test]
    fn empty_values_are_never_inserted() {
        let mut set = results();
        assert_eq!(set.merge_subdomain("   "), None);
        assert_eq!(set.merge_live("\x1b[0m"), None);
        assert_eq!(set.merge_fuzz_hit("[Status: 200]"), None);
        assert_eq!(set.subdomain_count(), 0);
        assert_eq!(set.live_count(), 0);
    }

    #[test]
    fn live_domains_keep_discovery_order() {
        let mut set = results();
        set.merge_live("b.example.com");
        set.merge_live("https://a.example.com");
        let dup = set.merge_live("b.example.com").unwrap();

        assert!(!dup.was_new);
        let ordered: Vec<&str> = set.live_domains().collect();
        assert_eq!(ordered, vec!["b.example.com", "a.example.com"]);
        assert_eq!(set.live_count(), ordered.len());
        assert!(set.is_live("a.example.com"));
    }

    #[test]
    fn js_merge_filters_and_dedups() {
        let mut set = results();
        assert!(set.merge_js("https://cdn.example.com/app.js").unwrap().was_new);
        assert!(!set.merge_js("HTTPS://CDN.example.com/app.js#x").unwrap().was_new);
        assert_eq!(set.merge_js("https://cdn.example.com/style.css"), None);
        assert_eq!(set.merge_js("not a url"), None);
        assert_eq!(set.js_count(), 1);
    }

    #[test]
    fn unseen_js_peeks_without_inserting() {
        let mut set = results();
        set.merge_js("https://cdn.example.com/app.js");

        assert_eq!(set.unseen_js("HTTPS://CDN.example.com/app.js"), None);
        assert_eq!(set.unseen_js("https://cdn.example.com/style.css"), None);
        assert_eq!(
            set.unseen_js("https://cdn.example.com/vendor.js").as_deref(),
            Some("https://cdn.example.com/vendor.js")
        );
        assert_eq!(set.js_count(), 1);
    }

    #[test]
    fn seeding_target_is_idempotent() {
        let mut set = results();
        assert!(set.seed_target().was_new);
        assert!(!set.seed_target().was_new);
        assert_eq!(set.subdomains().collect::<Vec<_>>(), vec!["example.com"]);
    }
}
