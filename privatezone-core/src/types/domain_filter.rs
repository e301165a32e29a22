//! Domain filter

use serde::{Deserialize, Serialize};

use super::endpoint::null_as_default;

/// Include/exclude domain lists, negotiated with external-dns on `GET /`.
///
/// An empty include list matches every name. A name matches an entry when it
/// equals the entry or is a subdomain of it. Exclusion wins over inclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainFilter {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl DomainFilter {
    /// Build a filter, normalizing entries (lowercase, no surrounding dots, no blanks).
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            include: normalize_all(include),
            exclude: normalize_all(exclude),
        }
    }

    /// Whether any include or exclude entry is set.
    pub fn is_configured(&self) -> bool {
        !self.include.is_empty() || !self.exclude.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = normalize(name);
        if self.exclude.iter().any(|d| is_within(&name, d)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|d| is_within(&name, d))
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_matches('.').to_ascii_lowercase()
}

fn normalize_all<I>(entries: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    entries
        .into_iter()
        .map(|e| normalize(e.as_ref()))
        .filter(|e| !e.is_empty())
        .collect()
}

fn is_within(name: &str, domain: &str) -> bool {
    name == domain
        || name
            .strip_suffix(domain)
            .is_some_and(|rest| rest.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        let f = DomainFilter::default();
        assert!(f.matches("anything.example"));
        assert!(!f.is_configured());
    }

    #[test]
    fn include_matches_domain_and_subdomains() {
        let f = DomainFilter::new(["example.com."], Vec::<String>::new());
        assert!(f.matches("example.com"));
        assert!(f.matches("www.Example.com."));
        assert!(!f.matches("badexample.com"));
        assert!(!f.matches("example.org"));
    }

    #[test]
    fn exclude_wins() {
        let f = DomainFilter::new(["example.com"], ["internal.example.com"]);
        assert!(f.matches("www.example.com"));
        assert!(!f.matches("db.internal.example.com"));
        assert!(!f.matches("internal.example.com"));
    }

    #[test]
    fn blank_entries_dropped() {
        let f = DomainFilter::new(["", " . "], [""]);
        assert!(!f.is_configured());
    }

    #[test]
    fn serializes_for_negotiation() {
        let f = DomainFilter::new(["example.com"], Vec::<String>::new());
        assert_eq!(
            serde_json::to_value(&f).unwrap(),
            serde_json::json!({"include": ["example.com"]})
        );
    }
}
