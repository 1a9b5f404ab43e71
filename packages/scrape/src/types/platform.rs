//! Source platform classification.

use serde::{Deserialize, Serialize};
use url::Url;

/// Coarse classification of the event platform a URL points at.
///
/// Derived from the hostname only, never from model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Partiful,
    Posh,
    Unknown,
}

impl Platform {
    /// Classify a hostname by substring match.
    ///
    /// Matching is case-sensitive and deliberately loose: any host
    /// containing "partiful" or "posh" matches, including subdomains.
    pub fn from_hostname(hostname: &str) -> Self {
        if hostname.contains("partiful") {
            Platform::Partiful
        } else if hostname.contains("posh") {
            Platform::Posh
        } else {
            Platform::Unknown
        }
    }

    /// Classify from a parsed URL. URLs without a host are `Unknown`.
    pub fn from_url(url: &Url) -> Self {
        url.host_str().map(Self::from_hostname).unwrap_or(Platform::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Partiful => "partiful",
            Platform::Posh => "posh",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partiful_hostnames() {
        assert_eq!(Platform::from_hostname("partiful.com"), Platform::Partiful);
        assert_eq!(Platform::from_hostname("www.partiful.com"), Platform::Partiful);
        // Substring match is intentionally loose
        assert_eq!(
            Platform::from_hostname("notpartiful.evil.com"),
            Platform::Partiful
        );
    }

    #[test]
    fn posh_hostnames() {
        assert_eq!(Platform::from_hostname("posh.vip"), Platform::Posh);
        assert_eq!(Platform::from_hostname("events.posh.vip"), Platform::Posh);
    }

    #[test]
    fn unknown_hostnames() {
        assert_eq!(Platform::from_hostname("eventbrite.com"), Platform::Unknown);
        // Case-sensitive as implemented
        assert_eq!(Platform::from_hostname("PARTIFUL.com"), Platform::Unknown);
    }

    #[test]
    fn from_url_uses_host() {
        let url = Url::parse("https://partiful.com/e/abc123").unwrap();
        assert_eq!(Platform::from_url(&url), Platform::Partiful);

        let url = Url::parse("https://example.com/partiful").unwrap();
        assert_eq!(Platform::from_url(&url), Platform::Unknown);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Platform::Partiful).unwrap(),
            "\"partiful\""
        );
        assert_eq!(
            serde_json::to_string(&Platform::Unknown).unwrap(),
            "\"unknown\""
        );
    }
}
