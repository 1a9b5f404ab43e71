//! Page loading strategies.
//!
//! Event platforms vary wildly in how much content is client-rendered,
//! so a single fixed timeout either wastes time on simple pages or
//! fails on heavy ones. Strategies are tried in order, each more
//! lenient (and slower) than the last.

use std::time::Duration;

use serde::Serialize;

/// Which navigation signal a strategy waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadEvent {
    /// DOM parsed; scripts may still be loading.
    DomContentLoaded,
    /// Full load event fired.
    Load,
    /// Navigation committed; nothing else awaited.
    Commit,
}

impl LoadEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadEvent::DomContentLoaded => "domcontentloaded",
            LoadEvent::Load => "load",
            LoadEvent::Commit => "commit",
        }
    }
}

impl std::fmt::Display for LoadEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One loading attempt: wait condition, deadline, settle pause, and
/// the acceptance threshold for the extracted text.
#[derive(Debug, Clone, Copy)]
pub struct LoadStrategy {
    pub wait_for: LoadEvent,
    /// Covers navigation plus the readiness wait.
    pub timeout: Duration,
    /// Fixed pause for dynamic content after the wait condition.
    pub settle: Duration,
    /// Minimum extracted text length to accept, `None` = accept anything.
    pub min_text_len: Option<usize>,
}

impl LoadStrategy {
    /// Whether extracted text satisfies this strategy.
    pub fn accepts(&self, text: &str) -> bool {
        match self.min_text_len {
            Some(min) => text.chars().count() > min,
            None => true,
        }
    }
}

/// The escalation ladder, strictest first. The last entry is the last
/// resort and accepts whatever text was obtained.
pub const LOAD_STRATEGIES: [LoadStrategy; 3] = [
    LoadStrategy {
        wait_for: LoadEvent::DomContentLoaded,
        timeout: Duration::from_secs(15),
        settle: Duration::from_secs(2),
        min_text_len: Some(100),
    },
    LoadStrategy {
        wait_for: LoadEvent::Load,
        timeout: Duration::from_secs(20),
        settle: Duration::from_secs(3),
        min_text_len: Some(100),
    },
    LoadStrategy {
        wait_for: LoadEvent::Commit,
        timeout: Duration::from_secs(10),
        settle: Duration::from_secs(5),
        min_text_len: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_escalates_leniency() {
        assert_eq!(LOAD_STRATEGIES.len(), 3);
        assert_eq!(LOAD_STRATEGIES[0].wait_for, LoadEvent::DomContentLoaded);
        assert_eq!(LOAD_STRATEGIES[1].wait_for, LoadEvent::Load);
        assert_eq!(LOAD_STRATEGIES[2].wait_for, LoadEvent::Commit);

        // Only the last strategy accepts unconditionally
        assert!(LOAD_STRATEGIES[0].min_text_len.is_some());
        assert!(LOAD_STRATEGIES[1].min_text_len.is_some());
        assert!(LOAD_STRATEGIES[2].min_text_len.is_none());
    }

    #[test]
    fn acceptance_threshold() {
        let strict = LOAD_STRATEGIES[0];
        assert!(!strict.accepts(""));
        assert!(!strict.accepts(&"x".repeat(100)));
        assert!(strict.accepts(&"x".repeat(101)));

        let last_resort = LOAD_STRATEGIES[2];
        assert!(last_resort.accepts(""));
    }
}
