//! Testing utilities including mock implementations.
//!
//! Useful for testing applications that use the scrape pipeline
//! without a real browser or model calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use url::Url;

use crate::error::{FetchError, FetchResult, ModelError, ModelResult};
use crate::extractor::ChatModel;
use crate::fetcher::{FetchedPage, LoadEvent, PageFetcher};

/// Record of one completion request made to the mock model.
#[derive(Debug, Clone)]
pub struct MockChatCall {
    pub system: String,
    pub user: String,
}

/// A mock [`ChatModel`] returning a canned response or error.
#[derive(Clone, Default)]
pub struct MockChatModel {
    response: Arc<RwLock<Option<String>>>,
    error: Arc<Mutex<Option<ModelError>>>,
    calls: Arc<RwLock<Vec<MockChatCall>>>,
}

impl MockChatModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to every completion with this text.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        *self.response.write().unwrap() = Some(response.into());
        self
    }

    /// Fail every completion with this error. `ModelError` is not
    /// `Clone`, so the error is handed out once and re-created from
    /// its message afterwards.
    pub fn with_error(self, error: ModelError) -> Self {
        *self.error.lock().unwrap() = Some(error);
        self
    }

    /// Calls made so far, for assertions.
    pub fn calls(&self) -> Vec<MockChatCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, system: &str, user: &str) -> ModelResult<String> {
        self.calls.write().unwrap().push(MockChatCall {
            system: system.to_string(),
            user: user.to_string(),
        });

        let mut error_slot = self.error.lock().unwrap();
        if let Some(error) = error_slot.take() {
            let message = error.to_string();
            *error_slot = Some(ModelError::Api(message));
            return Err(error);
        }
        drop(error_slot);

        match self.response.read().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err(ModelError::Empty),
        }
    }
}

/// A mock [`PageFetcher`] with session accounting.
///
/// Counts opened and closed sessions so tests can assert that every
/// fetch, successful or not, releases its browser exactly once.
#[derive(Clone)]
pub struct MockPageFetcher {
    text: Option<String>,
    failure: Option<String>,
    launch_failure: Option<String>,
    sessions_opened: Arc<AtomicUsize>,
    sessions_closed: Arc<AtomicUsize>,
}

impl MockPageFetcher {
    fn empty() -> Self {
        Self {
            text: None,
            failure: None,
            launch_failure: None,
            sessions_opened: Arc::new(AtomicUsize::new(0)),
            sessions_closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A fetcher that succeeds with the given page text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::empty()
        }
    }

    /// A fetcher whose strategies are all exhausted with this detail.
    pub fn with_failure(details: impl Into<String>) -> Self {
        Self {
            failure: Some(details.into()),
            ..Self::empty()
        }
    }

    /// A fetcher whose browser never starts. No session is opened.
    pub fn with_launch_failure(details: impl Into<String>) -> Self {
        Self {
            launch_failure: Some(details.into()),
            ..Self::empty()
        }
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.sessions_closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch_page_text(&self, _url: &Url) -> FetchResult<FetchedPage> {
        // Launch failure happens before any session exists
        if let Some(details) = &self.launch_failure {
            return Err(FetchError::Launch(details.clone()));
        }

        self.sessions_opened.fetch_add(1, Ordering::SeqCst);

        // Session teardown happens on both exit paths, mirroring the
        // real fetcher.
        let result = match (&self.text, &self.failure) {
            (Some(text), _) => Ok(FetchedPage {
                text: text.clone(),
                strategy: LoadEvent::DomContentLoaded,
            }),
            (None, Some(details)) => Err(FetchError::StrategiesExhausted {
                attempts: 3,
                details: details.clone(),
            }),
            (None, None) => Err(FetchError::Launch("no mock behavior configured".into())),
        };

        self.sessions_closed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_model_records_calls() {
        let model = MockChatModel::new().with_response("hi");
        let reply = model.complete("sys", "usr").await.unwrap();
        assert_eq!(reply, "hi");

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, "sys");
    }

    #[tokio::test]
    async fn mock_model_errors_repeatedly() {
        let model = MockChatModel::new().with_error(ModelError::Empty);
        assert!(model.complete("s", "u").await.is_err());
        // Error is re-armed after being handed out
        assert!(model.complete("s", "u").await.is_err());
    }

    #[tokio::test]
    async fn mock_fetcher_launch_failure_opens_no_session() {
        let fetcher = MockPageFetcher::with_launch_failure("chrome not found");
        let url = Url::parse("https://partiful.com/e/x").unwrap();

        let error = fetcher.fetch_page_text(&url).await.unwrap_err();
        assert!(matches!(error, FetchError::Launch(_)));
        assert_eq!(fetcher.sessions_opened(), 0);
        assert_eq!(fetcher.sessions_closed(), 0);
    }

    #[tokio::test]
    async fn mock_fetcher_counts_sessions() {
        let fetcher = MockPageFetcher::with_failure("dns error");
        let url = Url::parse("https://partiful.com/e/x").unwrap();

        assert!(fetcher.fetch_page_text(&url).await.is_err());
        assert_eq!(fetcher.sessions_opened(), 1);
        assert_eq!(fetcher.sessions_closed(), 1);
    }
}
