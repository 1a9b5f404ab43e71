//! Event Page Scraping and Extraction Pipeline
//!
//! Turns an event page URL into a structured [`EventRecord`] in three
//! strictly sequential stages, executed once per request with no
//! shared mutable state:
//!
//! 1. **Fetcher** — renders the page in headless Chrome, escalating
//!    through loading strategies for slow or script-heavy sites.
//! 2. **Extractor** — prompts a hosted language model for structured
//!    fields, degrading to placeholder records when the model is
//!    unconfigured or misbehaves.
//! 3. **Normalizer** — repairs the model's output into a record that
//!    always satisfies the `EventRecord` invariants.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scrape::{BrowserFetcher, EventExtractor, OpenAiChat, PageFetcher, Platform};
//!
//! let fetcher = BrowserFetcher::new();
//! let extractor = EventExtractor::new(Some(Arc::new(OpenAiChat::new("sk-..."))));
//!
//! let url = url::Url::parse("https://partiful.com/e/abc123")?;
//! let page = fetcher.fetch_page_text(&url).await?;
//! let outcome = extractor
//!     .extract(&page.text, Platform::from_url(&url), &categories)
//!     .await;
//! ```
//!
//! # Modules
//!
//! - [`fetcher`] - Browser-based page fetching with strategy escalation
//! - [`extractor`] - Model-backed field extraction with degraded modes
//! - [`normalizer`] - Total normalization of untrusted drafts
//! - [`types`] - Event record and platform types
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod normalizer;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use error::{FetchError, ModelError};
pub use extractor::{
    ChatModel, EventExtractor, ExtractedEvent, OpenAiChat, EXTRACT_SYSTEM_PROMPT, MAX_PAGE_CHARS,
};
pub use fetcher::{
    BrowserFetcher, FetchedPage, LoadEvent, LoadStrategy, PageFetcher, LOAD_STRATEGIES,
};
pub use normalizer::{default_category, normalize};
pub use types::event::{
    CategoryField, EventRecord, ExtractionStatus, FALLBACK_CATEGORY, NOT_SPECIFIED,
    PLACEHOLDER_DATE,
};
pub use types::platform::Platform;

// Re-export testing utilities
pub use testing::{MockChatModel, MockPageFetcher};
