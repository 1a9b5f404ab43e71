//! Browser-based page fetcher.
//!
//! Uses chromiumoxide (CDP) with stealth evasion so that script-heavy
//! event pages render the same content they would for a real visitor.
//! Loading is attempted with an escalating ladder of strategies; see
//! [`strategy`].

mod strategy;
mod stealth;

pub use strategy::{LoadEvent, LoadStrategy, LOAD_STRATEGIES};

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, NavigateParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use stealth::STEALTH_SCRIPTS;

/// Default user agent presented to target sites.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// JavaScript returning the visible text of the page.
const BODY_TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";

/// Text content of a page plus the strategy that produced it.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub text: String,
    /// Wait condition of the strategy that succeeded.
    pub strategy: LoadEvent,
}

/// Retrieves rendered page text for a URL.
///
/// Abstracted as a trait so the HTTP layer can be tested without a
/// real browser.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page_text(&self, url: &Url) -> FetchResult<FetchedPage>;
}

/// Headless-Chrome implementation of [`PageFetcher`].
///
/// A fresh browser process is launched per fetch and torn down on
/// every exit path, including failures, so sustained failure load
/// cannot leak orphaned Chrome processes.
pub struct BrowserFetcher {
    headless: bool,
    user_agent: String,
    extra_args: Vec<String>,
}

impl Default for BrowserFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    pub fn new() -> Self {
        Self {
            headless: true,
            user_agent: BROWSER_USER_AGENT.to_string(),
            extra_args: Vec::new(),
        }
    }

    /// Run with a visible window (debugging).
    pub fn with_head(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Override the presented user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Additional Chrome command-line arguments.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Find a Chrome/Chromium executable.
    fn find_chrome() -> FetchResult<PathBuf> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                debug!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        debug!("Found Chrome in PATH: {}", path);
                        return Ok(PathBuf::from(path));
                    }
                }
            }
        }

        Err(FetchError::Launch(
            "Chrome/Chromium not found on this host".to_string(),
        ))
    }

    /// Launch a browser process and spawn its CDP handler task.
    async fn launch(&self) -> FetchResult<(Browser, JoinHandle<()>)> {
        info!(headless = self.headless, "Launching browser");

        let chrome_path = Self::find_chrome()?;

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless, confusingly
        if !self.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--metrics-recording-only")
            .arg("--no-sandbox") // Often needed for headless in containers
            .arg("--disable-gpu")
            .arg("--window-size=1280,720");

        for arg in &self.extra_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| FetchError::Launch(format!("invalid browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handle))
    }

    /// Page setup, strategy ladder, text extraction.
    async fn fetch_inner(&self, browser: &Browser, url: &Url) -> FetchResult<FetchedPage> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let result = self.load_with_strategies(&page, url).await;
        let _ = page.close().await;
        result
    }

    /// Identity and stealth setup, all before any navigation.
    ///
    /// The stealth scripts are registered to run on every new document
    /// so anti-bot checks executing during page load already see the
    /// spoofed fingerprint; evaluating them after load would be too
    /// late.
    async fn prepare_page(&self, page: &Page) -> FetchResult<()> {
        page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        page.execute(SetExtraHttpHeadersParams::new(Headers::new(
            browser_headers(),
        )))
        .await
        .map_err(|e| FetchError::Browser(e.to_string()))?;

        for script in STEALTH_SCRIPTS {
            page.execute(AddScriptToEvaluateOnNewDocumentParams::new(*script))
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?;
        }

        Ok(())
    }

    async fn load_with_strategies(&self, page: &Page, url: &Url) -> FetchResult<FetchedPage> {
        self.prepare_page(page).await?;

        let mut last_failure = String::new();

        for (attempt, strategy) in LOAD_STRATEGIES.iter().enumerate() {
            debug!(
                attempt = attempt + 1,
                wait_for = %strategy.wait_for,
                timeout_secs = strategy.timeout.as_secs(),
                "Trying load strategy"
            );

            match self.attempt_load(page, url, strategy).await {
                Ok(text) if strategy.accepts(&text) => {
                    info!(
                        strategy = %strategy.wait_for,
                        content_length = text.chars().count(),
                        "Page loaded"
                    );
                    return Ok(FetchedPage {
                        text,
                        strategy: strategy.wait_for,
                    });
                }
                Ok(text) => {
                    debug!(
                        strategy = %strategy.wait_for,
                        content_length = text.chars().count(),
                        "Content below threshold, escalating"
                    );
                    last_failure =
                        format!("only {} characters extracted", text.chars().count());
                }
                Err(e) => {
                    debug!(strategy = %strategy.wait_for, error = %e, "Load strategy failed");
                    last_failure = e;
                }
            }
        }

        warn!(url = %url, error = %last_failure, "All loading strategies failed");
        Err(FetchError::StrategiesExhausted {
            attempts: LOAD_STRATEGIES.len(),
            details: last_failure,
        })
    }

    /// One navigation attempt. The strategy timeout covers navigation
    /// and the readiness wait; the settle pause runs after both.
    async fn attempt_load(
        &self,
        page: &Page,
        url: &Url,
        strategy: &LoadStrategy,
    ) -> Result<String, String> {
        let nav_params = NavigateParams::builder()
            .url(url.as_str())
            .build()
            .map_err(|e| format!("invalid navigation params: {}", e))?;

        tokio::time::timeout(strategy.timeout, async {
            page.execute(nav_params)
                .await
                .map_err(|e| format!("navigation failed: {}", e))?;

            if let Some(script) = readiness_script(strategy.wait_for) {
                page.evaluate(script)
                    .await
                    .map_err(|e| format!("readiness wait failed: {}", e))?;
            }
            Ok::<(), String>(())
        })
        .await
        .map_err(|_| {
            format!(
                "{} wait timed out after {}s",
                strategy.wait_for,
                strategy.timeout.as_secs()
            )
        })??;

        // Pause for dynamic content
        tokio::time::sleep(strategy.settle).await;

        page.evaluate(BODY_TEXT_SCRIPT.to_string())
            .await
            .map_err(|e| format!("text extraction failed: {}", e))?
            .into_value::<String>()
            .map_err(|e| format!("unexpected text value: {}", e))
    }

    /// Close the browser process and its handler task.
    async fn teardown(mut browser: Browser, handle: JoinHandle<()>) {
        if let Err(e) = browser.close().await {
            debug!("Browser close failed: {}", e);
        }
        let _ = tokio::time::timeout(Duration::from_secs(5), browser.wait()).await;
        handle.abort();
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch_page_text(&self, url: &Url) -> FetchResult<FetchedPage> {
        let (browser, handle) = self.launch().await?;

        // The browser is torn down on every exit path, including the
        // one where all strategies failed.
        let result = self.fetch_inner(&browser, url).await;
        Self::teardown(browser, handle).await;
        result
    }
}

/// Request headers a regular desktop Chrome would send.
fn browser_headers() -> serde_json::Value {
    serde_json::json!({
        "Accept": "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        "Accept-Language": "en-US,en;q=0.5",
        "Accept-Encoding": "gzip, deflate",
        "DNT": "1",
        "Connection": "keep-alive",
        "Upgrade-Insecure-Requests": "1",
    })
}

/// Script resolving once the page reaches the strategy's wait state.
///
/// `Commit` waits for nothing beyond navigation itself.
fn readiness_script(event: LoadEvent) -> Option<String> {
    let (check, target, dom_event) = match event {
        LoadEvent::DomContentLoaded => (
            "document.readyState === 'interactive' || document.readyState === 'complete'",
            "document",
            "DOMContentLoaded",
        ),
        LoadEvent::Load => ("document.readyState === 'complete'", "window", "load"),
        LoadEvent::Commit => return None,
    };

    Some(format!(
        r#"
        new Promise((resolve) => {{
            if ({check}) {{
                resolve(document.readyState);
                return;
            }}
            {target}.addEventListener('{dom_event}', () => resolve(document.readyState), {{ once: true }});
        }})
        "#
    ))
}
