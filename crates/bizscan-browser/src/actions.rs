use crate::error::{BrowserError, Result};
use crate::locator::{Locator, SelectBy};
use std::time::Duration;

/// Interval between `exists` probes while waiting for a control.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser actions for automation
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Whether the locator currently matches anything
    async fn exists(&self, locator: &Locator) -> Result<bool>;

    /// Click the first element the locator matches
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Replace the value of an input field
    async fn fill_field(&self, selector: &str, value: &str) -> Result<()>;

    /// Choose an option of a `<select>` and fire its change event
    async fn select_option(&self, selector: &str, option: &SelectBy) -> Result<()>;

    /// Visible text of every option of a `<select>`
    async fn option_labels(&self, selector: &str) -> Result<Vec<String>>;

    /// Scroll the window vertically
    async fn scroll_by(&self, dy: i64) -> Result<()>;

    /// Full page markup
    async fn content(&self) -> Result<String>;

    /// Close the page
    async fn close(&self) -> Result<()>;

    /// Wait until one of the locators matches, returning its index.
    async fn wait_for_any(&self, locators: &[Locator], timeout: Duration) -> Result<usize> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            for (index, locator) in locators.iter().enumerate() {
                if self.exists(locator).await? {
                    return Ok(index);
                }
            }

            if tokio::time::Instant::now() >= deadline {
                let wanted: Vec<String> = locators.iter().map(ToString::to_string).collect();
                return Err(BrowserError::Timeout(format!(
                    "none of [{}] appeared within {timeout:?}",
                    wanted.join(", ")
                )));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Hands out pages bound to an isolated browser context.
#[async_trait::async_trait]
pub trait SessionSource: Send + Sync {
    type Page: BrowserActions + 'static;

    /// Open a page in the context assigned to `slot`.
    async fn acquire(&self, slot: usize) -> Result<Self::Page>;
}

/// Helper to extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}
