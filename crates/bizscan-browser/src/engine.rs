use crate::actions::{extract_domain, BrowserActions, SessionSource};
use crate::error::{BrowserError, Result};
use crate::fingerprint::{FingerprintConfig, STEALTH_SCRIPT};
use crate::locator::{Locator, SelectBy};
use crate::script;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetLocaleOverrideParams, SetTimezoneOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{CreateBrowserContextParams, CreateTargetParams};
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Launch arguments that make an automated Chromium look like a regular one
const LAUNCH_ARGS: [&str; 3] = [
    "--disable-blink-features=AutomationControlled",
    "--start-maximized",
    "--no-default-browser-check",
];

/// Engine launch options
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub headless: bool,
    /// Number of isolated contexts; sessions are assigned `slot % pool_size`
    pub pool_size: usize,
    pub window_width: u32,
    pub window_height: u32,
    pub locale: String,
    pub timezone: String,
    /// Upper bound on a single click
    pub action_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            headless: false,
            pool_size: 1,
            window_width: 1920,
            window_height: 1080,
            locale: "en-US".to_string(),
            timezone: "America/Toronto".to_string(),
            action_timeout: Duration::from_secs(2),
        }
    }
}

/// One pre-created browser context and the identity its pages present
#[derive(Debug, Clone)]
struct PooledContext {
    id: BrowserContextId,
    fingerprint: FingerprintConfig,
}

/// Browser automation engine
pub struct BrowserEngine {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    contexts: Vec<PooledContext>,
    action_timeout: Duration,
}

impl BrowserEngine {
    /// Launch Chromium and pre-create the context pool
    pub async fn launch(options: EngineOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(options.window_width, options.window_height)
            .args(LAUNCH_ARGS);
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {}", e);
                }
            }
        });

        let mut contexts = Vec::with_capacity(options.pool_size);
        for _ in 0..options.pool_size.max(1) {
            let id = browser
                .create_browser_context(CreateBrowserContextParams::default())
                .await?;
            let fingerprint = FingerprintConfig::randomized()
                .with_viewport(options.window_width, options.window_height)
                .with_locale(options.locale.clone())
                .with_timezone(options.timezone.clone());
            contexts.push(PooledContext { id, fingerprint });
        }

        tracing::info!(
            "Initialized browser with {} isolated contexts (headless: {})",
            contexts.len(),
            options.headless
        );

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
            contexts,
            action_timeout: options.action_timeout,
        })
    }

    /// Close the browser and stop its event handler
    pub async fn shutdown(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await?;
        if let Err(e) = browser.wait().await {
            tracing::debug!("browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        Ok(())
    }

    async fn apply_identity(page: &Page, fingerprint: &FingerprintConfig) -> Result<()> {
        page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(
            STEALTH_SCRIPT,
        ))
        .await?;

        let user_agent = SetUserAgentOverrideParams::builder()
            .user_agent(fingerprint.user_agent.clone())
            .accept_language(fingerprint.locale.clone())
            .build()
            .map_err(BrowserError::ChromiumError)?;
        page.execute(user_agent).await?;

        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(fingerprint.viewport_width),
            i64::from(fingerprint.viewport_height),
            1.0,
            false,
        ))
        .await?;

        page.execute(SetTimezoneOverrideParams::new(fingerprint.timezone.clone()))
            .await?;
        page.execute(SetLocaleOverrideParams {
            locale: Some(fingerprint.locale.clone()),
        })
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionSource for BrowserEngine {
    type Page = ChromePage;

    async fn acquire(&self, slot: usize) -> Result<ChromePage> {
        if self.contexts.is_empty() {
            return Err(BrowserError::EmptyPool);
        }
        let context = &self.contexts[slot % self.contexts.len()];

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context.id.clone())
            .build()
            .map_err(BrowserError::ChromiumError)?;

        let page = {
            let browser = self.browser.lock().await;
            browser.new_page(target).await?
        };
        Self::apply_identity(&page, &context.fingerprint).await?;

        tracing::debug!(
            slot,
            user_agent = %context.fingerprint.user_agent,
            "Opened page in pooled context"
        );

        Ok(ChromePage {
            page,
            action_timeout: self.action_timeout,
        })
    }
}

/// A Chromium tab driven through CDP
pub struct ChromePage {
    page: Page,
    action_timeout: Duration,
}

impl ChromePage {
    async fn eval<T: serde::de::DeserializeOwned>(&self, js: String) -> Result<T> {
        self.page
            .evaluate(js)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }

    async fn click_inner(&self, locator: &Locator) -> Result<()> {
        match locator {
            Locator::Css(selector) => {
                let element = self
                    .page
                    .find_element(selector.as_str())
                    .await
                    .map_err(|_| BrowserError::SelectorNotFound(selector.clone()))?;
                element.click().await?;
                Ok(())
            }
            Locator::Text { scope, text } => {
                if self.eval::<bool>(script::click_text(scope, text)).await? {
                    Ok(())
                } else {
                    Err(BrowserError::SelectorNotFound(locator.to_string()))
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl BrowserActions for ChromePage {
    async fn navigate(&self, url: &str) -> Result<()> {
        let domain = extract_domain(url)?;
        tracing::debug!(%domain, "Navigating");
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn exists(&self, locator: &Locator) -> Result<bool> {
        self.eval(script::exists(locator)).await
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        tokio::time::timeout(self.action_timeout, self.click_inner(locator))
            .await
            .map_err(|_| BrowserError::Timeout(format!("clicking {locator}")))?
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        if self.eval::<bool>(script::fill(selector, value)).await? {
            Ok(())
        } else {
            Err(BrowserError::SelectorNotFound(selector.to_string()))
        }
    }

    async fn select_option(&self, selector: &str, option: &SelectBy) -> Result<()> {
        let status: String = self.eval(script::select_option(selector, option)).await?;
        match status.as_str() {
            script::SELECT_OK => Ok(()),
            script::SELECT_NO_OPTION => Err(BrowserError::OptionNotFound {
                selector: selector.to_string(),
                option: option.as_str().to_string(),
            }),
            _ => Err(BrowserError::SelectorNotFound(selector.to_string())),
        }
    }

    async fn option_labels(&self, selector: &str) -> Result<Vec<String>> {
        self.eval(script::option_labels(selector)).await
    }

    async fn scroll_by(&self, dy: i64) -> Result<()> {
        self.page
            .evaluate(script::scroll_by(dy))
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn close(&self) -> Result<()> {
        self.page.clone().close().await?;
        Ok(())
    }
}
