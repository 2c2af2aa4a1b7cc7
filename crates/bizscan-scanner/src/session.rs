//! One search session: a single business type swept end to end on one page.

use crate::challenge::BotDetector;
use crate::enumerator::QueryEnumerator;
use crate::error::{Result, ScanError};
use crate::parser::ResultPageParser;
use crate::registry::RegistryForm;
use crate::sink::ResultDelivery;
use bizscan_browser::{BrowserActions, BrowserError, Locator, PageLease, SelectBy, SessionSource};
use bizscan_core::{BizscanError, BusinessType, SearchResult, SearchTerm, SessionConfig};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::Instrument;

/// Counters reported when a session runs its enumerator to exhaustion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Terms whose result page was captured
    pub terms_searched: u32,
    /// Captured terms that filled a whole page
    pub saturated_terms: u32,
    /// Search attempts that failed
    pub failed_attempts: u32,
    /// Terms given up on after exhausting their retries
    pub skipped_terms: u32,
    /// Results the sink refused
    pub delivery_failures: u32,
}

/// Drives the search form for one business type at a time.
pub struct SessionController<S: SessionSource> {
    source: Arc<S>,
    form: RegistryForm,
    config: SessionConfig,
    detector: BotDetector,
    parser: ResultPageParser,
    resume_from: Option<SearchTerm>,
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

impl<S: SessionSource> SessionController<S> {
    /// Build a controller; fails only when `resume_from` is not a valid term.
    pub fn new(source: Arc<S>, form: RegistryForm, config: SessionConfig) -> Result<Self> {
        let resume_from = config.resume_term().map_err(BizscanError::from)?;

        Ok(Self {
            detector: BotDetector::new(&form.challenge_fragments, &form.bot_markers),
            parser: ResultPageParser::new(&form),
            source,
            form,
            config,
            resume_from,
        })
    }

    /// Run a full session on pool slot `slot` after waiting `start_delay`.
    ///
    /// Returns an error only for the fatal setup failures; per-term failures
    /// are delivered as failed results and counted in the stats.
    pub async fn run(
        &self,
        slot: usize,
        business_type: &BusinessType,
        sink: &dyn ResultDelivery,
        start_delay: Duration,
    ) -> Result<SessionStats> {
        let span = tracing::info_span!("session", slot, business_type = %business_type);

        async move {
            if !start_delay.is_zero() {
                tracing::info!("Starting in {:.1}s", start_delay.as_secs_f64());
                sleep(start_delay).await;
            }

            let page = PageLease::new(self.source.acquire(slot).await?);
            let outcome = self.drive(&page, business_type, sink).await;

            if let Err(e) = page.release().await {
                tracing::warn!("Failed to close page: {}", e);
            }

            match &outcome {
                Ok(stats) => tracing::info!(
                    terms = stats.terms_searched,
                    saturated = stats.saturated_terms,
                    skipped = stats.skipped_terms,
                    "Session complete"
                ),
                Err(e) => tracing::error!("Session aborted: {}", e),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        page: &S::Page,
        business_type: &BusinessType,
        sink: &dyn ResultDelivery,
    ) -> Result<SessionStats> {
        self.open_form(page).await?;
        self.configure_filters(page, business_type).await?;
        Ok(self.search_loop(page, business_type, sink).await)
    }

    async fn open_form(&self, page: &S::Page) -> Result<()> {
        tracing::info!("Navigating to {}", self.form.entry_url);
        page.navigate(&self.form.entry_url)
            .await
            .map_err(|e| ScanError::FormUnavailable(e.to_string()))?;
        sleep(millis(self.config.navigation_settle_ms)).await;

        if page.exists(&self.form.cookie_accept).await.unwrap_or(false) {
            match page.click(&self.form.cookie_accept).await {
                Ok(()) => tracing::debug!("Accepted cookies"),
                Err(e) => tracing::debug!("Cookie banner click failed: {}", e),
            }
        }
        Ok(())
    }

    async fn configure_filters(&self, page: &S::Page, business_type: &BusinessType) -> Result<()> {
        self.expand_advanced(page).await;
        self.select_register(page, business_type).await?;
        self.select_business_type(page, business_type).await?;
        self.select_status(page).await;
        Ok(())
    }

    async fn expand_advanced(&self, page: &S::Page) {
        for toggle in &self.form.advanced_toggles {
            if !page.exists(toggle).await.unwrap_or(false) {
                continue;
            }
            match page.click(toggle).await {
                Ok(()) => {
                    tracing::info!("Expanded advanced search via {}", toggle);
                    sleep(millis(self.config.toggle_settle_ms)).await;
                }
                Err(e) => tracing::warn!("Advanced search toggle {} failed: {}", toggle, e),
            }
            return;
        }
        tracing::warn!("Advanced search toggle not found; continuing");
    }

    async fn select_register(&self, page: &S::Page, business_type: &BusinessType) -> Result<()> {
        let selector = self.form.register_select.as_str();
        let unavailable = |e: BrowserError| ScanError::RegisterUnavailable {
            business_type: business_type.clone(),
            selector: selector.to_string(),
            reason: e.to_string(),
        };

        page.wait_for_any(
            &[Locator::css(selector)],
            millis(self.config.register_wait_ms),
        )
        .await
        .map_err(unavailable)?;
        page.select_option(selector, &SelectBy::label(self.form.register_label.as_str()))
            .await
            .map_err(unavailable)?;

        tracing::info!("Selected register '{}'", self.form.register_label);
        sleep(millis(self.config.register_settle_ms)).await;
        Ok(())
    }

    async fn select_business_type(
        &self,
        page: &S::Page,
        business_type: &BusinessType,
    ) -> Result<()> {
        let selector = self.form.business_type_select.as_str();
        let attempts = self.config.business_type_attempts.max(1);

        for attempt in 1..=attempts {
            match page.option_labels(selector).await {
                Ok(labels) => match labels.iter().find(|l| l.contains(business_type.as_str())) {
                    Some(label) => {
                        let by_label = SelectBy::label(label.as_str());
                        match page.select_option(selector, &by_label).await {
                            Ok(()) => {
                                tracing::info!("Selected business type '{}'", label);
                                return Ok(());
                            }
                            Err(e) => {
                                tracing::warn!(attempt, "Selecting '{}' failed: {}", label, e)
                            }
                        }
                    }
                    None => tracing::debug!(
                        attempt,
                        options = labels.len(),
                        "Business type not offered yet"
                    ),
                },
                Err(e) => tracing::warn!(attempt, "Reading {} options failed: {}", selector, e),
            }

            if attempt < attempts {
                sleep(millis(self.config.business_type_retry_ms)).await;
            }
        }

        Err(ScanError::BusinessTypeUnavailable {
            business_type: business_type.clone(),
            attempts,
        })
    }

    async fn select_status(&self, page: &S::Page) {
        if let Err(e) = page.scroll_by(self.config.status_scroll_px).await {
            tracing::debug!("Scroll before status filter failed: {}", e);
        }
        sleep(millis(self.config.status_settle_ms)).await;

        let status = Locator::css(self.form.status_select.as_str());
        if !page.exists(&status).await.unwrap_or(false) {
            tracing::warn!("Status filter {} not found; searching all statuses", status);
            return;
        }

        let by_label = SelectBy::label(self.form.status_label.as_str());
        match page.select_option(&self.form.status_select, &by_label).await {
            Ok(()) => tracing::info!("Selected status '{}'", self.form.status_label),
            Err(e) => tracing::warn!("Status filter failed: {}", e),
        }
    }

    async fn search_loop(
        &self,
        page: &S::Page,
        business_type: &BusinessType,
        sink: &dyn ResultDelivery,
    ) -> SessionStats {
        let mut enumerator = match &self.resume_from {
            Some(term) => QueryEnumerator::resume_from(term),
            None => QueryEnumerator::new(),
        };
        let mut stats = SessionStats::default();
        let mut first_search = true;
        let mut failures = 0;

        while let Some(term) = enumerator.current() {
            let started = Instant::now();

            match self.search_term(page, &term, &mut first_search).await {
                Ok(content) => {
                    failures = 0;
                    let saturated = self.is_saturated(&content, &term);
                    stats.terms_searched += 1;
                    if saturated {
                        stats.saturated_terms += 1;
                        tracing::info!(term = %term, "Page saturated; descending");
                    }
                    enumerator.advance(saturated);

                    let result = SearchResult::captured(
                        business_type.clone(),
                        term,
                        content,
                        started.elapsed(),
                    );
                    Self::deliver(sink, result, &mut stats).await;
                    sleep(self.search_delay()).await;
                }
                Err(e) => {
                    failures += 1;
                    stats.failed_attempts += 1;
                    tracing::warn!(term = %term, attempt = failures, "Search failed: {}", e);

                    let result = SearchResult::failed(
                        business_type.clone(),
                        term.clone(),
                        e.to_string(),
                        started.elapsed(),
                    );
                    Self::deliver(sink, result, &mut stats).await;
                    sleep(millis(self.config.error_backoff_ms)).await;

                    if failures > self.config.term_retries {
                        tracing::warn!(
                            term = %term,
                            "Giving up on term after {} attempts",
                            failures
                        );
                        stats.skipped_terms += 1;
                        failures = 0;
                        enumerator.advance(false);
                    }
                }
            }
        }

        stats
    }

    /// Search one term and return the captured page markup.
    async fn search_term(
        &self,
        page: &S::Page,
        term: &SearchTerm,
        first_search: &mut bool,
    ) -> Result<String> {
        tracing::debug!(term = %term, "Searching");

        let before = page.content().await?;
        if self.detector.detect(&before) {
            self.await_challenge(page).await;
        }

        page.fill_field(&self.form.query_input, term.as_str()).await?;
        self.click_search(page).await?;
        sleep(millis(self.config.search_settle_ms)).await;
        self.await_results(page, term).await;

        if std::mem::take(first_search) {
            self.raise_page_size(page, term).await;
        }

        Ok(page.content().await?)
    }

    async fn click_search(&self, page: &S::Page) -> Result<()> {
        for button in &self.form.search_buttons {
            if page.exists(button).await? {
                page.click(button).await?;
                return Ok(());
            }
        }

        let tried: Vec<String> = self.form.search_buttons.iter().map(ToString::to_string).collect();
        Err(BrowserError::SelectorNotFound(tried.join(", ")).into())
    }

    async fn await_results(&self, page: &S::Page, term: &SearchTerm) {
        let timeout = millis(self.config.results_timeout_ms);
        if let Err(e) = page.wait_for_any(&self.form.results_ready(), timeout).await {
            tracing::warn!(term = %term, "Results did not settle: {}; capturing anyway", e);
        }
    }

    async fn raise_page_size(&self, page: &S::Page, term: &SearchTerm) {
        let items = Locator::css(self.form.result_item.as_str());
        if !page.exists(&items).await.unwrap_or(false) {
            tracing::debug!(
                term = %term,
                "First search returned nothing; keeping default page size"
            );
            return;
        }

        match page
            .select_option(
                &self.form.page_size_select,
                &SelectBy::value(self.form.page_size_value.as_str()),
            )
            .await
        {
            Ok(()) => {
                tracing::info!("Raised page size to {} rows", self.form.page_cap);
                sleep(millis(self.config.page_size_settle_ms)).await;
                self.await_results(page, term).await;
            }
            Err(e) => tracing::warn!("Could not raise page size: {}", e),
        }
    }

    async fn await_challenge(&self, page: &S::Page) {
        tracing::warn!("Bot challenge detected; waiting for it to clear");
        let input = Locator::css(self.form.query_input.as_str());

        for _ in 0..self.config.challenge_poll_attempts {
            sleep(millis(self.config.challenge_poll_ms)).await;
            if page.exists(&input).await.unwrap_or(false) {
                tracing::info!("Challenge cleared");
                return;
            }
        }
        tracing::warn!("Challenge still showing; continuing");
    }

    fn is_saturated(&self, content: &str, term: &SearchTerm) -> bool {
        if let Some(saturated) = self.parser.saturation(content) {
            saturated
        } else {
            tracing::debug!(term = %term, "No pager banner; treating as unsaturated");
            false
        }
    }

    fn search_delay(&self) -> Duration {
        let min = self.config.min_search_delay_ms;
        let max = self.config.max_search_delay_ms.max(min);
        millis(rand::thread_rng().gen_range(min..=max))
    }

    async fn deliver(sink: &dyn ResultDelivery, result: SearchResult, stats: &mut SessionStats) {
        let label = result.label();
        if let Err(e) = sink.deliver(result).await {
            stats.delivery_failures += 1;
            tracing::error!("Failed to record {}: {}", label, e);
        }
    }
}
