//! In-memory registry site used by the session and orchestrator tests.
//!
//! Pages hold real markup and answer `exists` by running the selector through
//! `scraper`, so the controller sees the same structure it would in Chrome.

#![allow(dead_code)]

use async_trait::async_trait;
use bizscan_browser::{BrowserActions, BrowserError, Locator, Result, SelectBy, SessionSource};
use bizscan_core::SearchResult;
use bizscan_scanner::{RecordStatus, RegistryForm, ResultDelivery, ScanError};
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Behaviour of the fake registry.
#[derive(Debug, Clone)]
pub struct SiteSpec {
    pub has_register: bool,
    pub has_status: bool,
    pub business_types: Vec<String>,
    /// `option_labels` calls answered with an empty list before the real options
    pub options_delay: usize,
    /// Terms whose page shows the row cap
    pub saturated: HashSet<String>,
    /// Terms with no matches
    pub empty: HashSet<String>,
    /// Terms whose query input fails this many times
    pub failing: HashMap<String, u32>,
    /// Failed `exists` probes a challenge lasts, shown before the first search
    pub challenge_probes: Option<u32>,
    /// Slots whose page cannot be opened
    pub broken_slots: HashSet<usize>,
}

impl Default for SiteSpec {
    fn default() -> Self {
        Self {
            has_register: true,
            has_status: true,
            business_types: vec![
                "Not-for-Profit Corporation".to_string(),
                "Co-operative Non-Share".to_string(),
                "Co-operative with Share".to_string(),
            ],
            options_delay: 0,
            saturated: HashSet::new(),
            empty: HashSet::new(),
            failing: HashMap::new(),
            challenge_probes: None,
            broken_slots: HashSet::new(),
        }
    }
}

/// What the site observed.
#[derive(Debug, Default)]
pub struct SiteLog {
    pub acquired: Vec<(usize, Instant)>,
    pub searches: Vec<(usize, String)>,
    pub page_size_raised: usize,
    pub challenges_shown: usize,
}

pub struct MockSite {
    spec: SiteSpec,
    failures: Mutex<HashMap<String, u32>>,
    option_calls: AtomicUsize,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub log: Mutex<SiteLog>,
}

impl MockSite {
    pub fn new(spec: SiteSpec) -> Arc<Self> {
        Arc::new(Self {
            failures: Mutex::new(spec.failing.clone()),
            spec,
            option_calls: AtomicUsize::new(0),
            opened: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
            log: Mutex::new(SiteLog::default()),
        })
    }

    pub fn searches(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .searches
            .iter()
            .map(|(_, term)| term.clone())
            .collect()
    }

    pub fn searches_for(&self, slot: usize) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .searches
            .iter()
            .filter(|(s, _)| *s == slot)
            .map(|(_, term)| term.clone())
            .collect()
    }

    fn form_html(&self, results: &str) -> String {
        let options: String = self
            .spec
            .business_types
            .iter()
            .map(|t| format!("<option>{t}</option>"))
            .collect();
        let register = if self.spec.has_register {
            r#"<select id="SourceAppCode"><option>Business Names</option><option>Corporations</option></select>"#
        } else {
            ""
        };
        let status = if self.spec.has_status {
            r#"<select id="Status"><option>Any</option><option>Active</option></select>"#
        } else {
            ""
        };

        format!(
            r#"<html><body>
<a id="expandonodeW297">Advanced</a>
{register}
<select id="EntitySubTypeCode">{options}</select>
{status}
<input id="QueryString">
<button id="nodeW303">Search</button>
<div id="results">{results}</div>
</body></html>"#
        )
    }

    fn results_html(&self, term: &str) -> String {
        if self.spec.empty.contains(term) {
            return "<p>No results found</p>".to_string();
        }

        let shown = if self.spec.saturated.contains(term) { "200 of 4512" } else { "2 of 2" };
        let name = term.to_uppercase();
        format!(
            r#"<div class="appPagerBanner">Displaying 1 - {shown}</div>
<div class="appSearchPageSize"><select><option value="1">25</option><option value="4">200</option></select></div>
<div class="appMinimalBox ItemBox">
  <div class="registerItemSearch-results-page-line-ItemBox-resultLeft-viewMenu"><span>1.</span><span>{name} ASSOCIATION</span></div>
  <div class="addressSearchResultBox"><span class="appAttrValue">Toronto, Ontario</span></div>
</div>"#
        )
    }
}

const CHALLENGE_HTML: &str =
    "<html><body><h1>Security check</h1><p>Please solve the captcha to continue.</p></body></html>";

struct PageState {
    html: String,
    query: String,
    challenge_armed: bool,
    challenge_left: u32,
}

pub struct MockPage {
    slot: usize,
    site: Arc<MockSite>,
    state: Mutex<PageState>,
}

impl MockPage {
    fn current_html(&self) -> String {
        let state = self.state.lock().unwrap();
        if state.challenge_left > 0 {
            CHALLENGE_HTML.to_string()
        } else {
            state.html.clone()
        }
    }

    fn matches(html: &str, locator: &Locator) -> bool {
        let document = Html::parse_document(html);
        match locator {
            Locator::Css(selector) => Selector::parse(selector)
                .map(|s| document.select(&s).next().is_some())
                .unwrap_or(false),
            Locator::Text { scope, text } => {
                let Ok(selector) = Selector::parse(scope) else {
                    return false;
                };
                let wanted = text.to_lowercase();
                document
                    .select(&selector)
                    .any(|el| el.text().collect::<String>().to_lowercase().contains(&wanted))
            }
        }
    }

    fn is_search_button(locator: &Locator) -> bool {
        match locator {
            Locator::Css(selector) => selector == "#nodeW303",
            Locator::Text { scope, text } => scope == "button" && text == "Search",
        }
    }
}

#[async_trait]
impl BrowserActions for MockPage {
    async fn navigate(&self, _url: &str) -> Result<()> {
        let html = self.site.form_html("");
        self.state.lock().unwrap().html = html;
        Ok(())
    }

    async fn exists(&self, locator: &Locator) -> Result<bool> {
        let found = Self::matches(&self.current_html(), locator);
        let mut state = self.state.lock().unwrap();
        state.challenge_left = state.challenge_left.saturating_sub(1);
        Ok(found)
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        if !Self::matches(&self.current_html(), locator) {
            return Err(BrowserError::SelectorNotFound(locator.to_string()));
        }
        if Self::is_search_button(locator) {
            let term = self.state.lock().unwrap().query.clone();
            let html = self.site.form_html(&self.site.results_html(&term));
            self.state.lock().unwrap().html = html;
            self.site.log.lock().unwrap().searches.push((self.slot, term));
        }
        Ok(())
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        if let Some(left) = self.site.failures.lock().unwrap().get_mut(value) {
            if *left > 0 {
                *left -= 1;
                return Err(BrowserError::Timeout(format!("filling {selector}")));
            }
        }
        self.state.lock().unwrap().query = value.to_string();
        Ok(())
    }

    async fn select_option(&self, selector: &str, option: &SelectBy) -> Result<()> {
        let html = self.current_html();
        if !Self::matches(&html, &Locator::css(selector)) {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        }
        if selector == RegistryForm::default().page_size_select {
            self.site.log.lock().unwrap().page_size_raised += 1;
        }
        if let SelectBy::Label(label) = option {
            let labels = self.option_labels(selector).await?;
            if !labels.iter().any(|l| l == label) {
                return Err(BrowserError::OptionNotFound {
                    selector: selector.to_string(),
                    option: label.clone(),
                });
            }
        }
        Ok(())
    }

    async fn option_labels(&self, selector: &str) -> Result<Vec<String>> {
        if selector == "#EntitySubTypeCode"
            && self.site.option_calls.fetch_add(1, Ordering::SeqCst) < self.site.spec.options_delay
        {
            return Ok(vec![]);
        }

        let document = Html::parse_document(&self.current_html());
        let Ok(options) = Selector::parse(&format!("{selector} option")) else {
            return Err(BrowserError::SelectorNotFound(selector.to_string()));
        };
        Ok(document
            .select(&options)
            .map(|o| o.text().collect::<String>())
            .collect())
    }

    async fn scroll_by(&self, _dy: i64) -> Result<()> {
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        {
            let mut state = self.state.lock().unwrap();
            if state.challenge_armed {
                state.challenge_armed = false;
                state.challenge_left = self.site.spec.challenge_probes.unwrap_or(0);
                self.site.log.lock().unwrap().challenges_shown += 1;
            }
        }
        Ok(self.current_html())
    }

    async fn close(&self) -> Result<()> {
        self.site.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockSource {
    pub site: Arc<MockSite>,
}

impl MockSource {
    pub fn new(spec: SiteSpec) -> Arc<Self> {
        Arc::new(Self {
            site: MockSite::new(spec),
        })
    }
}

#[async_trait]
impl SessionSource for MockSource {
    type Page = MockPage;

    async fn acquire(&self, slot: usize) -> Result<MockPage> {
        self.site.log.lock().unwrap().acquired.push((slot, Instant::now()));
        if self.site.spec.broken_slots.contains(&slot) {
            return Err(BrowserError::ChromiumError(format!("context {slot} crashed")));
        }
        self.site.opened.fetch_add(1, Ordering::SeqCst);

        Ok(MockPage {
            slot,
            site: Arc::clone(&self.site),
            state: Mutex::new(PageState {
                html: String::new(),
                query: String::new(),
                challenge_armed: self.site.spec.challenge_probes.is_some(),
                challenge_left: 0,
            }),
        })
    }
}

/// Sink that keeps every delivered result in memory.
#[derive(Default)]
pub struct MemorySink {
    pub results: Mutex<Vec<SearchResult>>,
    pub reject: bool,
}

impl MemorySink {
    pub fn terms(&self) -> Vec<String> {
        self.results
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.query_term().to_string())
            .collect()
    }
}

#[async_trait]
impl ResultDelivery for MemorySink {
    async fn deliver(&self, result: SearchResult) -> bizscan_scanner::Result<RecordStatus> {
        if self.reject {
            return Err(ScanError::Io(std::io::Error::other("disk full")));
        }
        let status = RecordStatus::classify(&result, &RegistryForm::default());
        self.results.lock().unwrap().push(result);
        Ok(status)
    }
}

/// All single letters in order.
pub fn alphabet() -> Vec<String> {
    (b'a'..=b'z').map(|c| char::from(c).to_string()).collect()
}
