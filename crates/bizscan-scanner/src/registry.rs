//! The Ontario Business Registry search form, as a fixed selector contract.
//!
//! Controls whose markup varies between deployments are given as ordered
//! [`Locator`] lists; the session controller stops at the first that matches.

use bizscan_browser::Locator;

/// Selectors for the sub-fields of one result block.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub name: String,
    pub business_type: String,
    pub date: String,
    pub location: String,
    pub status: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            name: ".registerItemSearch-results-page-line-ItemBox-resultLeft-viewMenu span:nth-of-type(2)"
                .to_string(),
            business_type: ".appMinimalAttr.EntitySubTypeCode .appMinimalValue".to_string(),
            date: ".appMinimalAttr.RegistrationDate .appMinimalValue".to_string(),
            location: ".addressSearchResultBox .appAttrValue".to_string(),
            status: ".statusSearchResult .appMinimalAttr.Status .appMinimalValue".to_string(),
        }
    }
}

/// Every control and marker the session needs to drive the search form.
#[derive(Debug, Clone)]
pub struct RegistryForm {
    pub entry_url: String,
    pub cookie_accept: Locator,
    pub advanced_toggles: Vec<Locator>,
    pub register_select: String,
    pub register_label: String,
    pub business_type_select: String,
    pub status_select: String,
    pub status_label: String,
    pub query_input: String,
    pub search_buttons: Vec<Locator>,
    /// One block per matching entity
    pub result_item: String,
    pub no_results_markers: Vec<String>,
    pub page_size_select: String,
    /// Option value of the largest page size
    pub page_size_value: String,
    /// Banner carrying the visible row range, e.g. `1 - 200 of 1543`
    pub pager_banner: String,
    /// Rows shown at the largest page size
    pub page_cap: u32,
    /// Fragments that mark a challenge widget wherever they appear
    pub challenge_fragments: Vec<String>,
    /// Whole words whose presence means a bot challenge is showing
    pub bot_markers: Vec<String>,
    pub listing: ListingSelectors,
}

impl Default for RegistryForm {
    fn default() -> Self {
        Self {
            entry_url: "https://www.appmybizaccount.gov.on.ca/onbis/master/entry.pub?applicationCode=onbis-master&businessService=registerItemSearch"
                .to_string(),
            cookie_accept: Locator::text("button", "Accept all"),
            advanced_toggles: vec![
                Locator::css("#expandonodeW297"),
                Locator::any_text("Advanced"),
                Locator::css(".advanced-search-toggle"),
            ],
            register_select: "#SourceAppCode".to_string(),
            register_label: "Corporations".to_string(),
            business_type_select: "#EntitySubTypeCode".to_string(),
            status_select: "#Status".to_string(),
            status_label: "Active".to_string(),
            query_input: "#QueryString".to_string(),
            search_buttons: vec![
                Locator::css("#nodeW303"),
                Locator::text("button", "Search"),
            ],
            result_item: ".appMinimalBox.ItemBox".to_string(),
            no_results_markers: vec![
                "No results found".to_string(),
                "No matches found".to_string(),
            ],
            page_size_select: ".appSearchPageSize select".to_string(),
            page_size_value: "4".to_string(),
            pager_banner: "div.appPagerBanner".to_string(),
            page_cap: 200,
            challenge_fragments: vec!["captcha".to_string()],
            bot_markers: vec!["unblock".to_string(), "bot".to_string()],
            listing: ListingSelectors::default(),
        }
    }
}

impl RegistryForm {
    /// Locators that signal a search has finished rendering.
    pub fn results_ready(&self) -> Vec<Locator> {
        std::iter::once(Locator::css(self.result_item.as_str()))
            .chain(self.no_results_markers.iter().map(Locator::any_text))
            .collect()
    }

    /// Whether raw markup carries an explicit no-results marker.
    pub fn reports_no_results(&self, html: &str) -> bool {
        self.no_results_markers
            .iter()
            .any(|marker| html.contains(marker.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_ready_locators() {
        let form = RegistryForm::default();
        let ready = form.results_ready();
        assert_eq!(ready.len(), 3);
        assert_eq!(ready[0], Locator::css(".appMinimalBox.ItemBox"));
        assert_eq!(ready[1], Locator::any_text("No results found"));
    }

    #[test]
    fn test_reports_no_results() {
        let form = RegistryForm::default();
        assert!(form.reports_no_results("<p>No matches found</p>"));
        assert!(!form.reports_no_results("<div class=\"appMinimalBox ItemBox\"></div>"));
    }
}
