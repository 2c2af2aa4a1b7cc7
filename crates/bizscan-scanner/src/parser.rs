use crate::registry::{ListingSelectors, RegistryForm};
use scraper::{ElementRef, Html, Selector};

/// Fields pulled out of one result block; `None` when the block lacks one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessListing {
    pub name: Option<String>,
    pub business_type: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResultPageParser {
    result_item: String,
    pager_banner: String,
    page_cap: String,
    listing: ListingSelectors,
}

impl ResultPageParser {
    pub fn new(form: &RegistryForm) -> Self {
        Self {
            result_item: form.result_item.clone(),
            pager_banner: form.pager_banner.clone(),
            page_cap: form.page_cap.to_string(),
            listing: form.listing.clone(),
        }
    }

    /// Whether the page shows the maximum row count.
    ///
    /// Returns `None` when the pager banner is missing, i.e. the page holds
    /// no result list to judge.
    pub fn saturation(&self, html: &str) -> Option<bool> {
        let selector = Selector::parse(&self.pager_banner).ok()?;
        let document = Html::parse_document(html);
        let banner = document.select(&selector).next()?;
        let text = banner.text().collect::<String>();

        Some(text.split_whitespace().any(|token| token == self.page_cap))
    }

    /// Every result block on the page.
    pub fn listings(&self, html: &str) -> Result<Vec<BusinessListing>, String> {
        let item_selector = parse_selector(&self.result_item)?;
        let fields = [
            parse_selector(&self.listing.name)?,
            parse_selector(&self.listing.business_type)?,
            parse_selector(&self.listing.date)?,
            parse_selector(&self.listing.location)?,
            parse_selector(&self.listing.status)?,
        ];

        let document = Html::parse_document(html);
        let listings = document
            .select(&item_selector)
            .map(|block| {
                let [name, business_type, date, location, status] =
                    fields.each_ref().map(|selector| extract_text(&block, selector));
                BusinessListing {
                    name,
                    business_type,
                    date,
                    location,
                    status,
                }
            })
            .collect();

        Ok(listings)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, String> {
    Selector::parse(selector).map_err(|e| format!("invalid selector '{selector}': {e}"))
}

fn extract_text(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}
