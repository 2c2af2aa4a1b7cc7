//! JavaScript snippets evaluated in the page by [`ChromePage`](crate::ChromePage).
//!
//! Every dynamic value is embedded as a JSON string literal so selectors
//! and search terms cannot break out of the script.

use crate::locator::{Locator, SelectBy};

/// Result codes returned by [`select_option`].
pub const SELECT_OK: &str = "ok";
pub const SELECT_NO_ELEMENT: &str = "no-element";
pub const SELECT_NO_OPTION: &str = "no-option";

fn literal(value: &str) -> String {
    // Serializing a &str cannot fail
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Expression yielding the innermost elements under `scope` whose text
/// contains `text`, case-insensitively.
fn text_matches(scope: &str, text: &str) -> String {
    format!(
        "(() => {{ \
            const needle = {text}.toLowerCase(); \
            const hits = Array.from(document.querySelectorAll({scope})) \
                .filter(e => (e.textContent || '').toLowerCase().includes(needle)); \
            return hits.filter(e => !hits.some(o => o !== e && e.contains(o))); \
        }})()",
        text = literal(text),
        scope = literal(scope),
    )
}

/// Boolean: does the locator match anything.
pub fn exists(locator: &Locator) -> String {
    match locator {
        Locator::Css(selector) => {
            format!("document.querySelector({}) !== null", literal(selector))
        }
        Locator::Text { scope, text } => format!("{}.length > 0", text_matches(scope, text)),
    }
}

/// Boolean: clicked the first text match.
pub fn click_text(scope: &str, text: &str) -> String {
    format!(
        "(() => {{ const el = {}[0]; if (!el) return false; el.click(); return true; }})()",
        text_matches(scope, text)
    )
}

/// Boolean: set the value of an input and fired `input`/`change`.
pub fn fill(selector: &str, value: &str) -> String {
    format!(
        "(() => {{ \
            const el = document.querySelector({selector}); \
            if (!el) return false; \
            el.focus(); \
            el.value = {value}; \
            el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
            el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
            return true; \
        }})()",
        selector = literal(selector),
        value = literal(value),
    )
}

/// String status code: one of `SELECT_OK`, `SELECT_NO_ELEMENT`, `SELECT_NO_OPTION`.
pub fn select_option(selector: &str, option: &SelectBy) -> String {
    let predicate = match option {
        SelectBy::Label(label) => format!("o => o.text.trim() === {}", literal(label)),
        SelectBy::Value(value) => format!("o => o.value === {}", literal(value)),
    };

    format!(
        "(() => {{ \
            const el = document.querySelector({selector}); \
            if (!el) return {no_element}; \
            const opt = Array.from(el.options).find({predicate}); \
            if (!opt) return {no_option}; \
            el.value = opt.value; \
            el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
            el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
            return {ok}; \
        }})()",
        selector = literal(selector),
        no_element = literal(SELECT_NO_ELEMENT),
        no_option = literal(SELECT_NO_OPTION),
        ok = literal(SELECT_OK),
    )
}

/// Array of strings: option texts of a `<select>`, empty when absent.
pub fn option_labels(selector: &str) -> String {
    format!(
        "(() => {{ \
            const el = document.querySelector({}); \
            return el ? Array.from(el.options).map(o => o.text) : []; \
        }})()",
        literal(selector)
    )
}

pub fn scroll_by(dy: i64) -> String {
    format!("window.scrollBy(0, {dy})")
}
