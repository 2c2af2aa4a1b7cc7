//! Shared types used across the scanner.
//!
//! Newtypes for the values that flow between sessions and the report, so a
//! business type can never be passed where a search term is expected.

use crate::error::BizscanError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// A literal string submitted to the registry's name-search field.
///
/// Always non-empty and made of lowercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Create a new `SearchTerm` from a string.
    ///
    /// # Errors
    /// Returns error if the term is empty or contains anything but `a`-`z`.
    pub fn new(term: impl Into<String>) -> Result<Self, BizscanError> {
        let term = term.into();
        Self::validate(&term)?;
        Ok(Self(term))
    }

    /// Build a term from enumerator letters.
    ///
    /// Returns `None` for an empty sequence or a byte outside `a..=z`.
    #[must_use]
    pub fn from_letters(letters: &[u8]) -> Option<Self> {
        if letters.is_empty() || !letters.iter().all(u8::is_ascii_lowercase) {
            return None;
        }
        // Lowercase ASCII is valid UTF-8
        String::from_utf8(letters.to_vec()).ok().map(Self)
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of letters in the term.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed term.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(term: &str) -> Result<(), BizscanError> {
        static TERM_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = TERM_REGEX.get_or_init(|| Regex::new(r"^[a-z]+$").expect("valid regex"));

        if regex.is_match(term) {
            Ok(())
        } else {
            Err(BizscanError::Validation(format!(
                "invalid search term: must be one or more lowercase letters, got '{term}'"
            )))
        }
    }
}

impl TryFrom<String> for SearchTerm {
    type Error = BizscanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SearchTerm> for String {
    fn from(term: SearchTerm) -> Self {
        term.0
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The registry's entity-subtype filter value scoped to one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BusinessType(String);

impl BusinessType {
    /// Create a new `BusinessType`, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns error if the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, BizscanError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BizscanError::Validation(
                "invalid business type: must not be blank".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BusinessType {
    type Error = BizscanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BusinessType> for String {
    fn from(business_type: BusinessType) -> Self {
        business_type.0
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one search attempt, handed to the result sink.
///
/// Immutable once built: fields are only reachable through accessors.
#[derive(Debug, Clone)]
pub struct SearchResult {
    business_type: BusinessType,
    query_term: SearchTerm,
    raw_content: String,
    success: bool,
    error_message: Option<String>,
    elapsed: Duration,
}

impl SearchResult {
    /// A page captured after a search.
    #[must_use]
    pub fn captured(
        business_type: BusinessType,
        query_term: SearchTerm,
        raw_content: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            business_type,
            query_term,
            raw_content,
            success: true,
            error_message: None,
            elapsed,
        }
    }

    /// A search attempt that failed before a page could be captured.
    #[must_use]
    pub fn failed(
        business_type: BusinessType,
        query_term: SearchTerm,
        error_message: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            business_type,
            query_term,
            raw_content: String::new(),
            success: false,
            error_message: Some(error_message.into()),
            elapsed,
        }
    }

    /// Business type of the session that produced this result.
    #[must_use]
    pub fn business_type(&self) -> &BusinessType {
        &self.business_type
    }

    /// The term that was searched.
    #[must_use]
    pub fn query_term(&self) -> &SearchTerm {
        &self.query_term
    }

    /// Full page markup at capture time (empty for failed attempts).
    #[must_use]
    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    /// Whether the page was captured.
    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Failure reason, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Wall time spent on the attempt.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Record title, e.g. `ab (Not-for-Profit Corporation)`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.query_term, self.business_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_valid() {
        let term = SearchTerm::new("abz").expect("valid term");
        assert_eq!(term.as_str(), "abz");
        assert_eq!(term.len(), 3);
        assert_eq!(term.to_string(), "abz");
    }

    #[test]
    fn test_search_term_invalid() {
        assert!(SearchTerm::new("").is_err());
        assert!(SearchTerm::new("Ab").is_err());
        assert!(SearchTerm::new("a b").is_err());
        assert!(SearchTerm::new("a1").is_err());
    }

    #[test]
    fn test_search_term_from_letters() {
        assert_eq!(
            SearchTerm::from_letters(b"az").map(String::from),
            Some("az".to_string())
        );
        assert!(SearchTerm::from_letters(b"").is_none());
        assert!(SearchTerm::from_letters(b"a{").is_none());
    }

    #[derive(Debug, Deserialize)]
    struct TermHolder {
        term: SearchTerm,
    }

    #[test]
    fn test_search_term_deserialize() {
        let holder: TermHolder = toml::from_str("term = \"ba\"").expect("parse term");
        assert_eq!(holder.term.as_str(), "ba");

        assert!(toml::from_str::<TermHolder>("term = \"A\"").is_err());
    }

    #[test]
    fn test_business_type() {
        let bt = BusinessType::new("  Co-operative Non-Share ").expect("valid type");
        assert_eq!(bt.as_str(), "Co-operative Non-Share");
        assert!(BusinessType::new("   ").is_err());
    }

    #[derive(Debug, Deserialize)]
    struct TypeHolder {
        business_type: BusinessType,
    }

    #[test]
    fn test_business_type_deserialize() {
        let holder: TypeHolder =
            toml::from_str("business_type = \" Co-operative with Share \"").expect("parse type");
        assert_eq!(holder.business_type.as_str(), "Co-operative with Share");

        assert!(toml::from_str::<TypeHolder>("business_type = \"\"").is_err());
        assert!(toml::from_str::<TypeHolder>("business_type = \"   \"").is_err());
    }

    #[test]
    fn test_search_result_captured() {
        let result = SearchResult::captured(
            BusinessType::new("Not-for-Profit Corporation").unwrap(),
            SearchTerm::new("ab").unwrap(),
            "<html></html>".to_string(),
            Duration::from_millis(1500),
        );
        assert!(result.success());
        assert!(result.error_message().is_none());
        assert_eq!(result.label(), "ab (Not-for-Profit Corporation)");
        assert_eq!(result.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn test_search_result_failed() {
        let result = SearchResult::failed(
            BusinessType::new("Co-operative with Share").unwrap(),
            SearchTerm::new("q").unwrap(),
            "selector not found: #QueryString",
            Duration::from_secs(2),
        );
        assert!(!result.success());
        assert!(result.raw_content().is_empty());
        assert_eq!(
            result.error_message(),
            Some("selector not found: #QueryString")
        );
    }
}
