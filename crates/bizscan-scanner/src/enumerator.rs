//! Depth-adaptive search-term enumeration.
//!
//! The registry truncates every result page at a fixed row count, so a term
//! that fills the page has to be replaced by the whole family of terms one
//! letter longer before the sweep can move on. The enumerator walks letter
//! strings like a base-26 counter whose length grows only where pages
//! saturate:
//!
//! ```text
//! a ──saturated──▶ aa ─▶ ab ─▶ … ─▶ az ─▶ b ─▶ … ─▶ z ─▶ (exhausted)
//! ```

use bizscan_core::SearchTerm;

/// Produces the sequence of search terms for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEnumerator {
    letters: Vec<u8>,
}

impl Default for QueryEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEnumerator {
    /// Start the sweep at `a`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            letters: vec![b'a'],
        }
    }

    /// Restart a sweep at an arbitrary term.
    #[must_use]
    pub fn resume_from(term: &SearchTerm) -> Self {
        Self {
            letters: term.as_str().as_bytes().to_vec(),
        }
    }

    /// The term to search next, or `None` once exhausted.
    #[must_use]
    pub fn current(&self) -> Option<SearchTerm> {
        SearchTerm::from_letters(&self.letters)
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.letters.is_empty()
    }

    /// Move past the current term.
    ///
    /// A saturated term descends one level (`ab` → `aba`); otherwise the
    /// term is incremented with carry (`abz` → `ac`, `zz` → exhausted).
    pub fn advance(&mut self, saturated: bool) -> Option<SearchTerm> {
        if self.letters.is_empty() {
            return None;
        }

        if saturated {
            self.letters.push(b'a');
        } else {
            while self.letters.last() == Some(&b'z') {
                self.letters.pop();
            }
            if let Some(last) = self.letters.last_mut() {
                *last += 1;
            }
        }

        self.current()
    }
}
