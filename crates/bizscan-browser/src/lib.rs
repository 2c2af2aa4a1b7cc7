//! Browser automation for the registry search form.
//!
//! Provides the capability interface sessions drive ([`BrowserActions`],
//! [`SessionSource`]) and a Chromium implementation with per-context
//! identity and automation masking.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod lease;
pub mod locator;
pub mod script;

pub use actions::{BrowserActions, SessionSource};
pub use engine::{BrowserEngine, ChromePage, EngineOptions};
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
pub use lease::PageLease;
pub use locator::{Locator, SelectBy};
