//! Bizscan Core - Foundation crate for the business registry scanner.
//!
//! This crate provides the shared types, error handling and configuration
//! management that the browser and scanner crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes (`SearchTerm`, `BusinessType`) and `SearchResult`
//!
//! # Example
//!
//! ```rust
//! use bizscan_core::{AppConfig, SearchTerm};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//!
//! let term = SearchTerm::new("ab")?;
//! assert_eq!(term.len(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, OutputConfig, SessionConfig};
pub use error::{BizscanError, ConfigError, ConfigResult, Result};
pub use types::{BusinessType, SearchResult, SearchTerm};
