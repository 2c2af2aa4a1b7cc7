//! Bizscan Scanner - adaptive business registry search sessions.
//!
//! This crate drives the Ontario Business Registry search form. Each session
//! configures the form for one business type and sweeps it with search terms
//! that grow deeper only where a result page is truncated. Captured pages are
//! written to a shared text report with one raw snapshot per page.
//!
//! # Features
//!
//! - Depth-adaptive term enumeration that covers truncated result pages
//! - Staggered concurrent sessions, one per business type
//! - Bot challenge detection with a bounded wait
//! - Per-term retries with explicit failure records
//! - A single report file written one whole record at a time
//!
//! # Example
//!
//! ```rust,ignore
//! use bizscan_scanner::{RegistryForm, ResultSink, SessionController, SessionOrchestrator};
//! use std::sync::Arc;
//!
//! let form = RegistryForm::default();
//! let sink = Arc::new(ResultSink::create(&output_dir, &stamp, form.clone(), true).await?);
//! let controller = Arc::new(SessionController::new(Arc::new(engine), form, config.session.clone())?);
//!
//! let summaries = SessionOrchestrator::new(controller, sink, config.session.start_interval())
//!     .run(&business_types)
//!     .await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod challenge;
pub mod enumerator;
#[allow(missing_docs)]
pub mod error;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod parser;
#[allow(missing_docs)]
pub mod registry;
#[allow(missing_docs)]
pub mod report;
pub mod session;
#[allow(missing_docs)]
pub mod sink;

// Re-export commonly used types
pub use challenge::BotDetector;
pub use enumerator::QueryEnumerator;
pub use error::{Result, ScanError};
pub use orchestrator::{SessionOrchestrator, SessionSummary};
pub use parser::{BusinessListing, ResultPageParser};
pub use registry::{ListingSelectors, RegistryForm};
pub use report::RecordStatus;
pub use session::{SessionController, SessionStats};
pub use sink::{ResultDelivery, ResultSink};
