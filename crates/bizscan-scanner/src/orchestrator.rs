//! Session orchestrator for running one session per business type.
//!
//! Sessions start staggered by a fixed interval, each on its own pool slot,
//! and are polled together until every one of them has finished. A failed
//! session is reported in its summary and never cancels the others.

use crate::session::{SessionController, SessionStats};
use crate::sink::ResultDelivery;
use bizscan_browser::SessionSource;
use bizscan_core::BusinessType;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// Business type the session swept
    pub business_type: BusinessType,
    /// Stats on exhaustion, or the fatal error message
    pub outcome: Result<SessionStats, String>,
}

impl SessionSummary {
    /// Whether the session ran its sweep to completion.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Runs sessions concurrently against a shared sink.
pub struct SessionOrchestrator<S: SessionSource> {
    /// Controller shared by every session
    controller: Arc<SessionController<S>>,
    /// Sink every session delivers into
    sink: Arc<dyn ResultDelivery>,
    /// Delay between consecutive session starts
    start_interval: Duration,
}

impl<S: SessionSource> SessionOrchestrator<S> {
    /// Create a new orchestrator.
    #[must_use]
    pub fn new(
        controller: Arc<SessionController<S>>,
        sink: Arc<dyn ResultDelivery>,
        start_interval: Duration,
    ) -> Self {
        Self {
            controller,
            sink,
            start_interval,
        }
    }

    /// Run one session per business type and wait for all of them.
    ///
    /// Session `i` gets pool slot `i` and starts after `i` intervals.
    /// Summaries are returned in completion order.
    pub async fn run(&self, business_types: &[BusinessType]) -> Vec<SessionSummary> {
        tracing::info!(
            sessions = business_types.len(),
            "Starting sessions {:.1}s apart",
            self.start_interval.as_secs_f64()
        );

        let mut futures = FuturesUnordered::new();

        for (slot, business_type) in business_types.iter().enumerate() {
            let controller = Arc::clone(&self.controller);
            let sink = Arc::clone(&self.sink);
            let start_delay = self
                .start_interval
                .saturating_mul(u32::try_from(slot).unwrap_or(u32::MAX));

            futures.push(async move {
                let outcome = controller
                    .run(slot, business_type, sink.as_ref(), start_delay)
                    .await
                    .map_err(|e| e.to_string());

                SessionSummary {
                    business_type: business_type.clone(),
                    outcome,
                }
            });
        }

        let mut summaries = Vec::with_capacity(business_types.len());
        while let Some(summary) = futures.next().await {
            match &summary.outcome {
                Ok(stats) => tracing::info!(
                    business_type = %summary.business_type,
                    terms = stats.terms_searched,
                    "Session finished"
                ),
                Err(e) => tracing::error!(
                    business_type = %summary.business_type,
                    "Session failed: {}",
                    e
                ),
            }
            summaries.push(summary);
        }

        let completed = summaries.iter().filter(|s| s.completed()).count();
        tracing::info!(
            "All sessions done: {} completed, {} failed",
            completed,
            summaries.len() - completed
        );

        summaries
    }
}
