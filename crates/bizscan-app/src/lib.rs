//! Bizscan application shell
//!
//! Wires configuration, the browser engine, the report sink and the session
//! orchestrator together. Search behaviour lives in the other crates.

use anyhow::Context;
use bizscan_browser::{BrowserEngine, EngineOptions};
use bizscan_core::AppConfig;
use bizscan_scanner::{
    RegistryForm, ResultSink, SessionController, SessionOrchestrator, SessionSummary,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,bizscan=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Engine options derived from the `[browser]` section.
#[must_use]
pub fn engine_options(config: &AppConfig) -> EngineOptions {
    let browser = &config.browser;
    EngineOptions {
        headless: browser.headless,
        // One isolated context per concurrent session
        pool_size: browser.pool_size.max(config.session.business_types.len()),
        window_width: browser.window_width,
        window_height: browser.window_height,
        locale: browser.locale.clone(),
        timezone: browser.timezone.clone(),
        action_timeout: Duration::from_millis(browser.action_timeout_ms),
    }
}

/// Timestamp naming every file of one run.
#[must_use]
pub fn run_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Run every configured session to completion or until Ctrl-C.
///
/// Returns `None` when the run was interrupted.
pub async fn run(config: AppConfig) -> anyhow::Result<Option<Vec<SessionSummary>>> {
    config.validate().context("invalid configuration")?;
    let business_types = config.session.business_types()?;
    let form = RegistryForm::default();
    let stamp = run_stamp();

    let sink = ResultSink::create(
        &config.output.dir,
        &stamp,
        form.clone(),
        config.output.save_snapshots,
    )
    .await
    .context("failed to create report")?;
    let report_path = sink.report_path().to_path_buf();

    let engine = Arc::new(
        BrowserEngine::launch(engine_options(&config))
            .await
            .context("failed to launch browser")?,
    );

    let controller = SessionController::new(Arc::clone(&engine), form, config.session.clone())?;
    let orchestrator = SessionOrchestrator::new(
        Arc::new(controller),
        Arc::new(sink),
        config.session.start_interval(),
    );

    info!(
        "Starting {} concurrent sessions: {}",
        business_types.len(),
        business_types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let outcome = tokio::select! {
        summaries = orchestrator.run(&business_types) => Some(summaries),
        _ = tokio::signal::ctrl_c() => {
            info!("Stopped by user");
            None
        }
    };

    // Sessions are dropped by now; their pages close through the lease
    drop(orchestrator);
    tokio::task::yield_now().await;
    if let Err(e) = engine.shutdown().await {
        tracing::warn!("Browser shutdown failed: {}", e);
    }

    if let Some(summaries) = &outcome {
        for summary in summaries {
            match &summary.outcome {
                Ok(stats) => info!(
                    "{}: {} terms, {} saturated, {} failed attempts, {} skipped",
                    summary.business_type,
                    stats.terms_searched,
                    stats.saturated_terms,
                    stats.failed_attempts,
                    stats.skipped_terms
                ),
                Err(e) => tracing::error!("{}: {}", summary.business_type, e),
            }
        }
        info!("Completed. Report saved to {}", report_path.display());
    }

    Ok(outcome)
}
