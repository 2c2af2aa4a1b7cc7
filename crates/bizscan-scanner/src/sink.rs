//! Serialized report output shared by every session.
//!
//! One [`ResultSink`] is built per run and handed to all sessions. It owns the
//! report file handle behind an async mutex; each [`deliver`](ResultDelivery::deliver)
//! holds the lock for exactly one record's writes, so concurrent sessions never
//! interleave inside a record.

use crate::error::Result;
use crate::parser::ResultPageParser;
use crate::registry::RegistryForm;
use crate::report::{self, RecordStatus};
use async_trait::async_trait;
use bizscan_core::SearchResult;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Where sessions hand their results.
#[async_trait]
pub trait ResultDelivery: Send + Sync {
    /// Persist one result, returning how it was classified.
    async fn deliver(&self, result: SearchResult) -> Result<RecordStatus>;
}

/// Append-only text report plus one raw snapshot per captured page.
pub struct ResultSink {
    output_dir: PathBuf,
    report_path: PathBuf,
    run_stamp: String,
    save_snapshots: bool,
    form: RegistryForm,
    parser: ResultPageParser,
    report: Mutex<File>,
}

impl ResultSink {
    /// Create the output directory and a fresh report named after `run_stamp`.
    pub async fn create(
        output_dir: &Path,
        run_stamp: &str,
        form: RegistryForm,
        save_snapshots: bool,
    ) -> Result<Self> {
        fs::create_dir_all(output_dir).await?;

        let report_path = output_dir.join(format!("search_report_{run_stamp}.txt"));
        fs::write(&report_path, report::header()).await?;
        let report = OpenOptions::new().append(true).open(&report_path).await?;

        tracing::info!("Writing report to {}", report_path.display());

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            report_path,
            run_stamp: run_stamp.to_string(),
            save_snapshots,
            parser: ResultPageParser::new(&form),
            form,
            report: Mutex::new(report),
        })
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// File name of the raw snapshot for a result.
    pub fn snapshot_name(&self, result: &SearchResult) -> String {
        let safe: String = result
            .label()
            .chars()
            .filter(|c| !matches!(c, '(' | ')'))
            .map(|c| match c {
                ' ' => '_',
                '/' | '\\' | ':' => '-',
                other => other,
            })
            .collect();
        format!("result_{safe}_{}.html", self.run_stamp)
    }

    /// Snapshot names are unique per result, so no lock is needed.
    /// Returns the name only when the file was written.
    async fn write_snapshot(&self, name: String, result: &SearchResult) -> Option<String> {
        match fs::write(self.output_dir.join(&name), result.raw_content()).await {
            Ok(()) => Some(name),
            Err(e) => {
                tracing::warn!(
                    term = %result.query_term(),
                    "Failed to save snapshot {}: {}",
                    name,
                    e
                );
                None
            }
        }
    }
}

#[async_trait]
impl ResultDelivery for ResultSink {
    async fn deliver(&self, result: SearchResult) -> Result<RecordStatus> {
        let status = RecordStatus::classify(&result, &self.form);
        let snapshot = if result.success() && self.save_snapshots {
            self.write_snapshot(self.snapshot_name(&result), &result).await
        } else {
            None
        };
        let record = report::render_record(&result, status, snapshot.as_deref(), &self.parser);

        let mut report = self.report.lock().await;
        report.write_all(record.as_bytes()).await?;
        report.flush().await?;
        drop(report);

        tracing::info!(
            business_type = %result.business_type(),
            term = %result.query_term(),
            "[Saved] {}: {}",
            status,
            result.label()
        );

        Ok(status)
    }
}
