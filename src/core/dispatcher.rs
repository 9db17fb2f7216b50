use crate::domain::model::PrinterCommandStream;
use crate::domain::ports::PrintSink;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Printed,
    DryRun,
    DeviceFailed,
    StagingFailed,
}

/// What happened to one dispatched ticket. Nobody waits for it in production;
/// it is there for whoever keeps the join handle.
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub staged: PathBuf,
    /// Size of the staged file as read back from disk, before cleanup.
    pub staged_bytes: u64,
    pub outcome: DeliveryOutcome,
}

/// Fire-and-forget delivery of rendered tickets.
///
/// Each dispatch stages the bytes under a unique file name, hands the file to
/// the sink (skipped in dry-run mode) and removes it whatever the outcome.
/// Failures are logged and never reach the caller. There is no retry, queue
/// or concurrency bound: a burst of claims spawns an equal burst of tasks.
/// A bounded worker pool would slot in here if that ever becomes a problem.
pub struct PrintDispatcher {
    sink: Arc<dyn PrintSink>,
    staging_dir: PathBuf,
    dry_run: bool,
    sequence: AtomicU64,
}

impl PrintDispatcher {
    pub fn new(sink: Arc<dyn PrintSink>, staging_dir: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            sink,
            staging_dir: staging_dir.into(),
            dry_run,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn sink_description(&self) -> String {
        self.sink.describe()
    }

    /// Spawns the delivery and returns at once. The handle may be dropped.
    pub fn dispatch(&self, stream: PrinterCommandStream) -> JoinHandle<DeliveryReport> {
        let staged = self.staging_dir.join(self.next_staging_name());
        let sink = Arc::clone(&self.sink);

        tokio::spawn(deliver(sink, staged, stream, self.dry_run))
    }

    fn next_staging_name(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "ticket-{}-{}-{}.bin",
            std::process::id(),
            chrono::Utc::now().format("%Y%m%d%H%M%S%3f"),
            seq
        )
    }
}

async fn deliver(
    sink: Arc<dyn PrintSink>,
    staged: PathBuf,
    stream: PrinterCommandStream,
    dry_run: bool,
) -> DeliveryReport {
    let mut report = DeliveryReport {
        staged,
        staged_bytes: 0,
        outcome: DeliveryOutcome::StagingFailed,
    };
    let staged = report.staged.as_path();

    if let Some(parent) = staged.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            tracing::error!("❌ Cannot create staging directory {}: {}", parent.display(), e);
            return report;
        }
    }

    if let Err(e) = tokio::fs::write(staged, stream.as_bytes()).await {
        tracing::error!("❌ Cannot stage ticket at {}: {}", staged.display(), e);
        // 寫入失敗時可能留下部分檔案
        cleanup(staged).await;
        return report;
    }

    match tokio::fs::metadata(staged).await {
        Ok(metadata) => report.staged_bytes = metadata.len(),
        Err(e) => {
            tracing::error!("❌ Staged ticket vanished at {}: {}", staged.display(), e);
            return report;
        }
    }
    tracing::debug!("Staged {} bytes at {}", report.staged_bytes, staged.display());

    report.outcome = if dry_run {
        tracing::info!(
            "🧪 DRY RUN - ticket staged ({} bytes), device {} not invoked",
            report.staged_bytes,
            sink.describe()
        );
        DeliveryOutcome::DryRun
    } else {
        match sink.deliver(staged).await {
            Ok(()) => {
                tracing::info!("✅ Ticket sent to {}", sink.describe());
                DeliveryOutcome::Printed
            }
            Err(e) => {
                tracing::error!("❌ Printer error on {}: {}", sink.describe(), e);
                DeliveryOutcome::DeviceFailed
            }
        }
    };

    cleanup(staged).await;
    report
}

async fn cleanup(staged: &Path) {
    match tokio::fs::remove_file(staged).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("⚠️ Could not remove staged ticket {}: {}", staged.display(), e),
    }
}
