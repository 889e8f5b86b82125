//! Worker tracking for both roles
//!
//! Every session runs in its own task. The dispatch loop owns the
//! [`WorkerSet`]; nothing else holds worker handles.

use crate::error::{ErrorKind, Result, TransferError};
use std::future::Future;
use tokio::task::{JoinError, JoinHandle};

/// Outcome counts for a role's workers
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    pub succeeded: u64,
    pub failed: u64,
    pub bytes: u64,
}

impl TransferSummary {
    pub fn add_success(&mut self, bytes: u64) {
        self.succeeded += 1;
        self.bytes += bytes;
    }

    pub fn add_failure(&mut self) {
        self.failed += 1;
    }
}

#[derive(Default)]
pub struct WorkerSet {
    handles: Vec<(String, JoinHandle<Result<u64>>)>,
    summary: TransferSummary,
}

impl WorkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `job` as an independent worker labelled `label`.
    pub fn spawn<F>(&mut self, label: impl Into<String>, job: F)
    where
        F: Future<Output = Result<u64>> + Send + 'static,
    {
        self.handles.push((label.into(), tokio::spawn(job)));
    }

    /// Record a failure that happened before a worker could be started.
    pub fn record_failure(&mut self, label: &str, err: &TransferError) {
        log_failure(label, err);
        self.summary.add_failure();
    }

    /// Number of workers not yet joined
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Collect outcomes of workers that already finished, without waiting.
    pub async fn reap(&mut self) {
        let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.handles)
            .into_iter()
            .partition(|(_, h)| h.is_finished());
        self.handles = running;
        for (label, handle) in done {
            let outcome = handle.await;
            self.record(&label, outcome);
        }
    }

    /// Wait for every remaining worker and return the totals.
    pub async fn join_all(mut self) -> TransferSummary {
        if !self.is_empty() {
            tracing::debug!("Waiting for {} worker(s)", self.handles.len());
        }
        for (label, handle) in std::mem::take(&mut self.handles) {
            let outcome = handle.await;
            self.record(&label, outcome);
        }
        self.summary
    }

    fn record(&mut self, label: &str, outcome: std::result::Result<Result<u64>, JoinError>) {
        match outcome {
            Ok(Ok(bytes)) => {
                tracing::debug!("{}: worker finished ({} bytes)", label, bytes);
                self.summary.add_success(bytes);
            }
            Ok(Err(e)) => self.record_failure(label, &e),
            Err(join_err) => {
                let err = TransferError::Unclassified(join_error_message(join_err));
                self.record_failure(label, &err);
            }
        }
    }
}

fn join_error_message(err: JoinError) -> String {
    if err.is_cancelled() {
        return "worker cancelled".to_string();
    }
    match err.try_into_panic() {
        Ok(payload) => {
            if let Some(s) = payload.downcast_ref::<&str>() {
                format!("worker panicked: {}", s)
            } else if let Some(s) = payload.downcast_ref::<String>() {
                format!("worker panicked: {}", s)
            } else {
                "worker panicked".to_string()
            }
        }
        Err(e) => format!("worker failed: {}", e),
    }
}

/// Render an error with its whole source chain.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(src) = cur {
        out.push_str(": ");
        out.push_str(&src.to_string());
        cur = src.source();
    }
    out
}

fn log_failure(label: &str, err: &TransferError) {
    let detail = error_chain(err);
    let kind = err.kind();
    match kind {
        ErrorKind::Path => {
            tracing::error!(kind = %kind, "{}: file or path not found: {}", label, detail)
        }
        ErrorKind::Io => tracing::error!(kind = %kind, "{}: OS error: {}", label, detail),
        ErrorKind::Protocol | ErrorKind::Transport => {
            tracing::error!(kind = %kind, "{}: {}", label, detail)
        }
        ErrorKind::Unclassified => {
            tracing::error!(
                kind = %kind,
                error = ?err,
                "{}: unexpected error: {}",
                label,
                detail
            )
        }
    }
}
