//! Background index rebuilds and diffs
//!
//! Both workers run their computation on tokio's blocking pool and use a
//! [`Generation`] counter for latest-wins semantics: issuing new work makes
//! every older [`Ticket`] stale, stale computations stop at their next check
//! point and their results are dropped.

use crate::index::SyncIndex;
use crate::reconciler::Reconciler;
use crate::{Error, Result};
use blocksync_diff::{DiffLimits, DiffLine, diff_text_with};
use blocksync_fs::NormalizedPath;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Shared request counter.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, making every earlier ticket stale.
    pub fn next(&self) -> Ticket {
        let value = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            counter: Arc::clone(&self.0),
            value,
        }
    }

    /// Make every outstanding ticket stale without starting new work.
    pub fn cancel(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle held by one computation.
#[derive(Debug, Clone)]
pub struct Ticket {
    counter: Arc<AtomicU64>,
    value: u64,
}

impl Ticket {
    /// False once a newer request was started or the generation cancelled.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.value
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

/// Rebuilds the sync index off the calling task.
#[derive(Debug, Clone, Default)]
pub struct IndexWorker {
    generation: Generation,
}

impl IndexWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a rebuild of `paths` and supersede any rebuild still running.
    ///
    /// The scan starts immediately; the returned future resolves to `None`
    /// if a newer rebuild was started before this one finished.
    ///
    /// Must be called from within a tokio runtime.
    pub fn rebuild(&self, paths: Vec<NormalizedPath>) -> impl Future<Output = Result<Option<SyncIndex>>> + use<> {
        let ticket = self.generation.next();
        let scan_ticket = ticket.clone();
        let handle = tokio::task::spawn_blocking(move || {
            SyncIndex::scan(&paths, || !scan_ticket.is_current())
        });

        async move {
            let index = handle.await.map_err(|e| Error::Worker(e.to_string()))?;
            if !ticket.is_current() {
                tracing::debug!(generation = ticket.value(), "Discarding superseded index rebuild");
                return Ok(None);
            }
            Ok(index)
        }
    }

    /// Rebuild and install the result into `reconciler` if still current.
    ///
    /// Returns whether the index was applied.
    pub async fn rebuild_into(&self, reconciler: &mut Reconciler, paths: Vec<NormalizedPath>) -> Result<bool> {
        let Some(index) = self.rebuild(paths.clone()).await? else {
            return Ok(false);
        };
        reconciler.apply_index(paths, index);
        Ok(true)
    }

    /// Abandon any rebuild in flight.
    pub fn cancel(&self) {
        self.generation.cancel();
    }
}

/// One diff job.
#[derive(Debug, Clone)]
pub struct DiffRequest {
    /// Echoed back in the response
    pub request_id: u64,
    pub old: String,
    pub new: String,
    pub limits: DiffLimits,
}

/// Result of a diff job that was not superseded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResponse {
    pub request_id: u64,
    pub result: blocksync_diff::Result<Vec<DiffLine>>,
}

/// Latest-wins asynchronous diff service.
#[derive(Debug)]
pub struct DiffWorker {
    generation: Generation,
    responses: mpsc::UnboundedSender<DiffResponse>,
}

impl DiffWorker {
    /// Create a worker and the receiver its responses are delivered on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DiffResponse>) {
        let (responses, receiver) = mpsc::unbounded_channel();
        let worker = Self {
            generation: Generation::new(),
            responses,
        };
        (worker, receiver)
    }

    /// Queue a diff, superseding every earlier request.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: DiffRequest) {
        let ticket = self.generation.next();
        let responses = self.responses.clone();

        tokio::task::spawn_blocking(move || {
            let DiffRequest {
                request_id,
                old,
                new,
                limits,
            } = request;
            let result = diff_text_with(&old, &new, limits, || !ticket.is_current());
            if !ticket.is_current() {
                tracing::trace!(request_id, "Dropping superseded diff");
                return;
            }
            if responses.send(DiffResponse { request_id, result }).is_err() {
                tracing::trace!(request_id, "Diff receiver closed");
            }
        });
    }

    /// Abandon any diff in flight.
    pub fn cancel(&self) {
        self.generation.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_makes_older_stale() {
        let generation = Generation::new();
        let first = generation.next();
        assert!(first.is_current());

        let second = generation.next();
        assert!(!first.is_current());
        assert!(second.is_current());

        generation.cancel();
        assert!(!second.is_current());
        assert_eq!(generation.current(), 3);
    }

    #[test]
    fn clones_share_the_counter() {
        let generation = Generation::new();
        let ticket = generation.next();
        generation.clone().next();
        assert!(!ticket.is_current());
    }
}
