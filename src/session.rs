//! Selection handling and batch publication
//!
//! An [`InspectSession`] owns the only state a front end reads: the latest
//! published [`Batch`], behind a `watch` channel. Every selection event takes
//! a fresh token from a monotonic counter; a batch is published only while
//! its token is still the newest, so a slow earlier selection can never
//! overwrite the result of a later one.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error};

use crate::file::{self, SelectedFile};
use crate::pipeline::{Batch, FilePipeline};

pub struct InspectSession {
    pipeline: FilePipeline,
    latest: AtomicU64,
    state: watch::Sender<Arc<Batch>>,
}

impl InspectSession {
    pub fn new(pipeline: FilePipeline) -> Self {
        let (state, _) = watch::channel(Arc::new(Batch::default()));
        Self {
            pipeline,
            latest: AtomicU64::new(0),
            state,
        }
    }

    pub fn pipeline(&self) -> &FilePipeline {
        &self.pipeline
    }

    /// Receive every batch that gets published
    pub fn subscribe(&self) -> watch::Receiver<Arc<Batch>> {
        self.state.subscribe()
    }

    /// The most recently published batch
    pub fn current(&self) -> Arc<Batch> {
        Arc::clone(&self.state.borrow())
    }

    fn next_token(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Handle one selection event.
    ///
    /// Returns the published batch, or `None` if a newer selection started
    /// before this one settled.
    pub async fn select(&self, files: Vec<SelectedFile>) -> Option<Arc<Batch>> {
        let token = self.next_token();
        debug!("Selection {} with {} files", token, files.len());
        let batch = self.pipeline.process_batch(token, files).await;
        self.publish(batch)
    }

    /// Handle a selection given as filesystem paths.
    ///
    /// If the handles themselves can't be built the selection publishes an
    /// empty batch instead of leaving the previous one in place.
    pub async fn select_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Option<Arc<Batch>> {
        let token = self.next_token();
        let batch = match file::select_paths(paths).await {
            Ok(files) => self.pipeline.process_batch(token, files).await,
            Err(e) => {
                error!("Selection {} failed: {}", token, e);
                Batch::empty(token)
            }
        };
        self.publish(batch)
    }

    /// Drop the current batch (teardown). Any selection still running
    /// becomes stale.
    pub fn clear(&self) {
        let token = self.next_token();
        self.publish(Batch::empty(token));
    }

    fn publish(&self, batch: Batch) -> Option<Arc<Batch>> {
        let batch = Arc::new(batch);
        let token = batch.token;

        // Token check happens under the channel's write lock
        let published = self.state.send_if_modified(|current| {
            if token != self.latest.load(Ordering::SeqCst) {
                return false;
            }
            *current = Arc::clone(&batch);
            true
        });

        self.pipeline.metrics().record_batch(published);
        if published {
            Some(batch)
        } else {
            debug!("Discarding stale batch {}", token);
            None
        }
    }
}
