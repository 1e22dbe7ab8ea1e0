//! Per-file encode -> extract pipelines and the tracker that owns their sessions.
//!
//! Every submitted file runs in its own tokio task. A task never touches the
//! session collection: it sends one [`SessionUpdate`] over a channel and the
//! [`Tracker`] applies it through the [`SessionStore`] reducer. Work is not
//! cancelled on removal; the late update is simply dropped.

use std::sync::Arc;

use stmtocr_core::{Applied, FileSession, Outcome, RemoveError, SessionId, SessionStore, SessionUpdate, Transaction};
use stmtocr_ingest::{RawFile, encode};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::gemini::Extractor;

/// Encode one file and extract its transactions. Returns the rows and the payload sent.
pub async fn process_file(
    file: &RawFile,
    extractor: &dyn Extractor,
) -> Result<(Vec<Transaction>, String), PipelineError> {
    let payload = encode(file).await?;
    let transactions = extractor.extract(&payload, &file.mime_type).await?;
    Ok((transactions, payload))
}

async fn run_pipeline(id: SessionId, file: RawFile, extractor: Arc<dyn Extractor>) -> SessionUpdate {
    let outcome = match process_file(&file, extractor.as_ref()).await {
        Ok((transactions, payload)) => {
            info!(session = %id, file = %file.name, rows = transactions.len(), "extraction completed");
            Outcome::Completed {
                transactions,
                encoded_payload: Some(payload),
            }
        }
        Err(e) => {
            warn!(session = %id, file = %file.name, error = %e, "extraction failed");
            Outcome::Failed { message: e.to_string() }
        }
    };
    SessionUpdate { id, outcome }
}

pub struct Tracker {
    store: SessionStore,
    extractor: Arc<dyn Extractor>,
    tx: mpsc::UnboundedSender<SessionUpdate>,
    rx: mpsc::UnboundedReceiver<SessionUpdate>,
}

impl Tracker {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store: SessionStore::new(),
            extractor,
            tx,
            rx,
        }
    }

    /// Register one session per file and start its pipeline. Does not wait.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, files: Vec<RawFile>) -> Vec<SessionId> {
        let mut ids = Vec::with_capacity(files.len());

        for file in files {
            let id = self.store.register(file.name.clone(), file.mime_type.clone());
            debug!(session = %id, file = %file.name, "submitted");

            let tx = self.tx.clone();
            let extractor = Arc::clone(&self.extractor);
            let task_id = id.clone();
            tokio::spawn(async move {
                // A panicking pipeline still has to settle its session.
                let handle = tokio::spawn(run_pipeline(task_id.clone(), file, extractor));
                let update = match handle.await {
                    Ok(update) => update,
                    Err(e) => SessionUpdate {
                        id: task_id,
                        outcome: Outcome::Failed {
                            message: format!("pipeline aborted: {e}"),
                        },
                    },
                };
                let _ = tx.send(update);
            });

            ids.push(id);
        }

        ids
    }

    /// Wait for the next pipeline to finish and apply its result.
    pub async fn next_update(&mut self) -> Option<(SessionId, Applied)> {
        let update = self.rx.recv().await?;
        let id = update.id.clone();
        let applied = self.store.apply(update);
        Some((id, applied))
    }

    /// Apply updates until no session is left in `processing`.
    pub async fn settle(&mut self) {
        while self.store.in_flight() > 0 {
            if self.next_update().await.is_none() {
                break;
            }
        }
    }

    pub fn remove(&mut self, id: &SessionId) -> Option<FileSession> {
        self.store.remove(id)
    }

    pub fn remove_settled(&mut self, id: &SessionId) -> Result<FileSession, RemoveError> {
        self.store.remove_settled(id)
    }

    pub fn get(&self, id: &SessionId) -> Option<&FileSession> {
        self.store.get(id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &FileSession> {
        self.store.iter()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}
