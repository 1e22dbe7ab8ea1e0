//! File sessions and the state-owning reducer that tracks them.
//!
//! Each submitted file gets a [`FileSession`] that starts in `Processing` and
//! moves exactly once to `Completed` or `Error`. Pipelines never touch the
//! collection directly: they produce a [`SessionUpdate`] and the owner of the
//! [`SessionStore`] applies it by identity.
//!
//! Rules enforced by `apply`:
//! - an update for an unknown id (e.g. removed mid-flight) is dropped
//! - an update for a session already in a terminal status is ignored
//! - only the addressed session changes

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Never produced by the tracker; sessions are registered straight into `Processing`.
    Pending,
    Processing,
    Completed,
    Error,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Error)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Processing => "processing",
            Status::Completed => "completed",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One uploaded file plus its processing status and results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSession {
    pub id: SessionId,
    pub name: String,
    pub mime_type: String,
    pub transactions: Vec<Transaction>,
    pub status: Status,
    pub error_message: Option<String>,
    /// Base64 payload sent for extraction, kept once the session completes.
    pub encoded_payload: Option<String>,
}

impl FileSession {
    fn processing(name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(),
            name: name.into(),
            mime_type: mime_type.into(),
            transactions: Vec::new(),
            status: Status::Processing,
            error_message: None,
            encoded_payload: None,
        }
    }
}

/// Terminal result of one file's pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed {
        transactions: Vec<Transaction>,
        encoded_payload: Option<String>,
    },
    Failed {
        message: String,
    },
}

/// Message produced by a pipeline, addressed to exactly one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate {
    pub id: SessionId,
    pub outcome: Outcome,
}

/// What `apply` did with an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated(Status),
    UnknownSession,
    AlreadyTerminal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemoveError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("session {0} is still processing")]
    StillProcessing(SessionId),
}

/// Ordered collection of sessions, mutated only through point updates.
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    sessions: Vec<FileSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session in `Processing` and return its id.
    pub fn register(&mut self, name: impl Into<String>, mime_type: impl Into<String>) -> SessionId {
        let session = FileSession::processing(name, mime_type);
        let id = session.id.clone();
        self.sessions.push(session);
        id
    }

    pub fn apply(&mut self, update: SessionUpdate) -> Applied {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == update.id) else {
            debug!(session = %update.id, "dropping update for unknown session");
            return Applied::UnknownSession;
        };

        if session.status.is_terminal() {
            debug!(session = %update.id, status = %session.status, "ignoring update for settled session");
            return Applied::AlreadyTerminal;
        }

        match update.outcome {
            Outcome::Completed {
                transactions,
                encoded_payload,
            } => {
                session.status = Status::Completed;
                session.transactions = transactions;
                session.encoded_payload = encoded_payload;
            }
            Outcome::Failed { message } => {
                session.status = Status::Error;
                session.error_message = Some(message);
            }
        }

        Applied::Updated(session.status)
    }

    /// Remove a session regardless of status. In-flight work is not cancelled;
    /// its eventual update becomes a no-op.
    pub fn remove(&mut self, id: &SessionId) -> Option<FileSession> {
        let pos = self.sessions.iter().position(|s| &s.id == id)?;
        Some(self.sessions.remove(pos))
    }

    /// Remove a session only once it has settled.
    pub fn remove_settled(&mut self, id: &SessionId) -> Result<FileSession, RemoveError> {
        match self.get(id) {
            None => Err(RemoveError::NotFound(id.clone())),
            Some(s) if s.status == Status::Processing => Err(RemoveError::StillProcessing(id.clone())),
            Some(_) => self.remove(id).ok_or_else(|| RemoveError::NotFound(id.clone())),
        }
    }

    pub fn get(&self, id: &SessionId) -> Option<&FileSession> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileSession> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of sessions still in `Processing`.
    pub fn in_flight(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.status == Status::Processing)
            .count()
    }

    pub fn completed(&self) -> impl Iterator<Item = &FileSession> {
        self.sessions.iter().filter(|s| s.status == Status::Completed)
    }
}
