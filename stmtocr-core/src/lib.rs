//! stmtocr-core: transaction rows, file sessions and the session reducer

pub mod session;
pub mod summary;
pub mod transaction;

pub use session::{
    Applied, FileSession, Outcome, RemoveError, SessionId, SessionStore, SessionUpdate, Status,
};
pub use summary::StatementSummary;
pub use transaction::{Direction, Transaction};
