//! Error kinds returned by the roster, inventory and assignment operations.
//! Every variant is recoverable: the caller can fix its input and retry.

use thiserror::Error;

use crate::models::ResourceKind;

/// Result alias used by every persistence operation in [`crate::db`].
pub type Result<T> = std::result::Result<T, BandError>;

#[derive(Error, Debug)]
pub enum BandError {
    #[error("{what} {id} does not exist")]
    NotFound { what: &'static str, id: i64 },

    #[error("student ID {0} already exists")]
    DuplicateKey(i64),

    #[error("invalid section '{0}' (expected WOODWIND, BRASS, PERCUSSION, AUXILIARY or DM)")]
    InvalidSection(String),

    #[error("{kind} {item_id} is already checked out")]
    ItemUnavailable { kind: ResourceKind, item_id: i64 },

    #[error("student {student_id} already holds {kind} {item_id}")]
    AlreadyHolding {
        kind: ResourceKind,
        student_id: i64,
        item_id: i64,
    },

    #[error("{kind} {item_id} is not checked out")]
    NotCheckedOut { kind: ResourceKind, item_id: i64 },

    #[error("storage failure: {0}")]
    StorageFailure(#[from] rusqlite::Error),
}

impl BandError {
    pub(crate) fn student_not_found(id: i64) -> Self {
        BandError::NotFound {
            what: "student",
            id,
        }
    }

    pub(crate) fn item_not_found(kind: ResourceKind, id: i64) -> Self {
        BandError::NotFound {
            what: kind.label(),
            id,
        }
    }
}
