//! Error types for derrick core operations.
//!
//! The load-time variants surface data-integrity defects in the external
//! store's snapshot. Nothing is silently repaired: a malformed edge or an
//! out-of-enum value fails the whole load so the corruption stays visible
//! upstream.

use crate::domain::{IssueId, Relation};
use std::io;
use thiserror::Error;

/// The error type for derrick core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An edge points to an id absent from the snapshot.
    #[error("{relation} edge on issue {id} references nonexistent issue {target}")]
    DanglingReference {
        /// The issue declaring the edge.
        id: IssueId,
        /// Which relation the edge belongs to.
        relation: Relation,
        /// The missing target id.
        target: IssueId,
    },

    /// A relationship chain revisits an issue.
    #[error("{relation} cycle detected involving issue {id}")]
    Cycle {
        /// An issue on the cycle.
        id: IssueId,
        /// Which relation forms the cycle.
        relation: Relation,
    },

    /// A status value outside the four-valued enum.
    #[error("issue {id} has invalid status '{value}' (expected one of: pending, in_progress, done, blocked)")]
    InvalidStatus {
        /// The issue carrying the value.
        id: IssueId,
        /// The rejected value.
        value: String,
    },

    /// A priority value outside the four-valued enum.
    #[error("issue {id} has invalid priority '{value}' (expected one of: critical, high, medium, low)")]
    InvalidPriority {
        /// The issue carrying the value.
        id: IssueId,
        /// The rejected value.
        value: String,
    },

    /// The same id appears twice in one snapshot.
    #[error("duplicate issue id in snapshot: {0}")]
    DuplicateId(IssueId),

    /// Query for an id absent from the current snapshot.
    #[error("issue not found: {0}")]
    NotFound(IssueId),

    /// The external issue store failed to produce a snapshot.
    #[error("store error: {0}")]
    Store(String),

    /// An I/O error occurred talking to the store.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A snapshot could not be parsed as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for derrick operations.
pub type Result<T> = std::result::Result<T, Error>;
