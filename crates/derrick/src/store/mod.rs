//! Snapshot source abstraction.
//!
//! The issue records are owned by an external tracker; this core only reads
//! a snapshot per request and projects it. The [`IssueStore`] trait is the
//! seam between the two: implementations must be `Send + Sync` so a store
//! can sit behind an `Arc` in an async server.
//!
//! # Test Utilities
//!
//! A [`MockStore`] with canned data is available for testing code that
//! depends on the trait. Downstream crates enable it with the `test-util`
//! feature:
//!
//! ```toml
//! [dev-dependencies]
//! derrick = { version = "...", features = ["test-util"] }
//! ```

use crate::domain::RawIssue;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod cli;

pub use cli::CliStore;

/// Read-only access to an external issue store.
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Retrieve a fresh snapshot of all issue records.
    ///
    /// The records are raw: relationship edges are ids and status/priority
    /// are unvalidated strings. Validation happens in
    /// [`IssueGraph::load`](crate::graph::IssueGraph::load).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`](crate::error::Error::Store), `Io`, or
    /// `Json` when the store cannot produce a parsable snapshot.
    async fn snapshot(&self) -> Result<Vec<RawIssue>>;

    /// Report the store's structural readiness.
    ///
    /// Pass-through data for the health endpoint; nothing is computed from
    /// it. This method is infallible by design: a broken store is a
    /// degraded health report, not an error.
    async fn health(&self) -> StoreHealth;
}

/// Structural readiness of the external issue store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHealth {
    /// Whether the store's database has been initialized
    pub initialized: bool,

    /// The store's reported version, if it could be queried
    pub version: Option<String>,

    /// Error encountered while probing the store, if any
    pub error: Option<String>,
}

/// Mock implementation of [`IssueStore`] for testing.
///
/// Returns a canned snapshot and health report. Construct a failing store
/// with [`MockStore::failing`] to exercise error paths.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone)]
pub struct MockStore {
    records: Vec<RawIssue>,
    health: StoreHealth,
    failure: Option<String>,
}

#[cfg(any(test, feature = "test-util"))]
impl MockStore {
    /// Create a mock store serving the given records.
    pub fn new(records: Vec<RawIssue>) -> Self {
        Self {
            records,
            health: StoreHealth {
                initialized: true,
                version: Some("mock".to_string()),
                error: None,
            },
            failure: None,
        }
    }

    /// Create a mock store whose `snapshot` always fails with a store error.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            records: vec![],
            health: StoreHealth {
                initialized: false,
                version: None,
                error: Some(message.clone()),
            },
            failure: Some(message),
        }
    }

    /// Override the canned health report.
    pub fn with_health(mut self, health: StoreHealth) -> Self {
        self.health = health;
        self
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl IssueStore for MockStore {
    async fn snapshot(&self) -> Result<Vec<RawIssue>> {
        match &self.failure {
            Some(message) => Err(crate::error::Error::Store(message.clone())),
            None => Ok(self.records.clone()),
        }
    }

    async fn health(&self) -> StoreHealth {
        self.health.clone()
    }
}
