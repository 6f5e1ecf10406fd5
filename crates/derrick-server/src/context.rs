//! Shared application state.

use derrick::error::Result;
use derrick::graph::IssueGraph;
use derrick::store::IssueStore;
use derrick::town::TownStore;
use std::sync::Arc;

/// State shared by all request handlers.
///
/// Holds only the store handles; graphs are built per request and never
/// shared mutably. If a graph cache is ever added here, refreshing it must
/// swap in a fully built snapshot, never mutate one in place.
pub struct AppState {
    /// The external issue store.
    pub store: Box<dyn IssueStore>,

    /// The town workspace observer.
    pub town: Box<dyn TownStore>,

    /// Daemon version reported by the health endpoint.
    pub version: &'static str,
}

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create the application state around the two stores.
    pub fn new(store: Box<dyn IssueStore>, town: Box<dyn TownStore>) -> Self {
        Self {
            store,
            town,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Fetch a fresh snapshot and build a validated graph from it.
    ///
    /// # Errors
    ///
    /// Propagates store failures and every load-time validation error.
    pub async fn load_graph(&self) -> Result<IssueGraph> {
        let records = self.store.snapshot().await?;
        IssueGraph::load(records)
    }
}
