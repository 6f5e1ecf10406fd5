//! HTTP daemon for the derrick status board.
//!
//! This crate wraps the `derrick` core in a small read-only axum API for
//! the display layer to poll:
//!
//! - `GET /api/v1/board` — the status-partitioned board
//! - `GET /api/v1/issues/{id}` — a fully-resolved issue detail
//! - `GET /api/v1/health` — daemon and store readiness
//! - `GET /api/v1/town` — the full observed town structure
//! - `GET /api/v1/town/status` — town health summary
//! - `GET /api/v1/town/rigs`, `/town/rigs/{name}` — rigs and their agents
//! - `GET /api/v1/town/agents` — all agents, grouped by liveness
//! - `GET /api/v1/town/convoys` — convoys in flight
//! - `GET /api/v1/town/mail/{address}` — an agent's inbox
//!
//! Every request fetches a fresh snapshot from the store (or re-observes
//! the town) and builds the response from scratch, so handlers share no
//! mutable state and need no locks.

pub mod context;
pub mod error;
pub mod models;
pub mod server;

pub use context::{AppState, SharedState};
pub use error::ApiError;
pub use server::{router, serve};
