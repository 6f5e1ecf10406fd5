//! Derrick - read-only status board core for an agent-town issue tracker.
//!
//! This crate provides the issue graph model and board aggregation logic:
//! raw issue records from an external store are validated into an immutable
//! [`graph::IssueGraph`] snapshot, which is then projected into a
//! status-partitioned [`board::Board`] or a single-issue
//! [`domain::IssueDetail`]. All projections are pure functions over one
//! snapshot; nothing here persists or mutates issues.
//!
//! Alongside the board, [`town`] observes the agent workspace the tracker
//! lives in: rigs, agents, convoys, and mail, read the same way — as a
//! point-in-time projection over externally-owned state.

#![forbid(unsafe_code)]

pub mod board;
pub mod domain;
pub mod error;
pub mod graph;
pub mod store;
pub mod town;
