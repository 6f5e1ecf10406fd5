//! Domain types for the derrick status board.
//!
//! This module contains the core domain types shared by the issue graph
//! model and the board aggregator. Raw snapshot records ([`RawIssue`]) come
//! from the external issue store; everything else is derived from them at
//! load time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an issue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueId(pub String);

impl IssueId {
    /// Create a new issue ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IssueId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of an issue.
///
/// The four values double as the board's columns. Anything outside this
/// enum in a snapshot is a data error in the store, not something to coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Issue is waiting to be picked up
    Pending,

    /// Issue is currently being worked on
    InProgress,

    /// Issue has been completed
    Done,

    /// Issue is blocked by other issues
    Blocked,
}

impl Status {
    /// All statuses in canonical board-column order.
    ///
    /// This order is a contract with the display layer: it is fixed, not
    /// alphabetical and not dependent on snapshot order.
    pub const ALL: [Status; 4] = [
        Status::Pending,
        Status::InProgress,
        Status::Done,
        Status::Blocked,
    ];

    /// Parse the exact wire string for a status.
    ///
    /// Only the four snake_case wire values are accepted. Unknown values
    /// return `None` so the caller can fail with the offending issue id.
    pub fn parse(s: &str) -> Option<Status> {
        match s {
            "pending" => Some(Status::Pending),
            "in_progress" => Some(Status::InProgress),
            "done" => Some(Status::Done),
            "blocked" => Some(Status::Blocked),
            _ => None,
        }
    }

    /// The wire string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Done => "done",
            Status::Blocked => "blocked",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Drop everything
    Critical,

    /// Important, schedule soon
    High,

    /// Default priority
    Medium,

    /// Nice to have
    Low,
}

impl Priority {
    /// Parse the exact wire string for a priority.
    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "critical" => Some(Priority::Critical),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    /// The wire string for this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of relationship edge between two issues.
///
/// Internal only: appears as a petgraph edge weight and inside error
/// variants, never on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Tree edge from a child up to its parent
    Parent,

    /// This issue blocks the target issue
    Blocks,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Parent => write!(f, "parent"),
            Relation::Blocks => write!(f, "blocks"),
        }
    }
}

/// Raw issue record as handed over by the external issue store.
///
/// This is the only type deserialized from the store. Status and priority
/// arrive as plain strings and are validated by [`IssueGraph::load`], which
/// can then name the offending issue in its error; relationship edges are
/// ids, never embedded objects.
///
/// [`IssueGraph::load`]: crate::graph::IssueGraph::load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssue {
    /// Unique identifier within one snapshot
    pub id: String,

    /// Issue title
    pub title: String,

    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,

    /// Status string, expected to be one of the [`Status`] wire values
    pub status: String,

    /// Priority string, expected to be one of the [`Priority`] wire values
    pub priority: String,

    /// Ordered completion criteria
    #[serde(default)]
    pub done_when: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Parent issue id, if any (tree edge upward)
    #[serde(default)]
    pub parent: Option<String>,

    /// Ids of issues this one blocks
    #[serde(default)]
    pub blocks: Vec<String>,
}

/// A validated issue.
///
/// Produced from a [`RawIssue`] during graph load; status and priority are
/// typed, and every edge id has been checked against the snapshot index.
/// The edge fields stay ids here — neighbor summaries are joined in exactly
/// one place, [`IssueDetail`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier
    pub id: IssueId,

    /// Issue title
    pub title: String,

    /// Free-text description
    pub description: Option<String>,

    /// Current status
    pub status: Status,

    /// Priority level
    pub priority: Priority,

    /// Ordered completion criteria
    pub done_when: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Parent issue id, if any
    #[serde(skip)]
    pub parent: Option<IssueId>,

    /// Ids of issues this one blocks, in declared order
    #[serde(skip)]
    pub blocks: Vec<IssueId>,
}

/// Minimal projection of an issue.
///
/// Used wherever a full issue would be redundant (column entries, neighbor
/// lists). Always derived from an [`Issue`] at read time; never a second
/// source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    /// Unique identifier
    pub id: IssueId,

    /// Issue title
    pub title: String,

    /// Current status
    pub status: Status,

    /// Priority level
    pub priority: Priority,
}

impl From<&Issue> for IssueSummary {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id.clone(),
            title: issue.title.clone(),
            status: issue.status,
            priority: issue.priority,
        }
    }
}

/// A fully-resolved issue with one-hop neighbor summaries.
///
/// Deep traversal is deliberately excluded: each relation is resolved a
/// single hop in each direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDetail {
    /// The full issue record
    #[serde(flatten)]
    pub issue: Issue,

    /// Summary of the parent issue, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<IssueSummary>,

    /// Summaries of issues whose parent is this issue, in snapshot order
    pub children: Vec<IssueSummary>,

    /// Summaries of issues this one blocks, in declared order
    pub blocks: Vec<IssueSummary>,

    /// Summaries of issues blocking this one, in snapshot order
    pub blocked_by: Vec<IssueSummary>,
}
