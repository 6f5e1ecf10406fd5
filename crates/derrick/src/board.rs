//! Board aggregation.
//!
//! Projects a loaded [`IssueGraph`] into a status-partitioned board. Columns
//! are materialized fresh on every call; nothing here holds state between
//! reads.

use crate::domain::{IssueSummary, Status};
use crate::graph::IssueGraph;
use serde::{Deserialize, Serialize};

/// One status column of the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// The status this column represents
    pub status: Status,

    /// Human-readable column label
    pub label: String,

    /// Number of issues in this column
    pub count: usize,

    /// Issue summaries, in snapshot order
    pub issues: Vec<IssueSummary>,
}

/// The status board: four columns in canonical order plus the total count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// Columns in canonical order: pending, in_progress, done, blocked
    pub columns: Vec<Column>,

    /// Total issue count across all columns
    pub total: usize,
}

/// Column label table.
///
/// Labels are supplied as configuration rather than inferred from the enum,
/// so a deployment can relabel columns without touching the status wire
/// values.
#[derive(Debug, Clone)]
pub struct BoardLabels {
    /// Label for the pending column
    pub pending: String,

    /// Label for the in-progress column
    pub in_progress: String,

    /// Label for the done column
    pub done: String,

    /// Label for the blocked column
    pub blocked: String,
}

impl Default for BoardLabels {
    fn default() -> Self {
        Self {
            pending: "Pending".to_string(),
            in_progress: "In Progress".to_string(),
            done: "Done".to_string(),
            blocked: "Blocked".to_string(),
        }
    }
}

impl BoardLabels {
    /// The label for a status column.
    pub fn label(&self, status: Status) -> &str {
        match status {
            Status::Pending => &self.pending,
            Status::InProgress => &self.in_progress,
            Status::Done => &self.done,
            Status::Blocked => &self.blocked,
        }
    }
}

/// Build the board with the default column labels.
pub fn build_board(graph: &IssueGraph) -> Board {
    build_board_with_labels(graph, &BoardLabels::default())
}

/// Build the board, partitioning all issues by status.
///
/// Always emits exactly four columns in the canonical [`Status::ALL`] order,
/// including empty ones. Within a column, issues keep their snapshot order;
/// no re-sorting by priority or title. `total` equals the sum of the column
/// counts, which equals the snapshot's issue count.
pub fn build_board_with_labels(graph: &IssueGraph, labels: &BoardLabels) -> Board {
    let mut columns: Vec<Column> = Status::ALL
        .iter()
        .map(|&status| Column {
            status,
            label: labels.label(status).to_string(),
            count: 0,
            issues: Vec::new(),
        })
        .collect();

    for issue in graph.iter() {
        if let Some(column) = columns.iter_mut().find(|c| c.status == issue.status) {
            column.issues.push(IssueSummary::from(issue));
        }
    }

    for column in &mut columns {
        column.count = column.issues.len();
    }

    Board {
        columns,
        total: graph.len(),
    }
}
