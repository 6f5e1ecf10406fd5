//! Integration tests for board aggregation.
//!
//! These tests pin the board contract surfaced to the display layer: four
//! columns in fixed canonical order, stable within-column ordering, and the
//! count/total invariant.

use chrono::{TimeZone, Utc};
use derrick::board::{BoardLabels, build_board, build_board_with_labels};
use derrick::domain::{RawIssue, Status};
use derrick::graph::IssueGraph;

fn record(id: &str, status: &str) -> RawIssue {
    RawIssue {
        id: id.to_string(),
        title: format!("Issue {id}"),
        description: None,
        status: status.to_string(),
        priority: "medium".to_string(),
        done_when: vec![],
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        parent: None,
        blocks: vec![],
    }
}

fn record_with_priority(id: &str, status: &str, priority: &str) -> RawIssue {
    RawIssue {
        priority: priority.to_string(),
        ..record(id, status)
    }
}

#[test]
fn test_empty_board_has_all_four_columns() {
    let graph = IssueGraph::load(vec![]).unwrap();
    let board = build_board(&graph);

    assert_eq!(board.total, 0);
    assert_eq!(board.columns.len(), 4);

    let statuses: Vec<Status> = board.columns.iter().map(|c| c.status).collect();
    assert_eq!(statuses, Status::ALL);

    for column in &board.columns {
        assert_eq!(column.count, 0);
        assert!(column.issues.is_empty());
    }
}

#[test]
fn test_column_order_is_canonical_not_input_order() {
    // Feed statuses in reverse canonical order; columns must not follow.
    let graph = IssueGraph::load(vec![
        record("d-1", "blocked"),
        record("d-2", "done"),
        record("d-3", "in_progress"),
        record("d-4", "pending"),
    ])
    .unwrap();

    let board = build_board(&graph);
    let statuses: Vec<Status> = board.columns.iter().map(|c| c.status).collect();
    assert_eq!(
        statuses,
        [
            Status::Pending,
            Status::InProgress,
            Status::Done,
            Status::Blocked
        ]
    );
}

#[test]
fn test_total_equals_sum_of_column_counts() {
    let graph = IssueGraph::load(vec![
        record("d-1", "pending"),
        record("d-2", "pending"),
        record("d-3", "in_progress"),
        record("d-4", "done"),
        record("d-5", "blocked"),
    ])
    .unwrap();

    let board = build_board(&graph);
    let sum: usize = board.columns.iter().map(|c| c.count).sum();

    assert_eq!(board.total, 5);
    assert_eq!(sum, board.total);
    for column in &board.columns {
        assert_eq!(column.count, column.issues.len());
    }
}

#[test]
fn test_within_column_order_is_snapshot_order() {
    // Three pending issues with priorities that would re-sort them if the
    // aggregator sorted by priority. It must not.
    let graph = IssueGraph::load(vec![
        record_with_priority("d-1", "pending", "low"),
        record_with_priority("d-2", "pending", "critical"),
        record_with_priority("d-3", "pending", "high"),
    ])
    .unwrap();

    let board = build_board(&graph);
    let pending = &board.columns[0];
    let ids: Vec<&str> = pending.issues.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["d-1", "d-2", "d-3"]);
}

#[test]
fn test_default_labels() {
    let graph = IssueGraph::load(vec![]).unwrap();
    let board = build_board(&graph);

    let labels: Vec<&str> = board.columns.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["Pending", "In Progress", "Done", "Blocked"]);
}

#[test]
fn test_custom_labels() {
    let graph = IssueGraph::load(vec![record("d-1", "in_progress")]).unwrap();
    let labels = BoardLabels {
        pending: "Queued".to_string(),
        in_progress: "Cooking".to_string(),
        done: "Shipped".to_string(),
        blocked: "Stuck".to_string(),
    };

    let board = build_board_with_labels(&graph, &labels);
    assert_eq!(board.columns[1].label, "Cooking");
    assert_eq!(board.columns[1].count, 1);
}

#[test]
fn test_board_wire_shape() {
    let graph = IssueGraph::load(vec![record("d-1", "in_progress")]).unwrap();
    let board = build_board(&graph);
    let json = serde_json::to_value(&board).unwrap();

    assert_eq!(json["total"], 1);
    assert_eq!(json["columns"][1]["status"], "in_progress");
    assert_eq!(json["columns"][1]["count"], 1);
    assert_eq!(json["columns"][1]["issues"][0]["id"], "d-1");
}

#[test]
fn test_worked_example() {
    // The three-issue example: a pending root with a done child that blocks
    // a blocked issue.
    let graph = IssueGraph::load(vec![
        record("g-1", "pending"),
        RawIssue {
            parent: Some("g-1".to_string()),
            blocks: vec!["g-3".to_string()],
            ..record("g-2", "done")
        },
        record("g-3", "blocked"),
    ])
    .unwrap();

    let board = build_board(&graph);
    assert_eq!(board.total, 3);

    let by_status = |status: Status| {
        board
            .columns
            .iter()
            .find(|c| c.status == status)
            .expect("column present")
    };
    assert_eq!(by_status(Status::Pending).count, 1);
    assert_eq!(by_status(Status::Pending).issues[0].id.as_str(), "g-1");
    assert_eq!(by_status(Status::Done).issues[0].id.as_str(), "g-2");
    assert_eq!(by_status(Status::Blocked).issues[0].id.as_str(), "g-3");
    assert_eq!(by_status(Status::InProgress).count, 0);

    let root = graph.resolve(&"g-1".into()).unwrap();
    let children: Vec<&str> = root.children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(children, ["g-2"]);

    let blocked = graph.resolve(&"g-3".into()).unwrap();
    let blockers: Vec<&str> = blocked.blocked_by.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(blockers, ["g-2"]);
}
