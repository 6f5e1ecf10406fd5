//! Issue graph model.
//!
//! This module holds one immutable snapshot of issues and answers structural
//! queries over it with validated, consistent relationship data.
//!
//! # Architecture
//!
//! The implementation uses:
//! - `HashMap<IssueId, Issue>` for O(1) issue lookups
//! - `Vec<IssueId>` to remember snapshot order (board ordering contract)
//! - `petgraph::DiGraph` for relationship edges and cycle detection
//! - `HashMap<IssueId, NodeIndex>` for mapping issues to graph nodes
//!
//! ## Edge Direction Convention
//!
//! - **Parent**: child -> parent. Children of an issue are found via
//!   incoming `Parent` edges.
//! - **Blocks**: blocker -> blocked. Issues blocking an issue are found via
//!   incoming `Blocks` edges.
//!
//! All edges are validated exactly once, at [`IssueGraph::load`]. Embedded
//! denormalized data is never trusted as a second source of truth: the
//! inverse relations (`children`, `blocked_by`) are always derived from the
//! declared edges.
//!
//! # Thread Safety
//!
//! A loaded graph is never mutated, so it can be shared freely across
//! concurrent readers (e.g. behind an `Arc`) with no locking. Refreshing
//! means building a whole new graph and swapping it in.

mod cycles;

use crate::domain::{
    Issue, IssueDetail, IssueId, IssueSummary, Priority, RawIssue, Relation, Status,
};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// An immutable, validated snapshot of issues and their relationships.
#[derive(Debug)]
pub struct IssueGraph {
    /// Issues indexed by ID for O(1) lookups
    issues: HashMap<IssueId, Issue>,

    /// Issue ids in snapshot order
    order: Vec<IssueId>,

    /// Snapshot position per id, for re-sorting derived neighbor lists
    position: HashMap<IssueId, usize>,

    /// Relationship graph. Nodes contain `IssueId` values, edges contain
    /// the [`Relation`] kind. See the module docs for edge directions.
    graph: DiGraph<IssueId, Relation>,

    /// Mapping from IssueId to graph NodeIndex
    node_map: HashMap<IssueId, NodeIndex>,
}

impl IssueGraph {
    /// Build a validated graph from raw snapshot records.
    ///
    /// Validation order: per-record field parsing (status, priority),
    /// duplicate id detection, edge target existence, then cycle checks on
    /// the parent chains and the blocks subgraph.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStatus`] / [`Error::InvalidPriority`] naming the
    ///   offending issue and value
    /// - [`Error::DuplicateId`] if an id appears twice
    /// - [`Error::DanglingReference`] if an edge targets a missing id
    /// - [`Error::Cycle`] if a parent chain revisits an ancestor or the
    ///   blocks relation is cyclic (including self-blocks)
    pub fn load(records: Vec<RawIssue>) -> Result<IssueGraph> {
        let mut issues = HashMap::with_capacity(records.len());
        let mut order = Vec::with_capacity(records.len());
        let mut position = HashMap::with_capacity(records.len());

        for record in records {
            let issue = parse_record(record)?;
            let id = issue.id.clone();
            if issues.insert(id.clone(), issue).is_some() {
                return Err(Error::DuplicateId(id));
            }
            position.insert(id.clone(), order.len());
            order.push(id);
        }

        let mut graph = DiGraph::with_capacity(order.len(), order.len());
        let mut node_map = HashMap::with_capacity(order.len());
        for id in &order {
            node_map.insert(id.clone(), graph.add_node(id.clone()));
        }

        for id in &order {
            let Some(issue) = issues.get(id) else {
                continue;
            };
            let Some(&source) = node_map.get(id) else {
                continue;
            };

            if let Some(parent_id) = &issue.parent {
                let &target = node_map.get(parent_id).ok_or_else(|| {
                    Error::DanglingReference {
                        id: id.clone(),
                        relation: Relation::Parent,
                        target: parent_id.clone(),
                    }
                })?;
                graph.add_edge(source, target, Relation::Parent);
            }

            for blocked_id in &issue.blocks {
                let &target = node_map.get(blocked_id).ok_or_else(|| {
                    Error::DanglingReference {
                        id: id.clone(),
                        relation: Relation::Blocks,
                        target: blocked_id.clone(),
                    }
                })?;
                graph.add_edge(source, target, Relation::Blocks);
            }
        }

        cycles::check_parent_chains(&issues, &order)?;
        cycles::check_blocks_relation(&issues, &order)?;

        tracing::debug!(
            issues = order.len(),
            edges = graph.edge_count(),
            "loaded issue graph"
        );

        Ok(IssueGraph {
            issues,
            order,
            position,
            graph,
            node_map,
        })
    }

    /// Get an issue by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is absent from the snapshot.
    pub fn get(&self, id: &IssueId) -> Result<&Issue> {
        self.issues
            .get(id)
            .ok_or_else(|| Error::NotFound(id.clone()))
    }

    /// Project an issue into its minimal summary form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is absent from the snapshot.
    pub fn summarize(&self, id: &IssueId) -> Result<IssueSummary> {
        self.get(id).map(IssueSummary::from)
    }

    /// Resolve an issue into its detail view with one-hop neighbor
    /// summaries.
    ///
    /// This is the one place summaries and the full record are joined:
    /// parent (if any), children in snapshot order, blocks in declared
    /// order, blocked_by in snapshot order. No transitive traversal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is absent from the snapshot;
    /// a partially-built detail is never returned.
    pub fn resolve(&self, id: &IssueId) -> Result<IssueDetail> {
        let issue = self.get(id)?;
        let &node = self
            .node_map
            .get(id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;

        // Parent and blocks targets were validated at load, so the lookups
        // cannot miss; filter_map keeps the read path panic-free anyway.
        let parent = issue
            .parent
            .as_ref()
            .and_then(|pid| self.issues.get(pid))
            .map(IssueSummary::from);

        let blocks = issue
            .blocks
            .iter()
            .filter_map(|bid| self.issues.get(bid))
            .map(IssueSummary::from)
            .collect();

        let children = self.incoming_summaries(node, Relation::Parent);
        let blocked_by = self.incoming_summaries(node, Relation::Blocks);

        Ok(IssueDetail {
            issue: issue.clone(),
            parent,
            children,
            blocks,
            blocked_by,
        })
    }

    /// Iterate all issues in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.order.iter().filter_map(|id| self.issues.get(id))
    }

    /// Number of issues in the snapshot.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Summaries of issues with an edge of `relation` pointing at `node`,
    /// re-sorted into snapshot order.
    ///
    /// petgraph iterates incoming edges in reverse insertion order, so the
    /// snapshot-order contract requires the explicit sort.
    fn incoming_summaries(&self, node: NodeIndex, relation: Relation) -> Vec<IssueSummary> {
        let mut ids: Vec<&IssueId> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .filter(|edge| *edge.weight() == relation)
            .map(|edge| &self.graph[edge.source()])
            .collect();

        ids.sort_by_key(|id| self.position.get(*id).copied().unwrap_or(usize::MAX));

        ids.into_iter()
            .filter_map(|id| self.issues.get(id))
            .map(IssueSummary::from)
            .collect()
    }
}

/// Parse one raw record into a typed issue.
fn parse_record(record: RawIssue) -> Result<Issue> {
    let id = IssueId::new(record.id);

    let status = Status::parse(&record.status).ok_or_else(|| Error::InvalidStatus {
        id: id.clone(),
        value: record.status.clone(),
    })?;

    let priority = Priority::parse(&record.priority).ok_or_else(|| Error::InvalidPriority {
        id: id.clone(),
        value: record.priority.clone(),
    })?;

    Ok(Issue {
        id,
        title: record.title,
        description: record.description,
        status,
        priority,
        done_when: record.done_when,
        created_at: record.created_at,
        updated_at: record.updated_at,
        parent: record.parent.map(IssueId::new),
        blocks: record.blocks.into_iter().map(IssueId::new).collect(),
    })
}
