//! Cycle detection over relationship edges.
//!
//! The two relations are checked independently: a chain that mixes parent
//! and blocks edges is allowed to close on itself, but neither relation may
//! form a cycle on its own. Parent chains use a bounded ancestor walk; the
//! blocks relation uses a topological sort over a blocks-only subgraph,
//! which also catches self-blocks and hands back a node to name in the
//! error.

use crate::domain::{Issue, IssueId, Relation};
use crate::error::{Error, Result};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::{HashMap, HashSet};

/// Verify that no issue is its own ancestor.
///
/// Walks the parent chain of every issue with a visited set. The walk is
/// additionally bounded by the total issue count, so it terminates even if
/// the index were corrupted.
pub(super) fn check_parent_chains(
    issues: &HashMap<IssueId, Issue>,
    order: &[IssueId],
) -> Result<()> {
    for start in order {
        let mut visited: HashSet<&IssueId> = HashSet::new();
        visited.insert(start);

        let mut current = issues.get(start).and_then(|issue| issue.parent.as_ref());
        let mut steps = 0usize;

        while let Some(id) = current {
            if !visited.insert(id) || steps > order.len() {
                return Err(Error::Cycle {
                    id: id.clone(),
                    relation: Relation::Parent,
                });
            }
            steps += 1;
            current = issues.get(id).and_then(|issue| issue.parent.as_ref());
        }
    }

    Ok(())
}

/// Verify that the blocks relation is acyclic.
///
/// Builds a throwaway blocks-only digraph and topologically sorts it. Edge
/// targets were already validated against the index, so missing targets are
/// skipped rather than re-reported here.
pub(super) fn check_blocks_relation(
    issues: &HashMap<IssueId, Issue>,
    order: &[IssueId],
) -> Result<()> {
    let mut graph: DiGraph<IssueId, ()> = DiGraph::with_capacity(order.len(), order.len());
    let mut nodes = HashMap::with_capacity(order.len());

    for id in order {
        nodes.insert(id, graph.add_node(id.clone()));
    }

    for id in order {
        let Some(issue) = issues.get(id) else {
            continue;
        };
        let Some(&source) = nodes.get(id) else {
            continue;
        };
        for blocked_id in &issue.blocks {
            if let Some(&target) = nodes.get(blocked_id) {
                graph.add_edge(source, target, ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(_) => Ok(()),
        Err(cycle) => Err(Error::Cycle {
            id: graph[cycle.node_id()].clone(),
            relation: Relation::Blocks,
        }),
    }
}
