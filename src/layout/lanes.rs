//! Lane assignment by traversal depth
//!
//! Nodes are visited depth-first along their outgoing links, starting from
//! every not-yet-visited node in model order. A node's lane is the depth at
//! which it was first discovered. Edges that reach an already-assigned node
//! are recorded as revisits and never move that node, which is also what
//! stops the traversal on cycles.

use std::collections::HashMap;

use tracing::trace;

use crate::model::{Diagram, NodeId};

/// An edge whose target already had a lane when the edge was followed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevisitEdge {
    pub from: NodeId,
    pub to: NodeId,
}

/// Result of lane assignment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneAssignment {
    /// Nodes per lane, in discovery order
    pub lanes: Vec<Vec<NodeId>>,
    /// Cycle-closing and cross edges that were skipped
    pub revisits: Vec<RevisitEdge>,
    lane_of: HashMap<NodeId, usize>,
}

impl LaneAssignment {
    /// The lane a node was assigned to
    pub fn lane_of(&self, id: NodeId) -> Option<usize> {
        self.lane_of.get(&id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

/// Assign every node of the diagram to a lane
pub fn assign_lanes(diagram: &Diagram) -> LaneAssignment {
    let mut result = LaneAssignment::default();
    let mut stack: Vec<(NodeId, usize, Option<NodeId>)> = Vec::new();

    for root in diagram.node_ids() {
        if result.lane_of.contains_key(&root) {
            continue;
        }
        stack.push((root, 0, None));
        while let Some((id, depth, from)) = stack.pop() {
            if result.lane_of.contains_key(&id) {
                if let Some(from) = from {
                    trace!(%from, to = %id, "skipping revisit edge");
                    result.revisits.push(RevisitEdge { from, to: id });
                }
                continue;
            }
            if depth == result.lanes.len() {
                result.lanes.push(Vec::new());
            }
            result.lanes[depth].push(id);
            result.lane_of.insert(id, depth);

            let children = diagram
                .node(id)
                .map(|n| n.linked_nodes())
                .unwrap_or_default();
            // reversed so the first slot is explored first
            for child in children.into_iter().rev().flatten() {
                stack.push((child, depth + 1, Some(id)));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeVariant;

    #[test]
    fn test_empty_diagram_has_no_lanes() {
        let d = Diagram::new();
        assert!(assign_lanes(&d).is_empty());
    }

    #[test]
    fn test_single_node_gets_lane_zero() {
        let mut d = Diagram::new();
        let n = d.add_node(NodeVariant::Text);
        let lanes = assign_lanes(&d);
        assert_eq!(lanes.lanes, vec![vec![n]]);
        assert_eq!(lanes.lane_of(n), Some(0));
    }

    #[test]
    fn test_depth_first_discovery_order() {
        let mut d = Diagram::new();
        let cond = d.add_node(NodeVariant::Condition);
        let a = d.add_node(NodeVariant::Text);
        let b = d.add_node(NodeVariant::Text);
        let c = d.add_node(NodeVariant::End);
        d.add_branch(cond, "yes");
        d.add_branch(cond, "no");
        d.add_link(cond, 0, a);
        d.add_link(cond, 1, b);
        d.add_link(a, 0, c);
        d.add_link(b, 0, c);

        let lanes = assign_lanes(&d);
        assert_eq!(lanes.lanes, vec![vec![cond], vec![a, b], vec![c]]);
        assert_eq!(lanes.revisits, vec![RevisitEdge { from: b, to: c }]);
    }

    #[test]
    fn test_cycle_is_recorded_not_followed() {
        let mut d = Diagram::new();
        let a = d.add_node(NodeVariant::Text);
        let b = d.add_node(NodeVariant::Text);
        d.add_link(a, 0, b);
        d.add_link(b, 0, a);

        let lanes = assign_lanes(&d);
        assert_eq!(lanes.lane_of(a), Some(0));
        assert_eq!(lanes.lane_of(b), Some(1));
        assert_eq!(lanes.revisits, vec![RevisitEdge { from: b, to: a }]);
    }

    #[test]
    fn test_first_discovery_depth_wins() {
        // a -> b -> c, and later root d -> c: c stays in lane 2
        let mut d = Diagram::new();
        let a = d.add_node(NodeVariant::Text);
        let b = d.add_node(NodeVariant::Text);
        let c = d.add_node(NodeVariant::End);
        let e = d.add_node(NodeVariant::Text);
        d.add_link(a, 0, b);
        d.add_link(b, 0, c);
        d.add_link(e, 0, c);

        let lanes = assign_lanes(&d);
        assert_eq!(lanes.lane_of(c), Some(2));
        assert_eq!(lanes.lane_of(e), Some(0));
        assert_eq!(lanes.lanes[0], vec![a, e]);
    }
}
