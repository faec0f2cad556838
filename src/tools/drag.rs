//! Dragging the selected nodes
//!
//! A drag captures the selected nodes and everything nested in selected
//! containers, and moves them together by the pointer delta. Containers
//! holding captured nodes stop fitting until the drag ends. Releasing over a
//! node that is not being dragged hands the selection to it, so containers
//! adopt dropped nodes. Releasing over empty space takes nodes out of the
//! containers they were dragged out of.

use tracing::trace;

use crate::geometry::{bounding_box, Point, Rect};
use crate::hit_test::{node_at, nodes_at};
use crate::model::{Diagram, NodeId};

use super::Modifiers;

/// Maximum distance, in pixels, between a selection edge and a node edge
/// for the selection to snap onto it
pub const GUIDELINE_THRESHOLD: i32 = 10;

/// A snap line shown while dragging with ctrl held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Guideline {
    /// A vertical line at this x
    Vertical(i32),
    /// A horizontal line at this y
    Horizontal(i32),
}

/// The edge of another node the selection snaps to on one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EdgeSnap {
    distance: i32,
    line: i32,
    /// The selection's left (or top) edge goes on the line, else its right
    /// (or bottom) edge
    leading: bool,
}

impl EdgeSnap {
    fn adjustment(&self, lo: i32, hi: i32) -> i32 {
        if self.leading {
            self.line - lo
        } else {
            self.line - hi
        }
    }
}

/// Closest edge pairing on one axis. `spans` are the other nodes' extents
/// on that axis. Ties keep the first candidate found.
fn closest_edge<I>(lo: i32, hi: i32, spans: I) -> Option<EdgeSnap>
where
    I: IntoIterator<Item = (i32, i32)>,
{
    let mut best: Option<EdgeSnap> = None;
    for (other_lo, other_hi) in spans {
        let candidates = [
            (hi, other_lo, false),
            (lo, other_lo, true),
            (lo, other_hi, true),
            (hi, other_hi, false),
        ];
        for (edge, line, leading) in candidates {
            let distance = (edge - line).abs();
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(EdgeSnap {
                    distance,
                    line,
                    leading,
                });
            }
        }
    }
    best.filter(|b| b.distance < GUIDELINE_THRESHOLD)
}

/// State of an active drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    origin: Point,
    start_positions: Vec<(NodeId, Point)>,
    suspended: Vec<NodeId>,
    node_at_press: Option<NodeId>,
    guidelines: Vec<Guideline>,
}

impl DragState {
    /// Capture the selection at `point`. `None` when no node is selected.
    pub(super) fn begin(diagram: &mut Diagram, point: Point) -> Option<Self> {
        let mut captured: Vec<NodeId> = Vec::new();
        for id in diagram.selected_nodes() {
            if !captured.contains(&id) {
                captured.push(id);
            }
            for child in diagram.all_children(id) {
                if !captured.contains(&child) {
                    captured.push(child);
                }
            }
        }
        if captured.is_empty() {
            return None;
        }

        let mut suspended: Vec<NodeId> = Vec::new();
        for id in &captured {
            if let Some(container) = diagram.node(*id).and_then(|n| n.container()) {
                if !suspended.contains(&container) {
                    suspended.push(container);
                }
            }
        }
        for container in &suspended {
            diagram.suspend_fit(*container);
        }

        let start_positions = captured
            .into_iter()
            .filter_map(|id| diagram.node(id).map(|n| (id, n.position())))
            .collect();
        trace!(x = point.x, y = point.y, suspended = suspended.len(), "drag started");
        Some(Self {
            origin: point,
            start_positions,
            suspended,
            node_at_press: node_at(diagram, point),
            guidelines: Vec::new(),
        })
    }

    /// Nodes moved by this drag
    pub fn captured(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.start_positions.iter().map(|(id, _)| *id)
    }

    fn is_captured(&self, id: NodeId) -> bool {
        self.start_positions.iter().any(|(c, _)| *c == id)
    }

    /// Guidelines the selection currently snaps to
    pub fn guidelines(&self) -> &[Guideline] {
        &self.guidelines
    }

    pub(super) fn drag_to(&mut self, diagram: &mut Diagram, point: Point, modifiers: Modifiers) {
        self.move_nodes(diagram, point, modifiers, false);
    }

    fn move_nodes(&mut self, diagram: &mut Diagram, point: Point, modifiers: Modifiers, snap: bool) {
        let dx = point.x - self.origin.x;
        let dy = point.y - self.origin.y;
        self.guidelines.clear();

        let others: Vec<Rect> = diagram
            .node_ids()
            .filter(|id| !self.is_captured(*id))
            .filter_map(|id| diagram.area(id))
            .collect();

        if modifiers.ctrl && !others.is_empty() {
            let (ax, ay) = self.guideline_adjustment(diagram, dx, dy, &others);
            for (id, start) in &self.start_positions {
                diagram.place(*id, start.offset(dx + ax, dy + ay));
            }
        } else {
            let grid = diagram.grid_size();
            for (id, start) in &self.start_positions {
                let position = start.offset(dx, dy);
                let position = if snap { position.round_to(grid) } else { position };
                diagram.place(*id, position);
            }
        }
    }

    /// Extra offset that puts the moved selection's edges on the nearest
    /// edges of other nodes, recording the guidelines used
    fn guideline_adjustment(&mut self, diagram: &Diagram, dx: i32, dy: i32, others: &[Rect]) -> (i32, i32) {
        let moved = self.start_positions.iter().filter_map(|(id, start)| {
            diagram
                .size_of(*id)
                .map(|size| Rect::from_point_size(start.offset(dx, dy), size))
        });
        let Some(bbox) = bounding_box(moved) else {
            return (0, 0);
        };

        let mut adjustment = (0, 0);
        if let Some(snap) = closest_edge(bbox.left(), bbox.right(), others.iter().map(|r| (r.left(), r.right()))) {
            adjustment.0 = snap.adjustment(bbox.left(), bbox.right());
            self.guidelines.push(Guideline::Vertical(snap.line));
        }
        if let Some(snap) = closest_edge(bbox.top(), bbox.bottom(), others.iter().map(|r| (r.top(), r.bottom()))) {
            adjustment.1 = snap.adjustment(bbox.top(), bbox.bottom());
            self.guidelines.push(Guideline::Horizontal(snap.line));
        }
        adjustment
    }

    /// Drop the selection at `point`.
    ///
    /// Holding shift moves without changing container membership.
    pub(super) fn finish(mut self, diagram: &mut Diagram, point: Point, modifiers: Modifiers) -> bool {
        self.move_nodes(diagram, point, modifiers, true);

        let selected = diagram.selected_nodes();
        let mut affected: Vec<NodeId> = selected.iter().flat_map(|id| diagram.ancestors(*id)).collect();

        if !modifiers.shift {
            let hits = nodes_at(diagram, point);
            match hits.iter().copied().find(|id| !self.is_captured(*id)) {
                Some(target) => {
                    for id in selected.iter().filter(|id| **id != target) {
                        diagram.add_to_container(target, *id);
                    }
                }
                None => {
                    let dragged_along = match self.node_at_press {
                        Some(press) if diagram.node(press).is_some_and(|n| n.is_container()) => {
                            diagram.all_children(press)
                        }
                        _ => Vec::new(),
                    };
                    for id in selected.iter().filter(|id| !dragged_along.contains(id)) {
                        let container = diagram.node(*id).and_then(|n| n.container());
                        if container.is_some_and(|c| !hits.contains(&c)) {
                            trace!(node = %id, "dragged out of container");
                            diagram.remove_from_container(*id);
                        }
                    }
                }
            }
        }

        for container in diagram.deepest_first(&self.suspended) {
            diagram.resume_fit(container);
        }
        affected.extend(selected.iter().flat_map(|id| diagram.ancestors(*id)));
        affected.extend(self.suspended.iter().copied());
        for container in diagram.deepest_first(&affected) {
            diagram.update_bounds(container);
        }
        diagram.request_redraw();
        trace!(x = point.x, y = point.y, "drag finished");
        true
    }

    /// Abandon the drag: nodes go back to where they started
    pub(super) fn cancel(self, diagram: &mut Diagram) {
        for (id, start) in &self.start_positions {
            diagram.place(*id, *start);
        }
        for container in diagram.deepest_first(&self.suspended) {
            diagram.resume_fit(container);
            diagram.update_bounds(container);
        }
    }
}
