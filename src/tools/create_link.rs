//! Drawing a new link from one node to another

use tracing::trace;

use crate::geometry::Point;
use crate::hit_test::{branch_at, node_at};
use crate::model::{Diagram, NodeId, NodeVariant};

use super::CLICK_TOLERANCE;

/// State of a link being drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkCreateState {
    source: NodeId,
    /// Outgoing slot the link will fill. `None` when a condition node was
    /// pressed outside its branch cells; the release then does nothing.
    slot: Option<usize>,
    origin: Point,
    current: Point,
}

impl LinkCreateState {
    /// Start on the node under `point`. `None` when there is no node that
    /// can link there.
    pub(super) fn begin(diagram: &Diagram, point: Point) -> Option<Self> {
        let source = node_at(diagram, point)?;
        let node = diagram.node(source)?;
        if !node.can_link() {
            return None;
        }
        let slot = match node.variant() {
            NodeVariant::Condition => branch_at(diagram, source, point),
            _ => Some(0),
        };
        trace!(%source, ?slot, "link drawing started");
        Some(Self {
            source,
            slot,
            origin: point,
            current: point,
        })
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    /// The line from the press point to the pointer, while a slot is held
    pub fn pending_line(&self) -> Option<(Point, Point)> {
        self.slot.map(|_| (self.origin, self.current))
    }

    pub(super) fn update(&mut self, point: Point) -> bool {
        if self.slot.is_none() {
            return false;
        }
        self.current = point;
        true
    }

    /// Link to the node under `point`.
    ///
    /// Releases close to the press point are ignored so a stray click does
    /// not create a self-loop.
    pub(super) fn finish(self, diagram: &mut Diagram, point: Point) -> bool {
        let Some(slot) = self.slot else {
            return false;
        };
        if (self.origin.x - point.x).abs() < CLICK_TOLERANCE
            && (self.origin.y - point.y).abs() < CLICK_TOLERANCE
        {
            return false;
        }
        let Some(target) = node_at(diagram, point) else {
            return false;
        };
        if !diagram.node(target).is_some_and(|n| n.can_be_linked_to()) {
            return false;
        }
        trace!(source = %self.source, slot, %target, "link drawn");
        diagram.add_link(self.source, slot, target)
    }
}
