//! Where connectors attach to node boundaries
//!
//! Attachment points are spread along the edge by slot: the source edge is
//! split between its outgoing slots, the target edge between its parents.

use crate::geometry::{Point, Rect};
use crate::model::Direction;

/// Position of an anchor along an edge: the centre of cell `index` of
/// `count` equal cells, computed the way integer layout code truncates.
fn edge_offset(index: usize, count: usize, extent: i32) -> i32 {
    let count = count.max(1);
    ((index as f32 / count as f32) * extent as f32) as i32 + (extent / count as i32) / 2
}

/// Source and destination anchors for one link.
///
/// `slot` of `slot_count` is the link's outgoing slot at the source (empty
/// slots count). `parent` of `parent_count` is the source's position in the
/// target's parent list.
pub fn anchor_points(
    direction: Direction,
    from: Rect,
    slot: usize,
    slot_count: usize,
    to: Rect,
    parent: usize,
    parent_count: usize,
) -> (Point, Point) {
    match direction {
        Direction::Horizontal => (
            Point::new(from.right(), from.top() + edge_offset(slot, slot_count, from.height)),
            Point::new(to.left(), to.top() + edge_offset(parent, parent_count, to.height)),
        ),
        Direction::Vertical => (
            Point::new(from.left() + edge_offset(slot, slot_count, from.width), from.bottom()),
            Point::new(to.left() + edge_offset(parent, parent_count, to.width), to.top()),
        ),
    }
}
