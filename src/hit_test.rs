//! Mapping points to the nodes and links under them
//!
//! Link hits reuse the router's fragments unchanged, so a click lands on
//! exactly what was drawn.

use crate::geometry::{point_to_line_distance, segment_projection, Point, PointF, Rect, RectF};
use crate::model::{Diagram, Direction, Link, NodeId};
use crate::routing::routes_from;

/// Maximum perpendicular distance, in pixels, for a click to hit a fragment
pub const LINK_HIT_THRESHOLD: f64 = 3.0;

/// Whether `point` lies on the segment `a`-`b` within the hit threshold.
///
/// The projection must fall strictly inside the segment; zero-length
/// segments never hit.
pub fn segment_hit(a: PointF, b: PointF, point: PointF) -> bool {
    let distance = point_to_line_distance(a, b, point);
    if distance.is_nan() || distance >= LINK_HIT_THRESHOLD {
        return false;
    }
    let (u, length) = segment_projection(a, b, point);
    u > 0.0 && u < length
}

/// The first link whose connector passes within the threshold of `point`.
///
/// Sources are scanned in model order, each connector's fragments in
/// generation order.
pub fn find_link_at(diagram: &Diagram, point: PointF) -> Option<Link> {
    diagram.node_ids().find_map(|id| {
        routes_from(diagram, id).into_iter().find_map(|route| {
            route
                .fragments(diagram)
                .any(|f| segment_hit(f.start, f.end, point))
                .then_some(route.link)
        })
    })
}

/// Every node whose area contains `point`, front to back.
///
/// Ordinary nodes come first, latest-added first since they paint on top.
/// Containers follow, deepest first.
pub fn nodes_at(diagram: &Diagram, point: Point) -> Vec<NodeId> {
    let hits = |id: &NodeId| diagram.area(*id).is_some_and(|area| area.contains(point));

    let mut result: Vec<NodeId> = diagram
        .nodes()
        .filter(|(_, n)| !n.is_container())
        .map(|(id, _)| id)
        .filter(hits)
        .collect();
    result.reverse();

    let mut containers: Vec<NodeId> = diagram
        .nodes()
        .filter(|(_, n)| n.is_container())
        .map(|(id, _)| id)
        .collect();
    containers.sort_by_key(|id| diagram.depth(*id));
    result.extend(containers.into_iter().rev().filter(hits));
    result
}

/// The frontmost node under `point`
pub fn node_at(diagram: &Diagram, point: Point) -> Option<NodeId> {
    nodes_at(diagram, point).into_iter().next()
}

/// Branch cells of a condition node, in branch order.
///
/// Horizontal nodes stack the cells down their right half, vertical nodes
/// lay them out across their bottom half. Other nodes have no cells.
pub fn branch_cells(diagram: &Diagram, id: NodeId) -> Vec<RectF> {
    let (Some(node), Some(area)) = (diagram.node(id), diagram.area(id)) else {
        return Vec::new();
    };
    let count = node.branches().len();
    if count == 0 {
        return Vec::new();
    }
    (0..count)
        .map(|i| cell(area, node.direction(), i, count))
        .collect()
}

fn cell(area: Rect, direction: Direction, index: usize, count: usize) -> RectF {
    let half_width = (area.width / 2) as f64;
    let half_height = (area.height / 2) as f64;
    match direction {
        Direction::Horizontal => {
            let size = area.height as f64 / count as f64;
            RectF::new(
                area.left() as f64 + half_width,
                area.top() as f64 + index as f64 * size,
                half_width,
                size,
            )
        }
        Direction::Vertical => {
            let size = area.width as f64 / count as f64;
            RectF::new(
                area.left() as f64 + index as f64 * size,
                area.top() as f64 + half_height,
                size,
                half_height,
            )
        }
    }
}

/// The branch whose cell contains `point`
pub fn branch_at(diagram: &Diagram, id: NodeId, point: Point) -> Option<usize> {
    branch_cells(diagram, id)
        .iter()
        .position(|cell| cell.contains(point.to_f()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeVariant;
    use crate::routing::LineType;

    fn straight_pair() -> (Diagram, Link) {
        let mut d = Diagram::new();
        d.set_line_type(LineType::Straight);
        let a = d.add_node_at(NodeVariant::Text, Point::new(0, 0));
        let b = d.add_node_at(NodeVariant::Text, Point::new(200, 0));
        d.add_link(a, 0, b);
        let link = d.links()[0];
        (d, link)
    }

    #[test]
    fn test_threshold_boundary() {
        // straight connector runs from (96,24) to (200,24)
        let (d, link) = straight_pair();
        assert_eq!(find_link_at(&d, PointF::new(150.0, 26.0)), Some(link));
        assert_eq!(find_link_at(&d, PointF::new(150.0, 29.0)), None);
    }

    #[test]
    fn test_projection_outside_segment_misses() {
        let a = PointF::new(0.0, 0.0);
        let b = PointF::new(10.0, 0.0);
        assert!(segment_hit(a, b, PointF::new(5.0, 1.0)));
        assert!(!segment_hit(a, b, PointF::new(12.0, 0.0)));
        assert!(!segment_hit(a, b, PointF::new(0.0, 0.0)));
        assert!(!segment_hit(a, a, PointF::new(0.0, 0.0)));
    }

    #[test]
    fn test_nodes_at_order() {
        let mut d = Diagram::new();
        let outer = d.add_node(NodeVariant::Container);
        let inner = d.add_node(NodeVariant::Container);
        let first = d.add_node_at(NodeVariant::Text, Point::new(100, 100));
        let second = d.add_node_at(NodeVariant::Text, Point::new(120, 110));
        d.add_to_container(outer, inner);
        d.add_to_container(inner, first);
        d.add_to_container(inner, second);

        let hits = nodes_at(&d, Point::new(130, 120));
        assert_eq!(hits, vec![second, first, inner, outer]);
        assert_eq!(node_at(&d, Point::new(130, 120)), Some(second));
        assert_eq!(node_at(&d, Point::new(-500, -500)), None);
    }

    #[test]
    fn test_branch_cells_horizontal() {
        let mut d = Diagram::new();
        let cond = d.add_node_at(NodeVariant::Condition, Point::new(0, 0));
        d.add_branch(cond, "yes");
        d.add_branch(cond, "no");
        // 96x48 node: cells on the right half, 24 px tall each
        assert_eq!(
            branch_cells(&d, cond),
            vec![
                RectF::new(48.0, 0.0, 48.0, 24.0),
                RectF::new(48.0, 24.0, 48.0, 24.0)
            ]
        );
        assert_eq!(branch_at(&d, cond, Point::new(60, 10)), Some(0));
        assert_eq!(branch_at(&d, cond, Point::new(60, 24)), Some(1));
        assert_eq!(branch_at(&d, cond, Point::new(10, 10)), None);
    }

    #[test]
    fn test_branch_cells_vertical() {
        let mut d = Diagram::new();
        let cond = d.add_node_at(NodeVariant::Condition, Point::new(0, 0));
        d.set_direction(cond, Direction::Vertical);
        for text in ["a", "b", "c"] {
            d.add_branch(cond, text);
        }
        let cells = branch_cells(&d, cond);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[1], RectF::new(32.0, 24.0, 32.0, 24.0));
        assert_eq!(branch_at(&d, cond, Point::new(70, 30)), Some(2));
        assert_eq!(branch_at(&d, cond, Point::new(70, 10)), None);
    }

    #[test]
    fn test_non_condition_has_no_cells() {
        let mut d = Diagram::new();
        let text = d.add_node(NodeVariant::Text);
        assert!(branch_cells(&d, text).is_empty());
        assert_eq!(branch_at(&d, text, Point::new(1, 1)), None);
    }
}
