//! Lane-based automatic placement
//!
//! Lanes run along the primary axis: columns for a horizontal layout, rows
//! for a vertical one. A first pass spreads each lane's nodes evenly. The
//! horizontal layout then makes a second pass that nudges nodes off the
//! connectors of earlier lanes; the vertical layout has no such pass.

use tracing::{debug, debug_span};

use crate::geometry::{Point, Size};
use crate::model::{Diagram, Direction, NodeId};
use crate::routing::sampled_segments;

use super::config::LayoutConfig;
use super::lanes::{assign_lanes, LaneAssignment};

/// Each node takes up its own extent plus half again along the lane
const NODE_STRIDE: f64 = 1.5;

/// Lay out every node of the diagram along `axis`.
///
/// Containers are refitted afterwards. Returns the lane assignment used.
pub fn auto_layout(diagram: &mut Diagram, axis: Direction) -> LaneAssignment {
    let _span = debug_span!("auto_layout", ?axis, nodes = diagram.len()).entered();
    let lanes = assign_lanes(diagram);
    if lanes.is_empty() {
        return lanes;
    }
    debug!(
        lanes = lanes.lanes.len(),
        revisits = lanes.revisits.len(),
        "assigned lanes"
    );

    let config = diagram.layout_config().clone();
    match axis {
        Direction::Horizontal => {
            place_columns(diagram, &lanes.lanes, &config);
            dodge_connectors(diagram, &lanes.lanes, &config);
        }
        Direction::Vertical => place_rows(diagram, &lanes.lanes, &config),
    }

    diagram.fit_all();
    diagram.request_redraw();
    lanes
}

fn size_of(diagram: &Diagram, id: NodeId) -> Size {
    diagram.size_of(id).unwrap_or_default()
}

fn stride(extent: i32) -> i32 {
    (extent as f64 * NODE_STRIDE) as i32
}

/// Longest lane measured along the cross axis, gaps included
fn cross_extent<F>(diagram: &Diagram, lanes: &[Vec<NodeId>], default: i32, extent: F) -> i32
where
    F: Fn(Size) -> i32,
{
    lanes
        .iter()
        .map(|lane| {
            lane.iter()
                .map(|id| extent(size_of(diagram, *id)) as f64 + default as f64 * 0.5)
                .sum::<f64>()
        })
        .fold(0.0, f64::max) as i32
}

fn lane_advance<F>(diagram: &Diagram, lane: &[NodeId], default: i32, gap: f64, extent: F) -> i32
where
    F: Fn(Size) -> i32,
{
    let max = lane
        .iter()
        .map(|id| extent(size_of(diagram, *id)))
        .max()
        .unwrap_or(0);
    (max as f64 + default as f64 * gap) as i32
}

fn first_top(default: Size, total_height: i32, lane_len: usize) -> i32 {
    default.height + (total_height / lane_len.max(1) as i32) / 2
}

/// First horizontal pass: one column per lane
fn place_columns(diagram: &mut Diagram, lanes: &[Vec<NodeId>], config: &LayoutConfig) {
    let default = diagram.node_size();
    let grid = diagram.grid_size();
    let total_height = cross_extent(diagram, lanes, default.height, |s| s.height);

    let mut left = default.width;
    for lane in lanes {
        let mut top = first_top(default, total_height, lane.len());
        for &id in lane {
            diagram.place(id, Point::new(left, top).round_to(grid));
            top += stride(size_of(diagram, id).height);
        }
        left += lane_advance(diagram, lane, default.width, config.lane_gap, |s| s.width);
    }
}

/// Second horizontal pass: move nodes off connectors that cross them.
///
/// Each node is tested against the sampled connectors of all earlier lanes
/// and its own. Nodes in the upper half of a lane move up, the rest move
/// down, one default node height per attempt. After the last attempt the
/// node stays where it is.
fn dodge_connectors(diagram: &mut Diagram, lanes: &[Vec<NodeId>], config: &LayoutConfig) {
    let default = diagram.node_size();
    let grid = diagram.grid_size();
    let total_height = cross_extent(diagram, lanes, default.height, |s| s.height);
    let mut pool: Vec<(Point, Point)> = Vec::new();
    let mut left = default.width;
    for lane in lanes {
        let mut top = first_top(default, total_height, lane.len());
        for (index, &id) in lane.iter().enumerate() {
            let own = sample(diagram, id, config);
            let mut attempts = 0;
            while attempts < config.dodge_attempts && crosses(diagram, id, &pool, &own) {
                if index < lane.len() / 2 {
                    top -= default.height;
                } else {
                    top += default.height;
                }
                diagram.place(id, Point::new(left, top).round_to(grid));
                attempts += 1;
            }
            if attempts > 0 && crosses(diagram, id, &pool, &own) {
                debug!(node = %id, attempts, "could not dodge connectors");
            }
            top += stride(size_of(diagram, id).height);
        }
        for &id in lane {
            pool.extend(sample(diagram, id, config));
        }
        left += lane_advance(diagram, lane, default.width, config.lane_gap, |s| s.width);
    }
}

fn sample(diagram: &Diagram, id: NodeId, config: &LayoutConfig) -> Vec<(Point, Point)> {
    sampled_segments(diagram, id, config.sample_skip, config.sample_take)
}

fn crosses(diagram: &Diagram, id: NodeId, pool: &[(Point, Point)], own: &[(Point, Point)]) -> bool {
    let Some(area) = diagram.area(id) else {
        return false;
    };
    pool.iter()
        .chain(own)
        .any(|(a, b)| area.intersects_line(a.to_f(), b.to_f()))
}

/// Vertical pass: one row per lane, nodes centred on the default width
fn place_rows(diagram: &mut Diagram, lanes: &[Vec<NodeId>], config: &LayoutConfig) {
    let default = diagram.node_size();
    let grid = diagram.grid_size();
    let total_width = cross_extent(diagram, lanes, default.width, |s| s.width);

    let mut top = default.height;
    for lane in lanes {
        let mut left = default.width + (total_width / lane.len().max(1) as i32) / 2;
        for &id in lane {
            let width = size_of(diagram, id).width;
            left += default.width / 2 - width / 2;
            diagram.place(id, Point::new(left, top).round_to(grid));
            left += stride(width);
        }
        top += lane_advance(diagram, lane, default.height, config.lane_gap, |s| s.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeVariant;

    #[test]
    fn test_empty_diagram_is_noop() {
        let mut d = Diagram::new();
        d.take_redraw();
        let lanes = auto_layout(&mut d, Direction::Horizontal);
        assert!(lanes.is_empty());
        assert!(!d.needs_redraw());
    }

    #[test]
    fn test_chain_lays_out_left_to_right() {
        let mut d = Diagram::new();
        let a = d.add_node(NodeVariant::Text);
        let b = d.add_node(NodeVariant::Text);
        let c = d.add_node(NodeVariant::Text);
        d.add_link(a, 0, b);
        d.add_link(b, 0, c);

        auto_layout(&mut d, Direction::Horizontal);
        // total height 72: every lane starts at 48 + 36 = 84, which snaps to
        // 80 with ties to even; columns advance by 96 + 48
        let positions: Vec<Point> = [a, b, c]
            .iter()
            .map(|id| d.node(*id).unwrap().position())
            .collect();
        assert_eq!(
            positions,
            vec![Point::new(96, 80), Point::new(240, 80), Point::new(384, 80)]
        );
    }

    #[test]
    fn test_vertical_layout_stacks_rows() {
        let mut d = Diagram::new();
        let a = d.add_node(NodeVariant::Text);
        let b = d.add_node(NodeVariant::Text);
        d.add_link(a, 0, b);

        auto_layout(&mut d, Direction::Vertical);
        let pa = d.node(a).unwrap().position();
        let pb = d.node(b).unwrap().position();
        assert_eq!(pa.x, pb.x);
        // rows advance by 48 + 24
        assert_eq!(pb.y - pa.y, 72);
        assert_eq!(pa.y, 48);
    }

    #[test]
    fn test_positions_snap_to_grid() {
        let mut d = Diagram::new();
        let root = d.add_node(NodeVariant::Condition);
        for i in 0..3 {
            d.add_branch(root, format!("b{i}"));
            let child = d.add_node(NodeVariant::Text);
            d.add_link(root, i, child);
        }
        for axis in [Direction::Horizontal, Direction::Vertical] {
            auto_layout(&mut d, axis);
            for (id, node) in d.nodes() {
                let p = node.position();
                assert_eq!(p.x % 8, 0, "{id} x not on grid");
                assert_eq!(p.y % 8, 0, "{id} y not on grid");
            }
        }
    }

    #[test]
    fn test_dodge_gives_up_after_configured_attempts() {
        let mut d = Diagram::new();
        d.set_layout_config(LayoutConfig::default().with_dodge_attempts(0));
        let a = d.add_node(NodeVariant::Text);
        let b = d.add_node(NodeVariant::Text);
        d.add_link(a, 0, b);
        let lanes = auto_layout(&mut d, Direction::Horizontal);
        assert_eq!(lanes.lanes.len(), 2);
        assert_eq!(d.node(b).unwrap().position(), Point::new(240, 80));
    }
}
