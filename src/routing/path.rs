//! Control points for a connector between two anchors
//!
//! A target well ahead along the primary axis gets a short Z-shaped route
//! through the midpoint. A target behind or roughly level with the source
//! gets the long route: out of the source, over to a clearance line one node
//! extent above or below, back along it, and into the target from behind.
//! Vertical nodes use the same routes with the axes swapped.

use crate::geometry::{Point, PointF, Rect};
use crate::model::Direction;

/// Control points from `source` on `from` to `dest` on `to`.
///
/// All arithmetic is integer with truncating division.
pub fn control_points(
    direction: Direction,
    from: Rect,
    to: Rect,
    source: Point,
    dest: Point,
) -> Vec<PointF> {
    match direction {
        Direction::Horizontal => primary_axis_route(from, to, source, dest)
            .into_iter()
            .map(Point::to_f)
            .collect(),
        Direction::Vertical => primary_axis_route(
            transpose_rect(from),
            transpose_rect(to),
            transpose(source),
            transpose(dest),
        )
        .into_iter()
        .map(|p| transpose(p).to_f())
        .collect(),
    }
}

fn transpose(p: Point) -> Point {
    Point::new(p.y, p.x)
}

fn transpose_rect(r: Rect) -> Rect {
    Rect::new(r.y, r.x, r.height, r.width)
}

/// The horizontal route; x is the primary axis
fn primary_axis_route(from: Rect, to: Rect, source: Point, dest: Point) -> Vec<Point> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    if dx.abs() < from.width || to.x <= from.x {
        let divisor = if from.width == 0 { 1 } else { from.width };
        let steep = dy.abs() < dx.abs() / divisor * from.height;
        // pick the side of the clearance line that avoids doubling back
        let long_y = if dy > 0 {
            if steep {
                source.y - from.height
            } else {
                source.y + from.height
            }
        } else if dy == 0 {
            source.y + from.height
        } else if steep {
            source.y + from.height
        } else {
            source.y - from.height
        };

        let out_x = source.x + from.width / 2;
        let in_x = dest.x - to.width / 2;
        vec![
            source,
            Point::new(out_x, source.y),
            Point::new(out_x, long_y),
            Point::new(in_x + 2 * (out_x - in_x) / 3, long_y),
            Point::new(in_x + (out_x - in_x) / 3, long_y),
            Point::new(in_x, long_y),
            Point::new(in_x, dest.y),
            dest,
        ]
    } else {
        let mid_x = source.x + (dest.x - source.x) / 2;
        vec![
            source,
            Point::new(mid_x, source.y),
            Point::new(mid_x, dest.y),
            dest,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(points: &[PointF]) -> Vec<(i32, i32)> {
        points.iter().map(|p| (p.x as i32, p.y as i32)).collect()
    }

    #[test]
    fn test_short_route_through_midpoint() {
        let from = Rect::new(0, 0, 96, 48);
        let to = Rect::new(200, 100, 96, 48);
        let points = control_points(
            Direction::Horizontal,
            from,
            to,
            Point::new(96, 24),
            Point::new(200, 124),
        );
        assert_eq!(ints(&points), vec![(96, 24), (148, 24), (148, 124), (200, 124)]);
    }

    #[test]
    fn test_long_route_for_target_behind() {
        let from = Rect::new(200, 0, 96, 48);
        let to = Rect::new(0, 0, 96, 48);
        let points = control_points(
            Direction::Horizontal,
            from,
            to,
            Point::new(296, 24),
            Point::new(0, 24),
        );
        // level target: clearance line below, interpolated at 2/3 and 1/3
        assert_eq!(
            ints(&points),
            vec![
                (296, 24),
                (344, 24),
                (344, 72),
                (213, 72),
                (82, 72),
                (-48, 72),
                (-48, 24),
                (0, 24),
            ]
        );
    }

    #[test]
    fn test_long_route_side_follows_slope() {
        let from = Rect::new(400, 0, 96, 48);
        let source = Point::new(496, 24);
        // far behind and slightly lower: clearance line goes above
        let to = Rect::new(0, 40, 96, 48);
        let points = control_points(Direction::Horizontal, from, to, source, Point::new(0, 64));
        assert_eq!(points[2].y, -24.0);
        // steeply lower: clearance line goes below
        let to = Rect::new(0, 400, 96, 48);
        let points = control_points(Direction::Horizontal, from, to, source, Point::new(0, 424));
        assert_eq!(points[2].y, 72.0);
    }

    #[test]
    fn test_vertical_route_mirrors_horizontal() {
        let from = Rect::new(0, 0, 96, 48);
        let to = Rect::new(100, 200, 96, 48);
        let points = control_points(
            Direction::Vertical,
            from,
            to,
            Point::new(48, 48),
            Point::new(148, 200),
        );
        assert_eq!(ints(&points), vec![(48, 48), (48, 124), (148, 124), (148, 200)]);
    }

    #[test]
    fn test_routes_end_on_anchors() {
        let from = Rect::new(300, 300, 96, 48);
        let to = Rect::new(0, 0, 96, 48);
        for direction in [Direction::Horizontal, Direction::Vertical] {
            let source = Point::new(396, 324);
            let dest = Point::new(0, 24);
            let points = control_points(direction, from, to, source, dest);
            assert_eq!(points.first().copied(), Some(source.to_f()));
            assert_eq!(points.last().copied(), Some(dest.to_f()));
        }
    }
}
