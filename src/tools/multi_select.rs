//! Rubber-band selection

use tracing::trace;

use crate::geometry::{Point, Rect};
use crate::hit_test::node_at;
use crate::model::{Diagram, NodeId, Selected};

use super::CLICK_TOLERANCE;

/// State of an active rubber-band selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiSelectState {
    origin: Point,
    current: Point,
}

impl MultiSelectState {
    pub(super) fn begin(point: Point) -> Self {
        trace!(x = point.x, y = point.y, "rubber band started");
        Self {
            origin: point,
            current: point,
        }
    }

    /// The rectangle spanned by the press point and the pointer
    pub fn rubber_band(&self) -> Rect {
        Rect::from_ltrb(
            self.origin.x.min(self.current.x),
            self.origin.y.min(self.current.y),
            self.origin.x.max(self.current.x),
            self.origin.y.max(self.current.y),
        )
    }

    fn is_click(&self) -> bool {
        (self.origin.x - self.current.x).abs() < CLICK_TOLERANCE
            && (self.origin.y - self.current.y).abs() < CLICK_TOLERANCE
    }

    /// Track the pointer. Once it has travelled far enough the selection
    /// becomes every node touching the band.
    pub(super) fn update(&mut self, diagram: &mut Diagram, point: Point) -> bool {
        self.current = point;
        if self.is_click() {
            return false;
        }
        self.select_band(diagram)
    }

    fn select_band(&self, diagram: &mut Diagram) -> bool {
        let band = self.rubber_band();
        let hits: Vec<NodeId> = diagram
            .node_ids()
            .filter(|id| diagram.area(*id).is_some_and(|area| area.intersects(&band)))
            .collect();
        diagram.set_selection(hits.into_iter().map(Selected::Node))
    }

    /// Finish at `point`. A short press toggles the node under it instead.
    pub(super) fn finish(mut self, diagram: &mut Diagram, point: Point) -> bool {
        self.current = point;
        if !self.is_click() {
            return self.select_band(diagram);
        }
        match node_at(diagram, point) {
            Some(id) => {
                diagram.toggle_selected(Selected::Node(id));
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeVariant;

    fn three_in_a_row() -> (Diagram, [NodeId; 3]) {
        let mut d = Diagram::new();
        let a = d.add_node_at(NodeVariant::Text, Point::new(0, 0));
        let b = d.add_node_at(NodeVariant::Text, Point::new(200, 0));
        let c = d.add_node_at(NodeVariant::Text, Point::new(400, 0));
        (d, [a, b, c])
    }

    #[test]
    fn test_band_normalizes_corners() {
        let mut band = MultiSelectState::begin(Point::new(50, 60));
        band.current = Point::new(10, 100);
        assert_eq!(band.rubber_band(), Rect::new(10, 60, 40, 40));
    }

    #[test]
    fn test_small_moves_do_not_select() {
        let (mut d, _) = three_in_a_row();
        let mut band = MultiSelectState::begin(Point::new(-20, -20));
        assert!(!band.update(&mut d, Point::new(-11, -11)));
        assert!(d.selection().is_empty());
    }

    #[test]
    fn test_band_selects_intersecting_nodes() {
        let (mut d, [a, b, c]) = three_in_a_row();
        let mut band = MultiSelectState::begin(Point::new(50, -20));
        band.update(&mut d, Point::new(250, 10));
        assert_eq!(d.selected_nodes(), vec![a, b]);

        // shrinking the band drops nodes again
        band.update(&mut d, Point::new(150, 10));
        assert_eq!(d.selected_nodes(), vec![a]);

        band.finish(&mut d, Point::new(420, 10));
        assert_eq!(d.selected_nodes(), vec![a, b, c]);
    }

    #[test]
    fn test_click_toggles_node() {
        let (mut d, [a, b, _]) = three_in_a_row();
        d.select(Selected::Node(a));
        let band = MultiSelectState::begin(Point::new(210, 10));
        assert!(band.finish(&mut d, Point::new(215, 14)));
        assert_eq!(d.selected_nodes(), vec![a, b]);

        let band = MultiSelectState::begin(Point::new(10, 10));
        band.finish(&mut d, Point::new(10, 10));
        assert_eq!(d.selected_nodes(), vec![b]);

        let band = MultiSelectState::begin(Point::new(150, 150));
        assert!(!band.finish(&mut d, Point::new(150, 150)));
    }
}
