//! Connector routing between linked nodes
//!
//! Routing runs in three steps: anchor points on the node edges, control
//! points between them, and fragments generated from the control points by
//! the diagram's [`LineType`].

mod anchors;
mod fragments;
mod path;

pub use anchors::anchor_points;
pub use fragments::{
    for_each_fragment, for_each_segment, fragments, BezierFragments, FourWayFragments, Fragment,
    Fragments, LineType, StraightFragments, DEFAULT_BEZIER_FRAGMENTS,
};
pub use path::control_points;

use crate::geometry::{Point, PointF};
use crate::model::{Diagram, Link, NodeId};

/// The geometry of one connector
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub link: Link,
    /// Anchor on the source node's edge
    pub source: Point,
    /// Anchor on the target node's edge
    pub dest: Point,
    pub control_points: Vec<PointF>,
}

impl Route {
    /// Fragments of this route for an explicit line type
    pub fn fragments_with(&self, line_type: LineType, bezier_fragments: usize) -> Fragments {
        fragments(line_type, self.control_points.clone(), bezier_fragments)
    }

    /// Fragments of this route with the diagram's line settings
    pub fn fragments(&self, diagram: &Diagram) -> Fragments {
        self.fragments_with(diagram.line_type(), diagram.bezier_fragments())
    }
}

/// Route a link. `None` when the link no longer exists in the diagram.
pub fn route_link(diagram: &Diagram, link: Link) -> Option<Route> {
    let node = diagram.node(link.from)?;
    let slots = node.linked_nodes();
    if slots.get(link.index).copied().flatten() != Some(link.to) {
        return None;
    }
    let from = diagram.area(link.from)?;
    let to = diagram.area(link.to)?;
    let target = diagram.node(link.to)?;
    let parents = target.parents();
    let parent = parents.iter().position(|p| *p == link.from).unwrap_or(0);

    let (source, dest) = anchor_points(
        node.direction(),
        from,
        link.index,
        slots.len(),
        to,
        parent,
        parents.len(),
    );
    Some(Route {
        link,
        source,
        dest,
        control_points: control_points(node.direction(), from, to, source, dest),
    })
}

/// Routes of every outgoing link of a node, in slot order
pub fn routes_from(diagram: &Diagram, id: NodeId) -> Vec<Route> {
    diagram
        .links_from(id)
        .into_iter()
        .filter_map(|link| route_link(diagram, link))
        .collect()
}

/// Fragments of a link with the diagram's line settings
pub fn link_fragments(diagram: &Diagram, link: Link) -> Option<Fragments> {
    route_link(diagram, link).map(|route| route.fragments(diagram))
}

/// Integer segments of a node's outgoing connectors, restricted to the
/// middle of each connector.
///
/// For each link, `trunc(skip * count)` fragments are skipped and
/// `trunc(take * count)` are kept, so the ends touching nodes are left out.
pub fn sampled_segments(diagram: &Diagram, id: NodeId, skip: f64, take: f64) -> Vec<(Point, Point)> {
    let mut segments = Vec::new();
    for route in routes_from(diagram, id) {
        let link_segments: Vec<(Point, Point)> = route
            .fragments(diagram)
            .map(|f| (f.start.truncate(), f.end.truncate()))
            .collect();
        let count = link_segments.len() as f64;
        segments.extend(
            link_segments
                .into_iter()
                .skip((skip * count) as usize)
                .take((take * count) as usize),
        );
    }
    segments
}
