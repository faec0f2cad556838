//! Drawing a diagram through a pluggable renderer
//!
//! [`render_diagram`] decides what is drawn and in which order; a
//! [`Renderer`] decides how. Links of ordinary nodes go first, then
//! containers from the outermost inwards, then every other node. Anything
//! outside the viewport is skipped.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::{render_svg, render_svg_with_overlay, SvgBuilder, SvgRenderer};

use tracing::trace;

use crate::geometry::{Point, Rect, RectF};
use crate::hit_test::branch_cells;
use crate::model::{Diagram, Direction, Link, Node, NodeId, NodeKind, Selected};
use crate::routing::{routes_from, Fragment};
use crate::tools::Overlay;

/// Height of a container's title strip
pub const TITLE_STRIP: i32 = 20;

/// A node as handed to a renderer
#[derive(Debug, Clone)]
pub struct NodeView<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    pub area: Rect,
    pub selected: bool,
    /// Where the node's own text goes
    pub text_area: RectF,
    /// Branch cells of a condition node, in branch order
    pub branch_cells: Vec<RectF>,
}

/// A connector as handed to a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct LinkView {
    pub link: Link,
    /// Anchor on the source node, drawn as a small dot
    pub source: Point,
    /// Fragments inside the viewport, in generation order. The terminal
    /// fragment, if visible, carries the arrowhead.
    pub fragments: Vec<Fragment>,
    pub selected: bool,
}

/// A drawing backend
pub trait Renderer {
    fn draw_link(&mut self, link: &LinkView);

    fn draw_node(&mut self, node: &NodeView<'_>);

    /// Transient tool drawing on top of everything else
    fn draw_overlay(&mut self, _overlay: &Overlay) {}
}

fn to_rect_f(rect: Rect) -> RectF {
    RectF::new(
        rect.x as f64,
        rect.y as f64,
        rect.width as f64,
        rect.height as f64,
    )
}

/// The area of a node its text is drawn in
fn text_area(node: &Node, area: Rect) -> RectF {
    let full = to_rect_f(area);
    match node.kind() {
        NodeKind::Container(_) => RectF::new(full.x, full.y, full.width, TITLE_STRIP as f64),
        NodeKind::Condition { branches } if !branches.is_empty() => match node.direction() {
            Direction::Horizontal => RectF::new(full.x, full.y, (area.width / 2) as f64, full.height),
            Direction::Vertical => RectF::new(full.x, full.y, full.width, (area.height / 2) as f64),
        },
        _ => full,
    }
}

fn node_view<'a>(diagram: &'a Diagram, id: NodeId) -> Option<NodeView<'a>> {
    let node = diagram.node(id)?;
    let area = diagram.area(id)?;
    Some(NodeView {
        id,
        node,
        area,
        selected: diagram.is_selected(Selected::Node(id)),
        text_area: text_area(node, area),
        branch_cells: branch_cells(diagram, id),
    })
}

/// Views of a node's outgoing connectors, clipped to `viewport`
pub fn link_views(diagram: &Diagram, id: NodeId, viewport: Rect) -> Vec<LinkView> {
    routes_from(diagram, id)
        .into_iter()
        .filter_map(|route| {
            let fragments: Vec<Fragment> = route
                .fragments(diagram)
                .filter(|f| viewport.intersects_line(f.start, f.end))
                .collect();
            if fragments.is_empty() {
                return None;
            }
            Some(LinkView {
                link: route.link,
                source: route.source,
                fragments,
                selected: diagram.is_selected(Selected::Link(route.link)),
            })
        })
        .collect()
}

/// Draw every visible part of `diagram` in draw order
pub fn render_diagram<R>(diagram: &Diagram, viewport: Rect, renderer: &mut R)
where
    R: Renderer + ?Sized,
{
    let mut links = 0;
    for (id, _) in diagram.nodes().filter(|(_, n)| !n.is_container()) {
        for view in link_views(diagram, id, viewport) {
            renderer.draw_link(&view);
            links += 1;
        }
    }

    let mut containers: Vec<NodeId> = diagram
        .nodes()
        .filter(|(_, n)| n.is_container())
        .map(|(id, _)| id)
        .collect();
    containers.sort_by_key(|id| diagram.depth(*id));
    let others = diagram
        .nodes()
        .filter(|(_, n)| !n.is_container())
        .map(|(id, _)| id);

    let mut nodes = 0;
    for id in containers.into_iter().chain(others) {
        let Some(view) = node_view(diagram, id) else {
            continue;
        };
        if viewport.intersects(&view.area) {
            renderer.draw_node(&view);
            nodes += 1;
        }
    }
    trace!(links, nodes, "rendered diagram");
}

/// The whole diagram from the origin, with one default node size of margin
/// on every side. Used as the viewport for exports.
pub fn export_bounds(diagram: &Diagram) -> Rect {
    let size = diagram.node_size();
    let extent = crate::geometry::bounding_box(diagram.node_ids().filter_map(|id| diagram.area(id)))
        .map(|bbox| Rect::new(0, 0, bbox.right() + 1, bbox.bottom() + 1))
        .unwrap_or_default();
    extent.inflate(size.width, size.height)
}
