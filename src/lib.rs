//! Node Diagram - a node-and-link diagram model with layout, routing and picking
//!
//! This library provides the graph model behind a flowchart editor: typed
//! nodes linked through outgoing slots, containers that fit around their
//! children, connector routing, lane-based auto-layout, hit testing for
//! pointer interaction, and an SVG renderer.
//!
//! # Example
//!
//! ```rust
//! use node_diagram::{layout_to_svg, Diagram, Direction, NodeVariant, SvgConfig};
//!
//! let mut diagram = Diagram::new();
//! let start = diagram.add_node(NodeVariant::Start);
//! let step = diagram.add_node(NodeVariant::Text);
//! let end = diagram.add_node(NodeVariant::End);
//! diagram.set_text(step, "Work");
//! diagram.add_link(start, 0, step);
//! diagram.add_link(step, 0, end);
//!
//! let svg = layout_to_svg(&mut diagram, Direction::Horizontal, &SvgConfig::default());
//! assert!(svg.contains("<svg"));
//! assert!(svg.contains("Work"));
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod hit_test;
pub mod layout;
pub mod model;
pub mod renderer;
pub mod routing;
pub mod tools;

pub use config::{DiagramConfig, DEFAULT_CONFIG};
pub use error::{ConfigError, DiagramError};
pub use geometry::{Point, PointF, Rect, RectF, Size};
pub use hit_test::{find_link_at, node_at, nodes_at};
pub use layout::{auto_layout, LaneAssignment, LayoutConfig};
pub use model::{
    Branch, Diagram, Direction, EditOutcome, EditRequest, FactoryRegistry, Link, Node,
    NodeEditor, NodeFactory, NodeId, NodeKind, NodeVariant, Selected,
};
pub use renderer::{render_diagram, render_svg, render_svg_with_overlay, Renderer, SvgConfig};
pub use routing::{Fragment, LineType};
pub use tools::{Interaction, Modifiers, PointerButton, PointerEvent};

use tracing::debug_span;

/// Lay `diagram` out along `axis` and render it to SVG
///
/// This is the batch entry point: everything an editor would do across many
/// events, in one call.
pub fn layout_to_svg(diagram: &mut Diagram, axis: Direction, config: &SvgConfig) -> String {
    let _span = debug_span!("layout_to_svg", nodes = diagram.len(), ?axis).entered();
    auto_layout(diagram, axis);
    diagram.normalize_origin();
    render_svg(diagram, config)
}
