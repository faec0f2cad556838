//! Graph model: nodes, links, containers and the diagram that owns them

mod container;
mod diagram;
mod editor;
mod factory;
mod node;

pub use diagram::{Diagram, Selected, MIN_ZOOM};
pub use editor::{EditOutcome, EditRequest, NodeEditor};
pub use factory::{FactoryRegistry, NodeFactory, VariantFactory};
pub use node::{Branch, ContainerState, Direction, Node, NodeId, NodeKind, NodeVariant};

/// A connector, derived from an outgoing slot rather than stored.
///
/// Two links are equal when source, target and slot index all match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    /// Slot index at the source; the branch index for condition nodes
    pub index: usize,
}
