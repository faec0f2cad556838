//! Node factories: named creation actions with keyboard shortcuts

use tracing::{debug, warn};

use crate::error::DiagramError;
use crate::geometry::Point;

use super::diagram::Diagram;
use super::editor::NodeEditor;
use super::node::{NodeId, NodeVariant};

/// A creation action offered to the user
pub trait NodeFactory {
    /// Menu name, also used to look the factory up
    fn name(&self) -> &str;

    /// Key sequence that triggers this factory
    fn shortcut(&self) -> &[char];

    /// Add a new node to `diagram`
    fn create(&self, diagram: &mut Diagram) -> Result<NodeId, DiagramError>;
}

/// Factory for one node variant
#[derive(Debug, Clone)]
pub struct VariantFactory {
    name: String,
    shortcut: Vec<char>,
    variant: NodeVariant,
}

impl VariantFactory {
    pub fn new(name: impl Into<String>, shortcut: &[char], variant: NodeVariant) -> Self {
        Self {
            name: name.into(),
            shortcut: shortcut.to_vec(),
            variant,
        }
    }

    pub fn variant(&self) -> NodeVariant {
        self.variant
    }
}

impl NodeFactory for VariantFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn shortcut(&self) -> &[char] {
        &self.shortcut
    }

    fn create(&self, diagram: &mut Diagram) -> Result<NodeId, DiagramError> {
        // a diagram has at most one start node
        if self.variant == NodeVariant::Start && diagram.has_start_node() {
            warn!(factory = %self.name, "start node already present");
            return Err(DiagramError::FactoryRefused {
                factory: self.name.clone(),
            });
        }
        Ok(diagram.add_node(self.variant))
    }
}

/// Ordered set of node factories
pub struct FactoryRegistry {
    factories: Vec<Box<dyn NodeFactory>>,
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl FactoryRegistry {
    /// A registry with no factories
    pub fn empty() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// A registry with the five built-in node kinds
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(VariantFactory::new("Text node", &['N', 'T'], NodeVariant::Text));
        registry.register(VariantFactory::new(
            "Condition node",
            &['N', 'D'],
            NodeVariant::Condition,
        ));
        registry.register(VariantFactory::new(
            "Container node",
            &['N', 'C'],
            NodeVariant::Container,
        ));
        registry.register(VariantFactory::new("Start node", &['N', 'S'], NodeVariant::Start));
        registry.register(VariantFactory::new("End node", &['N', 'E'], NodeVariant::End));
        registry
    }

    pub fn register<F>(&mut self, factory: F)
    where
        F: NodeFactory + 'static,
    {
        self.factories.push(Box::new(factory));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.iter().map(|f| f.name())
    }

    pub fn get(&self, name: &str) -> Option<&dyn NodeFactory> {
        self.factories
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.as_ref())
    }

    pub fn by_shortcut(&self, keys: &[char]) -> Option<&dyn NodeFactory> {
        self.factories
            .iter()
            .find(|f| f.shortcut() == keys)
            .map(|f| f.as_ref())
    }

    /// Create a node with the named factory, centred on `center`, and open it
    /// in `editor`.
    ///
    /// A cancelled edit discards the new node and yields `Ok(None)`.
    pub fn create_at(
        &self,
        diagram: &mut Diagram,
        name: &str,
        center: Point,
        editor: &mut dyn NodeEditor,
    ) -> Result<Option<NodeId>, DiagramError> {
        let factory = self
            .get(name)
            .ok_or_else(|| DiagramError::UnknownFactory(name.to_string()))?;
        let id = factory.create(diagram)?;
        let size = diagram.size_of(id).unwrap_or_default();
        diagram.set_position(id, center.offset(-size.width / 2, -size.height / 2));

        if !diagram.open_editor(id, editor) {
            diagram.remove_node(id);
            return Ok(None);
        }
        debug!(node = %id, factory = name, "created node");
        Ok(Some(id))
    }
}
