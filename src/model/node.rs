//! Node variants and their per-kind capabilities

use std::fmt;

use crate::geometry::{Point, Size};

/// Stable handle to a node in a [`Diagram`](super::Diagram).
///
/// Handles are never reused, so a handle to a removed node simply resolves
/// to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which sides links attach to, and the axis auto-layout runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Links leave on the right and enter on the left
    #[default]
    Horizontal,
    /// Links leave at the bottom and enter at the top
    Vertical,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }
}

/// The closed set of node kinds, used when creating nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeVariant {
    Start,
    End,
    Text,
    Condition,
    Container,
}

impl fmt::Display for NodeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeVariant::Start => "start",
            NodeVariant::End => "end",
            NodeVariant::Text => "text",
            NodeVariant::Condition => "condition",
            NodeVariant::Container => "container",
        };
        f.write_str(name)
    }
}

/// A named outgoing edge of a condition node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Branch {
    pub text: String,
    pub tag: Option<String>,
    pub(crate) target: Option<NodeId>,
}

impl Branch {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: None,
            target: None,
        }
    }

    /// The node this branch links to, if any
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }
}

/// Membership and fit state of a container node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerState {
    pub(crate) children: Vec<NodeId>,
    pub(crate) fitted_size: Size,
    pub(crate) fit_suspended: bool,
}

impl ContainerState {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_fit_suspended(&self) -> bool {
        self.fit_suspended
    }
}

/// Variant-specific state.
///
/// Outgoing slots are only writable through the diagram so the target's
/// parent list can never drift from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Single outgoing slot; cannot be linked to
    Start { target: Option<NodeId> },
    /// No outgoing links
    End,
    /// Single outgoing slot
    Text { target: Option<NodeId> },
    /// One outgoing slot per branch, in branch order
    Condition { branches: Vec<Branch> },
    /// Owns child nodes; has no links of its own
    Container(ContainerState),
}

impl NodeKind {
    pub(crate) fn empty(variant: NodeVariant) -> Self {
        match variant {
            NodeVariant::Start => NodeKind::Start { target: None },
            NodeVariant::End => NodeKind::End,
            NodeVariant::Text => NodeKind::Text { target: None },
            NodeVariant::Condition => NodeKind::Condition {
                branches: Vec::new(),
            },
            NodeVariant::Container => NodeKind::Container(ContainerState::default()),
        }
    }

    pub fn variant(&self) -> NodeVariant {
        match self {
            NodeKind::Start { .. } => NodeVariant::Start,
            NodeKind::End => NodeVariant::End,
            NodeKind::Text { .. } => NodeVariant::Text,
            NodeKind::Condition { .. } => NodeVariant::Condition,
            NodeKind::Container(_) => NodeVariant::Container,
        }
    }
}

/// A diagram node. Identity is the [`NodeId`] it lives under.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) position: Point,
    pub(crate) direction: Direction,
    pub(crate) text: String,
    pub(crate) tag: Option<String>,
    pub(crate) kind: NodeKind,
    pub(crate) parents: Vec<NodeId>,
    pub(crate) container: Option<NodeId>,
}

impl Node {
    pub(crate) fn new(variant: NodeVariant) -> Self {
        Self {
            position: Point::default(),
            direction: Direction::default(),
            text: String::new(),
            tag: None,
            kind: NodeKind::empty(variant),
            parents: Vec::new(),
            container: None,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn variant(&self) -> NodeVariant {
        self.kind.variant()
    }

    /// Nodes that currently link to this one, in the order they first linked
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// The container this node sits in
    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// Whether outgoing links may be added
    pub fn can_link(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Start { .. } | NodeKind::Text { .. } | NodeKind::Condition { .. }
        )
    }

    /// Whether other nodes may link to this one
    pub fn can_be_linked_to(&self) -> bool {
        !matches!(self.kind, NodeKind::Start { .. })
    }

    /// Outgoing slots in their fixed order. Empty slots are `None`.
    pub fn linked_nodes(&self) -> Vec<Option<NodeId>> {
        match &self.kind {
            NodeKind::Start { target } | NodeKind::Text { target } => vec![*target],
            NodeKind::Condition { branches } => branches.iter().map(|b| b.target).collect(),
            NodeKind::End | NodeKind::Container(_) => Vec::new(),
        }
    }

    /// Branches of a condition node; empty for every other kind
    pub fn branches(&self) -> &[Branch] {
        match &self.kind {
            NodeKind::Condition { branches } => branches,
            _ => &[],
        }
    }

    pub fn container_state(&self) -> Option<&ContainerState> {
        match &self.kind {
            NodeKind::Container(state) => Some(state),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container(_))
    }

    /// Size of this node given the diagram's default size and grid.
    ///
    /// Start and end nodes are squares of half the smaller default side.
    /// Condition nodes grow along their branch axis once the cells would be
    /// thinner than 10 px. Containers use their fitted size while they have
    /// children.
    pub fn effective_size(&self, default_size: Size, grid: Size) -> Size {
        match &self.kind {
            NodeKind::Start { .. } | NodeKind::End => {
                let side = default_size.width.min(default_size.height) / 2;
                Size::new(side, side)
            }
            NodeKind::Text { .. } => default_size,
            NodeKind::Condition { branches } => {
                let count = branches.len() as i32;
                if count == 0 {
                    return default_size;
                }
                match self.direction {
                    Direction::Horizontal if default_size.height / count < 10 => {
                        Size::new(default_size.width, 15 * count)
                    }
                    Direction::Vertical if default_size.width / count < 10 => {
                        Size::new(15 * count, default_size.height)
                    }
                    _ => default_size,
                }
            }
            NodeKind::Container(state) => {
                if state.children.is_empty() {
                    default_size
                } else {
                    state.fitted_size.round_to(grid)
                }
            }
        }
    }
}
