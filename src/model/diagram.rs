//! The diagram aggregate: node arena, link bookkeeping and selection

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::config::DiagramConfig;
use crate::geometry::{bounding_box, Point, Rect, Size};
use crate::hit_test;
use crate::layout::LayoutConfig;
use crate::routing::LineType;

use super::node::{Branch, Direction, Node, NodeId, NodeKind, NodeVariant};
use super::Link;

/// Zoom factors at or below this are clamped to it
pub const MIN_ZOOM: f32 = 0.1;

/// An entry of the selection set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selected {
    Node(NodeId),
    Link(Link),
}

/// A node-and-link diagram.
///
/// The diagram is the only mutator of its nodes. Every operation that touches
/// an outgoing slot also updates the target's parent list, so the two sides of
/// an edge can never disagree. Operations that cannot apply (unknown node,
/// wrong variant, out-of-range slot) do nothing and report `false`.
#[derive(Debug, Clone)]
pub struct Diagram {
    nodes: Vec<Option<Node>>,
    node_size: Size,
    grid_size: Size,
    zoom: f32,
    line_type: LineType,
    bezier_fragments: usize,
    layout: LayoutConfig,
    selection: HashSet<Selected>,
    redraw_required: bool,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::with_config(&DiagramConfig::default())
    }
}

impl Diagram {
    /// Create an empty diagram with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty diagram from a configuration
    pub fn with_config(config: &DiagramConfig) -> Self {
        let grid_size = config.grid_size();
        Self {
            nodes: Vec::new(),
            node_size: config.node_size().round_to(grid_size),
            grid_size,
            zoom: config.zoom.max(MIN_ZOOM),
            line_type: config.line_type,
            bezier_fragments: config.bezier_fragments,
            layout: config.layout.clone(),
            selection: HashSet::new(),
            redraw_required: true,
        }
    }

    // ---- settings ----

    /// Default node size, already snapped to the grid
    pub fn node_size(&self) -> Size {
        self.node_size
    }

    pub fn set_node_size(&mut self, size: Size) {
        self.node_size = size.round_to(self.grid_size);
        self.request_redraw();
    }

    pub fn grid_size(&self) -> Size {
        self.grid_size
    }

    pub fn set_grid_size(&mut self, grid: Size) {
        self.grid_size = grid;
        self.request_redraw();
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom factor. Values at or below 0.1 become 0.1.
    pub fn set_zoom(&mut self, zoom: f32) {
        let zoom = if zoom <= MIN_ZOOM { MIN_ZOOM } else { zoom };
        if zoom != self.zoom {
            self.zoom = zoom;
            self.request_redraw();
        }
    }

    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    pub fn set_line_type(&mut self, line_type: LineType) {
        if line_type != self.line_type {
            self.line_type = line_type;
            self.request_redraw();
        }
    }

    /// Number of fragments a bezier connector is sampled into
    pub fn bezier_fragments(&self) -> usize {
        self.bezier_fragments
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn set_layout_config(&mut self, config: LayoutConfig) {
        self.layout = config;
    }

    // ---- redraw signalling ----

    pub fn request_redraw(&mut self) {
        self.redraw_required = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw_required
    }

    /// Read and clear the redraw flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.redraw_required, false)
    }

    // ---- nodes ----

    /// Create a node of the given variant at the origin
    pub fn add_node(&mut self, variant: NodeVariant) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new(variant)));
        trace!(node = %id, %variant, "added node");
        self.request_redraw();
        id
    }

    /// Create a node of the given variant at `position`
    pub fn add_node_at(&mut self, variant: NodeVariant, position: Point) -> NodeId {
        let id = self.add_node(variant);
        self.place(id, position);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Live node handles in model order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes()
            .map(|(id, _)| id)
    }

    /// Live nodes in model order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (NodeId(i), n)))
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_start_node(&self) -> bool {
        self.nodes()
            .any(|(_, n)| matches!(n.kind, NodeKind::Start { .. }))
    }

    /// Effective size of a node
    pub fn size_of(&self, id: NodeId) -> Option<Size> {
        self.node(id)
            .map(|n| n.effective_size(self.node_size, self.grid_size))
    }

    /// The node's rectangle: position plus effective size
    pub fn area(&self, id: NodeId) -> Option<Rect> {
        let node = self.node(id)?;
        Some(Rect::from_point_size(
            node.position,
            node.effective_size(self.node_size, self.grid_size),
        ))
    }

    /// Move a node and refit the container it sits in
    pub fn set_position(&mut self, id: NodeId, position: Point) -> bool {
        if !self.place(id, position) {
            return false;
        }
        if let Some(container) = self.node(id).and_then(|n| n.container) {
            self.update_bounds(container);
        }
        true
    }

    /// Move a node without touching container bounds
    pub(crate) fn place(&mut self, id: NodeId, position: Point) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                self.request_redraw();
                true
            }
            None => false,
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.text = text.into();
                self.request_redraw();
                true
            }
            None => false,
        }
    }

    pub fn set_tag(&mut self, id: NodeId, tag: Option<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.tag = tag;
                true
            }
            None => false,
        }
    }

    pub fn set_direction(&mut self, id: NodeId, direction: Direction) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.direction = direction;
                self.request_redraw();
                true
            }
            None => false,
        }
    }

    /// Flip a node between horizontal and vertical link attachment
    pub fn toggle_direction(&mut self, id: NodeId) -> bool {
        match self.node(id).map(|n| n.direction) {
            Some(direction) => self.set_direction(id, direction.toggled()),
            None => false,
        }
    }

    /// Remove a node after tearing down every incident link, its container
    /// membership and any selection entries that mention it. A removed
    /// container releases its children.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let outgoing: Vec<NodeId> = node.linked_nodes().into_iter().flatten().collect();
        for target in outgoing {
            self.remove_link(id, target);
        }
        let incoming = self.node(id).map(|n| n.parents.clone()).unwrap_or_default();
        for parent in incoming {
            self.remove_link(parent, id);
        }

        self.remove_from_container(id);
        let released = self
            .node(id)
            .and_then(|n| n.container_state())
            .map(|state| state.children.clone())
            .unwrap_or_default();
        for child in released {
            if let Some(child) = self.node_mut(child) {
                child.container = None;
            }
        }

        self.selection.retain(|item| match item {
            Selected::Node(n) => *n != id,
            Selected::Link(link) => link.from != id && link.to != id,
        });
        self.nodes[id.0] = None;
        debug!(node = %id, "removed node");
        self.request_redraw();
        true
    }

    // ---- links ----

    /// Outgoing links of a node, skipping empty slots
    pub fn links_from(&self, id: NodeId) -> Vec<Link> {
        self.node(id)
            .map(|node| {
                node.linked_nodes()
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, target)| {
                        target.map(|to| Link {
                            from: id,
                            to,
                            index,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every link in the diagram, sources in model order
    pub fn links(&self) -> Vec<Link> {
        self.node_ids()
            .flat_map(|id| self.links_from(id))
            .collect()
    }

    /// Whether `link` still describes a live slot
    pub fn has_link(&self, link: Link) -> bool {
        self.target_of(link.from, link.index) == Some(link.to)
    }

    /// Current target of an outgoing slot
    pub fn target_of(&self, source: NodeId, slot: usize) -> Option<NodeId> {
        self.node(source)
            .and_then(|n| n.linked_nodes().get(slot).copied().flatten())
    }

    /// Point outgoing `slot` of `source` at `target`.
    ///
    /// Start and text nodes only have slot 0; condition nodes have one slot
    /// per branch. A previous target of the slot loses `source` as parent.
    /// No-op when `source` cannot link or `target` cannot be linked to.
    pub fn add_link(&mut self, source: NodeId, slot: usize, target: NodeId) -> bool {
        match self.node(source) {
            Some(node) if node.can_link() => {}
            _ => return false,
        }
        match self.node(target) {
            Some(node) if node.can_be_linked_to() => {}
            _ => return false,
        }
        let Some(slot) = self.slot_mut(source, slot) else {
            return false;
        };
        let previous = slot.replace(target);
        if previous == Some(target) {
            return false;
        }
        if let Some(old) = previous {
            self.detach_parent(old, source);
        }
        self.attach_parent(target, source);
        trace!(from = %source, to = %target, "linked");
        self.request_redraw();
        true
    }

    /// Clear every outgoing slot of `source` that points at `target`
    pub fn remove_link(&mut self, source: NodeId, target: NodeId) -> bool {
        let slots: Vec<usize> = match self.node(source) {
            Some(node) => node
                .linked_nodes()
                .iter()
                .enumerate()
                .filter(|(_, t)| **t == Some(target))
                .map(|(i, _)| i)
                .collect(),
            None => return false,
        };
        if slots.is_empty() {
            return false;
        }
        for index in slots {
            if let Some(slot) = self.slot_mut(source, index) {
                *slot = None;
            }
        }
        self.detach_parent(target, source);
        trace!(from = %source, to = %target, "unlinked");
        self.request_redraw();
        true
    }

    /// Clear a single outgoing slot
    pub fn unlink_slot(&mut self, source: NodeId, slot: usize) -> bool {
        let Some(previous) = self.slot_mut(source, slot).and_then(|s| s.take()) else {
            return false;
        };
        self.detach_parent(previous, source);
        self.request_redraw();
        true
    }

    fn slot_mut(&mut self, source: NodeId, slot: usize) -> Option<&mut Option<NodeId>> {
        match &mut self.node_mut(source)?.kind {
            NodeKind::Start { target } | NodeKind::Text { target } if slot == 0 => Some(target),
            NodeKind::Condition { branches } => branches.get_mut(slot).map(|b| &mut b.target),
            _ => None,
        }
    }

    fn references(&self, source: NodeId, target: NodeId) -> bool {
        self.node(source)
            .is_some_and(|n| n.linked_nodes().contains(&Some(target)))
    }

    /// Record `source` as a parent of `target`. Only for callers that have
    /// just written the matching outgoing slot.
    pub(super) fn attach_parent(&mut self, target: NodeId, source: NodeId) {
        if let Some(node) = self.node_mut(target) {
            if !node.parents.contains(&source) {
                node.parents.push(source);
            }
        }
    }

    /// Drop `source` from `target`'s parents once no slot of `source` points
    /// at `target` any more. Only for callers that have just cleared a slot.
    pub(super) fn detach_parent(&mut self, target: NodeId, source: NodeId) {
        if self.references(source, target) {
            return;
        }
        if let Some(node) = self.node_mut(target) {
            node.parents.retain(|p| *p != source);
        }
    }

    // ---- branches ----

    /// Append a branch to a condition node
    pub fn add_branch(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Condition { branches }) => {
                branches.push(Branch::new(text));
                self.request_redraw();
                true
            }
            _ => false,
        }
    }

    pub fn set_branch_text(&mut self, id: NodeId, index: usize, text: impl Into<String>) -> bool {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Condition { branches }) => match branches.get_mut(index) {
                Some(branch) => {
                    branch.text = text.into();
                    self.request_redraw();
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Remove a branch, releasing its link
    pub fn remove_branch(&mut self, id: NodeId, index: usize) -> bool {
        let removed = match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Condition { branches }) if index < branches.len() => {
                branches.remove(index)
            }
            _ => return false,
        };
        if let Some(target) = removed.target {
            self.detach_parent(target, id);
        }
        self.selection.retain(|item| match item {
            Selected::Link(link) => link.from != id || link.index < index,
            Selected::Node(_) => true,
        });
        self.request_redraw();
        true
    }

    // ---- selection ----

    pub fn selection(&self) -> &HashSet<Selected> {
        &self.selection
    }

    pub fn is_selected(&self, item: Selected) -> bool {
        self.selection.contains(&item)
    }

    pub fn select(&mut self, item: Selected) -> bool {
        let changed = self.selection.insert(item);
        if changed {
            self.request_redraw();
        }
        changed
    }

    pub fn deselect(&mut self, item: Selected) -> bool {
        let changed = self.selection.remove(&item);
        if changed {
            self.request_redraw();
        }
        changed
    }

    /// Add the item if absent, remove it if present
    pub fn toggle_selected(&mut self, item: Selected) {
        if !self.deselect(item) {
            self.select(item);
        }
    }

    /// Replace the whole selection, returning whether it changed
    pub fn set_selection<I>(&mut self, items: I) -> bool
    where
        I: IntoIterator<Item = Selected>,
    {
        let selection: HashSet<Selected> = items.into_iter().collect();
        if selection == self.selection {
            return false;
        }
        self.selection = selection;
        self.request_redraw();
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        self.set_selection(std::iter::empty())
    }

    /// Selected nodes, sorted by handle
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .selection
            .iter()
            .filter_map(|item| match item {
                Selected::Node(id) => Some(*id),
                Selected::Link(_) => None,
            })
            .collect();
        nodes.sort();
        nodes
    }

    /// Selected links, sorted by source, slot and target
    pub fn selected_links(&self) -> Vec<Link> {
        let mut links: Vec<Link> = self
            .selection
            .iter()
            .filter_map(|item| match item {
                Selected::Link(link) => Some(*link),
                Selected::Node(_) => None,
            })
            .collect();
        links.sort_by_key(|l| (l.from, l.index, l.to));
        links
    }

    /// Select whatever is under `point`: the topmost node, else a link,
    /// else nothing. An item that is already selected keeps the current
    /// selection intact so a multi-selection can be dragged. Returns whether
    /// the selection changed.
    pub fn select_at(&mut self, point: Point) -> bool {
        let hit = match hit_test::node_at(self, point) {
            Some(node) => Some(Selected::Node(node)),
            None => hit_test::find_link_at(self, point.to_f()).map(Selected::Link),
        };
        match hit {
            Some(item) if self.is_selected(item) => false,
            Some(item) => self.set_selection([item]),
            None => self.clear_selection(),
        }
    }

    /// Remove every selected link and node
    pub fn delete_selected(&mut self) -> bool {
        let mut changed = false;
        for link in self.selected_links() {
            if self.has_link(link) {
                changed |= self.unlink_slot(link.from, link.index);
            }
        }
        for node in self.selected_nodes() {
            changed |= self.remove_node(node);
        }
        self.selection.clear();
        if changed {
            self.request_redraw();
        }
        changed
    }

    // ---- extent ----

    /// Shift every node by the same offset. Container bounds move along.
    pub(crate) fn translate_all(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        for node in self.nodes.iter_mut().flatten() {
            node.position = node.position.offset(dx, dy);
        }
        self.request_redraw();
    }

    /// Shift every node so the diagram starts at non-negative coordinates.
    ///
    /// Returns the scrollable content extent at the current zoom.
    pub fn normalize_origin(&mut self) -> Size {
        let Some(bbox) = bounding_box(self.node_ids().filter_map(|id| self.area(id))) else {
            return Size::default();
        };
        let dx = if bbox.left() < 0 { -bbox.left() } else { 0 };
        let dy = if bbox.top() < 0 { -bbox.top() } else { 0 };
        self.translate_all(dx, dy);
        let extent = Point::new(bbox.right() + dx + 1, bbox.bottom() + dy + 1).scale(self.zoom);
        Size::new(extent.x, extent.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (Diagram, NodeId, NodeId, NodeId) {
        let mut d = Diagram::new();
        let start = d.add_node(NodeVariant::Start);
        let text = d.add_node(NodeVariant::Text);
        let end = d.add_node(NodeVariant::End);
        assert!(d.add_link(start, 0, text));
        assert!(d.add_link(text, 0, end));
        (d, start, text, end)
    }

    #[test]
    fn test_default_settings() {
        let d = Diagram::new();
        assert_eq!(d.node_size(), Size::new(96, 48));
        assert_eq!(d.grid_size(), Size::new(8, 8));
        assert_eq!(d.line_type(), LineType::Bezier);
        assert_eq!(d.zoom(), 1.0);
    }

    #[test]
    fn test_add_link_updates_parents() {
        let (d, start, text, end) = chain();
        assert_eq!(d.node(text).unwrap().parents(), &[start]);
        assert_eq!(d.node(end).unwrap().parents(), &[text]);
        assert_eq!(d.links().len(), 2);
    }

    #[test]
    fn test_relinking_slot_moves_parent_entry() {
        let (mut d, start, text, end) = chain();
        assert!(d.add_link(start, 0, end));
        assert!(d.node(text).unwrap().parents().is_empty());
        assert_eq!(d.node(end).unwrap().parents(), &[text, start]);
    }

    #[test]
    fn test_same_target_again_is_noop() {
        let (mut d, start, text, _) = chain();
        assert!(!d.add_link(start, 0, text));
        assert_eq!(d.node(text).unwrap().parents(), &[start]);
    }

    #[test]
    fn test_rejected_links() {
        let (mut d, start, text, end) = chain();
        // end cannot link, start cannot be linked to
        assert!(!d.add_link(end, 0, text));
        assert!(!d.add_link(text, 0, start));
        // single-slot node has no slot 1
        assert!(!d.add_link(text, 1, end));
        let container = d.add_node(NodeVariant::Container);
        assert!(!d.add_link(container, 0, end));
        assert_eq!(d.links().len(), 2);
    }

    #[test]
    fn test_remove_link_clears_both_sides() {
        let (mut d, _, text, end) = chain();
        assert!(d.remove_link(text, end));
        assert!(d.node(end).unwrap().parents().is_empty());
        assert_eq!(d.target_of(text, 0), None);
        assert!(!d.remove_link(text, end));
    }

    #[test]
    fn test_condition_two_branches_same_target() {
        let mut d = Diagram::new();
        let cond = d.add_node(NodeVariant::Condition);
        let end = d.add_node(NodeVariant::End);
        d.add_branch(cond, "yes");
        d.add_branch(cond, "no");
        assert!(d.add_link(cond, 0, end));
        assert!(d.add_link(cond, 1, end));
        assert_eq!(d.node(end).unwrap().parents(), &[cond]);

        assert!(d.unlink_slot(cond, 0));
        // branch 1 still points there
        assert_eq!(d.node(end).unwrap().parents(), &[cond]);
        assert!(d.unlink_slot(cond, 1));
        assert!(d.node(end).unwrap().parents().is_empty());
    }

    #[test]
    fn test_remove_branch_releases_link() {
        let mut d = Diagram::new();
        let cond = d.add_node(NodeVariant::Condition);
        let a = d.add_node(NodeVariant::Text);
        let b = d.add_node(NodeVariant::Text);
        d.add_branch(cond, "yes");
        d.add_branch(cond, "no");
        d.add_link(cond, 0, a);
        d.add_link(cond, 1, b);

        assert!(d.remove_branch(cond, 1));
        assert!(d.node(b).unwrap().parents().is_empty());
        assert_eq!(d.node(a).unwrap().parents(), &[cond]);
        assert!(!d.remove_branch(cond, 5));
    }

    #[test]
    fn test_remove_node_tears_down_all_edges() {
        let (mut d, start, text, end) = chain();
        d.select(Selected::Node(text));
        d.select(Selected::Link(Link {
            from: start,
            to: text,
            index: 0,
        }));
        assert!(d.remove_node(text));
        assert!(!d.contains(text));
        assert_eq!(d.target_of(start, 0), None);
        assert!(d.node(end).unwrap().parents().is_empty());
        assert!(d.selection().is_empty());
        assert!(!d.remove_node(text));
    }

    #[test]
    fn test_delete_selected_link_only_clears_that_slot() {
        let (mut d, start, text, end) = chain();
        d.set_selection([Selected::Link(Link {
            from: text,
            to: end,
            index: 0,
        })]);
        assert!(d.delete_selected());
        assert_eq!(d.target_of(start, 0), Some(text));
        assert_eq!(d.target_of(text, 0), None);
        assert!(d.selection().is_empty());
    }

    #[test]
    fn test_zoom_clamps() {
        let mut d = Diagram::new();
        d.set_zoom(0.05);
        assert_eq!(d.zoom(), MIN_ZOOM);
        d.set_zoom(2.0);
        assert_eq!(d.zoom(), 2.0);
    }

    #[test]
    fn test_normalize_origin_shifts_negative_nodes() {
        let mut d = Diagram::new();
        let a = d.add_node_at(NodeVariant::Text, Point::new(-10, 20));
        let b = d.add_node_at(NodeVariant::Text, Point::new(50, -30));
        let extent = d.normalize_origin();
        assert_eq!(d.node(a).unwrap().position(), Point::new(0, 50));
        assert_eq!(d.node(b).unwrap().position(), Point::new(60, 0));
        assert_eq!(extent, Size::new(60 + 96 + 1, 50 + 48 + 1));
    }

    #[test]
    fn test_normalize_origin_extent_follows_zoom() {
        let mut d = Diagram::new();
        d.add_node_at(NodeVariant::Text, Point::new(0, 0));
        d.set_zoom(0.5);
        // (96 + 1) * 0.5 and (48 + 1) * 0.5, truncated
        assert_eq!(d.normalize_origin(), Size::new(48, 24));
    }

    #[test]
    fn test_redraw_flag() {
        let mut d = Diagram::new();
        assert!(d.take_redraw());
        assert!(!d.needs_redraw());
        d.add_node(NodeVariant::End);
        assert!(d.needs_redraw());
    }

    #[test]
    fn test_toggle_direction() {
        let mut d = Diagram::new();
        let n = d.add_node(NodeVariant::Text);
        assert!(d.toggle_direction(n));
        assert_eq!(d.node(n).unwrap().direction(), Direction::Vertical);
    }
}
