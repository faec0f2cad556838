//! Container membership and bounds fitting
//!
//! A container's area is derived from its children: the union of their
//! areas, inflated by one grid cell, with a title strip on top. Fits
//! propagate upward through nested containers. Bulk moves suspend fitting
//! on the affected containers and refit once at the end, deepest first.

use tracing::trace;

use crate::geometry::{bounding_box, Point, Size};

use super::diagram::Diagram;
use super::node::{NodeId, NodeKind};

/// Height reserved above the children for the container's title
const TITLE_PADDING: i32 = 20;

impl Diagram {
    /// Move `child` into `container`, leaving any previous container.
    ///
    /// Refused when `container` is not a container, when `child` is already
    /// in it, or when the move would make a container contain itself.
    pub fn add_to_container(&mut self, container: NodeId, child: NodeId) -> bool {
        if container == child || !self.contains(child) {
            return false;
        }
        match self.node(container) {
            Some(node) if node.is_container() => {}
            _ => return false,
        }
        if self.node(child).and_then(|n| n.container) == Some(container) {
            return false;
        }
        if self.ancestors(container).contains(&child) {
            return false;
        }

        self.remove_from_container(child);
        if let Some(NodeKind::Container(state)) = self.node_mut(container).map(|n| &mut n.kind) {
            state.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.container = Some(container);
        }
        trace!(%container, %child, "adopted child");
        self.update_bounds(container);
        true
    }

    /// Take `child` out of its container, refitting the container
    pub fn remove_from_container(&mut self, child: NodeId) -> bool {
        let Some(container) = self.node(child).and_then(|n| n.container) else {
            return false;
        };
        if let Some(NodeKind::Container(state)) = self.node_mut(container).map(|n| &mut n.kind) {
            state.children.retain(|c| *c != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.container = None;
        }
        self.update_bounds(container);
        true
    }

    /// Containers enclosing `id`, innermost first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.node(id).and_then(|n| n.container);
        while let Some(parent) = current {
            if ancestors.contains(&parent) {
                break;
            }
            ancestors.push(parent);
            current = self.node(parent).and_then(|n| n.container);
        }
        ancestors
    }

    /// Nesting depth: 0 for a node outside any container
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// Every node nested inside `container`, at any depth, in pre-order
    pub fn all_children(&self, container: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self
            .children_of(container)
            .iter()
            .rev()
            .copied()
            .collect();
        while let Some(id) = stack.pop() {
            if result.contains(&id) {
                continue;
            }
            result.push(id);
            stack.extend(self.children_of(id).iter().rev().copied());
        }
        result
    }

    /// Direct children of a container; empty for other nodes
    pub fn children_of(&self, container: NodeId) -> &[NodeId] {
        self.node(container)
            .and_then(|n| n.container_state())
            .map(|s| s.children())
            .unwrap_or(&[])
    }

    /// Refit `container` from its children, then every enclosing container.
    ///
    /// A suspended container keeps its bounds but the walk still continues to
    /// its parent.
    pub fn update_bounds(&mut self, container: NodeId) {
        let mut current = Some(container);
        let mut visited = Vec::new();
        while let Some(id) = current {
            if visited.contains(&id) {
                break;
            }
            visited.push(id);
            self.fit(id);
            current = self.node(id).and_then(|n| n.container);
        }
    }

    fn fit(&mut self, container: NodeId) {
        let Some(state) = self.node(container).and_then(|n| n.container_state()) else {
            return;
        };
        if state.fit_suspended || state.children.is_empty() {
            return;
        }
        let children = state.children.clone();
        let Some(bbox) = bounding_box(children.iter().filter_map(|c| self.area(*c))) else {
            return;
        };

        let grid = self.grid_size();
        let (grid_w, grid_h) = grid.clamped();
        let bbox = bbox.inflate(grid_w, grid_h);
        let padding = TITLE_PADDING / grid_h * grid_h;
        let position = Point::new(bbox.x, bbox.y - padding).round_to(grid);
        let fitted = Size::new(bbox.width, bbox.height + padding);

        if let Some(node) = self.node_mut(container) {
            node.position = position;
            if let NodeKind::Container(state) = &mut node.kind {
                state.fitted_size = fitted;
            }
        }
        trace!(%container, x = position.x, y = position.y, w = fitted.width, h = fitted.height, "fitted container");
        self.request_redraw();
    }

    /// Stop `container` from refitting until [`resume_fit`](Self::resume_fit)
    pub fn suspend_fit(&mut self, container: NodeId) -> bool {
        self.set_fit_suspended(container, true)
    }

    /// Allow `container` to refit again. Does not fit by itself.
    pub fn resume_fit(&mut self, container: NodeId) -> bool {
        self.set_fit_suspended(container, false)
    }

    fn set_fit_suspended(&mut self, container: NodeId, suspended: bool) -> bool {
        match self.node_mut(container).map(|n| &mut n.kind) {
            Some(NodeKind::Container(state)) => {
                state.fit_suspended = suspended;
                true
            }
            _ => false,
        }
    }

    /// Resume every container in `containers` and refit them deepest first
    pub fn resume_fits(&mut self, containers: &[NodeId]) {
        for container in self.deepest_first(containers) {
            self.resume_fit(container);
            self.update_bounds(container);
        }
    }

    /// Run `f` with fitting suspended on `containers`, then resume and refit
    /// them deepest first.
    pub fn with_fit_suspended<F, R>(&mut self, containers: &[NodeId], f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        for container in containers {
            self.suspend_fit(*container);
        }
        let result = f(self);
        self.resume_fits(containers);
        result
    }

    /// Refit every container in the diagram, deepest first
    pub fn fit_all(&mut self) {
        let containers: Vec<NodeId> = self
            .nodes()
            .filter(|(_, n)| n.is_container())
            .map(|(id, _)| id)
            .collect();
        for container in self.deepest_first(&containers) {
            self.update_bounds(container);
        }
    }

    /// Deduplicated containers sorted by descending depth, stable otherwise
    pub(crate) fn deepest_first(&self, containers: &[NodeId]) -> Vec<NodeId> {
        let mut ordered: Vec<NodeId> = Vec::with_capacity(containers.len());
        for id in containers {
            if !ordered.contains(id) {
                ordered.push(*id);
            }
        }
        ordered.sort_by_key(|id| std::cmp::Reverse(self.depth(*id)));
        ordered
    }
}
