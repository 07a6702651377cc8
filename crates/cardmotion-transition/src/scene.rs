#![forbid(unsafe_code)]

//! Headless retained scene graph.
//!
//! The transition engine never talks to a concrete UI toolkit. It moves,
//! hides, re-parents, and rounds nodes in a [`Scene`]; the host mirrors the
//! resulting frames and flags into whatever views it actually renders.
//!
//! # Invariants
//!
//! 1. [`NodeId`]s are never reused. A removed node reads back as absent,
//!    which is how a deallocated origin view is detected.
//! 2. A [`Layout::FullBleed`] node always has its parent's bounds as frame.
//! 3. `live_temporary_containers()` equals containers created minus
//!    containers removed.
//!
//! # Coordinates
//!
//! A node's frame is relative to its parent's content: children of a node
//! with scroll offset `s` are drawn `s` points higher. A node's scale
//! transform is applied about its own center and affects only its rendered
//! frame, never its layout.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use cardmotion_core::geometry::{Rect, Size};

/// Shared handle to a scene. All transition work runs on one thread.
pub type SharedScene = Rc<RefCell<Scene>>;

/// Identifier of a node in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Raw numeric value (for logging).
    #[inline]
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// How a node's frame is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// The frame is whatever was last set.
    #[default]
    Absolute,
    /// The frame tracks the parent's bounds.
    FullBleed,
}

#[derive(Debug, Clone)]
struct Node {
    label: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    frame: Rect,
    layout: Layout,
    hidden: bool,
    alpha: f64,
    scale: f64,
    corner_radius: f64,
    scroll_offset: f64,
    scroll_enabled: bool,
    temporary: bool,
}

impl Node {
    fn new(frame: Rect) -> Self {
        Self {
            label: None,
            parent: None,
            children: Vec::new(),
            frame,
            layout: Layout::Absolute,
            hidden: false,
            alpha: 1.0,
            scale: 1.0,
            corner_radius: 0.0,
            scroll_offset: 0.0,
            scroll_enabled: true,
            temporary: false,
        }
    }
}

/// A tree of rectangular nodes rooted at the screen.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: AHashMap<NodeId, Node>,
    next_id: u64,
    root: NodeId,
    containers_created: usize,
    containers_removed: usize,
}

impl Scene {
    /// Create a scene whose root covers a screen of `size`.
    #[must_use]
    pub fn new(size: Size) -> Self {
        let root = NodeId(0);
        let mut node = Node::new(Rect::from_size(size));
        node.label = Some("root".to_string());
        let mut nodes = AHashMap::new();
        nodes.insert(root, node);
        Self {
            nodes,
            next_id: 1,
            root,
            containers_created: 0,
            containers_removed: 0,
        }
    }

    /// Wrap in a shared handle.
    #[must_use]
    pub fn shared(self) -> SharedScene {
        Rc::new(RefCell::new(self))
    }

    /// The screen root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Screen bounds (the root frame).
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.nodes.get(&self.root).map(|n| n.frame).unwrap_or_default()
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root cannot be removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    /// Add a node under `parent` with an absolute frame.
    ///
    /// Returns `None` if `parent` does not exist.
    pub fn add_node(&mut self, parent: NodeId, frame: Rect) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(frame));
        self.attach(id, parent);
        Some(id)
    }

    /// Add a labeled node (labels only aid debugging).
    pub fn add_labeled(&mut self, parent: NodeId, frame: Rect, label: &str) -> Option<NodeId> {
        let id = self.add_node(parent, frame)?;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.label = Some(label.to_string());
        }
        Some(id)
    }

    /// Create a temporary animation container under `parent`.
    pub fn create_temporary_container(&mut self, parent: NodeId, frame: Rect) -> Option<NodeId> {
        let id = self.add_labeled(parent, frame, "transition-container")?;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.temporary = true;
        }
        self.containers_created += 1;
        Some(id)
    }

    /// Remove a node and its whole subtree. The root cannot be removed.
    ///
    /// Returns `false` if the node did not exist.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.contains(id) {
            return false;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                if node.temporary {
                    self.containers_removed += 1;
                }
                stack.extend(node.children);
            }
        }
        true
    }

    /// Unlink a node from its parent, keeping it (and its subtree) alive.
    pub fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get_mut(&id).and_then(|n| n.parent.take());
        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(&parent)
        {
            p.children.retain(|c| *c != id);
        }
    }

    /// Move a node under a new parent (appended on top of its siblings).
    ///
    /// Refuses to create cycles.
    pub fn reparent(&mut self, id: NodeId, parent: NodeId) -> bool {
        if id == self.root || !self.contains(id) || !self.contains(parent) {
            return false;
        }
        if self.is_ancestor_or_self(id, parent) {
            return false;
        }
        self.detach(id);
        self.attach(id, parent);
        true
    }

    fn attach(&mut self, id: NodeId, parent: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        self.relayout(id);
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(p) => node = p,
                None => return false,
            }
        }
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Children in back-to-front order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).and_then(|n| n.label.as_deref())
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    /// Frame relative to the parent.
    #[must_use]
    pub fn frame(&self, id: NodeId) -> Option<Rect> {
        self.nodes.get(&id).map(|n| n.frame)
    }

    /// Set an absolute frame and switch the node to [`Layout::Absolute`].
    pub fn set_frame(&mut self, id: NodeId, frame: Rect) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.layout = Layout::Absolute;
            node.frame = frame;
        }
        self.relayout_children(id);
    }

    #[must_use]
    pub fn layout(&self, id: NodeId) -> Option<Layout> {
        self.nodes.get(&id).map(|n| n.layout)
    }

    /// Change the layout mode; `FullBleed` snaps to the parent's bounds.
    pub fn set_layout(&mut self, id: NodeId, layout: Layout) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.layout = layout;
        }
        self.relayout(id);
    }

    fn relayout(&mut self, id: NodeId) {
        let parent_size = self
            .parent(id)
            .and_then(|p| self.nodes.get(&p))
            .map(|p| p.frame.size());
        if let (Some(size), Some(node)) = (parent_size, self.nodes.get_mut(&id))
            && node.layout == Layout::FullBleed
        {
            node.frame = Rect::from_size(size);
        }
        self.relayout_children(id);
    }

    fn relayout_children(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            if self.layout(child) == Some(Layout::FullBleed) {
                self.relayout(child);
            }
        }
    }

    /// Rendered frame in screen coordinates, including the node's own scale
    /// transform. `None` if the node is gone or not attached to the root.
    #[must_use]
    pub fn screen_frame(&self, id: NodeId) -> Option<Rect> {
        let rest = self.frame_at_rest(id)?;
        let scale = self.nodes.get(&id)?.scale;
        Some(rest.scaled_about_center(scale))
    }

    /// Frame in screen coordinates ignoring the node's transform.
    #[must_use]
    pub fn frame_at_rest(&self, id: NodeId) -> Option<Rect> {
        let node = self.nodes.get(&id)?;
        let mut frame = node.frame;
        let mut cursor = node.parent;
        let mut reached_root = id == self.root;
        while let Some(pid) = cursor {
            let parent = self.nodes.get(&pid)?;
            frame = frame.offset(parent.frame.x, parent.frame.y - parent.scroll_offset);
            if pid == self.root {
                reached_root = true;
            }
            cursor = parent.parent;
        }
        reached_root.then_some(frame)
    }

    // -----------------------------------------------------------------------
    // Visual properties
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn is_hidden(&self, id: NodeId) -> Option<bool> {
        self.nodes.get(&id).map(|n| n.hidden)
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.hidden = hidden;
        }
    }

    #[must_use]
    pub fn alpha(&self, id: NodeId) -> Option<f64> {
        self.nodes.get(&id).map(|n| n.alpha)
    }

    pub fn set_alpha(&mut self, id: NodeId, alpha: f64) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    #[must_use]
    pub fn scale(&self, id: NodeId) -> Option<f64> {
        self.nodes.get(&id).map(|n| n.scale)
    }

    pub fn set_scale(&mut self, id: NodeId, scale: f64) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.scale = scale;
        }
    }

    #[must_use]
    pub fn corner_radius(&self, id: NodeId) -> Option<f64> {
        self.nodes.get(&id).map(|n| n.corner_radius)
    }

    pub fn set_corner_radius(&mut self, id: NodeId, radius: f64) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.corner_radius = radius.max(0.0);
        }
    }

    // -----------------------------------------------------------------------
    // Scrolling
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn scroll_offset(&self, id: NodeId) -> Option<f64> {
        self.nodes.get(&id).map(|n| n.scroll_offset)
    }

    pub fn set_scroll_offset(&mut self, id: NodeId, offset: f64) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.scroll_offset = offset;
        }
    }

    #[must_use]
    pub fn is_scroll_enabled(&self, id: NodeId) -> Option<bool> {
        self.nodes.get(&id).map(|n| n.scroll_enabled)
    }

    pub fn set_scroll_enabled(&mut self, id: NodeId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.scroll_enabled = enabled;
        }
    }

    // -----------------------------------------------------------------------
    // Temporary containers
    // -----------------------------------------------------------------------

    /// Temporary containers created over the scene's lifetime.
    #[inline]
    #[must_use]
    pub fn containers_created(&self) -> usize {
        self.containers_created
    }

    /// Temporary containers removed over the scene's lifetime.
    #[inline]
    #[must_use]
    pub fn containers_removed(&self) -> usize {
        self.containers_removed
    }

    /// Temporary containers currently alive.
    #[inline]
    #[must_use]
    pub fn live_temporary_containers(&self) -> usize {
        self.containers_created - self.containers_removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(Size::new(390.0, 844.0))
    }

    #[test]
    fn removed_nodes_read_back_as_absent() {
        let mut s = scene();
        let grid = s.add_node(s.root(), s.bounds()).unwrap();
        let cell = s.add_node(grid, Rect::new(20.0, 500.0, 150.0, 220.0)).unwrap();
        assert!(s.remove(grid));
        assert!(!s.contains(cell), "subtree is removed with its parent");
        assert_eq!(s.frame(cell), None);
        assert_eq!(s.screen_frame(cell), None);
        assert!(!s.remove(s.root()));
    }

    #[test]
    fn screen_frame_accounts_for_scroll_and_scale() {
        let mut s = scene();
        let grid = s.add_node(s.root(), s.bounds()).unwrap();
        let cell = s.add_node(grid, Rect::new(20.0, 700.0, 150.0, 220.0)).unwrap();
        s.set_scroll_offset(grid, 200.0);
        assert_eq!(s.frame_at_rest(cell), Some(Rect::new(20.0, 500.0, 150.0, 220.0)));

        s.set_scale(cell, 0.5);
        let rendered = s.screen_frame(cell).unwrap();
        assert_eq!(rendered.size(), Size::new(75.0, 110.0));
        assert_eq!(rendered.center(), Rect::new(20.0, 500.0, 150.0, 220.0).center());
    }

    #[test]
    fn detached_nodes_have_no_screen_frame() {
        let mut s = scene();
        let content = s.add_node(s.root(), s.bounds()).unwrap();
        s.detach(content);
        assert!(s.contains(content));
        assert_eq!(s.screen_frame(content), None);
        assert!(s.children(s.root()).is_empty());
    }

    #[test]
    fn full_bleed_tracks_parent() {
        let mut s = scene();
        let container = s.create_temporary_container(s.root(), Rect::new(10.0, 10.0, 100.0, 100.0)).unwrap();
        let content = s.add_node(container, Rect::default()).unwrap();
        s.set_layout(content, Layout::FullBleed);
        assert_eq!(s.frame(content), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        s.set_frame(container, Rect::new(0.0, 0.0, 300.0, 500.0));
        assert_eq!(s.frame(content), Some(Rect::new(0.0, 0.0, 300.0, 500.0)));
    }

    #[test]
    fn temporary_container_accounting() {
        let mut s = scene();
        let c = s.create_temporary_container(s.root(), s.bounds()).unwrap();
        assert_eq!(s.live_temporary_containers(), 1);
        assert!(s.remove(c));
        assert!(!s.remove(c));
        assert_eq!(s.containers_created(), 1);
        assert_eq!(s.containers_removed(), 1);
        assert_eq!(s.live_temporary_containers(), 0);
    }

    #[test]
    fn reparent_refuses_cycles() {
        let mut s = scene();
        let a = s.add_node(s.root(), s.bounds()).unwrap();
        let b = s.add_node(a, s.bounds()).unwrap();
        assert!(!s.reparent(a, b));
        assert!(s.reparent(b, s.root()));
        assert_eq!(s.parent(b), Some(s.root()));
        assert_eq!(s.children(a), &[] as &[NodeId]);
    }
}
