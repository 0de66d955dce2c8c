// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=liana_dom_ref --heading-base-level=0

//! Liana DOM Reference Tree.
//!
//! This crate provides a small, stateful implementation of
//! [`DomTree`] for **fixtures and call tracing**.
//!
//! It is intentionally *not* a browser:
//! - It does **not** lay anything out; geometry is whatever the fixture sets.
//! - It does **not** dispatch events; hosts and tests construct
//!   [`DragEvent`](liana_dom::DragEvent)s by hand.
//! - It records window listener binds/unbinds and explicit drag-start
//!   requests, so tests can assert on what the backend asked of the host.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Rect;
//! use liana_dom::{topology, DomRef, Tag};
//! use liana_dom_ref::RefDom;
//!
//! let mut dom = RefDom::new();
//! let window = dom.create_window();
//! let root = dom.document_root(window);
//! let div = dom.create_element(window, Tag::Other);
//! dom.append_child(root, div);
//! dom.set_rect(div, Rect::new(10.0, 20.0, 110.0, 70.0));
//!
//! assert!(topology::is_node_in_doc(&dom, div));
//! assert_eq!(topology::get_window(&dom, DomRef::Node(div)), Some(window));
//!
//! dom.detach(div);
//! assert!(!topology::is_node_in_doc(&dom, div));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod transfer;

pub use transfer::RefTransfer;

use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Rect, Size, Vec2};

use liana_dom::{DomTree, ListenerKinds, Tag};

/// Identifier for a node in the reference tree.
///
/// A slot index plus a generation counter: stable across updates, invalid
/// once the slot is freed and reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeKey(u32, u32);

/// Identifier for a window (and its document) in the reference tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct WindowKey(u32);

/// One recorded listener bind or unbind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BindRecord {
    /// The window the backend addressed.
    pub window: WindowKey,
    /// The listener kinds in the call.
    pub kinds: ListenerKinds,
    /// `true` for bind, `false` for unbind.
    pub bind: bool,
}

#[derive(Clone, Debug)]
struct NodeData {
    window: WindowKey,
    tag: Tag,
    is_element: bool,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    rect: Option<Rect>,
    offset_parent: Option<NodeKey>,
    offset_position: Vec2,
    scroll: Vec2,
    border: Vec2,
    offset_size: Size,
    intrinsic_size: Option<Size>,
    css_width: Option<f64>,
    draggable: bool,
    content_editable: bool,
}

impl NodeData {
    fn new(window: WindowKey, tag: Tag, is_element: bool) -> Self {
        Self {
            window,
            tag,
            is_element,
            parent: None,
            children: Vec::new(),
            rect: None,
            offset_parent: None,
            offset_position: Vec2::ZERO,
            scroll: Vec2::ZERO,
            border: Vec2::ZERO,
            offset_size: Size::ZERO,
            intrinsic_size: None,
            css_width: None,
            draggable: false,
            content_editable: false,
        }
    }
}

#[derive(Clone, Debug)]
struct WindowData {
    document_element: NodeKey,
    host_iframe: Option<NodeKey>,
    device_pixel_ratio: f64,
    document_scroll: Vec2,
    listeners: ListenerKinds,
    backend_attached: bool,
}

/// The reference tree: an arena of nodes and windows with fixture setters.
///
/// Geometry answers exactly what the fixture set, nothing is derived. All
/// mutators take and return plain keys; a key whose slot was freed stops
/// answering queries rather than panicking, which is precisely the weak
/// reference behavior the backend is written against.
#[derive(Debug, Default)]
pub struct RefDom {
    slots: Vec<Option<NodeData>>,
    generations: Vec<u32>,
    windows: Vec<WindowData>,
    /// Content window per iframe element.
    iframe_windows: HashMap<NodeKey, WindowKey>,
    bind_log: Vec<BindRecord>,
    drag_start_requests: Vec<NodeKey>,
    supports_explicit_drag_start: bool,
}

impl RefDom {
    /// Creates an empty reference tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a top-level window with an empty document (a root element is
    /// created automatically).
    pub fn create_window(&mut self) -> WindowKey {
        self.create_window_inner(None)
    }

    /// Create a window nested under `host_iframe`, which must be an iframe
    /// element of some existing window.
    pub fn create_iframe_window(&mut self, host_iframe: NodeKey) -> WindowKey {
        debug_assert_eq!(
            self.node(host_iframe).map(|n| n.tag),
            Some(Tag::Iframe),
            "host must be an iframe element"
        );
        let window = self.create_window_inner(Some(host_iframe));
        self.iframe_windows.insert(host_iframe, window);
        window
    }

    fn create_window_inner(&mut self, host_iframe: Option<NodeKey>) -> WindowKey {
        let window = WindowKey(u32::try_from(self.windows.len()).unwrap_or(u32::MAX));
        let root = self.alloc(NodeData::new(window, Tag::Html, true));
        self.windows.push(WindowData {
            document_element: root,
            host_iframe,
            device_pixel_ratio: 1.0,
            document_scroll: Vec2::ZERO,
            listeners: ListenerKinds::empty(),
            backend_attached: false,
        });
        window
    }

    /// The document root element of a window.
    #[must_use]
    pub fn document_root(&self, window: WindowKey) -> NodeKey {
        self.windows[window.0 as usize].document_element
    }

    /// Create a detached element in a window's document.
    pub fn create_element(&mut self, window: WindowKey, tag: Tag) -> NodeKey {
        self.alloc(NodeData::new(window, tag, true))
    }

    /// Create a detached non-element node (text).
    pub fn create_text(&mut self, window: WindowKey) -> NodeKey {
        self.alloc(NodeData::new(window, Tag::Other, false))
    }

    /// Append `child` under `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) {
        self.detach(child);
        if let Some(data) = self.node_mut(parent) {
            data.children.push(child);
        }
        if let Some(data) = self.node_mut(child) {
            data.parent = Some(parent);
        }
    }

    /// Detach a node from its parent, keeping it alive.
    pub fn detach(&mut self, node: NodeKey) {
        let Some(parent) = self.node(node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(data) = self.node_mut(parent) {
            data.children.retain(|c| *c != node);
        }
        if let Some(data) = self.node_mut(node) {
            data.parent = None;
        }
    }

    /// Free a node's slot entirely; its key (and its subtree's keys) go
    /// stale.
    pub fn remove(&mut self, node: NodeKey) {
        self.detach(node);
        let children = self.node(node).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.remove(child);
        }
        let idx = node.0 as usize;
        if self.is_alive(node) {
            self.slots[idx] = None;
            self.generations[idx] = self.generations[idx].wrapping_add(1);
        }
    }

    /// Whether the key still refers to a live node.
    #[must_use]
    pub fn is_alive(&self, node: NodeKey) -> bool {
        let idx = node.0 as usize;
        idx < self.slots.len() && self.slots[idx].is_some() && self.generations[idx] == node.1
    }

    // ---- fixture setters ----

    /// Set a node's viewport-relative bounding rectangle.
    ///
    /// Also sets the offset size to the rect's size; use
    /// [`set_offset_size`](Self::set_offset_size) afterwards when a fixture
    /// needs them to differ.
    pub fn set_rect(&mut self, node: NodeKey, rect: Rect) {
        if let Some(data) = self.node_mut(node) {
            data.rect = Some(rect);
            data.offset_size = rect.size();
        }
    }

    /// Set a node's CSS offset parent.
    pub fn set_offset_parent(&mut self, node: NodeKey, offset_parent: Option<NodeKey>) {
        if let Some(data) = self.node_mut(node) {
            data.offset_parent = offset_parent;
        }
    }

    /// Set a node's `offsetLeft`/`offsetTop`.
    pub fn set_offset_position(&mut self, node: NodeKey, position: Vec2) {
        if let Some(data) = self.node_mut(node) {
            data.offset_position = position;
        }
    }

    /// Set a node's `scrollLeft`/`scrollTop`.
    pub fn set_scroll(&mut self, node: NodeKey, scroll: Vec2) {
        if let Some(data) = self.node_mut(node) {
            data.scroll = scroll;
        }
    }

    /// Set a node's border widths (`clientLeft`/`clientTop`).
    pub fn set_border(&mut self, node: NodeKey, border: Vec2) {
        if let Some(data) = self.node_mut(node) {
            data.border = border;
        }
    }

    /// Set a node's `offsetWidth`/`offsetHeight` without touching its rect.
    pub fn set_offset_size(&mut self, node: NodeKey, size: Size) {
        if let Some(data) = self.node_mut(node) {
            data.offset_size = size;
        }
    }

    /// Set an image's intrinsic size.
    pub fn set_intrinsic_size(&mut self, node: NodeKey, size: Size) {
        if let Some(data) = self.node_mut(node) {
            data.intrinsic_size = Some(size);
        }
    }

    /// Set a node's computed CSS width.
    pub fn set_css_width(&mut self, node: NodeKey, width: f64) {
        if let Some(data) = self.node_mut(node) {
            data.css_width = Some(width);
        }
    }

    /// Mark a node content-editable.
    pub fn set_content_editable(&mut self, node: NodeKey, editable: bool) {
        if let Some(data) = self.node_mut(node) {
            data.content_editable = editable;
        }
    }

    /// Set a window's device pixel ratio.
    pub fn set_device_pixel_ratio(&mut self, window: WindowKey, ratio: f64) {
        self.windows[window.0 as usize].device_pixel_ratio = ratio;
    }

    /// Set a window's document-level scroll.
    pub fn set_document_scroll(&mut self, window: WindowKey, scroll: Vec2) {
        self.windows[window.0 as usize].document_scroll = scroll;
    }

    /// Whether [`DomTree::explicit_drag_start`] should report support.
    pub fn set_supports_explicit_drag_start(&mut self, supported: bool) {
        self.supports_explicit_drag_start = supported;
    }

    // ---- recorded observations ----

    /// Every listener bind/unbind the backend issued, in order.
    #[must_use]
    pub fn bind_log(&self) -> &[BindRecord] {
        &self.bind_log
    }

    /// The listener kinds currently bound on a window.
    #[must_use]
    pub fn listeners(&self, window: WindowKey) -> ListenerKinds {
        self.windows[window.0 as usize].listeners
    }

    /// Nodes for which an explicit drag start was requested, in order.
    #[must_use]
    pub fn drag_start_requests(&self) -> &[NodeKey] {
        &self.drag_start_requests
    }

    // ---- internals ----

    fn alloc(&mut self, data: NodeData) -> NodeKey {
        let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Some(data));
        self.generations.push(0);
        NodeKey(idx, 0)
    }

    fn node(&self, node: NodeKey) -> Option<&NodeData> {
        if self.is_alive(node) {
            self.slots[node.0 as usize].as_ref()
        } else {
            None
        }
    }

    fn node_mut(&mut self, node: NodeKey) -> Option<&mut NodeData> {
        if self.is_alive(node) {
            self.slots[node.0 as usize].as_mut()
        } else {
            None
        }
    }

    fn window(&self, window: WindowKey) -> Option<&WindowData> {
        self.windows.get(window.0 as usize)
    }
}

impl DomTree for RefDom {
    type Node = NodeKey;
    type Window = WindowKey;

    fn tag(&self, node: NodeKey) -> Option<Tag> {
        let data = self.node(node)?;
        data.is_element.then_some(data.tag)
    }

    fn is_element(&self, node: NodeKey) -> bool {
        self.node(node).is_some_and(|n| n.is_element)
    }

    fn nearest_element(&self, node: NodeKey) -> Option<NodeKey> {
        let data = self.node(node)?;
        if data.is_element {
            return Some(node);
        }
        data.parent.filter(|&p| self.is_element(p))
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.node(node)?.parent
    }

    fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn owner_window(&self, node: NodeKey) -> Option<WindowKey> {
        Some(self.node(node)?.window)
    }

    fn content_window(&self, iframe: NodeKey) -> Option<WindowKey> {
        self.iframe_windows.get(&iframe).copied()
    }

    fn top_window(&self, window: WindowKey) -> WindowKey {
        let mut current = window;
        while let Some(host) = self.window(current).and_then(|w| w.host_iframe) {
            match self.node(host) {
                Some(data) => current = data.window,
                None => break,
            }
        }
        current
    }

    fn frame_element(&self, window: WindowKey) -> Option<NodeKey> {
        self.window(window)?.host_iframe
    }

    fn document_element(&self, window: WindowKey) -> Option<NodeKey> {
        Some(self.window(window)?.document_element)
    }

    fn bounding_client_rect(&self, node: NodeKey) -> Option<Rect> {
        self.node(node)?.rect
    }

    fn offset_parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.node(node)?.offset_parent
    }

    fn offset_position(&self, node: NodeKey) -> Vec2 {
        self.node(node).map_or(Vec2::ZERO, |n| n.offset_position)
    }

    fn scroll_offset(&self, node: NodeKey) -> Vec2 {
        self.node(node).map_or(Vec2::ZERO, |n| n.scroll)
    }

    fn border_offset(&self, node: NodeKey) -> Vec2 {
        self.node(node).map_or(Vec2::ZERO, |n| n.border)
    }

    fn document_scroll(&self, window: WindowKey) -> Vec2 {
        self.window(window).map_or(Vec2::ZERO, |w| w.document_scroll)
    }

    fn offset_size(&self, node: NodeKey) -> Size {
        self.node(node).map_or(Size::ZERO, |n| n.offset_size)
    }

    fn intrinsic_size(&self, node: NodeKey) -> Option<Size> {
        self.node(node)?.intrinsic_size
    }

    fn css_width(&self, node: NodeKey) -> Option<f64> {
        self.node(node)?.css_width
    }

    fn device_pixel_ratio(&self, window: WindowKey) -> f64 {
        self.window(window).map_or(1.0, |w| w.device_pixel_ratio)
    }

    fn is_draggable(&self, node: NodeKey) -> bool {
        self.node(node).is_some_and(|n| n.draggable)
    }

    fn is_content_editable(&self, node: NodeKey) -> bool {
        self.node(node).is_some_and(|n| n.content_editable)
    }

    fn set_draggable(&mut self, node: NodeKey, draggable: bool) {
        if let Some(data) = self.node_mut(node) {
            data.draggable = draggable;
        }
    }

    fn bind_window_events(&mut self, window: WindowKey, kinds: ListenerKinds) {
        self.bind_log.push(BindRecord {
            window,
            kinds,
            bind: true,
        });
        self.windows[window.0 as usize].listeners |= kinds;
    }

    fn unbind_window_events(&mut self, window: WindowKey, kinds: ListenerKinds) {
        self.bind_log.push(BindRecord {
            window,
            kinds,
            bind: false,
        });
        self.windows[window.0 as usize].listeners &= !kinds;
    }

    fn backend_attached(&self, window: WindowKey) -> bool {
        self.window(window).is_some_and(|w| w.backend_attached)
    }

    fn set_backend_attached(&mut self, window: WindowKey, attached: bool) {
        self.windows[window.0 as usize].backend_attached = attached;
    }

    fn explicit_drag_start(&mut self, node: NodeKey) -> bool {
        if !self.supports_explicit_drag_start {
            return false;
        }
        self.drag_start_requests.push(node);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liana_dom::{topology, DomRef};

    #[test]
    fn keys_go_stale_after_remove() {
        let mut dom = RefDom::new();
        let window = dom.create_window();
        let div = dom.create_element(window, Tag::Other);
        assert!(dom.is_alive(div));
        dom.remove(div);
        assert!(!dom.is_alive(div));
        assert_eq!(dom.tag(div), None);
    }

    #[test]
    fn contains_is_inclusive_and_follows_parents() {
        let mut dom = RefDom::new();
        let window = dom.create_window();
        let root = dom.document_root(window);
        let outer = dom.create_element(window, Tag::Other);
        let inner = dom.create_element(window, Tag::Other);
        dom.append_child(root, outer);
        dom.append_child(outer, inner);

        assert!(dom.contains(outer, outer));
        assert!(dom.contains(root, inner));
        assert!(!dom.contains(inner, outer));
    }

    #[test]
    fn node_in_doc_covers_root_parent_and_detached_cases() {
        let mut dom = RefDom::new();
        let window = dom.create_window();
        let root = dom.document_root(window);
        let child = dom.create_element(window, Tag::Other);
        dom.append_child(root, child);

        // The root element itself and its subtree count as in-document.
        assert!(topology::is_node_in_doc(&dom, root));
        assert!(topology::is_node_in_doc(&dom, child));

        // A fully detached subtree does not.
        dom.detach(child);
        assert!(!topology::is_node_in_doc(&dom, child));
    }

    #[test]
    fn iframe_window_round_trip() {
        let mut dom = RefDom::new();
        let top = dom.create_window();
        let top_root = dom.document_root(top);
        let iframe = dom.create_element(top, Tag::Iframe);
        dom.append_child(top_root, iframe);
        let inner = dom.create_iframe_window(iframe);
        let inner_node = dom.create_element(inner, Tag::Other);
        dom.append_child(dom.document_root(inner), inner_node);

        // getWindow of the iframe element is its content window...
        assert_eq!(topology::get_window(&dom, DomRef::Node(iframe)), Some(inner));
        // ...and the iframe element of a node inside is the original iframe.
        assert_eq!(topology::get_iframe_element(&dom, inner_node), Some(iframe));

        assert!(topology::is_in_iframe(&dom, inner_node));
        assert!(!topology::is_in_iframe(&dom, iframe));
        assert_eq!(dom.top_window(inner), top);
    }

    #[test]
    fn listener_binds_are_recorded_and_idempotent_in_effect() {
        let mut dom = RefDom::new();
        let window = dom.create_window();
        dom.bind_window_events(window, ListenerKinds::DRAG_SET);
        dom.bind_window_events(window, ListenerKinds::MOUSE_MOVE);
        dom.unbind_window_events(window, ListenerKinds::MOUSE_MOVE);

        assert_eq!(dom.listeners(window), ListenerKinds::DRAG_SET);
        assert_eq!(dom.bind_log().len(), 3);
    }
}
