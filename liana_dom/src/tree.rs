// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host tree trait and its key types.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Rect, Size, Vec2};

use crate::event::ListenerKinds;

/// Element tags the backend cares about.
///
/// Hosts map their tag names through [`Tag::from_name`]; everything the
/// backend does not special-case collapses to [`Tag::Other`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// The document root element.
    Html,
    /// The document body.
    Body,
    /// A nested browsing context host.
    Iframe,
    /// An image element.
    Img,
    /// A text input.
    Input,
    /// A select control.
    Select,
    /// A multi-line text input.
    TextArea,
    /// Any other element.
    Other,
}

impl Tag {
    /// Map a tag name, ASCII-case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("html") {
            Self::Html
        } else if name.eq_ignore_ascii_case("body") {
            Self::Body
        } else if name.eq_ignore_ascii_case("iframe") {
            Self::Iframe
        } else if name.eq_ignore_ascii_case("img") {
            Self::Img
        } else if name.eq_ignore_ascii_case("input") {
            Self::Input
        } else if name.eq_ignore_ascii_case("select") {
            Self::Select
        } else if name.eq_ignore_ascii_case("textarea") {
            Self::TextArea
        } else {
            Self::Other
        }
    }
}

/// A polymorphic reference into the host tree: either a node or a window.
///
/// Mirrors the original DOM's habit of letting windows, documents, iframe
/// elements, and plain nodes all stand in for "a place with an owning
/// window". Documents are identified with their window (the mapping is 1:1),
/// so there is no third variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DomRef<N, W> {
    /// A node key.
    Node(N),
    /// A window key.
    Window(W),
}

/// Queries and mutations the backend needs from the host's DOM.
///
/// Implementations answer with plain values; every method must be cheap and
/// synchronous because they are called from inside event dispatch. A key that
/// no longer names a live node should answer `None`/defaults rather than
/// panic — keys are weak references and the backend treats absent answers as
/// "node went away".
///
/// ## Geometry contract
///
/// - [`bounding_client_rect`](Self::bounding_client_rect) is
///   viewport-relative, post-transform.
/// - [`offset_position`](Self::offset_position),
///   [`scroll_offset`](Self::scroll_offset) and
///   [`border_offset`](Self::border_offset) follow the CSS offset model
///   (`offsetLeft/Top`, `scrollLeft/Top`, `clientLeft/Top`).
/// - [`contains`](Self::contains) is inclusive: `contains(n, n)` is `true`.
pub trait DomTree {
    /// Opaque node key.
    type Node: Copy + Eq + Hash + Debug;
    /// Opaque window key. Each window owns exactly one document.
    type Window: Copy + Eq + Hash + Debug;

    /// Tag of the node, or `None` for non-elements and dead keys.
    fn tag(&self, node: Self::Node) -> Option<Tag>;
    /// Whether the node is an element (as opposed to text or other node kinds).
    fn is_element(&self, node: Self::Node) -> bool;
    /// The node itself if it is an element, else its parent element.
    fn nearest_element(&self, node: Self::Node) -> Option<Self::Node>;
    /// Parent node, if any.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    /// Inclusive subtree containment.
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool;

    /// The window owning the node's document.
    fn owner_window(&self, node: Self::Node) -> Option<Self::Window>;
    /// The browsing context hosted by an iframe element.
    fn content_window(&self, iframe: Self::Node) -> Option<Self::Window>;
    /// The top window of a window's frame chain (itself if unframed).
    fn top_window(&self, window: Self::Window) -> Self::Window;
    /// The iframe element hosting this window, or `None` at the top.
    fn frame_element(&self, window: Self::Window) -> Option<Self::Node>;
    /// The root element of the window's document.
    fn document_element(&self, window: Self::Window) -> Option<Self::Node>;

    /// Viewport-relative bounding rectangle of an element.
    fn bounding_client_rect(&self, node: Self::Node) -> Option<Rect>;
    /// CSS offset parent.
    fn offset_parent(&self, node: Self::Node) -> Option<Self::Node>;
    /// `offsetLeft`/`offsetTop` relative to the offset parent.
    fn offset_position(&self, node: Self::Node) -> Vec2;
    /// `scrollLeft`/`scrollTop`.
    fn scroll_offset(&self, node: Self::Node) -> Vec2;
    /// `clientLeft`/`clientTop`: the border widths.
    fn border_offset(&self, node: Self::Node) -> Vec2;
    /// Document-level scroll of a window (its root element's scroll).
    fn document_scroll(&self, window: Self::Window) -> Vec2;
    /// `offsetWidth`/`offsetHeight`.
    fn offset_size(&self, node: Self::Node) -> Size;
    /// Intrinsic size, for elements that have one (images).
    fn intrinsic_size(&self, node: Self::Node) -> Option<Size>;
    /// Computed CSS width, when resolvable.
    fn css_width(&self, node: Self::Node) -> Option<f64>;
    /// Device pixel ratio of the window.
    fn device_pixel_ratio(&self, window: Self::Window) -> f64;

    /// Whether the node carries an explicit draggable marking.
    fn is_draggable(&self, node: Self::Node) -> bool;
    /// Whether the node is content-editable.
    fn is_content_editable(&self, node: Self::Node) -> bool;

    /// Mark or unmark the node as draggable.
    fn set_draggable(&mut self, node: Self::Node, draggable: bool);

    /// Attach host listeners for the given kinds on a window.
    ///
    /// The backend calls this at most once per window while the window's
    /// registration refcount is positive; hosts only need to forward to their
    /// real `addEventListener` equivalents.
    fn bind_window_events(&mut self, window: Self::Window, kinds: ListenerKinds);
    /// Detach host listeners previously bound with
    /// [`bind_window_events`](Self::bind_window_events).
    fn unbind_window_events(&mut self, window: Self::Window, kinds: ListenerKinds);

    /// Whether a backend is already attached to this window.
    fn backend_attached(&self, window: Self::Window) -> bool;
    /// Record backend attachment on the window itself.
    ///
    /// The flag lives on the window, not in the backend, so that a second
    /// backend instance created against the same window can be refused.
    fn set_backend_attached(&mut self, window: Self::Window, attached: bool);

    /// Ask the host to start a drag for this node explicitly.
    ///
    /// Only meaningful on [`Engine::Legacy`](crate::Engine::Legacy) hosts;
    /// returns whether the host supports the call.
    fn explicit_drag_start(&mut self, node: Self::Node) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_matching_is_case_insensitive() {
        assert_eq!(Tag::from_name("iframe"), Tag::Iframe);
        assert_eq!(Tag::from_name("IFrame"), Tag::Iframe);
        assert_eq!(Tag::from_name("IMG"), Tag::Img);
        assert_eq!(Tag::from_name("textarea"), Tag::TextArea);
        assert_eq!(Tag::from_name("div"), Tag::Other);
        assert_eq!(Tag::from_name(""), Tag::Other);
    }
}
