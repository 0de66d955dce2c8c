// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame/document topology derived from [`DomTree`] primitives.
//!
//! These free functions answer the questions the backend keeps asking about
//! where a node lives: which window owns it, whether that window is nested in
//! an iframe, and whether the node is still part of its document. They are
//! deliberately total — a dead key resolves to `None`/`false`, never an
//! error — because the backend uses them to *detect* nodes going away.
//!
//! A note on iframe elements: resolving "the window of" an iframe element is
//! ambiguous. [`get_window`] answers with the *content* window (the browsing
//! context the iframe hosts), while the nesting queries ([`is_in_iframe`],
//! [`get_iframe_element`]) resolve the iframe element's *owner* window — the
//! side of the boundary the element itself lives on.

use crate::tree::{DomRef, DomTree, Tag};

/// Whether the node is an iframe element.
#[must_use]
pub fn is_iframe<D: DomTree>(dom: &D, node: D::Node) -> bool {
    dom.tag(node) == Some(Tag::Iframe)
}

/// Resolve the window a reference belongs to.
///
/// - A window resolves to itself.
/// - An iframe element resolves to its content window.
/// - Any other node resolves to its owning document's window.
#[must_use]
pub fn get_window<D: DomTree>(dom: &D, target: DomRef<D::Node, D::Window>) -> Option<D::Window> {
    match target {
        DomRef::Window(w) => Some(w),
        DomRef::Node(n) if is_iframe(dom, n) => dom.content_window(n),
        DomRef::Node(n) => dom.owner_window(n),
    }
}

/// Resolve the document a reference belongs to.
///
/// Documents are identified with their window, so this is [`get_window`]
/// under a name that matches what callers mean.
#[must_use]
pub fn get_document<D: DomTree>(dom: &D, target: DomRef<D::Node, D::Window>) -> Option<D::Window> {
    get_window(dom, target)
}

/// The window a node resolves to for nesting queries.
///
/// Unlike [`get_window`], an iframe element resolves to its owner window
/// here: nesting is a property of where the element lives, not of the
/// context it hosts.
fn nesting_window<D: DomTree>(dom: &D, node: D::Node) -> Option<D::Window> {
    dom.owner_window(node)
}

/// Whether the window is nested inside another browsing context.
#[must_use]
pub fn is_window_in_iframe<D: DomTree>(dom: &D, window: D::Window) -> bool {
    dom.top_window(window) != window
}

/// Whether the node lives inside a nested browsing context.
#[must_use]
pub fn is_in_iframe<D: DomTree>(dom: &D, node: D::Node) -> bool {
    nesting_window(dom, node).is_some_and(|w| is_window_in_iframe(dom, w))
}

/// Whether the node is still part of its document.
///
/// True for the document root element itself, for the root element's direct
/// parent, and for any node contained in the root element's subtree. The
/// parent check covers the edge case where a node was just detached but its
/// parent is still the document root.
#[must_use]
pub fn is_node_in_doc<D: DomTree>(dom: &D, node: D::Node) -> bool {
    let Some(doc_el) = nesting_window(dom, node).and_then(|w| dom.document_element(w)) else {
        return false;
    };
    if doc_el == node {
        return true;
    }
    match dom.parent(node) {
        Some(parent) => doc_el == parent || (dom.is_element(parent) && dom.contains(doc_el, parent)),
        None => false,
    }
}

/// The iframe element hosting the node's window, or `None` at the top.
#[must_use]
pub fn get_iframe_element<D: DomTree>(dom: &D, node: D::Node) -> Option<D::Node> {
    nesting_window(dom, node).and_then(|w| dom.frame_element(w))
}
