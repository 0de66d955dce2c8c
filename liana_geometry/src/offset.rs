// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element and event positions in client, page, and viewport space.
//!
//! Page offsets accumulate the CSS offset-parent chain (`offset − scroll +
//! border` per ancestor, with the body-level document-scroll fallback).
//! Cross-frame variants then fold in the hosting iframe's own offset, scaled
//! by the iframe's zoom factor — the ratio of its rendered width to its CSS
//! width, which compensates for iframe content scaling under browser zoom.

use kurbo::{Point, Vec2};

use liana_dom::topology;
use liana_dom::{DomTree, DragEvent, Tag};

/// How far offset accumulation follows frame boundaries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameScope {
    /// Measure within the node's own window.
    Local,
    /// Accumulate through hosting iframes up to the top window.
    TopWindow,
}

/// The four offset variants attached to begin-drag and hover actions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EventOffset {
    /// Viewport-relative, in the event's own window.
    pub client: Point,
    /// Viewport-relative, in the top window's space.
    pub client_to_top_window: Point,
    /// Document-relative, in the event's own window.
    pub page: Option<Point>,
    /// Document-relative, in the top window's space.
    pub page_to_top_window: Option<Point>,
}

/// Round to two decimal places without leaving `core`.
fn round_hundredths(v: f64) -> f64 {
    let scaled = v * 100.0;
    let nudged = if scaled >= 0.0 { scaled + 0.5 } else { scaled - 0.5 };
    #[expect(clippy::cast_possible_truncation, reason = "offsets are far below 2^53")]
    let whole = nudged as i64;
    whole as f64 / 100.0
}

/// Bounding-box top-left of the nearest element, or `None` if there is none.
#[must_use]
pub fn get_node_client_offset<D: DomTree>(dom: &D, node: D::Node) -> Option<Point> {
    let el = dom.nearest_element(node)?;
    dom.bounding_client_rect(el).map(|r| r.origin())
}

/// The zoom factor applied to an iframe's content.
///
/// Rendered width over CSS width, rounded to two decimals; `1.0` when the
/// CSS width is unavailable or degenerate.
#[must_use]
pub fn iframe_zoom_factor<D: DomTree>(dom: &D, iframe: D::Node) -> f64 {
    let rendered = dom.bounding_client_rect(iframe).map_or(0.0, |r| r.width());
    match dom.css_width(iframe) {
        Some(css) if css > 0.0 && rendered > 0.0 => round_hundredths(rendered / css),
        _ => 1.0,
    }
}

/// Fold a local offset into the hosting frame's space.
fn across_frame<D: DomTree>(
    dom: &D,
    local: Point,
    iframe: D::Node,
    iframe_offset: Option<Point>,
) -> Point {
    let zoom = iframe_zoom_factor(dom, iframe);
    let base = iframe_offset.unwrap_or(Point::ZERO);
    Point::new(local.x * zoom + base.x, local.y * zoom + base.y)
}

/// Document-relative offset via the offset-parent chain.
///
/// With [`FrameScope::TopWindow`], a node inside a nested frame additionally
/// accumulates the hosting iframe's page offset, scaled by the iframe zoom
/// factor, recursively to the top window.
#[must_use]
pub fn offset_to_page<D: DomTree>(dom: &D, node: D::Node, scope: FrameScope) -> Option<Point> {
    let source = dom.nearest_element(node)?;
    let mut offset = dom.offset_position(source);
    let mut el = source;
    while let Some(ancestor) = dom.offset_parent(el) {
        el = ancestor;
        if dom.tag(el) == Some(Tag::Body) {
            // The body's own scroll may be zero with the page scroll living
            // on the document element instead.
            let doc_scroll = dom
                .owner_window(el)
                .map_or(Vec2::ZERO, |w| dom.document_scroll(w));
            let scroll = dom.scroll_offset(el);
            let sx = if scroll.x != 0.0 { scroll.x } else { doc_scroll.x };
            let sy = if scroll.y != 0.0 { scroll.y } else { doc_scroll.y };
            offset += dom.offset_position(el) - Vec2::new(sx, sy) + dom.border_offset(el);
        } else {
            offset += dom.offset_position(el) - dom.scroll_offset(el) + dom.border_offset(el);
        }
    }

    let mut page = offset.to_point();
    if scope == FrameScope::TopWindow && topology::is_in_iframe(dom, source) {
        if let Some(iframe) = topology::get_iframe_element(dom, source) {
            let hosting = offset_to_page(dom, iframe, FrameScope::TopWindow);
            page = across_frame(dom, page, iframe, hosting);
        }
    }
    Some(page)
}

/// Viewport-relative offset, with the same cross-frame accumulation as
/// [`offset_to_page`].
#[must_use]
pub fn offset_to_viewport<D: DomTree>(dom: &D, node: D::Node, scope: FrameScope) -> Option<Point> {
    let el = dom.nearest_element(node)?;
    let mut viewport = dom.bounding_client_rect(el)?.origin();
    if scope == FrameScope::TopWindow && topology::is_in_iframe(dom, el) {
        if let Some(iframe) = topology::get_iframe_element(dom, el) {
            let hosting = offset_to_viewport(dom, iframe, FrameScope::TopWindow);
            viewport = across_frame(dom, viewport, iframe, hosting);
        }
    }
    Some(viewport)
}

/// Viewport-relative event position.
///
/// Uses the event's client coordinates directly; with
/// [`FrameScope::TopWindow`], folds in the hosting iframe's viewport offset.
#[must_use]
pub fn get_event_client_offset<D: DomTree, T>(
    dom: &D,
    event: &DragEvent<D::Node, D::Window, T>,
    scope: FrameScope,
) -> Point {
    let mut offset = event.client;
    if scope == FrameScope::TopWindow && topology::is_in_iframe(dom, event.target) {
        if let Some(iframe) = topology::get_iframe_element(dom, event.target) {
            let hosting = offset_to_viewport(dom, iframe, FrameScope::TopWindow);
            offset = across_frame(dom, offset, iframe, hosting);
        }
    }
    offset
}

/// Document-relative event position.
///
/// Derived from the event's element-relative offset plus the target
/// element's page offset plus its border widths. The event's own page
/// coordinates are never used; they are unreliable inside iframes.
#[must_use]
pub fn get_event_page_offset<D: DomTree, T>(
    dom: &D,
    event: &DragEvent<D::Node, D::Window, T>,
    scope: FrameScope,
) -> Option<Point> {
    let el = dom.nearest_element(event.target)?;
    let el_page = offset_to_page(dom, el, FrameScope::Local)?;
    let border = dom.border_offset(el);
    let mut offset = Point::new(
        event.offset_in_target.x + el_page.x + border.x,
        event.offset_in_target.y + el_page.y + border.y,
    );
    if scope == FrameScope::TopWindow && topology::is_in_iframe(dom, el) {
        if let Some(iframe) = topology::get_iframe_element(dom, el) {
            let hosting = offset_to_page(dom, iframe, FrameScope::TopWindow);
            offset = across_frame(dom, offset, iframe, hosting);
        }
    }
    Some(offset)
}

/// All four offset variants for one event.
///
/// This is the canonical payload attached to hover and begin-drag actions.
#[must_use]
pub fn get_event_offset<D: DomTree, T>(
    dom: &D,
    event: &DragEvent<D::Node, D::Window, T>,
) -> EventOffset {
    EventOffset {
        client: get_event_client_offset(dom, event, FrameScope::Local),
        client_to_top_window: get_event_client_offset(dom, event, FrameScope::TopWindow),
        page: get_event_page_offset(dom, event, FrameScope::Local),
        page_to_top_window: get_event_page_offset(dom, event, FrameScope::TopWindow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_to_hundredths() {
        assert_eq!(round_hundredths(1.996), 2.0);
        assert_eq!(round_hundredths(0.125), 0.13);
        assert_eq!(round_hundredths(-0.125), -0.13);
        assert_eq!(round_hundredths(2.0), 2.0);
    }
}
