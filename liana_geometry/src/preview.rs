// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchored drag-preview image positioning.
//!
//! Browsers take a drag-image offset in the preview node's own coordinate
//! space. The useful anchor, though, is a point in *source-node* space: "pin
//! the preview under the cursor the way the source sat under it". When the
//! preview and source differ in size, mapping one to the other is not a
//! linear blend — each axis is interpolated monotonically over three anchor
//! samples (dock to the near edge, proportionally scaled center, dock to the
//! far edge), so intermediate anchors move the preview smoothly without
//! overshooting either edge.

use kurbo::{Point, Vec2};

use liana_dom::topology;
use liana_dom::{DomRef, DomTree, Engine, Tag};

use crate::interpolant::MonotonicInterpolant;
use crate::offset::get_node_client_offset;

/// An anchor point in `[0, 1]²` normalized source-node space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnchorPoint {
    /// Horizontal anchor: 0 docks left, 1 docks right.
    pub x: f64,
    /// Vertical anchor: 0 docks top, 1 docks bottom.
    pub y: f64,
}

impl Default for AnchorPoint {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

/// Whether the preview node is attached to its document.
fn preview_attached<D: DomTree>(dom: &D, preview: D::Node) -> bool {
    topology::get_window(dom, DomRef::Node(preview))
        .and_then(|w| dom.document_element(w))
        .is_some_and(|doc_el| dom.contains(doc_el, preview))
}

/// Compute the drag-image offset for a preview anchored in source space.
///
/// `client_offset` is the drag-start position in client space. Image
/// previews are special-cased: engines render a detached or standalone image
/// at its intrinsic size rather than the source's size, and disagree about
/// device-pixel-ratio handling in both directions.
#[must_use]
pub fn get_drag_preview_offset<D: DomTree>(
    dom: &D,
    engine: Engine,
    source: D::Node,
    preview: D::Node,
    client_offset: Point,
    anchor: AnchorPoint,
) -> Vec2 {
    let detached = !preview_attached(dom, preview);
    let is_image =
        dom.tag(preview) == Some(Tag::Img) && engine.image_preview_at_intrinsic_size(detached);

    // When the engine will render the image at intrinsic size, measure from
    // the source node; the preview's layout position is meaningless then.
    let measured = if is_image { source } else { preview };
    let measured_client = get_node_client_offset(dom, measured).unwrap_or(Point::ZERO);
    let from_preview = client_offset - measured_client;

    let source_size = dom.offset_size(source);
    let (mut preview_w, mut preview_h) = if is_image {
        let intrinsic = dom.intrinsic_size(preview).unwrap_or(source_size);
        (intrinsic.width, intrinsic.height)
    } else {
        (source_size.width, source_size.height)
    };

    let dpr = dom
        .owner_window(source)
        .map_or(1.0, |w| dom.device_pixel_ratio(w));
    if is_image && engine.scales_image_preview_down_by_dpr() {
        preview_w /= dpr;
        preview_h /= dpr;
    } else if !is_image && engine.scales_node_preview_up_by_dpr() {
        preview_w *= dpr;
        preview_h *= dpr;
    }

    // A zero-sized source cannot scale the center sample; dock it instead.
    let center_x = if source_size.width == 0.0 {
        from_preview.x
    } else {
        from_preview.x / source_size.width * preview_w
    };
    let center_y = if source_size.height == 0.0 {
        from_preview.y
    } else {
        from_preview.y / source_size.height * preview_h
    };

    let interpolant_x = MonotonicInterpolant::new(
        &[0.0, 0.5, 1.0],
        &[
            from_preview.x,
            center_x,
            from_preview.x + preview_w - source_size.width,
        ],
    );
    let interpolant_y = MonotonicInterpolant::new(
        &[0.0, 0.5, 1.0],
        &[
            from_preview.y,
            center_y,
            from_preview.y + preview_h - source_size.height,
        ],
    );

    let x = interpolant_x.interpolate(anchor.x);
    let mut y = interpolant_y.interpolate(anchor.y);

    // Known engine defect: image previews land one pixel-ratio step high.
    if is_image && engine.image_preview_vertical_fixup() {
        y += (dpr - 1.0) * preview_h;
    }

    Vec2::new(x, y)
}
