// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=liana_geometry --heading-base-level=0

//! Liana Geometry: offset computation for drag-and-drop reconciliation.
//!
//! Everything here is a pure read over a host [`DomTree`](liana_dom::DomTree);
//! no state, no mutation. Three concerns live in this crate:
//!
//! - [`offset`]: element and event positions in client, page, and viewport
//!   space, with optional accumulation across iframe boundaries (including
//!   iframe zoom compensation). [`offset::get_event_offset`] bundles the four
//!   variants the backend attaches to begin-drag and hover actions.
//! - [`interpolant`]: a monotone cubic interpolant (Fritsch–Carlson tangents)
//!   used to anchor drag-preview images. Monotonicity matters: a naive linear
//!   blend misplaces the preview whenever preview and source sizes differ.
//! - [`preview`]: where to position a custom drag image given an anchor point
//!   in normalized source-node space, including the per-engine image and
//!   device-pixel-ratio corrections.
//!
//! ## Coordinate spaces
//!
//! All coordinates are 2D CSS pixels ([`kurbo::Point`] / [`kurbo::Vec2`]).
//! *Client* is viewport-relative, *page* is document-relative, and the
//! `_to_top_window` variants are measured in the top window's space for drags
//! that cross iframe boundaries. Page offsets are always derived from the
//! event's element-relative position plus the element's page offset — the
//! event's own page coordinates are unreliable inside iframes and are never
//! consulted.
//!
//! ## Example
//!
//! ```
//! use liana_geometry::interpolant::MonotonicInterpolant;
//!
//! // The three-knot anchor shape used for drag previews.
//! let it = MonotonicInterpolant::new(&[0.0, 0.5, 1.0], &[10.0, 25.0, 40.0]);
//! assert_eq!(it.interpolate(0.0), 10.0);
//! assert_eq!(it.interpolate(0.5), 25.0);
//! assert_eq!(it.interpolate(1.0), 40.0);
//! // Intermediate anchors vary smoothly and never overshoot the knots.
//! let v = it.interpolate(0.25);
//! assert!(v > 10.0 && v < 25.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod interpolant;
pub mod offset;
pub mod preview;

pub use interpolant::MonotonicInterpolant;
pub use offset::{EventOffset, FrameScope};
pub use preview::AnchorPoint;
