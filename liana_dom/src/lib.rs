// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=liana_dom --heading-base-level=0

//! Liana DOM: the host abstraction the drag-and-drop backend is written against.
//!
//! Liana does not own a DOM. The host (a browser binding, a webview bridge, or
//! the in-memory reference tree from `liana_dom_ref`) implements [`DomTree`]
//! over its own opaque node and window keys, and feeds [`DragEvent`]s into the
//! backend. This crate holds that seam:
//!
//! - [`DomTree`]: queries and mutations the backend needs — tags, parents,
//!   geometry reads, draggable marking, and window-level listener binding.
//! - [`topology`]: frame/document topology derived from `DomTree` primitives —
//!   owning windows, iframe nesting, and document membership.
//! - [`event`]: the drag event and data-transfer surface, including the
//!   `default_prevented` flag the host reads back after dispatch.
//! - [`Engine`]: the browser-engine quirk table. Engine *sniffing* is the
//!   host's job; this crate only encodes which engine needs which behavior.
//!
//! ## Design Philosophy
//!
//! Node and window identities are small copyable keys. A key is a weak
//! reference by construction: the host's tree owns node lifetimes, and a key
//! for a removed node simply stops answering queries. Nothing in liana keeps a
//! node alive.
//!
//! All coordinates are 2D CSS pixels using [`kurbo`] types.
//!
//! ## Example
//!
//! ```
//! use liana_dom::{DropEffect, Tag};
//!
//! assert_eq!(Tag::from_name("IFRAME"), Tag::Iframe);
//! assert_eq!(Tag::from_name("iframe"), Tag::Iframe);
//! assert_eq!(Tag::from_name("article"), Tag::Other);
//! assert_eq!(DropEffect::Copy.as_str(), "copy");
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod engine;
mod tree;

pub mod event;
pub mod topology;

pub use engine::Engine;
pub use event::{
    DataTransfer, DragEvent, DragEventKind, DropEffect, ListenerKinds, SetDataError,
};
pub use tree::{DomRef, DomTree, Tag};
