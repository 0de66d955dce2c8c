// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=liana_backend --heading-base-level=0

//! Liana Backend: reconcile native drag events into a neutral action stream.
//!
//! Browser drag events are dispatched to many overlapping nodes in capture
//! and bubble phases, fire asynchronously, and disagree across engines. This
//! crate reduces that stream to one consistent logical sequence of
//! begin-drag / hover / drop / end-drag actions for an external
//! drag-and-drop manager, including native payloads (files, URLs, text) and
//! drags that cross iframe boundaries.
//!
//! ## Pieces
//!
//! - [`backend::DragBackend`]: the event reconciliation state machine — the
//!   core of this crate. Owns per-drag-operation state, tracks source/
//!   target/preview registrations, and converts low-level events into
//!   manager actions.
//! - [`enter_leave::EnterLeaveCounter`]: reduces per-node dragenter/
//!   dragleave pairs to true document-level enter and leave transitions.
//! - [`native`]: recognizes payloads originating outside the application
//!   and represents them as synthetic drag sources.
//! - [`manager`]: the traits the host framework's manager implements —
//!   [`manager::DragActions`], [`manager::DragMonitor`],
//!   [`manager::SourceRegistry`].
//!
//! ## Host contract
//!
//! The host owns the DOM (behind [`liana_dom::DomTree`]) and the event loop.
//! It routes each window-level drag event into
//! [`DragBackend::handle`](backend::DragBackend::handle), pumps mouse moves
//! while [`wants_mouse_moves`](backend::DragBackend::wants_mouse_moves)
//! says so, and calls
//! [`flush_deferred_publish`](backend::DragBackend::flush_deferred_publish)
//! on the next turn after each event. Everything runs synchronously inside
//! dispatch; the deferred publish is the only suspension, and it is
//! epoch-guarded so a superseded drag cannot publish a stale source.
//!
//! ## Concurrency
//!
//! Single-threaded, event-driven, cooperative. All mutable state is owned by
//! the one backend instance bound to a window; nested-iframe windows share
//! that instance's top-level listeners via reference counting rather than
//! getting instances of their own.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod enter_leave;
pub mod manager;
pub mod native;

pub use backend::{
    DragBackend, PreviewConnection, PreviewOptions, SetupError, SourceConnection, SourceOptions,
    TargetConnection,
};
pub use manager::{
    BeginDragOptions, DragActions, DragCandidate, DragMonitor, SourceId, SourceRegistry, TargetId,
};
pub use native::{NativeItem, NativeItemKind};
