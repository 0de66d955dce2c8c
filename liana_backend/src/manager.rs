// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The external drag-and-drop manager surface.
//!
//! The backend does not own drag state beyond what event reconciliation
//! needs; the host framework's manager does. These traits are that seam:
//! [`DragActions`] receives the reconciled action stream, [`DragMonitor`]
//! answers queries about the manager's current state, and [`SourceRegistry`]
//! accepts the synthetic sources that stand in for native payloads.
//!
//! One manager object usually implements all three; backend entry points
//! take `&mut M where M: DragActions<..> + DragMonitor + SourceRegistry`.
//! The monitor must reflect actions synchronously — after
//! [`DragActions::begin_drag`] accepts a source, [`DragMonitor::is_dragging`]
//! reports `true` within the same event dispatch.

use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::Point;

use liana_geometry::EventOffset;

use crate::native::{NativeDragSource, NativeItemKind};

/// Opaque identifier of a registered drag source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

/// Opaque identifier of a registered drop target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// One candidate source for a begin-drag decision.
///
/// Candidates arrive nearest-first (event target upward). The client offset
/// of each candidate's node is computed eagerly inside the synchronous
/// handler so the dispatcher can anchor whichever source it resolves to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragCandidate {
    /// The candidate source.
    pub id: SourceId,
    /// The candidate node's client offset at drag start.
    pub client_offset: Option<Point>,
}

/// Options attached to a begin-drag action.
#[derive(Clone, Debug, PartialEq)]
pub struct BeginDragOptions {
    /// Whether to surface the chosen source to observers immediately.
    ///
    /// The backend defers publication for internal drags so the browser can
    /// screenshot the not-yet-dragging DOM state, and publishes via
    /// [`DragActions::publish_drag_source`] afterwards.
    pub publish_source: bool,
    /// The event offsets at drag start, when an event produced this drag.
    pub event_offset: Option<EventOffset>,
}

impl Default for BeginDragOptions {
    fn default() -> Self {
        Self {
            publish_source: true,
            event_offset: None,
        }
    }
}

/// The action stream consumed by the external dispatcher.
pub trait DragActions {
    /// A drag gesture began; the dispatcher resolves which candidate (if
    /// any) accepts it.
    fn begin_drag(&mut self, candidates: &[DragCandidate], options: BeginDragOptions);
    /// Surface the previously accepted source to observers.
    fn publish_drag_source(&mut self);
    /// The drag is over the given targets, nearest-first.
    fn hover(&mut self, target_ids: &[TargetId], offset: Option<EventOffset>);
    /// The payload was dropped on the current targets.
    fn drop(&mut self);
    /// The drag operation ended.
    fn end_drag(&mut self);
}

/// Read-only queries over the manager's current drag state.
pub trait DragMonitor {
    /// Whether a drag operation is in progress.
    fn is_dragging(&self) -> bool;
    /// Whether the current operation already dropped.
    fn did_drop(&self) -> bool;
    /// Whether the given target accepts the current payload.
    fn can_drop_on_target(&self, target_id: TargetId) -> bool;
    /// The accepted source of the current drag, if any.
    fn source_id(&self) -> Option<SourceId>;
    /// The native kind of the current payload, or `None` for internal drags.
    fn native_item_kind(&self) -> Option<NativeItemKind>;
}

/// Registration of synthetic native sources.
///
/// The source instance is shared: the backend keeps a handle to fill the
/// payload in at drop time, while the registry exposes it to the manager's
/// consumers.
pub trait SourceRegistry {
    /// Register a synthetic source; returns its handle.
    fn add_native_source(
        &mut self,
        kind: NativeItemKind,
        source: Rc<RefCell<NativeDragSource>>,
    ) -> SourceId;
    /// Remove a previously registered synthetic source.
    fn remove_source(&mut self, id: SourceId);
}
