// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag-and-drop backend state machine.
//!
//! One [`DragBackend`] instance binds to one window and reduces the noisy
//! capture/bubble drag event stream to a single consistent logical sequence
//! of begin-drag / hover / drop / end-drag actions on the external manager.
//!
//! ## Event flow
//!
//! The host routes each window-level drag event into [`DragBackend::handle`].
//! For kinds with an element phase the backend walks the event target's
//! ancestor path itself, gathering registered source or target IDs
//! nearest-first into a transient buffer — the equivalent of element-level
//! listeners firing between the capture and bubble window listeners — and
//! then runs the top-level handler, which consults the gathered IDs plus the
//! monitor to issue at most one logical action.
//!
//! ## Implicit states
//!
//! There is no state enum; the machine's state is derived from its fields:
//! idle (nothing tracked, monitor not dragging), internal drag pending
//! (dragstart seen, candidates gathered), internal drag active
//! (`current_source` set), native drag active (`current_native` set). The
//! two "active" states are mutually exclusive — native drags bypass the
//! internal source path entirely.
//!
//! ## Deferred publication
//!
//! Publishing an accepted internal source is deferred to the host's next
//! turn by default so the browser can screenshot the not-yet-dragging DOM
//! state for its native drag image. The deferral is an explicit task guarded
//! by a drag epoch: if a new drag sequence starts first,
//! [`DragBackend::flush_deferred_publish`] detects the epoch mismatch and
//! does nothing.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;
use core::mem;

use hashbrown::HashMap;
use kurbo::Point;
use smallvec::SmallVec;

use liana_dom::topology;
use liana_dom::{
    DataTransfer, DomRef, DomTree, DragEvent, DragEventKind, DropEffect, Engine, ListenerKinds,
    Tag,
};
use liana_geometry::offset::{
    get_event_client_offset, get_event_offset, get_node_client_offset, FrameScope,
};
use liana_geometry::preview::get_drag_preview_offset;
use liana_geometry::AnchorPoint;

use crate::enter_leave::EnterLeaveCounter;
use crate::manager::{
    BeginDragOptions, DragActions, DragCandidate, DragMonitor, SourceId, SourceRegistry, TargetId,
};
use crate::native::{
    create_native_drag_source, match_native_item_type, NativeDragSource, NativeItemKind,
};

/// A second backend was attached to a window that already has one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SetupError {
    /// The window already carries an active backend.
    AlreadyInstalled,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled => {
                f.write_str("cannot attach two drag backends to the same window")
            }
        }
    }
}

impl core::error::Error for SetupError {}

/// Per-source options set at connect time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SourceOptions {
    /// The visible effect when a target accepts this source's payload.
    pub drop_effect: DropEffect,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            drop_effect: DropEffect::Move,
        }
    }
}

/// Per-preview options set at connect time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PreviewOptions {
    /// Anchor point in normalized source-node space.
    pub anchor: AnchorPoint,
    /// Publish the accepted source immediately instead of next turn.
    ///
    /// Opt-in for custom drag layers that must render the dragging state
    /// (e.g. a hidden or zero-size source) rather than let the browser
    /// screenshot the pre-drag DOM.
    pub capture_dragging_state: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            anchor: AnchorPoint::default(),
            capture_dragging_state: false,
        }
    }
}

/// Token returned by [`DragBackend::connect_drag_source`]; undone by
/// [`DragBackend::disconnect_drag_source`].
#[derive(Debug)]
#[must_use = "dropping the token leaks the registration; pass it to disconnect_drag_source"]
pub struct SourceConnection<N, W> {
    id: SourceId,
    node: N,
    frame_window: Option<W>,
}

/// Token returned by [`DragBackend::connect_drag_preview`].
#[derive(Debug)]
#[must_use = "dropping the token leaks the registration; pass it to disconnect_drag_preview"]
pub struct PreviewConnection {
    id: SourceId,
}

/// Token returned by [`DragBackend::connect_drop_target`].
#[derive(Debug)]
#[must_use = "dropping the token leaks the registration; pass it to disconnect_drop_target"]
pub struct TargetConnection<N, W> {
    id: TargetId,
    node: N,
    frame_window: Option<W>,
}

/// The tracked source node of an active internal drag.
#[derive(Debug)]
struct CurrentSourceNode<N> {
    node: N,
    /// Client offset snapshot taken at drag start.
    client_offset: Option<Point>,
    /// One-shot latch: once the node is seen to have moved, stays true for
    /// the rest of the drag so dragover stops re-reading geometry.
    offset_changed: bool,
}

/// The synthetic source of an active native drag.
#[derive(Debug)]
struct CurrentNativeSource {
    handle: SourceId,
    source: Rc<RefCell<NativeDragSource>>,
}

/// The backend. One instance per window; see the module docs.
#[derive(Debug)]
pub struct DragBackend<D: DomTree> {
    engine: Engine,
    root_window: Option<D::Window>,
    /// Shared top-level listener refcounts for nested-iframe windows.
    frame_windows: HashMap<D::Window, u32>,

    source_nodes: HashMap<SourceId, D::Node>,
    source_options: HashMap<SourceId, SourceOptions>,
    node_sources: HashMap<D::Node, SmallVec<[SourceId; 1]>>,
    preview_nodes: HashMap<SourceId, D::Node>,
    preview_options: HashMap<SourceId, PreviewOptions>,
    target_nodes: HashMap<TargetId, D::Node>,
    node_targets: HashMap<D::Node, SmallVec<[TargetId; 1]>>,

    enter_leave: EnterLeaveCounter<D::Node>,

    drag_start_source_ids: SmallVec<[SourceId; 4]>,
    drag_enter_target_ids: SmallVec<[TargetId; 4]>,
    drag_over_target_ids: SmallVec<[TargetId; 4]>,
    drop_target_ids: SmallVec<[TargetId; 4]>,

    current_source: Option<CurrentSourceNode<D::Node>>,
    current_native: Option<CurrentNativeSource>,

    drag_epoch: u64,
    deferred_publish: Option<u64>,
}

impl<D: DomTree> DragBackend<D> {
    /// Create a backend for the given engine. Call [`setup`](Self::setup)
    /// before routing events.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            root_window: None,
            frame_windows: HashMap::new(),
            source_nodes: HashMap::new(),
            source_options: HashMap::new(),
            node_sources: HashMap::new(),
            preview_nodes: HashMap::new(),
            preview_options: HashMap::new(),
            target_nodes: HashMap::new(),
            node_targets: HashMap::new(),
            enter_leave: EnterLeaveCounter::new(),
            drag_start_source_ids: SmallVec::new(),
            drag_enter_target_ids: SmallVec::new(),
            drag_over_target_ids: SmallVec::new(),
            drop_target_ids: SmallVec::new(),
            current_source: None,
            current_native: None,
            drag_epoch: 0,
            deferred_publish: None,
        }
    }

    /// Attach to a window. Fails if the window already has a backend.
    pub fn setup(&mut self, dom: &mut D, window: D::Window) -> Result<(), SetupError> {
        if dom.backend_attached(window) {
            return Err(SetupError::AlreadyInstalled);
        }
        dom.set_backend_attached(window, true);
        dom.bind_window_events(window, ListenerKinds::DRAG_SET);
        self.root_window = Some(window);
        Ok(())
    }

    /// Detach from the window and clear any tracked drag state. Idempotent.
    pub fn teardown(&mut self, dom: &mut D) {
        if let Some(window) = self.root_window {
            dom.set_backend_attached(window, false);
            dom.unbind_window_events(window, ListenerKinds::DRAG_SET);
        }
        self.clear_current_source_node(dom);
        self.root_window = None;
    }

    /// Register a draggable node under a source ID.
    ///
    /// Marks the node draggable, and — when the node lives in a nested
    /// iframe — joins that window's refcounted top-level listener set.
    pub fn connect_drag_source(
        &mut self,
        dom: &mut D,
        id: SourceId,
        node: D::Node,
        options: SourceOptions,
    ) -> SourceConnection<D::Node, D::Window> {
        self.source_nodes.insert(id, node);
        self.source_options.insert(id, options);
        self.node_sources.entry(node).or_default().push(id);
        dom.set_draggable(node, true);
        let frame_window = self.frame_window_of(dom, node);
        if let Some(window) = frame_window {
            self.retain_frame_listeners(dom, window);
        }
        SourceConnection {
            id,
            node,
            frame_window,
        }
    }

    /// Exactly undo a [`connect_drag_source`](Self::connect_drag_source).
    pub fn disconnect_drag_source(
        &mut self,
        dom: &mut D,
        connection: SourceConnection<D::Node, D::Window>,
    ) {
        let SourceConnection {
            id,
            node,
            frame_window,
        } = connection;
        if let Some(window) = frame_window {
            self.release_frame_listeners(dom, window);
        }
        self.source_nodes.remove(&id);
        self.source_options.remove(&id);
        if let Some(ids) = self.node_sources.get_mut(&node) {
            ids.retain(|s| *s != id);
            if ids.is_empty() {
                self.node_sources.remove(&node);
            }
        }
        dom.set_draggable(node, false);
    }

    /// Register a custom drag-preview node for a source ID.
    ///
    /// Independent of the source registration; a source without a preview
    /// falls back to its own node as the drag image.
    pub fn connect_drag_preview(
        &mut self,
        id: SourceId,
        node: D::Node,
        options: PreviewOptions,
    ) -> PreviewConnection {
        self.preview_nodes.insert(id, node);
        self.preview_options.insert(id, options);
        PreviewConnection { id }
    }

    /// Exactly undo a [`connect_drag_preview`](Self::connect_drag_preview).
    pub fn disconnect_drag_preview(&mut self, connection: PreviewConnection) {
        self.preview_nodes.remove(&connection.id);
        self.preview_options.remove(&connection.id);
    }

    /// Register a drop-acceptance region under a target ID.
    pub fn connect_drop_target(
        &mut self,
        dom: &mut D,
        id: TargetId,
        node: D::Node,
    ) -> TargetConnection<D::Node, D::Window> {
        self.target_nodes.insert(id, node);
        self.node_targets.entry(node).or_default().push(id);
        let frame_window = self.frame_window_of(dom, node);
        if let Some(window) = frame_window {
            self.retain_frame_listeners(dom, window);
        }
        TargetConnection {
            id,
            node,
            frame_window,
        }
    }

    /// Exactly undo a [`connect_drop_target`](Self::connect_drop_target).
    pub fn disconnect_drop_target(
        &mut self,
        dom: &mut D,
        connection: TargetConnection<D::Node, D::Window>,
    ) {
        let TargetConnection {
            id,
            node,
            frame_window,
        } = connection;
        if let Some(window) = frame_window {
            self.release_frame_listeners(dom, window);
        }
        self.target_nodes.remove(&id);
        if let Some(ids) = self.node_targets.get_mut(&node) {
            ids.retain(|t| *t != id);
            if ids.is_empty() {
                self.node_targets.remove(&node);
            }
        }
    }

    /// Route one window-level event through the machine.
    ///
    /// After the call, the host reads
    /// [`event.default_prevented()`](DragEvent::default_prevented) and the
    /// transfer's drop effect back out.
    pub fn handle<M, T>(
        &mut self,
        dom: &mut D,
        mgr: &mut M,
        event: &mut DragEvent<D::Node, D::Window, T>,
    ) where
        M: DragActions + DragMonitor + SourceRegistry,
        T: DataTransfer<D::Node>,
    {
        if !self.window_bound(event.window) {
            return;
        }
        match event.kind {
            DragEventKind::DragStart => {
                self.top_drag_start_capture(dom, mgr);
                self.drag_start_source_ids = self.path_sources(dom, event.target);
                self.top_drag_start(dom, mgr, event);
            }
            DragEventKind::DragEnd => self.top_drag_end_capture(dom, mgr),
            DragEventKind::DragEnter => {
                self.top_drag_enter_capture(dom, mgr, event);
                self.drag_enter_target_ids = self.path_targets(dom, event.target);
                self.top_drag_enter(dom, mgr, event);
            }
            DragEventKind::DragOver => {
                self.top_drag_over_capture();
                self.drag_over_target_ids = self.path_targets(dom, event.target);
                self.top_drag_over(dom, mgr, event);
            }
            DragEventKind::DragLeave => self.top_drag_leave_capture(dom, mgr, event),
            DragEventKind::Drop => {
                self.top_drop_capture(mgr, event);
                self.drop_target_ids = self.path_targets(dom, event.target);
                self.top_drop(dom, mgr, event);
            }
            DragEventKind::SelectStart => {
                if self.handle_select_start(dom, event.target) {
                    event.prevent_default();
                }
            }
            DragEventKind::MouseMove => self.handle_mouse_move(dom, mgr),
        }
    }

    /// Legacy-engine selection suppression.
    ///
    /// Only meaningful inside a registered source's subtree (the element
    /// listener lives on source nodes). Returns whether selection was
    /// suppressed and an explicit drag requested. Editable targets keep
    /// their selection behavior.
    pub fn handle_select_start(&mut self, dom: &mut D, node: D::Node) -> bool {
        if !self.engine.needs_select_start_drag() {
            return false;
        }
        if self.path_sources(dom, node).is_empty() {
            return false;
        }
        if matches!(dom.tag(node), Some(Tag::Input | Tag::Select | Tag::TextArea))
            || dom.is_content_editable(node)
        {
            return false;
        }
        dom.explicit_drag_start(node)
    }

    /// The node-removal and native-termination watchdog.
    ///
    /// Browsers do not reliably fire dragend when the source node is deleted
    /// mid-drag, and one engine never terminates native drags; a mouse move
    /// arriving mid-drag means the operation is over.
    pub fn handle_mouse_move<M>(&mut self, dom: &mut D, mgr: &mut M)
    where
        M: DragActions + DragMonitor + SourceRegistry,
    {
        if mgr.native_item_kind().is_some() {
            if !self.engine.reliable_native_drag_end() {
                self.end_drag_native(dom, mgr);
            }
            return;
        }
        self.end_drag_if_source_removed(dom, mgr);
    }

    /// Whether the host should be pumping mouse moves right now.
    #[must_use]
    pub fn wants_mouse_moves(&self) -> bool {
        self.current_source.is_some()
            || (self.current_native.is_some() && !self.engine.reliable_native_drag_end())
    }

    /// Whether a deferred publish is pending for the current drag.
    #[must_use]
    pub fn has_deferred_publish(&self) -> bool {
        self.deferred_publish == Some(self.drag_epoch)
    }

    /// Run the deferred publish scheduled at drag start, if still current.
    ///
    /// The host calls this on the next turn of its event loop. A task left
    /// over from a drag that has since ended detects the epoch mismatch and
    /// does nothing.
    pub fn flush_deferred_publish<M: DragActions>(&mut self, mgr: &mut M) {
        if let Some(epoch) = self.deferred_publish.take() {
            if epoch == self.drag_epoch {
                mgr.publish_drag_source();
            }
        }
    }

    // ---- capture/top handlers ----

    fn top_drag_start_capture<M>(&mut self, dom: &mut D, mgr: &mut M)
    where
        M: DragActions + DragMonitor + SourceRegistry,
    {
        // The previous drag's source may have been removed before its
        // dragend could fire; an orphaned active drag would block this one.
        if self.clear_current_source_node(dom) {
            mgr.end_drag();
        }
        self.drag_start_source_ids.clear();
    }

    fn top_drag_start<M, T>(
        &mut self,
        dom: &mut D,
        mgr: &mut M,
        event: &mut DragEvent<D::Node, D::Window, T>,
    ) where
        M: DragActions + DragMonitor + SourceRegistry,
        T: DataTransfer<D::Node>,
    {
        let source_ids = mem::take(&mut self.drag_start_source_ids);
        if mgr.is_dragging() {
            // Nested listeners must not double-begin a drag.
            return;
        }

        let candidates: SmallVec<[DragCandidate; 4]> = source_ids
            .iter()
            .map(|&id| DragCandidate {
                id,
                client_offset: self
                    .source_nodes
                    .get(&id)
                    .and_then(|&node| get_node_client_offset(dom, node)),
            })
            .collect();

        // Defer publication so the monitor can resolve which source actually
        // accepted before anything is surfaced to observers.
        mgr.begin_drag(
            &candidates,
            BeginDragOptions {
                publish_source: false,
                event_offset: Some(get_event_offset(dom, event)),
            },
        );

        let native_kind = match_native_item_type(&event.transfer);

        if mgr.is_dragging() {
            if event.transfer.supports_set_drag_image() {
                // If a child source refused the drag but a parent accepted,
                // the parent's node becomes the drag image.
                if let Some(&source_node) = mgr
                    .source_id()
                    .and_then(|id| self.source_nodes.get(&id))
                {
                    let preview = mgr
                        .source_id()
                        .and_then(|id| self.preview_nodes.get(&id))
                        .copied()
                        .unwrap_or(source_node);
                    let anchor = self.current_preview_options(mgr).anchor;
                    let client_offset = get_event_client_offset(dom, event, FrameScope::Local);
                    let preview_offset = get_drag_preview_offset(
                        dom,
                        self.engine,
                        source_node,
                        preview,
                        client_offset,
                        anchor,
                    );
                    event.transfer.set_drag_image(preview, preview_offset);
                }
            }

            // Gecko will not drag without payload data; engines that reject
            // custom types just drag without it.
            let _ = event.transfer.set_data("application/json", "{}");

            // Track the source node so removal mid-drag can end the drag.
            self.set_current_source_node(dom, event.target);

            if self.current_preview_options(mgr).capture_dragging_state {
                mgr.publish_drag_source();
            } else {
                // Published next turn, so the browser screenshots the
                // not-yet-dragging state for its native drag image.
                self.deferred_publish = Some(self.drag_epoch);
            }
        } else if let Some(kind) = native_kind {
            // A native payload (such as a URL) dragged from inside the page.
            self.begin_drag_native(dom, mgr, kind);
        } else if event.transfer.type_names().is_empty() && !dom.is_draggable(event.target) {
            // Engine quirk: type info absent and no draggable involved.
            // A native payload the dragenter handler will pick up; let the
            // browser continue.
        } else {
            // No source reacted; suppress the browser drag entirely.
            event.prevent_default();
        }
    }

    fn top_drag_end_capture<M>(&mut self, dom: &mut D, mgr: &mut M)
    where
        M: DragActions + DragMonitor + SourceRegistry,
    {
        // Acting only while a source node is still tracked breaks the
        // engine's infinite re-dispatch of dragend around synchronous UI
        // calls in handlers.
        if self.clear_current_source_node(dom) {
            mgr.end_drag();
        }
    }

    fn top_drag_enter_capture<M, T>(
        &mut self,
        dom: &mut D,
        mgr: &mut M,
        event: &DragEvent<D::Node, D::Window, T>,
    ) where
        M: DragActions + DragMonitor + SourceRegistry,
        T: DataTransfer<D::Node>,
    {
        self.drag_enter_target_ids.clear();

        let doc_el = dom.document_element(event.window);
        let is_first_enter = self
            .enter_leave
            .enter(event.target, |n| doc_el.is_some_and(|d| dom.contains(d, n)));
        if !is_first_enter || mgr.is_dragging() {
            return;
        }

        if let Some(kind) = match_native_item_type(&event.transfer) {
            // A native payload dragged in from outside the document.
            self.begin_drag_native(dom, mgr, kind);
        }
    }

    fn top_drag_enter<M, T>(
        &mut self,
        dom: &mut D,
        mgr: &mut M,
        event: &mut DragEvent<D::Node, D::Window, T>,
    ) where
        M: DragActions + DragMonitor + SourceRegistry,
        T: DataTransfer<D::Node>,
    {
        let target_ids = mem::take(&mut self.drag_enter_target_ids);
        if !mgr.is_dragging() || mgr.did_drop() {
            // Probably a native payload kind we do not understand.
            return;
        }

        if self.engine.hover_on_enter() {
            mgr.hover(&target_ids, Some(get_event_offset(dom, event)));
        }

        let can_drop = target_ids.iter().any(|&t| mgr.can_drop_on_target(t));
        if can_drop {
            event.prevent_default();
            let effect = self.current_drop_effect(mgr);
            event.transfer.set_drop_effect(effect);
        }
    }

    fn top_drag_over_capture(&mut self) {
        self.drag_over_target_ids.clear();
    }

    fn top_drag_over<M, T>(
        &mut self,
        dom: &mut D,
        mgr: &mut M,
        event: &mut DragEvent<D::Node, D::Window, T>,
    ) where
        M: DragActions + DragMonitor + SourceRegistry,
        T: DataTransfer<D::Node>,
    {
        let target_ids = mem::take(&mut self.drag_over_target_ids);
        if !mgr.is_dragging() || mgr.did_drop() {
            // Unrecognized payload; still block the browser's destructive
            // "drop and navigate away" default.
            event.prevent_default();
            event.transfer.set_drop_effect(DropEffect::None);
            return;
        }

        mgr.hover(&target_ids, Some(get_event_offset(dom, event)));

        let can_drop = target_ids.iter().any(|&t| mgr.can_drop_on_target(t));
        if can_drop {
            event.prevent_default();
            let effect = self.current_drop_effect(mgr);
            event.transfer.set_drop_effect(effect);
        } else if mgr.native_item_kind().is_some() {
            event.prevent_default();
            event.transfer.set_drop_effect(DropEffect::None);
        } else if self.check_source_rect_changed(dom) {
            // The source moved since drag start; an effect other than none
            // keeps the browser from animating the drop back to the stale
            // position.
            event.prevent_default();
            event.transfer.set_drop_effect(DropEffect::Move);
        }
    }

    fn top_drag_leave_capture<M, T>(
        &mut self,
        dom: &mut D,
        mgr: &mut M,
        event: &mut DragEvent<D::Node, D::Window, T>,
    ) where
        M: DragActions + DragMonitor + SourceRegistry,
        T: DataTransfer<D::Node>,
    {
        if mgr.native_item_kind().is_some() {
            event.prevent_default();
        }

        let doc_el = dom.document_element(event.window);
        let is_last_leave = self
            .enter_leave
            .leave(event.target, |n| doc_el.is_some_and(|d| dom.contains(d, n)));
        if !is_last_leave {
            return;
        }

        if mgr.native_item_kind().is_some() {
            self.end_drag_native(dom, mgr);
        }
    }

    fn top_drop_capture<M, T>(&mut self, mgr: &M, event: &mut DragEvent<D::Node, D::Window, T>)
    where
        M: DragMonitor,
        T: DataTransfer<D::Node>,
    {
        self.drop_target_ids.clear();
        // Browsers otherwise navigate to or open the dropped payload.
        event.prevent_default();

        if mgr.native_item_kind().is_some() {
            if let Some(native) = &self.current_native {
                native
                    .source
                    .borrow_mut()
                    .mutate_item_by_reading_data_transfer(&event.transfer);
            }
        }

        // Drop does not reliably pair with a prior leave.
        self.enter_leave.reset();
    }

    fn top_drop<M, T>(
        &mut self,
        dom: &mut D,
        mgr: &mut M,
        event: &DragEvent<D::Node, D::Window, T>,
    ) where
        M: DragActions + DragMonitor + SourceRegistry,
        T: DataTransfer<D::Node>,
    {
        let target_ids = mem::take(&mut self.drop_target_ids);

        // Hover first, so the dispatcher's current targets match the drop
        // location before the drop resolves.
        mgr.hover(&target_ids, Some(get_event_offset(dom, event)));
        mgr.drop();

        if mgr.native_item_kind().is_some() {
            self.end_drag_native(dom, mgr);
        } else {
            // A drop may detach the source node as a side effect.
            self.end_drag_if_source_removed(dom, mgr);
        }
    }

    // ---- native drag lifecycle ----

    fn begin_drag_native<M>(&mut self, dom: &mut D, mgr: &mut M, kind: NativeItemKind)
    where
        M: DragActions + DragMonitor + SourceRegistry,
    {
        self.clear_current_source_node(dom);

        let source = Rc::new(RefCell::new(create_native_drag_source(kind)));
        let handle = mgr.add_native_source(kind, Rc::clone(&source));
        self.current_native = Some(CurrentNativeSource { handle, source });
        mgr.begin_drag(
            &[DragCandidate {
                id: handle,
                client_offset: None,
            }],
            BeginDragOptions::default(),
        );

        // One engine never reliably terminates native drags; a mouse move
        // arriving mid-drag stands in for the missing event.
        if !self.engine.reliable_native_drag_end() {
            if let Some(window) = self.root_window {
                dom.bind_window_events(window, ListenerKinds::MOUSE_MOVE);
            }
        }
    }

    fn end_drag_native<M>(&mut self, dom: &mut D, mgr: &mut M)
    where
        M: DragActions + DragMonitor + SourceRegistry,
    {
        if mgr.native_item_kind().is_none() {
            return;
        }

        if !self.engine.reliable_native_drag_end() {
            if let Some(window) = self.root_window {
                dom.unbind_window_events(window, ListenerKinds::MOUSE_MOVE);
            }
        }

        mgr.end_drag();
        if let Some(native) = self.current_native.take() {
            mgr.remove_source(native.handle);
        }
        self.drag_epoch = self.drag_epoch.wrapping_add(1);
    }

    // ---- current-source bookkeeping ----

    fn set_current_source_node(&mut self, dom: &mut D, node: D::Node) {
        self.clear_current_source_node(dom);
        self.current_source = Some(CurrentSourceNode {
            node,
            client_offset: get_node_client_offset(dom, node),
            offset_changed: false,
        });

        // A mouse event mid-drag means the drag ended with the source gone
        // from the DOM and no dragend dispatched.
        if let Some(window) = self.root_window {
            dom.bind_window_events(window, ListenerKinds::MOUSE_MOVE);
        }
    }

    fn clear_current_source_node(&mut self, dom: &mut D) -> bool {
        if self.current_source.take().is_some() {
            if let Some(window) = self.root_window {
                dom.unbind_window_events(window, ListenerKinds::MOUSE_MOVE);
            }
            self.drag_epoch = self.drag_epoch.wrapping_add(1);
            true
        } else {
            false
        }
    }

    fn check_source_rect_changed(&mut self, dom: &D) -> bool {
        let Some(current) = &mut self.current_source else {
            return false;
        };
        if current.offset_changed {
            return true;
        }
        current.offset_changed =
            get_node_client_offset(dom, current.node) != current.client_offset;
        current.offset_changed
    }

    fn end_drag_if_source_removed<M>(&mut self, dom: &mut D, mgr: &mut M)
    where
        M: DragActions + DragMonitor + SourceRegistry,
    {
        let Some(current) = &self.current_source else {
            return;
        };
        if topology::is_node_in_doc(dom, current.node) {
            return;
        }
        if self.clear_current_source_node(dom) {
            mgr.end_drag();
        }
    }

    // ---- lookups ----

    fn window_bound(&self, window: D::Window) -> bool {
        self.root_window == Some(window) || self.frame_windows.contains_key(&window)
    }

    fn frame_window_of(&self, dom: &D, node: D::Node) -> Option<D::Window> {
        if topology::is_in_iframe(dom, node) {
            topology::get_window(dom, DomRef::Node(node))
        } else {
            None
        }
    }

    fn retain_frame_listeners(&mut self, dom: &mut D, window: D::Window) {
        let count = self.frame_windows.entry(window).or_insert(0);
        if *count == 0 {
            dom.bind_window_events(window, ListenerKinds::DRAG_SET);
        }
        *count += 1;
    }

    fn release_frame_listeners(&mut self, dom: &mut D, window: D::Window) {
        if let Some(count) = self.frame_windows.get_mut(&window) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.frame_windows.remove(&window);
                dom.unbind_window_events(window, ListenerKinds::DRAG_SET);
            }
        }
    }

    /// Registered source IDs along the path from `from` to the root,
    /// nearest-first; most recently registered first within one node.
    fn path_sources(&self, dom: &D, from: D::Node) -> SmallVec<[SourceId; 4]> {
        let mut ids = SmallVec::new();
        let mut cursor = Some(from);
        while let Some(node) = cursor {
            if let Some(registered) = self.node_sources.get(&node) {
                ids.extend(registered.iter().rev().copied());
            }
            cursor = dom.parent(node);
        }
        ids
    }

    /// Registered target IDs along the path from `from` to the root,
    /// nearest-first; most recently registered first within one node.
    fn path_targets(&self, dom: &D, from: D::Node) -> SmallVec<[TargetId; 4]> {
        let mut ids = SmallVec::new();
        let mut cursor = Some(from);
        while let Some(node) = cursor {
            if let Some(registered) = self.node_targets.get(&node) {
                ids.extend(registered.iter().rev().copied());
            }
            cursor = dom.parent(node);
        }
        ids
    }

    fn current_source_options<M: DragMonitor>(&self, mgr: &M) -> SourceOptions {
        mgr.source_id()
            .and_then(|id| self.source_options.get(&id).copied())
            .unwrap_or_default()
    }

    fn current_preview_options<M: DragMonitor>(&self, mgr: &M) -> PreviewOptions {
        mgr.source_id()
            .and_then(|id| self.preview_options.get(&id).copied())
            .unwrap_or_default()
    }

    fn current_drop_effect<M: DragMonitor>(&self, mgr: &M) -> DropEffect {
        if mgr.native_item_kind().is_some() {
            // Copy reads better than move for resources from outside.
            return DropEffect::Copy;
        }
        self.current_source_options(mgr).drop_effect
    }
}
