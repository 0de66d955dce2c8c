// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag events and the data-transfer surface.
//!
//! The host builds one [`DragEvent`] per DOM event it routes into the
//! backend, and reads [`DragEvent::default_prevented`] back afterwards to
//! decide whether to call the platform's `preventDefault`. This is the
//! flag-on-the-event pattern rather than a control-flow exception: the
//! backend never unwinds out of a handler.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Vec2};

/// The event kinds the backend reconciles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DragEventKind {
    /// A drag gesture started on some node.
    DragStart,
    /// The browser ended a drag (capture-phase only).
    DragEnd,
    /// The drag entered a node.
    DragEnter,
    /// The drag left a node (capture-phase only).
    DragLeave,
    /// The drag is moving over a node.
    DragOver,
    /// The payload was dropped.
    Drop,
    /// Text selection is starting (legacy engines only).
    SelectStart,
    /// A plain mouse move, pumped only while a watchdog is armed.
    MouseMove,
}

bitflags::bitflags! {
    /// Window-level listener kinds, used for idempotent (un)binding.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ListenerKinds: u8 {
        /// `dragstart` in both phases.
        const DRAG_START   = 0b0000_0001;
        /// `dragend` capture.
        const DRAG_END     = 0b0000_0010;
        /// `dragenter` in both phases.
        const DRAG_ENTER   = 0b0000_0100;
        /// `dragleave` capture.
        const DRAG_LEAVE   = 0b0000_1000;
        /// `dragover` in both phases.
        const DRAG_OVER    = 0b0001_0000;
        /// `drop` in both phases.
        const DROP         = 0b0010_0000;
        /// `mousemove` capture, for the removal watchdogs.
        const MOUSE_MOVE   = 0b0100_0000;
        /// `selectstart`, element-level on legacy engines.
        const SELECT_START = 0b1000_0000;
    }
}

impl ListenerKinds {
    /// The standard top-level set installed on every participating window.
    pub const DRAG_SET: Self = Self::DRAG_START
        .union(Self::DRAG_END)
        .union(Self::DRAG_ENTER)
        .union(Self::DRAG_LEAVE)
        .union(Self::DRAG_OVER)
        .union(Self::DROP);
}

/// The visible drop effect requested from the browser.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DropEffect {
    /// No drop permitted; blocks the browser's destructive defaults.
    #[default]
    None,
    /// Copy the payload.
    Copy,
    /// Link to the payload.
    Link,
    /// Move the payload.
    Move,
}

impl DropEffect {
    /// The DOM string value for this effect.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Copy => "copy",
            Self::Link => "link",
            Self::Move => "move",
        }
    }
}

/// Setting custom drag data was refused by the engine.
///
/// Some engines reject non-standard MIME types in `setData`; the backend
/// tolerates this and proceeds without custom payload data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SetDataError;

impl fmt::Display for SetDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("engine rejected custom drag data type")
    }
}

impl core::error::Error for SetDataError {}

/// View over a DOM `DataTransfer`, implemented by the host.
///
/// Reads are only guaranteed meaningful where the DOM guarantees them: the
/// type list is available throughout a drag, but string and file payloads
/// are only readable inside the drop handler on most engines, which is why
/// the backend reads them synchronously there.
pub trait DataTransfer<N> {
    /// The advertised type list (`Files`, `text/uri-list`, MIME types, …).
    /// May be empty on engines that withhold it outside a drag.
    fn type_names(&self) -> Vec<String>;
    /// String payload for a format, if present and readable.
    fn string_data(&self, format: &str) -> Option<String>;
    /// Names of dragged files, if any.
    fn file_names(&self) -> Vec<String>;

    /// Set the visible drop effect.
    fn set_drop_effect(&mut self, effect: DropEffect);
    /// Whether the engine supports custom drag images at all.
    fn supports_set_drag_image(&self) -> bool;
    /// Install a custom drag image anchored at `offset` within the node.
    fn set_drag_image(&mut self, node: N, offset: Vec2);
    /// Attach string payload data. Engines may refuse custom types.
    fn set_data(&mut self, format: &str, data: &str) -> Result<(), SetDataError>;
}

/// One DOM event routed into the backend.
///
/// `offset_in_target` is the event position relative to the target element's
/// content box (`offsetX`/`offsetY`); `client` is viewport-relative. Page
/// coordinates are deliberately absent — they are unreliable inside iframes
/// and the geometry crate derives them instead.
#[derive(Debug)]
pub struct DragEvent<N, W, T> {
    /// Which event this is.
    pub kind: DragEventKind,
    /// The window whose listener saw the event.
    pub window: W,
    /// The event target node.
    pub target: N,
    /// Viewport-relative position.
    pub client: Point,
    /// Position relative to the target element's content box.
    pub offset_in_target: Vec2,
    /// The event's data transfer.
    pub transfer: T,
    default_prevented: bool,
}

impl<N, W, T> DragEvent<N, W, T> {
    /// Build an event for dispatch.
    pub fn new(
        kind: DragEventKind,
        window: W,
        target: N,
        client: Point,
        offset_in_target: Vec2,
        transfer: T,
    ) -> Self {
        Self {
            kind,
            window,
            target,
            client,
            offset_in_target,
            transfer,
            default_prevented: false,
        }
    }

    /// Suppress the browser's default action for this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether the backend asked to suppress the default action.
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_set_excludes_watchdog_and_selection_kinds() {
        let set = ListenerKinds::DRAG_SET;
        assert!(set.contains(ListenerKinds::DRAG_START));
        assert!(set.contains(ListenerKinds::DROP));
        assert!(!set.contains(ListenerKinds::MOUSE_MOVE));
        assert!(!set.contains(ListenerKinds::SELECT_START));
    }

    #[test]
    fn prevent_default_latches() {
        let mut e = DragEvent::new(
            DragEventKind::DragOver,
            0_u32,
            0_u32,
            Point::ZERO,
            Vec2::ZERO,
            (),
        );
        assert!(!e.default_prevented());
        e.prevent_default();
        e.prevent_default();
        assert!(e.default_prevented());
    }

    #[test]
    fn drop_effect_strings() {
        assert_eq!(DropEffect::None.as_str(), "none");
        assert_eq!(DropEffect::Move.as_str(), "move");
    }
}
