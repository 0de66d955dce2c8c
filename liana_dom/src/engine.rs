// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The browser-engine quirk table.
//!
//! Engine detection is the host's problem (user-agent sniffing is scoped out
//! of liana); the backend only needs to know which engine it is driving so it
//! can pick the right behavior at the handful of places engines disagree.
//! Each quirk is a named predicate so call sites read as the behavior they
//! select, not as engine comparisons.

/// The rendering engine hosting the drag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Engine {
    /// Chromium family.
    Blink,
    /// Firefox family.
    Gecko,
    /// Safari family.
    WebKit,
    /// Legacy engines that need explicit drag opt-in via `selectstart`.
    Legacy,
}

impl Engine {
    /// Whether hover actions may fire from `dragenter`.
    ///
    /// Gecko keeps dispatching `dragover` to a target that repositioned in
    /// response to `dragenter`, so hover is deferred to `dragover` there.
    #[must_use]
    pub fn hover_on_enter(self) -> bool {
        !matches!(self, Self::Gecko)
    }

    /// Whether the engine reliably terminates native drags with a drag event.
    ///
    /// Gecko does not; a mousemove watchdog stands in for the missing event.
    #[must_use]
    pub fn reliable_native_drag_end(self) -> bool {
        !matches!(self, Self::Gecko)
    }

    /// Whether an image preview renders at its intrinsic size.
    ///
    /// Gecko always renders image previews at intrinsic size; other engines
    /// only do so when the image is detached from the document.
    #[must_use]
    pub fn image_preview_at_intrinsic_size(self, detached: bool) -> bool {
        matches!(self, Self::Gecko) || detached
    }

    /// Whether image preview sizes must be divided by the device pixel ratio.
    #[must_use]
    pub fn scales_image_preview_down_by_dpr(self) -> bool {
        matches!(self, Self::WebKit)
    }

    /// Whether non-image preview sizes must be multiplied by the device
    /// pixel ratio.
    #[must_use]
    pub fn scales_node_preview_up_by_dpr(self) -> bool {
        matches!(self, Self::Gecko)
    }

    /// Whether image previews need the vertical positioning fixup.
    #[must_use]
    pub fn image_preview_vertical_fixup(self) -> bool {
        matches!(self, Self::WebKit)
    }

    /// Whether drags must be started explicitly from `selectstart`.
    #[must_use]
    pub fn needs_select_start_drag(self) -> bool {
        matches!(self, Self::Legacy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gecko_defers_hover_and_needs_watchdog() {
        assert!(!Engine::Gecko.hover_on_enter());
        assert!(!Engine::Gecko.reliable_native_drag_end());
        assert!(Engine::Blink.hover_on_enter());
        assert!(Engine::Blink.reliable_native_drag_end());
    }

    #[test]
    fn intrinsic_size_rules() {
        // Gecko: always intrinsic, attached or not.
        assert!(Engine::Gecko.image_preview_at_intrinsic_size(false));
        // Others: only when detached.
        assert!(!Engine::Blink.image_preview_at_intrinsic_size(false));
        assert!(Engine::Blink.image_preview_at_intrinsic_size(true));
        assert!(Engine::WebKit.image_preview_at_intrinsic_size(true));
    }

    #[test]
    fn dpr_corrections_oppose_each_other() {
        assert!(Engine::WebKit.scales_image_preview_down_by_dpr());
        assert!(!Engine::WebKit.scales_node_preview_up_by_dpr());
        assert!(Engine::Gecko.scales_node_preview_up_by_dpr());
        assert!(!Engine::Gecko.scales_image_preview_down_by_dpr());
    }
}
