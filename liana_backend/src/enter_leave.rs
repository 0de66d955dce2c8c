// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document-level enter/leave reconciliation.
//!
//! `dragenter`/`dragleave` fire once per DOM node pair along the path, not
//! once per drag: every descendant transition looks like the drag leaving
//! and re-entering. This counter reduces that noise to the two transitions
//! that matter — the drag entering the document region as a whole, and truly
//! leaving it.
//!
//! ## Minimal example
//!
//! ```
//! use liana_backend::enter_leave::EnterLeaveCounter;
//!
//! let mut counter = EnterLeaveCounter::new();
//! let live = |_: u32| true;
//!
//! // Outer element, then a nested child: only the first enter is real.
//! assert!(counter.enter(1, live));
//! assert!(!counter.enter(2, live));
//!
//! // Leaving the child keeps us inside; leaving the outer element is real.
//! assert!(!counter.leave(2, live));
//! assert!(counter.leave(1, live));
//! ```

use smallvec::SmallVec;

/// Tracks nested enter/leave pairs per node to find true document-level
/// transitions.
///
/// Internally an ordered set of entered nodes; the depth is its length, so
/// it can never go negative, and the same node entering twice (bubbling
/// duplicates) collapses to one entry. Both operations take a `live`
/// predicate and first drop tracked nodes that are no longer live — nodes
/// removed mid-drag would otherwise hold the counter open forever.
#[derive(Clone, Debug, Default)]
pub struct EnterLeaveCounter<N> {
    entered: SmallVec<[N; 4]>,
}

impl<N: Copy + Eq> EnterLeaveCounter<N> {
    /// Creates an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entered: SmallVec::new(),
        }
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entered.len()
    }

    /// Record one entry for `node`.
    ///
    /// Returns `true` exactly when this is the first entry since the last
    /// full exit — the drag has newly entered the document region as a
    /// whole, not merely a deeper descendant.
    pub fn enter(&mut self, node: N, live: impl Fn(N) -> bool) -> bool {
        let was_empty = self.entered.is_empty();
        self.entered.retain(|n| live(*n));
        if !self.entered.contains(&node) {
            self.entered.push(node);
        }
        was_empty && !self.entered.is_empty()
    }

    /// Record one exit for `node`.
    ///
    /// Returns `true` exactly when no entered nodes remain — a true
    /// top-level leave.
    pub fn leave(&mut self, node: N, live: impl Fn(N) -> bool) -> bool {
        let was_occupied = !self.entered.is_empty();
        self.entered.retain(|n| live(*n) && *n != node);
        was_occupied && self.entered.is_empty()
    }

    /// Unconditionally clear all tracked entries.
    ///
    /// Called after a drop: drop events do not reliably pair with leave
    /// events, so the state is reset atomically instead.
    pub fn reset(&mut self) {
        self.entered.clear();
    }
}
