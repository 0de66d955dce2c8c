// Copyright 2026 the Liana Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotone cubic interpolation over a small set of knots.
//!
//! Tangents are chosen with the Fritsch–Carlson scheme, so the interpolated
//! curve never overshoots the knot range: monotone knot values produce a
//! monotone curve. Drag-preview anchoring depends on exactly that property.

use alloc::vec::Vec;

/// A monotone piecewise-cubic interpolant over `(x, y)` knots.
///
/// Knots are sorted by `x` on construction. Adjacent knots with equal `x`
/// get a zero tangent instead of a division by zero, which keeps evaluation
/// finite for degenerate inputs.
#[derive(Clone, Debug)]
pub struct MonotonicInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
    c1s: Vec<f64>,
    c2s: Vec<f64>,
    c3s: Vec<f64>,
}

impl MonotonicInterpolant {
    /// Build an interpolant from parallel knot arrays.
    ///
    /// `xs` and `ys` must have the same length.
    #[must_use]
    pub fn new(xs: &[f64], ys: &[f64]) -> Self {
        debug_assert_eq!(xs.len(), ys.len(), "knot arrays must be parallel");
        let len = xs.len().min(ys.len());

        let mut order: Vec<usize> = (0..len).collect();
        order.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));
        let xs: Vec<f64> = order.iter().map(|&i| xs[i]).collect();
        let ys: Vec<f64> = order.iter().map(|&i| ys[i]).collect();

        // Secant slopes between consecutive knots. A vertical pair gets a
        // zero slope, keeping every later term finite.
        let mut dxs = Vec::with_capacity(len.saturating_sub(1));
        let mut ms = Vec::with_capacity(len.saturating_sub(1));
        for i in 0..len.saturating_sub(1) {
            let dx = xs[i + 1] - xs[i];
            let dy = ys[i + 1] - ys[i];
            dxs.push(dx);
            ms.push(if dx == 0.0 { 0.0 } else { dy / dx });
        }

        // Degree-1 coefficients: Fritsch–Carlson tangents. A sign change (or
        // a flat secant) forces a zero tangent so the segment cannot
        // overshoot.
        let mut c1s = Vec::with_capacity(len);
        if let Some(&first) = ms.first() {
            c1s.push(first);
        }
        for i in 1..ms.len() {
            let m = ms[i - 1];
            let next = ms[i];
            if m * next <= 0.0 {
                c1s.push(0.0);
            } else {
                let dx = dxs[i - 1];
                let dx_next = dxs[i];
                let common = dx + dx_next;
                c1s.push(3.0 * common / ((common + dx_next) / m + (common + dx) / next));
            }
        }
        if let Some(&last) = ms.last() {
            c1s.push(last);
        }

        // Degree-2 and degree-3 coefficients per segment.
        let mut c2s = Vec::with_capacity(ms.len());
        let mut c3s = Vec::with_capacity(ms.len());
        for i in 0..ms.len() {
            let c1 = c1s[i];
            let m = ms[i];
            let inv_dx = if dxs[i] == 0.0 { 0.0 } else { 1.0 / dxs[i] };
            let common = c1 + c1s[i + 1] - m - m;
            c2s.push((m - c1 - common) * inv_dx);
            c3s.push(common * inv_dx * inv_dx);
        }

        Self { xs, ys, c1s, c2s, c3s }
    }

    /// Evaluate the interpolant at `x`.
    ///
    /// Queries outside the knot range extrapolate from the nearest segment,
    /// matching the cubic Hermite form of that segment.
    #[must_use]
    pub fn interpolate(&self, x: f64) -> f64 {
        let Some((&last_x, &last_y)) = self.xs.last().zip(self.ys.last()) else {
            return 0.0;
        };
        if x == last_x || self.c3s.is_empty() {
            return last_y;
        }

        // Locate the enclosing segment. Three knots would not need a binary
        // search, but the knot count is not fixed by this type.
        let mut low: isize = 0;
        let mut high: isize = self.c3s.len() as isize - 1;
        while low <= high {
            let mid = (low + high) / 2;
            let x_here = self.xs[usize::try_from(mid).unwrap_or(0)];
            if x_here < x {
                low = mid + 1;
            } else if x_here > x {
                high = mid - 1;
            } else {
                return self.ys[usize::try_from(mid).unwrap_or(0)];
            }
        }
        let i = usize::try_from(high.max(0)).unwrap_or(0);

        let diff = x - self.xs[i];
        let diff_sq = diff * diff;
        self.ys[i] + self.c1s[i] * diff + self.c2s[i] * diff_sq + self.c3s[i] * diff * diff_sq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn exact_at_knots() {
        let it = MonotonicInterpolant::new(&[0.0, 0.5, 1.0], &[-4.0, 10.0, 60.0]);
        assert_eq!(it.interpolate(0.0), -4.0);
        assert_eq!(it.interpolate(0.5), 10.0);
        assert_eq!(it.interpolate(1.0), 60.0);
    }

    #[test]
    fn monotone_knots_give_monotone_curve() {
        let it = MonotonicInterpolant::new(&[0.0, 0.5, 1.0], &[0.0, 30.0, 40.0]);
        let samples: Vec<f64> = (0..=100).map(|i| it.interpolate(f64::from(i) / 100.0)).collect();
        for pair in samples.windows(2) {
            assert!(pair[1] >= pair[0], "curve regressed between samples: {pair:?}");
        }
        // No overshoot beyond the knot range.
        for v in samples {
            assert!((0.0..=40.0).contains(&v));
        }
    }

    #[test]
    fn decreasing_knots_stay_decreasing() {
        let it = MonotonicInterpolant::new(&[0.0, 0.5, 1.0], &[40.0, 12.0, 0.0]);
        let mut prev = f64::INFINITY;
        for i in 0..=20 {
            let v = it.interpolate(f64::from(i) / 20.0);
            assert!(v <= prev);
            prev = v;
        }
    }

    #[test]
    fn unsorted_knots_are_sorted_on_construction() {
        let it = MonotonicInterpolant::new(&[1.0, 0.0, 0.5], &[40.0, 0.0, 20.0]);
        assert_eq!(it.interpolate(0.0), 0.0);
        assert_eq!(it.interpolate(0.5), 20.0);
        assert_eq!(it.interpolate(1.0), 40.0);
    }

    #[test]
    fn equal_adjacent_x_values_stay_finite() {
        let it = MonotonicInterpolant::new(&[0.0, 0.0, 1.0], &[0.0, 5.0, 10.0]);
        for i in 0..=10 {
            let v = it.interpolate(f64::from(i) / 10.0);
            assert!(v.is_finite());
        }
    }

    #[test]
    fn empty_and_single_knot() {
        let empty = MonotonicInterpolant::new(&[], &[]);
        assert_eq!(empty.interpolate(0.3), 0.0);

        let single = MonotonicInterpolant::new(&[0.5], &[7.0]);
        assert_eq!(single.interpolate(0.5), 7.0);
    }
}
