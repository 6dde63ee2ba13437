// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-vs-target visibility evaluation.
//!
//! [`evaluate`] compares two [`ModifiedRect`]s and produces a [`Verdict`]:
//! whether the target is off-screen and on which side, plus a normalized
//! [`Offset`] that is computed regardless of the outcome.
//!
//! Each offset component is the signed distance between a target edge and the
//! matching screen edge, divided by the screen's (unmodified) extent on that
//! axis. Zero means flush, positive means the target edge is inside the
//! screen edge, negative means it is past it.
//!
//! Edges touching counts as off-screen: a target whose bottom equals the
//! screen's top is on the `top` side.

use crate::modifier::ModifiedRect;
use crate::side::{Horizontal, Side, Vertical};

/// Normalized per-edge distances between a target and the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    /// `(target.top - screen.top) / screen.height`
    pub top: f64,
    /// `(screen.right - target.right) / screen.width`
    pub right: f64,
    /// `(screen.bottom - target.bottom) / screen.height`
    pub bottom: f64,
    /// `(target.left - screen.left) / screen.width`
    pub left: f64,
}

impl Offset {
    /// Computes the offset of `target` within `screen`.
    ///
    /// A zero-sized screen yields non-finite components; they are passed
    /// through unchanged.
    #[must_use]
    pub fn between(screen: &ModifiedRect, target: &ModifiedRect) -> Self {
        Self {
            top: (target.top() - screen.top()) / screen.height,
            right: -(target.right() - screen.right()) / screen.width,
            bottom: -(target.bottom() - screen.bottom()) / screen.height,
            left: (target.left() - screen.left()) / screen.width,
        }
    }
}

/// The outcome of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Verdict {
    /// The off-screen side, or `None` when the target intersects the screen.
    pub side: Option<Side>,
    /// Normalized offsets, always populated.
    pub offset: Offset,
}

impl Verdict {
    /// Returns `true` if the target intersects the screen.
    #[inline]
    #[must_use]
    pub const fn is_on_screen(&self) -> bool {
        self.side.is_none()
    }
}

/// Evaluates `target` against `screen`.
///
/// The axes are independent; within an axis the top (left) test wins over
/// the bottom (right) test, which only matters for inverted rectangles.
#[must_use]
pub fn evaluate(screen: &ModifiedRect, target: &ModifiedRect) -> Verdict {
    let vertical = if target.bottom() <= screen.top() {
        Some(Vertical::Top)
    } else if target.top() >= screen.bottom() {
        Some(Vertical::Bottom)
    } else {
        None
    };

    let horizontal = if target.right() <= screen.left() {
        Some(Horizontal::Left)
    } else if target.left() >= screen.right() {
        Some(Horizontal::Right)
    } else {
        None
    };

    Verdict {
        side: Side::from_axes(vertical, horizontal),
        offset: Offset::between(screen, target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{EdgeModifiers, Modifier, modify};
    use kurbo::Rect;

    fn plain(x0: f64, y0: f64, x1: f64, y1: f64) -> ModifiedRect {
        modify(Rect::new(x0, y0, x1, y1), &EdgeModifiers::NONE)
    }

    fn screen() -> ModifiedRect {
        plain(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn above_the_screen_is_top() {
        for bottom in [-500.0, -1.0, 0.0] {
            let v = evaluate(&screen(), &plain(100.0, bottom - 50.0, 200.0, bottom));
            assert!(!v.is_on_screen(), "bottom={bottom}");
            assert_eq!(v.side, Some(Side::Top), "bottom={bottom}");
        }
    }

    #[test]
    fn below_the_screen_is_bottom() {
        let v = evaluate(&screen(), &plain(0.0, 800.0, 100.0, 900.0));
        assert_eq!(v.side, Some(Side::Bottom));
    }

    #[test]
    fn contained_target_is_on_screen() {
        for (x0, y0, x1, y1) in [
            (0.0, 0.0, 1000.0, 800.0),
            (10.0, 10.0, 20.0, 20.0),
            (999.0, 799.0, 1000.0, 800.0),
        ] {
            let v = evaluate(&screen(), &plain(x0, y0, x1, y1));
            assert!(v.is_on_screen(), "({x0}, {y0}, {x1}, {y1})");
        }
    }

    #[test]
    fn partially_visible_target_is_on_screen() {
        let v = evaluate(&screen(), &plain(-50.0, -50.0, 50.0, 50.0));
        assert!(v.is_on_screen());
        assert_eq!(v.offset.top, -50.0 / 800.0);
        assert_eq!(v.offset.left, -50.0 / 1000.0);
    }

    #[test]
    fn corner_sides_combine_both_axes() {
        let s = screen();
        assert_eq!(
            evaluate(&s, &plain(-100.0, -100.0, -10.0, -10.0)).side,
            Some(Side::TopLeft)
        );
        assert_eq!(
            evaluate(&s, &plain(1100.0, -100.0, 1200.0, -10.0)).side,
            Some(Side::TopRight)
        );
        assert_eq!(
            evaluate(&s, &plain(-100.0, 900.0, -10.0, 1000.0)).side,
            Some(Side::BottomLeft)
        );
        assert_eq!(
            evaluate(&s, &plain(1100.0, 900.0, 1200.0, 1000.0)).side,
            Some(Side::BottomRight)
        );
        assert_eq!(
            evaluate(&s, &plain(1000.0, 100.0, 1100.0, 200.0)).side,
            Some(Side::Right)
        );
    }

    #[test]
    fn offsets_follow_edge_formulas() {
        let v = evaluate(&screen(), &plain(100.0, 200.0, 300.0, 600.0));
        assert_eq!(v.offset.top, 0.25);
        assert_eq!(v.offset.bottom, 0.25);
        assert_eq!(v.offset.left, 0.1);
        assert_eq!(v.offset.right, 0.7);
    }

    #[test]
    fn offsets_are_scale_invariant() {
        let small = evaluate(&plain(0.0, 0.0, 500.0, 400.0), &plain(30.0, 70.0, 130.0, 470.0));
        let large = evaluate(
            &plain(0.0, 0.0, 1000.0, 800.0),
            &plain(60.0, 140.0, 260.0, 940.0),
        );
        assert_eq!(small.side, large.side);
        let eps = 1e-12;
        assert!((small.offset.top - large.offset.top).abs() < eps, "top");
        assert!((small.offset.right - large.offset.right).abs() < eps, "right");
        assert!((small.offset.bottom - large.offset.bottom).abs() < eps, "bottom");
        assert!((small.offset.left - large.offset.left).abs() < eps, "left");
    }

    #[test]
    fn offsets_normalize_by_unmodified_screen_extent() {
        let s = modify(
            Rect::new(0.0, 0.0, 1000.0, 800.0),
            &EdgeModifiers {
                top: Modifier::Absolute(200.0),
                ..EdgeModifiers::NONE
            },
        );
        let v = evaluate(&s, &plain(0.0, 400.0, 100.0, 500.0));
        assert_eq!(v.offset.top, 200.0 / 800.0);
    }

    #[test]
    fn screen_insets_can_push_a_target_off_screen() {
        let s = modify(
            Rect::new(0.0, 0.0, 1000.0, 800.0),
            &EdgeModifiers {
                bottom: Modifier::Percent(50.0),
                ..EdgeModifiers::NONE
            },
        );
        let v = evaluate(&s, &plain(0.0, 450.0, 100.0, 500.0));
        assert_eq!(v.side, Some(Side::Bottom));
    }

    #[test]
    fn zero_sized_screen_yields_non_finite_offsets() {
        let v = evaluate(&plain(0.0, 0.0, 0.0, 0.0), &plain(10.0, 10.0, 20.0, 20.0));
        assert!(!v.offset.top.is_finite());
        assert_eq!(v.side, Some(Side::BottomRight));
    }
}
