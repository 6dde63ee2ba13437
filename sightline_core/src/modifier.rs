// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge modifiers and modified comparison rectangles.
//!
//! Both the screen rectangle and each target rectangle can be shrunk (or,
//! with negative values, grown) per edge before they are compared. A
//! [`Modifier`] is either an absolute pixel amount or a percentage of the
//! rectangle's extent along the edge's axis: height for top/bottom, width for
//! left/right.
//!
//! Modifiers are always applied *inward*:
//!
//! ```text
//! top    += top modifier        left  += left modifier
//! bottom -= bottom modifier     right -= right modifier
//! ```
//!
//! The resulting [`ModifiedRect`] keeps the **unmodified** width and height.
//! Offsets computed by [`evaluate`](crate::visibility::evaluate) are
//! normalized by that unmodified extent.

use kurbo::Rect;

/// A single-edge inset.
///
/// Malformed input never fails: anything that cannot be read as a number
/// resolves to zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Modifier {
    /// An absolute amount in pixels.
    Absolute(f64),
    /// A percentage (`50.0` means half) of the edge's dimension.
    Percent(f64),
}

impl Default for Modifier {
    fn default() -> Self {
        Self::Absolute(0.0)
    }
}

impl Modifier {
    /// A zero inset.
    pub const ZERO: Self = Self::Absolute(0.0);

    /// Parses a modifier from its textual form.
    ///
    /// A string ending in a digit followed by `%` (e.g. `"25%"`) is a
    /// percentage. Anything else is read by its longest leading decimal
    /// number, so `"12px"` is 12 pixels. Unparseable text is zero.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let bytes = text.as_bytes();
        let is_percent = bytes.len() >= 2
            && bytes[bytes.len() - 1] == b'%'
            && bytes[bytes.len() - 2].is_ascii_digit();
        let value = leading_number(text).unwrap_or(0.0);
        if is_percent {
            Self::Percent(value)
        } else {
            Self::Absolute(value)
        }
    }

    /// Resolves this modifier to pixels against `range`, the rectangle's
    /// extent along the edge's axis.
    #[must_use]
    pub fn resolve(self, range: f64) -> f64 {
        let px = match self {
            Self::Absolute(v) => v,
            Self::Percent(p) => p / 100.0 * range,
        };
        if px.is_finite() { px } else { 0.0 }
    }
}

impl From<f64> for Modifier {
    fn from(px: f64) -> Self {
        Self::Absolute(px)
    }
}

impl From<&str> for Modifier {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

/// Reads the longest leading decimal number of `text`, skipping leading
/// whitespace. Returns `None` when no digits are found.
fn leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Per-edge modifiers for one rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeModifiers {
    /// Moves the top edge down.
    pub top: Modifier,
    /// Moves the right edge left.
    pub right: Modifier,
    /// Moves the bottom edge up.
    pub bottom: Modifier,
    /// Moves the left edge right.
    pub left: Modifier,
}

impl EdgeModifiers {
    /// No modification on any edge.
    pub const NONE: Self = Self::uniform(Modifier::ZERO);

    /// The same modifier on all four edges.
    #[must_use]
    pub const fn uniform(modifier: Modifier) -> Self {
        Self {
            top: modifier,
            right: modifier,
            bottom: modifier,
            left: modifier,
        }
    }
}

/// A partial set of edge modifiers, merged edge-by-edge over an
/// [`EdgeModifiers`] with [`Merge`](crate::options::Merge).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeModifiersPatch {
    /// Replacement top modifier.
    pub top: Option<Modifier>,
    /// Replacement right modifier.
    pub right: Option<Modifier>,
    /// Replacement bottom modifier.
    pub bottom: Option<Modifier>,
    /// Replacement left modifier.
    pub left: Option<Modifier>,
}

impl EdgeModifiersPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }
}

impl From<EdgeModifiers> for EdgeModifiersPatch {
    fn from(m: EdgeModifiers) -> Self {
        Self {
            top: Some(m.top),
            right: Some(m.right),
            bottom: Some(m.bottom),
            left: Some(m.left),
        }
    }
}

/// A rectangle after edge modification.
///
/// `rect` holds the moved edges and is never normalized: a large enough
/// inset produces an inverted rectangle, which the evaluator handles with the
/// same comparisons. `width` and `height` are the extent of the rectangle
/// *before* modification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModifiedRect {
    /// Modified edges (`x0` left, `y0` top, `x1` right, `y1` bottom).
    pub rect: Rect,
    /// Width of the unmodified rectangle.
    pub width: f64,
    /// Height of the unmodified rectangle.
    pub height: f64,
}

impl ModifiedRect {
    /// Top edge.
    #[inline]
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.rect.y0
    }

    /// Right edge.
    #[inline]
    #[must_use]
    pub const fn right(&self) -> f64 {
        self.rect.x1
    }

    /// Bottom edge.
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> f64 {
        self.rect.y1
    }

    /// Left edge.
    #[inline]
    #[must_use]
    pub const fn left(&self) -> f64 {
        self.rect.x0
    }
}

/// Applies `mods` to `rect`.
#[must_use]
pub fn modify(rect: Rect, mods: &EdgeModifiers) -> ModifiedRect {
    let width = rect.x1 - rect.x0;
    let height = rect.y1 - rect.y0;
    ModifiedRect {
        rect: Rect::new(
            rect.x0 + mods.left.resolve(width),
            rect.y0 + mods.top.resolve(height),
            rect.x1 - mods.right.resolve(width),
            rect.y1 - mods.bottom.resolve(height),
        ),
        width,
        height,
    }
}
