// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Off-screen direction labels.

use core::fmt;

/// Vertical half of a [`Side`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Vertical {
    /// Above the screen rectangle.
    Top,
    /// Below the screen rectangle.
    Bottom,
}

/// Horizontal half of a [`Side`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Horizontal {
    /// Left of the screen rectangle.
    Left,
    /// Right of the screen rectangle.
    Right,
}

/// Where a target lies relative to the screen rectangle while it is
/// off-screen.
///
/// Items start out as [`Side::Bottom`]. The side is only recomputed while an
/// item is off-screen, so after entering it still names the direction the
/// item came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    /// Above.
    Top,
    /// Below.
    #[default]
    Bottom,
    /// To the left.
    Left,
    /// To the right.
    Right,
    /// Above and to the left.
    TopLeft,
    /// Above and to the right.
    TopRight,
    /// Below and to the left.
    BottomLeft,
    /// Below and to the right.
    BottomRight,
}

impl Side {
    /// All eight sides, vertical-only first.
    pub const ALL: [Self; 8] = [
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Combines per-axis labels; `None` when neither axis is off-screen.
    #[must_use]
    pub const fn from_axes(vertical: Option<Vertical>, horizontal: Option<Horizontal>) -> Option<Self> {
        Some(match (vertical, horizontal) {
            (None, None) => return None,
            (Some(Vertical::Top), None) => Self::Top,
            (Some(Vertical::Bottom), None) => Self::Bottom,
            (None, Some(Horizontal::Left)) => Self::Left,
            (None, Some(Horizontal::Right)) => Self::Right,
            (Some(Vertical::Top), Some(Horizontal::Left)) => Self::TopLeft,
            (Some(Vertical::Top), Some(Horizontal::Right)) => Self::TopRight,
            (Some(Vertical::Bottom), Some(Horizontal::Left)) => Self::BottomLeft,
            (Some(Vertical::Bottom), Some(Horizontal::Right)) => Self::BottomRight,
        })
    }

    /// The vertical component, if any.
    #[must_use]
    pub const fn vertical(self) -> Option<Vertical> {
        match self {
            Self::Top | Self::TopLeft | Self::TopRight => Some(Vertical::Top),
            Self::Bottom | Self::BottomLeft | Self::BottomRight => Some(Vertical::Bottom),
            Self::Left | Self::Right => None,
        }
    }

    /// The horizontal component, if any.
    #[must_use]
    pub const fn horizontal(self) -> Option<Horizontal> {
        match self {
            Self::Left | Self::TopLeft | Self::BottomLeft => Some(Horizontal::Left),
            Self::Right | Self::TopRight | Self::BottomRight => Some(Horizontal::Right),
            Self::Top | Self::Bottom => None,
        }
    }

    /// The label used in notifications and class suffixes, e.g. `"top-left"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    /// Parses a label produced by [`as_str`](Self::as_str).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|side| side.as_str() == label)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_label_comes_first() {
        let side = Side::from_axes(Some(Vertical::Top), Some(Horizontal::Left));
        assert_eq!(side, Some(Side::TopLeft));
        assert_eq!(Side::TopLeft.as_str(), "top-left");
        assert_eq!(Side::BottomRight.as_str(), "bottom-right");
    }

    #[test]
    fn axes_round_trip_through_components() {
        for side in Side::ALL {
            assert_eq!(
                Side::from_axes(side.vertical(), side.horizontal()),
                Some(side),
                "{side}"
            );
            assert_eq!(Side::from_label(side.as_str()), Some(side));
        }
        assert_eq!(Side::from_axes(None, None), None);
        assert_eq!(Side::from_label("middle"), None);
    }

    #[test]
    fn default_is_bottom() {
        assert_eq!(Side::default(), Side::Bottom);
    }
}
