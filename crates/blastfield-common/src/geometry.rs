//! Geometry types: integer rectangles and display density.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle in surface pixel space.
///
/// Edges are stored as `left`/`top` (inclusive) and `right`/`bottom`
/// (exclusive), matching the drawing surface's coordinate system where
/// `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge
    pub right: i32,
    /// Bottom edge
    pub bottom: i32,
}

impl Rect {
    /// Creates a rectangle from its four edges.
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle from an origin and a size.
    #[must_use]
    pub const fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Width in pixels (may be negative for malformed rectangles).
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height in pixels (may be negative for malformed rectangles).
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Integer horizontal center.
    #[must_use]
    pub const fn center_x(&self) -> i32 {
        (self.left + self.right) >> 1
    }

    /// Integer vertical center.
    #[must_use]
    pub const fn center_y(&self) -> i32 {
        (self.top + self.bottom) >> 1
    }

    /// Center as a float vector.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x() as f32, self.center_y() as f32)
    }

    /// Whether the rectangle covers no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Grows the rectangle outward by `dx` horizontally and `dy` vertically
    /// on every side.
    #[must_use]
    pub const fn expanded(self, dx: i32, dy: i32) -> Self {
        Self::new(self.left - dx, self.top - dy, self.right + dx, self.bottom + dy)
    }

    /// Moves the rectangle by the given offset.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    /// Whether the point lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left as f32 && x < self.right as f32 && y >= self.top as f32 && y < self.bottom as f32
    }
}

/// Display density: the number of physical pixels per density-independent
/// pixel (dp).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Density(f32);

impl Density {
    /// Baseline density (1 px per dp).
    pub const BASELINE: Self = Self(1.0);

    /// Creates a density. Non-finite or non-positive values fall back to
    /// [`Density::BASELINE`].
    #[must_use]
    pub fn new(scale: f32) -> Self {
        if scale.is_finite() && scale > 0.0 {
            Self(scale)
        } else {
            Self::BASELINE
        }
    }

    /// Returns the raw scale factor.
    #[must_use]
    pub const fn scale(self) -> f32 {
        self.0
    }

    /// Converts dp to pixels.
    #[must_use]
    pub fn dp(self, value: f32) -> f32 {
        value * self.0
    }

    /// Converts integer dp to rounded integer pixels.
    #[must_use]
    pub fn dp_px(self, value: u32) -> i32 {
        (value as f32 * self.0).round() as i32
    }
}

impl Default for Density {
    fn default() -> Self {
        Self::BASELINE
    }
}
