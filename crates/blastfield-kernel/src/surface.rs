//! Drawing surfaces for particle composition.
//!
//! Sessions only emit filled circles through the [`Surface`] trait. The
//! crate ships a CPU rasteriser ([`PixelCanvas`]) and a recording surface
//! (`Vec<Circle>`) for hosts that batch draws themselves.

use std::path::Path;

use blastfield_common::{Argb, BlastError, Rect};
use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::snapshot::Snapshot;

/// Receives the circles drawn by explosion sessions.
pub trait Surface {
    /// Fills a circle. `color` already carries the particle's opacity.
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Argb);
}

/// A recorded circle draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center x.
    pub cx: f32,
    /// Center y.
    pub cy: f32,
    /// Radius.
    pub radius: f32,
    /// Colour including opacity.
    pub color: Argb,
}

impl Surface for Vec<Circle> {
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Argb) {
        self.push(Circle {
            cx,
            cy,
            radius,
            color,
        });
    }
}

/// CPU raster target backed by an RGBA image.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    image: RgbaImage,
}

impl PixelCanvas {
    /// Creates a transparent canvas.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Canvas width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Canvas height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Fills the whole canvas with `color`.
    pub fn clear(&mut self, color: Argb) {
        let rgba = Rgba(color.to_rgba_bytes());
        for pixel in self.image.pixels_mut() {
            *pixel = rgba;
        }
    }

    /// Colour at `(x, y)`, or `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Argb> {
        self.image
            .get_pixel_checked(x, y)
            .map(|p| Argb::from_rgba_bytes(p.0))
    }

    /// Borrow the underlying image.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Writes the canvas as a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), BlastError> {
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| BlastError::Image(e.to_string()))
    }

    /// Composites `snapshot` into `dest`, shifted by `offset`, scaled by
    /// `scale` around the rectangle's center and faded by `opacity`.
    ///
    /// Sampling is nearest-neighbour. Used by hosts to draw the source view
    /// while it shakes and shrinks away.
    pub fn draw_snapshot(
        &mut self,
        snapshot: &Snapshot,
        dest: Rect,
        offset: Vec2,
        scale: f32,
        opacity: f32,
    ) {
        let opacity = opacity.clamp(0.0, 1.0);
        if dest.is_empty() || scale.is_nan() || scale <= 0.0 || opacity <= 0.0 {
            return;
        }

        let center = dest.center() + offset;
        let half = Vec2::new(dest.width() as f32, dest.height() as f32) * scale * 0.5;
        let min = (center - half).max(Vec2::ZERO);
        let max = (center + half).min(Vec2::new(self.width() as f32, self.height() as f32));
        if min.x >= max.x || min.y >= max.y {
            return;
        }

        let step = Vec2::new(
            snapshot.width() as f32 / (2.0 * half.x),
            snapshot.height() as f32 / (2.0 * half.y),
        );
        for y in min.y as u32..max.y.ceil() as u32 {
            let sy = ((y as f32 + 0.5 - (center.y - half.y)) * step.y) as u32;
            for x in min.x as u32..max.x.ceil() as u32 {
                let sx = ((x as f32 + 0.5 - (center.x - half.x)) * step.x) as u32;
                let src = snapshot.pixel(sx, sy);
                let alpha = (f32::from(src.alpha()) * opacity) as u8;
                if alpha == 0 {
                    continue;
                }
                if let Some(dst) = self.image.get_pixel_mut_checked(x, y) {
                    let blended = blend_over(src.with_alpha(alpha), Argb::from_rgba_bytes(dst.0));
                    *dst = Rgba(blended.to_rgba_bytes());
                }
            }
        }
    }
}

impl Surface for PixelCanvas {
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Argb) {
        if radius <= 0.0 || color.alpha() == 0 || !cx.is_finite() || !cy.is_finite() {
            return;
        }

        let max_x = self.image.width() as f32 - 1.0;
        let max_y = self.image.height() as f32 - 1.0;
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }

        let x0 = (cx - radius).floor().max(0.0);
        let x1 = (cx + radius).ceil().min(max_x);
        let y0 = (cy - radius).floor().max(0.0);
        let y1 = (cy + radius).ceil().min(max_y);
        if x0 > x1 || y0 > y1 {
            return;
        }

        let r2 = radius * radius;
        for y in y0 as u32..=y1 as u32 {
            let dy = y as f32 + 0.5 - cy;
            for x in x0 as u32..=x1 as u32 {
                let dx = x as f32 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    let dst = self.image.get_pixel_mut(x, y);
                    *dst = Rgba(blend_over(color, Argb::from_rgba_bytes(dst.0)).to_rgba_bytes());
                }
            }
        }
    }
}

/// Source-over blend of straight-alpha colours.
fn blend_over(src: Argb, dst: Argb) -> Argb {
    let sa = f32::from(src.alpha()) / 255.0;
    let da = f32::from(dst.alpha()) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Argb::TRANSPARENT;
    }

    let channel = |s: u8, d: u8| {
        let c = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    Argb::from_argb(
        (out_a * 255.0).round() as u8,
        channel(src.red(), dst.red()),
        channel(src.green(), dst.green()),
        channel(src.blue(), dst.blue()),
    )
}
