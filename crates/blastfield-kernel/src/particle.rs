//! Explosion particle and its per-frame advance.
//!
//! A [`Particle`] is a flat value: four motion coefficient slots whose
//! meaning depends on [`MotionKind`], plus mutable render state. All
//! motion is closed-form in the particle's own rescaled time, so a frame
//! can be computed from the global progress alone.

use blastfield_common::Argb;
use bytemuck::{Pod, Zeroable};

use crate::config::DEFAULT_FADE_OUT_START;

/// Value stored in [`Particle::neg`] by spiral particles.
pub const SPIRAL_SENTINEL: f32 = -1.0;

/// Closed-form motion regime of a particle.
///
/// Coefficient slots per regime:
///
/// | kind | `top` | `bottom` | `mag` | `neg` |
/// |---|---|---|---|---|
/// | `Parabolic` | peak height | horizontal range | launch velocity | gravity |
/// | `Radial` | vertical velocity (up) | horizontal velocity | 0 | 0 |
/// | `Fall` | initial fall velocity | horizontal drift | acceleration | 0 |
/// | `Spiral` | total rotation (rad) | start angle (rad) | final radius | [`SPIRAL_SENTINEL`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum MotionKind {
    /// Arc peaking at `top` over the horizontal range `bottom`.
    #[default]
    Parabolic = 0,
    /// Straight line at constant velocity.
    Radial = 1,
    /// Uniformly accelerated fall with horizontal drift.
    Fall = 2,
    /// Outward spiral with linearly growing radius.
    Spiral = 3,
}

/// A single explosion particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    // === Immutable once generated ===
    /// ARGB colour.
    pub color: Argb,
    /// Horizontal origin.
    pub base_cx: f32,
    /// Vertical origin.
    pub base_cy: f32,
    /// Radius reached at `scaled == 1.0`.
    pub base_radius: f32,
    /// Motion regime selecting the meaning of the coefficient slots.
    pub motion: MotionKind,
    /// Coefficient A.
    pub top: f32,
    /// Coefficient B.
    pub bottom: f32,
    /// Coefficient C.
    pub mag: f32,
    /// Coefficient D.
    pub neg: f32,
    /// Normalised delay before the particle appears, in `[0, 1)`.
    pub life: f32,
    /// Normalised early-fade margin, in `[0, 1)`.
    pub overflow: f32,
    /// Fraction of the visible window after which alpha ramps down.
    pub fade_start: f32,

    // === Render state ===
    /// Current horizontal center.
    pub cx: f32,
    /// Current vertical center.
    pub cy: f32,
    /// Current radius.
    pub radius: f32,
    /// Current opacity in `[0, 1]`.
    pub alpha: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            color: Argb::TRANSPARENT,
            base_cx: 0.0,
            base_cy: 0.0,
            base_radius: 0.0,
            motion: MotionKind::Parabolic,
            top: 0.0,
            bottom: 0.0,
            mag: 0.0,
            neg: 0.0,
            life: 0.0,
            overflow: 0.0,
            fade_start: DEFAULT_FADE_OUT_START,
            cx: 0.0,
            cy: 0.0,
            radius: 0.0,
            alpha: 1.0,
        }
    }
}

impl Particle {
    /// Creates a particle at rest at `(base_cx, base_cy)`.
    #[must_use]
    pub fn new(motion: MotionKind, base_cx: f32, base_cy: f32, base_radius: f32) -> Self {
        Self {
            base_cx,
            base_cy,
            base_radius,
            motion,
            cx: base_cx,
            cy: base_cy,
            ..Self::default()
        }
    }

    /// Sets the four coefficient slots.
    #[must_use]
    pub fn with_coefficients(mut self, top: f32, bottom: f32, mag: f32, neg: f32) -> Self {
        self.top = top;
        self.bottom = bottom;
        self.mag = mag;
        self.neg = neg;
        self
    }

    /// Sets the appear delay and early-fade margin.
    #[must_use]
    pub fn with_lifecycle(mut self, life: f32, overflow: f32) -> Self {
        self.life = life;
        self.overflow = overflow;
        self
    }

    /// Sets the colour.
    #[must_use]
    pub fn with_color(mut self, color: Argb) -> Self {
        self.color = color;
        self
    }

    /// Length of the visible window in normalised progress.
    #[must_use]
    pub fn window(&self) -> f32 {
        1.0 - self.life - self.overflow
    }

    /// Whether the particle can ever become visible.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let window = self.window();
        window.is_nan() || window <= 0.0
    }

    /// Whether the particle currently contributes pixels.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.alpha > 0.0 && self.radius > 0.0
    }

    /// Updates position, radius and alpha from the global progress value.
    ///
    /// `progress` runs over `[0, scale]`. Outside the particle's own window
    /// alpha drops to zero and position is left untouched.
    pub fn advance(&mut self, progress: f32, scale: f32) {
        if self.is_degenerate() || scale.is_nan() || scale <= 0.0 {
            self.alpha = 0.0;
            return;
        }

        let normalized = progress / scale;
        if normalized.is_nan() || normalized < self.life || normalized > 1.0 - self.overflow {
            self.alpha = 0.0;
            return;
        }

        let window = self.window();

        let adjusted = ((normalized - self.life) / window).clamp(0.0, 1.0);
        let scaled = adjusted * scale;

        self.alpha = fade_alpha(adjusted, self.fade_start);
        let (cx, cy) = self.position_at(scaled);
        self.cx = cx;
        self.cy = cy;
        self.radius = self.base_radius * scaled;
    }

    /// Closed-form position at rescaled time `t`.
    #[must_use]
    pub fn position_at(&self, t: f32) -> (f32, f32) {
        match self.motion {
            MotionKind::Parabolic => {
                let distance = self.bottom * t;
                (
                    self.base_cx + distance,
                    self.base_cy - self.neg * distance * distance - distance * self.mag,
                )
            },
            MotionKind::Radial => (
                self.base_cx + self.bottom * t,
                self.base_cy - self.top * t,
            ),
            MotionKind::Fall => (
                self.base_cx + self.bottom * t,
                self.base_cy + self.top * t + 0.5 * self.mag * t * t,
            ),
            MotionKind::Spiral => {
                let angle = self.bottom + self.top * t;
                let radius = self.mag * t;
                (
                    self.base_cx + radius * angle.cos(),
                    self.base_cy + radius * angle.sin(),
                )
            },
        }
    }
}

/// Alpha for a position `adjusted` in the visible window: opaque until
/// `fade_start`, then linear to zero at the end of the window.
fn fade_alpha(adjusted: f32, fade_start: f32) -> f32 {
    if adjusted < fade_start || fade_start >= 1.0 {
        1.0
    } else {
        (1.0 - (adjusted - fade_start) / (1.0 - fade_start)).clamp(0.0, 1.0)
    }
}

/// GPU-friendly particle instance for hosts that render with shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Center (x, y).
    pub position: [f32; 2],
    /// Radius.
    pub radius: f32,
    /// Padding for 16-byte alignment.
    _pad: f32,
    /// Colour with the particle's opacity folded into alpha.
    pub color: [f32; 4],
}

impl ParticleInstance {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Creates an instance from a particle's current render state.
    #[must_use]
    pub fn from_particle(particle: &Particle) -> Self {
        let mut color = particle.color.to_rgba_f32();
        color[3] *= particle.alpha;
        Self {
            position: [particle.cx, particle.cy],
            radius: particle.radius,
            _pad: 0.0,
            color,
        }
    }
}
