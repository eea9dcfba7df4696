//! Pre-explosion shake.
//!
//! The host moves the exploding surface by [`ShakeAnimation::offset`]
//! every frame until the shake ends. Offsets come from a seeded generator
//! so a replayed explosion shakes identically.

use std::time::Duration;

use fastrand::Rng;
use glam::Vec2;

/// Random translation jitter applied before an explosion.
#[derive(Debug, Clone)]
pub struct ShakeAnimation {
    duration: Duration,
    amplitude: Vec2,
    elapsed: Duration,
    rng: Rng,
}

impl ShakeAnimation {
    /// Creates a shake for a surface of `width × height` pixels.
    ///
    /// Offsets per axis lie in `[-size·intensity/2, size·intensity/2)`.
    #[must_use]
    pub fn new(duration: Duration, width: f32, height: f32, intensity: f32, seed: u64) -> Self {
        Self {
            duration,
            amplitude: Vec2::new(width, height) * intensity,
            elapsed: Duration::ZERO,
            rng: Rng::with_seed(seed),
        }
    }

    /// Total shake duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the shake has run its course.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advances by `dt` and returns the translation for this frame, or
    /// `None` once the shake is over (the host should reset to zero).
    pub fn offset(&mut self, dt: Duration) -> Option<Vec2> {
        if self.is_finished() {
            return None;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        let jitter = Vec2::new(self.rng.f32() - 0.5, self.rng.f32() - 0.5);
        Some(jitter * self.amplitude)
    }
}
