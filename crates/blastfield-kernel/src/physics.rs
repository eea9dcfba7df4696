//! Per-style particle generators.
//!
//! Each [`ExplosionStyle`] maps a random source, the explosion bounds and
//! the configuration to a fully parameterised [`Particle`]. The colour is
//! left transparent; the session fills it in from the sampled snapshot.
//!
//! Distances that the motion formulas multiply by the rescaled time are
//! divided by [`PROGRESS_SCALE`] so the travel at the end of a particle's
//! window matches the intended figure.

use std::f32::consts::TAU;

use blastfield_common::{Density, Rect};
use fastrand::Rng;

use crate::clock::PROGRESS_SCALE;
use crate::config::{ExplosionConfig, ExplosionStyle, ParticleSize};
use crate::particle::{MotionKind, Particle, SPIRAL_SENTINEL};

/// Smallest horizontal range a fountain particle may get. Keeps the
/// derived launch velocity and gravity finite.
pub const MIN_FOUNTAIN_RANGE: f32 = 0.01;

impl ExplosionStyle {
    /// Generates one particle for this style.
    #[must_use]
    pub fn generate(
        self,
        rng: &mut Rng,
        bounds: &Rect,
        config: &ExplosionConfig,
        density: Density,
    ) -> Particle {
        let mut particle = match self {
            Self::Fountain => fountain(rng, bounds, config.particle_size, density),
            Self::Scatter => scatter(rng, bounds, config.particle_size, density),
            Self::Fall => fall(rng, bounds, config.particle_size, density),
            Self::Vortex => vortex(rng, bounds, config.particle_size, density),
        };
        particle.fade_start = config.fade_out_start;
        particle
    }

    /// Upper bound (exclusive) of the sampled appear delay.
    #[must_use]
    pub fn max_life(self) -> f32 {
        match self {
            Self::Fountain => PROGRESS_SCALE / 10.0,
            Self::Scatter => PROGRESS_SCALE / 25.0,
            Self::Fall => PROGRESS_SCALE / 15.0,
            Self::Vortex => PROGRESS_SCALE / 18.0,
        }
    }

    /// Upper bound (exclusive) of the sampled early-fade margin.
    #[must_use]
    pub fn max_overflow(self) -> f32 {
        match self {
            Self::Fountain => 0.4,
            Self::Scatter | Self::Fall => 0.35,
            Self::Vortex => 0.45,
        }
    }
}

/// Samples a base radius in pixels for the size tier.
#[must_use]
pub fn particle_radius(rng: &mut Rng, size: ParticleSize, density: Density) -> f32 {
    let standard = density.dp(2.0);
    let minimum = density.dp(1.0);
    let maximum = density.dp(5.0);

    match size {
        ParticleSize::Tiny => minimum + (standard - minimum) * rng.f32(),
        ParticleSize::Small => standard + density.dp(1.0) * rng.f32(),
        ParticleSize::Mixed => {
            if rng.f32() < 0.2 {
                standard + (maximum - standard) * rng.f32()
            } else {
                minimum + (standard - minimum) * rng.f32()
            }
        },
        ParticleSize::Large => (maximum - density.dp(1.0)) + density.dp(2.0) * rng.f32(),
    }
}

fn extent(bounds: &Rect) -> (f32, f32) {
    (bounds.width().max(0) as f32, bounds.height().max(0) as f32)
}

/// Horizontal range multiplier for a fountain shape draw: 20% keep the full
/// range, 60% get 0.6 of it and the top 20% get 0.3.
fn fountain_range_scale(shape: f32) -> f32 {
    if shape < 0.2 {
        1.0
    } else if shape < 0.8 {
        0.6
    } else {
        0.3
    }
}

/// Whether a fountain shape draw lifts the peak (top 20%).
fn fountain_boosts_peak(shape: f32) -> bool {
    shape >= 0.8
}

/// Symmetric jitter of `span` pixels around zero.
fn jitter(rng: &mut Rng, span: f32) -> f32 {
    span * (rng.f32() - 0.5)
}

fn fountain(rng: &mut Rng, bounds: &Rect, size: ParticleSize, density: Density) -> Particle {
    let (_, height) = extent(bounds);
    let center = bounds.center();

    let base_radius = particle_radius(rng, size, density);
    let base_cx = center.x + jitter(rng, density.dp(20.0));
    let base_cy = center.y + jitter(rng, density.dp(20.0));

    // One draw decides both the peak boost and the range scaling.
    let mut top = height * (0.18 * rng.f32() + 0.2);
    let shape = rng.f32();
    if fountain_boosts_peak(shape) {
        top += top * 0.2 * rng.f32();
    }

    let mut bottom = height * (rng.f32() - 0.5) * 1.8 * fountain_range_scale(shape);
    if bottom.abs() < MIN_FOUNTAIN_RANGE {
        bottom = MIN_FOUNTAIN_RANGE.copysign(bottom);
    }

    let mag = 4.0 * top / bottom;
    let neg = -mag / bottom;

    let life = ExplosionStyle::Fountain.max_life() * rng.f32();
    let overflow = ExplosionStyle::Fountain.max_overflow() * rng.f32();

    Particle::new(MotionKind::Parabolic, base_cx, base_cy, base_radius)
        .with_coefficients(top, bottom, mag, neg)
        .with_lifecycle(life, overflow)
}

fn scatter(rng: &mut Rng, bounds: &Rect, size: ParticleSize, density: Density) -> Particle {
    let (width, height) = extent(bounds);
    let center = bounds.center();

    let base_radius = particle_radius(rng, size, density);

    let angle = rng.f32() * TAU;
    let speed = 0.6 + rng.f32();
    let max_distance = width.max(height) * 0.8 / PROGRESS_SCALE;

    let bottom = angle.cos() * max_distance * speed;
    let top = -angle.sin() * max_distance * speed;

    let life = ExplosionStyle::Scatter.max_life() * rng.f32();
    let overflow = ExplosionStyle::Scatter.max_overflow() * rng.f32();

    Particle::new(MotionKind::Radial, center.x, center.y, base_radius)
        .with_coefficients(top, bottom, 0.0, 0.0)
        .with_lifecycle(life, overflow)
}

fn fall(rng: &mut Rng, bounds: &Rect, size: ParticleSize, density: Density) -> Particle {
    let (width, height) = extent(bounds);
    let center = bounds.center();

    let base_radius = particle_radius(rng, size, density);
    let base_cx = center.x + jitter(rng, density.dp(30.0));
    let base_cy = center.y + jitter(rng, density.dp(20.0));

    let drift = (rng.f32() - 0.5) * width * 0.3 / PROGRESS_SCALE;
    let initial_velocity = height * (0.3 + rng.f32() * 0.4) / PROGRESS_SCALE;
    let acceleration = height * 0.3 / PROGRESS_SCALE;

    let life = ExplosionStyle::Fall.max_life() * rng.f32();
    let overflow = ExplosionStyle::Fall.max_overflow() * rng.f32();

    Particle::new(MotionKind::Fall, base_cx, base_cy, base_radius)
        .with_coefficients(initial_velocity, drift, acceleration, 0.0)
        .with_lifecycle(life, overflow)
}

fn vortex(rng: &mut Rng, bounds: &Rect, size: ParticleSize, density: Density) -> Particle {
    let (width, height) = extent(bounds);
    let center = bounds.center();

    let base_radius = particle_radius(rng, size, density);
    let base_cx = center.x + jitter(rng, density.dp(15.0));
    let base_cy = center.y + jitter(rng, density.dp(15.0));

    let start_angle = rng.f32() * TAU;
    let rotation = (2.0 + rng.f32() * 2.0) * TAU;
    let max_radius = width.max(height) * 0.6 / PROGRESS_SCALE;
    let final_radius = max_radius * (0.7 + rng.f32() * 0.6);

    let life = ExplosionStyle::Vortex.max_life() * rng.f32();
    let overflow = ExplosionStyle::Vortex.max_overflow() * rng.f32();

    Particle::new(MotionKind::Spiral, base_cx, base_cy, base_radius)
        .with_coefficients(rotation, start_angle, final_radius, SPIRAL_SENTINEL)
        .with_lifecycle(life, overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BOUNDS: Rect = Rect::new(0, 0, 200, 100);

    fn config(style: ExplosionStyle) -> ExplosionConfig {
        ExplosionConfig::default().with_style(style)
    }

    #[test]
    fn test_radius_tiers() {
        let density = Density::new(2.0);
        let mut rng = Rng::with_seed(3);
        for _ in 0..500 {
            let tiny = particle_radius(&mut rng, ParticleSize::Tiny, density);
            assert!((2.0..4.0).contains(&tiny), "tiny {tiny}");
            let small = particle_radius(&mut rng, ParticleSize::Small, density);
            assert!((4.0..6.0).contains(&small), "small {small}");
            let large = particle_radius(&mut rng, ParticleSize::Large, density);
            assert!((8.0..12.0).contains(&large), "large {large}");
            let mixed = particle_radius(&mut rng, ParticleSize::Mixed, density);
            assert!((2.0..10.0).contains(&mixed), "mixed {mixed}");
        }
    }

    #[test]
    fn test_mixed_is_mostly_small() {
        let mut rng = Rng::with_seed(11);
        let large = (0..10_000)
            .filter(|_| particle_radius(&mut rng, ParticleSize::Mixed, Density::BASELINE) >= 2.0)
            .count();
        // ~20% large draws
        assert!((1_500..2_500).contains(&large), "{large}");
    }

    #[test]
    fn test_fountain_shape_thresholds() {
        assert_eq!(fountain_range_scale(0.0), 1.0);
        assert_eq!(fountain_range_scale(0.199), 1.0);
        assert_eq!(fountain_range_scale(0.2), 0.6);
        assert_eq!(fountain_range_scale(0.799), 0.6);
        assert_eq!(fountain_range_scale(0.8), 0.3);
        assert!(!fountain_boosts_peak(0.799));
        assert!(fountain_boosts_peak(0.8));
    }

    #[test]
    fn test_fountain_shape_distribution() {
        let mut rng = Rng::with_seed(13);
        let draws = 10_000;
        let (mut full, mut reduced, mut short, mut boosted) = (0, 0, 0, 0);
        for _ in 0..draws {
            let shape = rng.f32();
            match fountain_range_scale(shape) {
                s if s == 1.0 => full += 1,
                s if s == 0.6 => reduced += 1,
                _ => short += 1,
            }
            if fountain_boosts_peak(shape) {
                boosted += 1;
            }
        }
        // 20 / 60 / 20 split, boost shares the top fifth
        assert!((1_700..2_300).contains(&full), "{full}");
        assert!((5_700..6_300).contains(&reduced), "{reduced}");
        assert!((1_700..2_300).contains(&short), "{short}");
        assert_eq!(boosted, short);
    }

    #[test]
    fn test_fountain_particles_follow_shape_split() {
        // Range is at most 0.9 * height before scaling; anything beyond
        // 0.6 of that must come from an unscaled draw.
        let mut rng = Rng::with_seed(17);
        let max_range = 100.0 * 0.9;
        let mut wide = 0;
        let mut peak_boosted = 0;
        for _ in 0..10_000 {
            let particle = ExplosionStyle::Fountain.generate(
                &mut rng,
                &BOUNDS,
                &config(ExplosionStyle::Fountain),
                Density::BASELINE,
            );
            if particle.bottom.abs() > max_range * 0.6 {
                wide += 1;
            }
            if particle.top >= 38.0 {
                peak_boosted += 1;
            }
        }
        // Unscaled draws are 20%; 40% of those exceed 0.6 of the range.
        assert!((550..1_050).contains(&wide), "{wide}");
        // Only boosted peaks pass the unboosted maximum of 0.38 * height.
        assert!(peak_boosted > 0 && peak_boosted < 2_000, "{peak_boosted}");
    }

    #[test]
    fn test_scatter_starts_at_center() {
        let mut rng = Rng::with_seed(5);
        let particle = ExplosionStyle::Scatter.generate(
            &mut rng,
            &BOUNDS,
            &config(ExplosionStyle::Scatter),
            Density::BASELINE,
        );
        assert_eq!((particle.base_cx, particle.base_cy), (100.0, 50.0));
        assert_eq!(particle.motion, MotionKind::Radial);
        assert_eq!((particle.mag, particle.neg), (0.0, 0.0));

        let speed = particle.top.hypot(particle.bottom);
        let max_distance = 200.0 * 0.8 / PROGRESS_SCALE;
        assert!(speed >= max_distance * 0.6 - 1e-3 && speed < max_distance * 1.6 + 1e-3);
    }

    #[test]
    fn test_fountain_peak_over_range() {
        let mut rng = Rng::with_seed(8);
        for _ in 0..100 {
            let particle = ExplosionStyle::Fountain.generate(
                &mut rng,
                &BOUNDS,
                &config(ExplosionStyle::Fountain),
                Density::BASELINE,
            );
            assert!(particle.top >= 20.0 && particle.top < 38.0 * 1.2 + 1e-3);
            assert!(particle.bottom.abs() >= MIN_FOUNTAIN_RANGE);
            assert!(particle.bottom.abs() <= 90.0);

            // Peak of the arc is reached halfway along the range.
            let (_, peak_y) = particle.position_at(0.5);
            assert!((particle.base_cy - peak_y - particle.top).abs() < 1e-2 * particle.top);
            assert!(particle.base_cx >= 90.0 && particle.base_cx < 110.0);
        }
    }

    #[test]
    fn test_fall_coefficients() {
        let mut rng = Rng::with_seed(21);
        let particle = ExplosionStyle::Fall.generate(
            &mut rng,
            &BOUNDS,
            &config(ExplosionStyle::Fall),
            Density::BASELINE,
        );
        assert_eq!(particle.motion, MotionKind::Fall);
        assert!((particle.mag - 100.0 * 0.3 / PROGRESS_SCALE).abs() < 1e-4);
        assert!(particle.top >= 100.0 * 0.3 / PROGRESS_SCALE);
        assert!(particle.top <= 100.0 * 0.7 / PROGRESS_SCALE);
        assert!(particle.bottom.abs() <= 200.0 * 0.15 / PROGRESS_SCALE);
        assert!((particle.base_cx - 100.0).abs() <= 15.0);
        assert!((particle.base_cy - 50.0).abs() <= 10.0);
    }

    #[test]
    fn test_vortex_coefficients() {
        let mut rng = Rng::with_seed(34);
        let particle = ExplosionStyle::Vortex.generate(
            &mut rng,
            &BOUNDS,
            &config(ExplosionStyle::Vortex),
            Density::BASELINE,
        );
        assert_eq!(particle.motion, MotionKind::Spiral);
        assert_eq!(particle.neg, SPIRAL_SENTINEL);
        assert!(particle.bottom >= 0.0 && particle.bottom <= TAU);
        assert!(particle.top >= 2.0 * TAU && particle.top < 4.0 * TAU + 1e-3);
        let max_radius = 200.0 * 0.6 / PROGRESS_SCALE;
        assert!(particle.mag >= max_radius * 0.7 - 1e-3 && particle.mag < max_radius * 1.3 + 1e-3);
    }

    #[test]
    fn test_fade_start_from_config() {
        let mut rng = Rng::with_seed(1);
        let config = ExplosionConfig {
            fade_out_start: 0.5,
            ..ExplosionConfig::default()
        };
        let particle = ExplosionStyle::Fountain.generate(&mut rng, &BOUNDS, &config, Density::BASELINE);
        assert_eq!(particle.fade_start, 0.5);
    }

    #[test]
    fn test_zero_height_bounds_stay_finite() {
        let mut rng = Rng::with_seed(2);
        let flat = Rect::new(0, 0, 50, 0);
        for style in ExplosionStyle::ALL {
            let particle = style.generate(&mut rng, &flat, &config(style), Density::BASELINE);
            for value in [particle.top, particle.bottom, particle.mag, particle.neg] {
                assert!(value.is_finite(), "{style:?} {particle:?}");
            }
        }
    }

    #[test]
    fn test_generation_is_seeded() {
        for style in ExplosionStyle::ALL {
            let mut a = Rng::with_seed(42);
            let mut b = Rng::with_seed(42);
            let first = style.generate(&mut a, &BOUNDS, &config(style), Density::BASELINE);
            let second = style.generate(&mut b, &BOUNDS, &config(style), Density::BASELINE);
            assert_eq!(first, second);
        }
    }

    proptest! {
        #[test]
        fn prop_lifecycle_window_is_open(seed in any::<u64>(), style_index in 0usize..4) {
            let style = ExplosionStyle::ALL[style_index];
            let mut rng = Rng::with_seed(seed);
            for _ in 0..32 {
                let particle = style.generate(&mut rng, &BOUNDS, &config(style), Density::BASELINE);
                prop_assert!(particle.life >= 0.0 && particle.life < style.max_life());
                prop_assert!(particle.overflow >= 0.0 && particle.overflow < style.max_overflow());
                prop_assert!(particle.life + particle.overflow < 1.0);
                prop_assert!(!particle.is_degenerate());
            }
        }
    }
}
