//! # Blastfield Kernel
//!
//! Particle explosions for raster surfaces.
//!
//! This crate turns a snapshot of a rectangular surface into a grid of
//! coloured particles and animates them outward:
//! - Colour processing of sampled pixels (original, grayscale, tinted, random)
//! - Four physics styles (fountain, scatter, fall, vortex)
//! - A closed-form per-particle motion model driven by one progress value
//! - A deterministic progress clock with interpolators
//! - Explosion sessions and the field that composites them
//!
//! ## Progress
//!
//! Every session is driven by a single progress value running from `0.0`
//! to [`PROGRESS_SCALE`]. Each particle maps that value into its own
//! visible window (`life` .. `1 - overflow`) and computes its position,
//! radius and opacity in closed form. Nothing integrates over frames, so
//! any progress value can be rendered directly.
//!
//! ## Determinism
//!
//! All randomness for a session comes from one `fastrand::Rng` seeded at
//! creation. The same snapshot, bounds, config, seed and density always
//! produce the same particles.
//!
//! ## Threading
//!
//! Everything runs on the caller's thread. Sessions share nothing but their
//! (immutable) snapshot, so a field can be moved between threads.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod color;
pub mod config;
pub mod field;
pub mod particle;
pub mod physics;
pub mod session;
pub mod shake;
pub mod snapshot;
pub mod surface;


/// Prelude for convenient imports
pub mod prelude {
    pub use crate::clock::*;
    pub use crate::color::*;
    pub use crate::config::*;
    pub use crate::field::*;
    pub use crate::particle::*;
    pub use crate::physics::*;
    pub use crate::session::*;
    pub use crate::shake::*;
    pub use crate::snapshot::*;
    pub use crate::surface::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_size() {
        // Two vec4s per instance for vertex buffer layouts.
        assert_eq!(ParticleInstance::SIZE, 32);
    }

    #[test]
    fn test_field_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ExplosionField>();
        assert_send::<ExplosionSession>();
    }

    #[test]
    fn test_every_style_has_open_window() {
        for style in ExplosionStyle::ALL {
            assert!(style.max_life() + style.max_overflow() < 1.0, "{}", style.name());
        }
    }
}
