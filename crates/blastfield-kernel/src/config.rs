//! Explosion configuration.
//!
//! An [`ExplosionConfig`] is an immutable value passed into every
//! generation call. It is validated once, when a session is created;
//! invalid values are rejected rather than clamped.

use std::time::Duration;

use blastfield_common::{Argb, ConfigError};
use serde::{Deserialize, Serialize};

use crate::clock::Interpolator;

/// Default animation duration in milliseconds.
pub const DEFAULT_DURATION_MS: u64 = 1024;

/// Default fraction of a particle's visible window after which it fades.
pub const DEFAULT_FADE_OUT_START: f32 = 0.7;

/// Default margin (dp) added around the exploded surface.
pub const DEFAULT_EXPAND_BOUNDS_DP: u32 = 32;

/// Largest accepted particle grid side (65 536 particles).
pub const MAX_GRID_SIZE: u32 = 256;

/// Particle density options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleCount {
    /// 100 particles.
    Low,
    /// 225 particles.
    #[default]
    Medium,
    /// 400 particles.
    High,
    /// Explicit grid side length.
    Custom(u32),
}

impl ParticleCount {
    /// Number of particles per grid row/column.
    #[must_use]
    pub const fn grid_size(self) -> u32 {
        match self {
            Self::Low => 10,
            Self::Medium => 15,
            Self::High => 20,
            Self::Custom(n) => n,
        }
    }

    /// Total particle count (`grid_size²`).
    #[must_use]
    pub const fn total(self) -> usize {
        let n = self.grid_size() as usize;
        n * n
    }
}

/// Particle size variation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleSize {
    /// 1-2dp.
    Tiny,
    /// 2-3dp.
    Small,
    /// Mostly 1-2dp with occasional 2-5dp particles.
    #[default]
    Mixed,
    /// 4-6dp.
    Large,
}

/// Colour processing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Colours sampled from the snapshot.
    #[default]
    Original,
    /// Luminosity grayscale.
    Grayscale,
    /// 50/50 blend with the tint colour.
    Tinted,
    /// Random bright colours.
    Random,
}

/// Explosion styles, one physics regime each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplosionStyle {
    /// Parabolic arcs: particles shoot up then fall.
    #[default]
    Fountain,
    /// Straight radial lines outward from the center.
    Scatter,
    /// Uniformly accelerated downward fall.
    Fall,
    /// Outward spiral.
    Vortex,
}

impl ExplosionStyle {
    /// All styles in declaration order.
    pub const ALL: [Self; 4] = [Self::Fountain, Self::Scatter, Self::Fall, Self::Vortex];

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fountain => "fountain",
            Self::Scatter => "scatter",
            Self::Fall => "fall",
            Self::Vortex => "vortex",
        }
    }
}

/// Configuration for one explosion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    // === Timing ===
    /// Total animation duration in milliseconds
    pub duration_ms: u64,
    /// Timing curve applied to the progress clock
    pub interpolator: Interpolator,

    // === Particles ===
    /// Grid density
    pub particle_count: ParticleCount,
    /// Radius sampling tier
    pub particle_size: ParticleSize,
    /// Physics regime
    pub style: ExplosionStyle,

    // === Bounds ===
    /// Extra room around the surface, in dp
    pub expand_bounds_dp: u32,

    // === Pre-explosion effects ===
    /// Shake the surface before it explodes
    pub shake_before_explode: bool,
    /// Shake duration in milliseconds
    pub shake_duration_ms: u64,
    /// Shake amplitude as a fraction of the surface size (0.0-1.0)
    pub shake_intensity: f32,

    // === Colour ===
    /// How sampled colours are processed
    pub color_mode: ColorMode,
    /// Tint used by [`ColorMode::Tinted`]
    pub tint_color: Argb,

    // === Animation behaviour ===
    /// Fraction of each particle's visible window after which it fades (0.0-1.0)
    pub fade_out_start: f32,

    // === Post-explosion ===
    /// Ask the host to remove the surface once the explosion ends
    pub remove_view_after_explosion: bool,
    /// Ask the host for haptic feedback when the explosion starts
    pub haptic_feedback: bool,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            interpolator: Interpolator::Accelerate(0.6),

            particle_count: ParticleCount::Medium,
            particle_size: ParticleSize::Mixed,
            style: ExplosionStyle::Fountain,

            expand_bounds_dp: DEFAULT_EXPAND_BOUNDS_DP,

            shake_before_explode: true,
            shake_duration_ms: 150,
            shake_intensity: 0.05,

            color_mode: ColorMode::Original,
            tint_color: Argb::BLACK,

            fade_out_start: DEFAULT_FADE_OUT_START,

            remove_view_after_explosion: false,
            haptic_feedback: false,
        }
    }
}

impl ExplosionConfig {
    /// Slower animation with fewer particles and a lighter shake.
    #[must_use]
    pub fn gentle() -> Self {
        Self {
            duration_ms: 1500,
            particle_count: ParticleCount::Low,
            interpolator: Interpolator::Decelerate(1.0),
            shake_intensity: 0.02,
            ..Self::default()
        }
    }

    /// Fast animation with many particles and a hard shake.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            duration_ms: 800,
            particle_count: ParticleCount::High,
            interpolator: Interpolator::Accelerate(0.8),
            shake_intensity: 0.1,
            ..Self::default()
        }
    }

    /// Many tiny particles.
    #[must_use]
    pub fn dust() -> Self {
        Self {
            particle_count: ParticleCount::High,
            particle_size: ParticleSize::Tiny,
            duration_ms: 1200,
            ..Self::default()
        }
    }

    /// Few large particles.
    #[must_use]
    pub fn chunky() -> Self {
        Self {
            particle_count: ParticleCount::Low,
            particle_size: ParticleSize::Large,
            duration_ms: 900,
            ..Self::default()
        }
    }

    /// Builder-style style override.
    #[must_use]
    pub fn with_style(mut self, style: ExplosionStyle) -> Self {
        self.style = style;
        self
    }

    /// Builder-style colour override.
    #[must_use]
    pub fn with_color_mode(mut self, mode: ColorMode, tint: Argb) -> Self {
        self.color_mode = mode;
        self.tint_color = tint;
        self
    }

    /// Animation duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Shake duration.
    #[must_use]
    pub fn shake_duration(&self) -> Duration {
        Duration::from_millis(self.shake_duration_ms)
    }

    /// Number of particles per grid row/column.
    #[must_use]
    pub fn grid_size(&self) -> u32 {
        self.particle_count.grid_size()
    }

    /// Checks every documented range. Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        let grid = self.grid_size();
        if grid == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if grid > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge(grid));
        }
        if !(0.0..=1.0).contains(&self.fade_out_start) {
            return Err(ConfigError::FadeOutStart(self.fade_out_start));
        }
        if !(0.0..=1.0).contains(&self.shake_intensity) {
            return Err(ConfigError::ShakeIntensity(self.shake_intensity));
        }
        self.interpolator.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExplosionConfig::default();
        assert_eq!(config.duration_ms, 1024);
        assert_eq!(config.grid_size(), 15);
        assert_eq!(config.particle_count.total(), 225);
        assert_eq!(config.style, ExplosionStyle::Fountain);
        assert!(config.shake_before_explode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        for config in [
            ExplosionConfig::default(),
            ExplosionConfig::gentle(),
            ExplosionConfig::aggressive(),
            ExplosionConfig::dust(),
            ExplosionConfig::chunky(),
        ] {
            assert!(config.validate().is_ok(), "{config:?}");
        }
        assert_eq!(ExplosionConfig::dust().particle_size, ParticleSize::Tiny);
        assert_eq!(ExplosionConfig::chunky().grid_size(), 10);
    }

    #[test]
    fn test_validation_rejects() {
        let config = ExplosionConfig {
            duration_ms: 0,
            ..ExplosionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration));

        let config = ExplosionConfig {
            particle_count: ParticleCount::Custom(0),
            ..ExplosionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyGrid));

        let config = ExplosionConfig {
            particle_count: ParticleCount::Custom(MAX_GRID_SIZE + 1),
            ..ExplosionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::GridTooLarge(MAX_GRID_SIZE + 1)));

        let config = ExplosionConfig {
            particle_count: ParticleCount::Custom(u32::MAX),
            ..ExplosionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::GridTooLarge(u32::MAX)));

        let config = ExplosionConfig {
            particle_count: ParticleCount::Custom(MAX_GRID_SIZE),
            ..ExplosionConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = ExplosionConfig {
            fade_out_start: 1.5,
            ..ExplosionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::FadeOutStart(1.5)));

        let config = ExplosionConfig {
            fade_out_start: f32::NAN,
            ..ExplosionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::FadeOutStart(_))));

        let config = ExplosionConfig {
            shake_intensity: -0.1,
            ..ExplosionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ShakeIntensity(-0.1)));
    }

    #[test]
    fn test_custom_grid() {
        assert_eq!(ParticleCount::Custom(7).grid_size(), 7);
        assert_eq!(ParticleCount::Custom(7).total(), 49);
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = ExplosionConfig::aggressive()
            .with_style(ExplosionStyle::Vortex)
            .with_color_mode(ColorMode::Tinted, Argb::from_raw(0xFF33_6699));
        let text = toml::to_string_pretty(&config).expect("Failed to serialize");
        assert!(text.contains("style = \"vortex\""));

        let parsed: ExplosionConfig = toml::from_str(&text).expect("Failed to parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_partial_toml() {
        let parsed: ExplosionConfig =
            toml::from_str("style = \"fall\"\nduration_ms = 500\n").expect("Failed to parse");
        assert_eq!(parsed.style, ExplosionStyle::Fall);
        assert_eq!(parsed.duration_ms, 500);
        assert_eq!(parsed.fade_out_start, DEFAULT_FADE_OUT_START);
    }
}
