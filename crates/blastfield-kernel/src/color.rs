//! Colour processing for sampled particle colours.

use blastfield_common::Argb;
use fastrand::Rng;

use crate::config::ColorMode;

/// Luminosity weights (0.299, 0.587, 0.114) in thousandths.
const LUMA_RED: u32 = 299;
const LUMA_GREEN: u32 = 587;
const LUMA_BLUE: u32 = 114;

/// Share of the tint in [`ColorMode::Tinted`].
const TINT_BLEND: f32 = 0.5;

/// Maps sampled colours to particle colours.
///
/// Every mode except [`ColorMode::Random`] is a pure function of its
/// inputs. `Random` draws from the caller's generator, so a seeded
/// session stays reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorProcessor;

impl ColorProcessor {
    /// Processes `color` according to `mode`.
    #[must_use]
    pub fn process(color: Argb, mode: ColorMode, tint: Argb, rng: &mut Rng) -> Argb {
        match mode {
            ColorMode::Original => color,
            ColorMode::Grayscale => Self::grayscale(color),
            ColorMode::Tinted => Self::tint(color, tint),
            ColorMode::Random => Self::random_bright(rng),
        }
    }

    /// Luminosity grayscale, truncated. Alpha is preserved.
    #[must_use]
    pub fn grayscale(color: Argb) -> Argb {
        // Integer weights keep gray inputs fixed points.
        let gray = ((u32::from(color.red()) * LUMA_RED
            + u32::from(color.green()) * LUMA_GREEN
            + u32::from(color.blue()) * LUMA_BLUE)
            / 1000) as u8;
        Argb::from_argb(color.alpha(), gray, gray, gray)
    }

    /// Even blend with `tint`. Alpha comes from `color`.
    #[must_use]
    pub fn tint(color: Argb, tint: Argb) -> Argb {
        let blend = |source: u8, tint: u8| {
            (f32::from(source) * (1.0 - TINT_BLEND) + f32::from(tint) * TINT_BLEND) as u8
        };
        Argb::from_argb(
            color.alpha(),
            blend(color.red(), tint.red()),
            blend(color.green(), tint.green()),
            blend(color.blue(), tint.blue()),
        )
    }

    /// Opaque colour with random hue and high saturation and value.
    #[must_use]
    pub fn random_bright(rng: &mut Rng) -> Argb {
        let hue = rng.f32() * 360.0;
        let saturation = 0.6 + rng.f32() * 0.4;
        let value = 0.8 + rng.f32() * 0.2;
        Argb::from_hsv(hue, saturation, value)
    }
}
