//! Surface snapshots sampled into particle colours.
//!
//! A [`Snapshot`] is a validated RGBA8 pixel buffer. Acquiring one from a
//! live surface is the host's job; [`SnapshotSource`] is the seam and
//! [`capture_with_retry`] gives hosts reclaim-and-retry behaviour on
//! allocation failure.

use std::path::Path;

use blastfield_common::{Argb, BlastError, SnapshotError};
use image::RgbaImage;
use tracing::warn;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// RGBA8 snapshot of a rectangular surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Snapshot {
    /// Creates a snapshot from raw RGBA bytes.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SnapshotError> {
        if width == 0 || height == 0 {
            return Err(SnapshotError::Empty { width, height });
        }
        let expected = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(SnapshotError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates a snapshot filled with a single colour.
    pub fn solid(width: u32, height: u32, color: Argb) -> Result<Self, SnapshotError> {
        let size = (width as usize) * (height as usize);
        let pixels = color.to_rgba_bytes().repeat(size);
        Self::from_rgba(width, height, pixels)
    }

    /// Creates a snapshot by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> Argb,
    ) -> Result<Self, SnapshotError> {
        let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * BYTES_PER_PIXEL);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y).to_rgba_bytes());
            }
        }
        Self::from_rgba(width, height, pixels)
    }

    /// Loads a snapshot from an image file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BlastError> {
        let image = image::open(path.as_ref()).map_err(|e| BlastError::Image(e.to_string()))?;
        Ok(Self::try_from(image.to_rgba8())?)
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Colour at `(x, y)`; coordinates are clamped to the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Argb {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let idx = (y * self.width as usize + x) * BYTES_PER_PIXEL;
        Argb::from_rgba_bytes([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    /// Colour sampled for grid cell `(row, col)` of an `n × n` grid.
    ///
    /// The image is divided into `n + 2` steps per axis and the outer
    /// border is skipped, so samples come from the interior.
    #[must_use]
    pub fn grid_sample(&self, row: u32, col: u32, n: u32) -> Argb {
        let steps = n.saturating_add(2);
        let step_x = self.width / steps;
        let step_y = self.height / steps;
        let x = col.saturating_add(1).saturating_mul(step_x).min(self.width - 1);
        let y = row.saturating_add(1).saturating_mul(step_y).min(self.height - 1);
        self.pixel(x, y)
    }
}

impl TryFrom<RgbaImage> for Snapshot {
    type Error = SnapshotError;

    fn try_from(image: RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        Self::from_rgba(width, height, image.into_raw())
    }
}

impl From<Snapshot> for RgbaImage {
    fn from(snapshot: Snapshot) -> Self {
        // Dimensions were validated against the buffer length.
        Self::from_raw(snapshot.width, snapshot.height, snapshot.pixels)
            .unwrap_or_else(|| Self::new(1, 1))
    }
}

/// Something that can capture a snapshot of a surface.
pub trait SnapshotSource {
    /// Attempts one capture.
    fn capture(&mut self) -> Result<Snapshot, SnapshotError>;
}

impl<F> SnapshotSource for F
where
    F: FnMut() -> Result<Snapshot, SnapshotError>,
{
    fn capture(&mut self) -> Result<Snapshot, SnapshotError> {
        self()
    }
}

/// Captures a snapshot, calling `reclaim` and retrying up to `retries`
/// times when the source runs out of memory. Other errors are returned
/// immediately.
pub fn capture_with_retry<S, R>(
    source: &mut S,
    retries: u32,
    mut reclaim: R,
) -> Result<Snapshot, SnapshotError>
where
    S: SnapshotSource + ?Sized,
    R: FnMut(),
{
    let mut remaining = retries;
    loop {
        match source.capture() {
            Err(SnapshotError::OutOfMemory) if remaining > 0 => {
                warn!("Snapshot capture ran out of memory, reclaiming and retrying ({remaining} left)");
                remaining -= 1;
                reclaim();
            },
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            Snapshot::from_rgba(0, 10, Vec::new()),
            Err(SnapshotError::Empty {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn test_rejects_short_buffer() {
        assert_eq!(
            Snapshot::from_rgba(2, 2, vec![0; 15]),
            Err(SnapshotError::BufferSize {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_pixel_lookup() {
        let snapshot = Snapshot::from_fn(4, 3, |x, y| Argb::from_argb(255, x as u8, y as u8, 0))
            .expect("valid snapshot");
        assert_eq!(snapshot.pixel(2, 1), Argb::from_argb(255, 2, 1, 0));
        // Clamped to the last pixel.
        assert_eq!(snapshot.pixel(99, 99), Argb::from_argb(255, 3, 2, 0));
    }

    #[test]
    fn test_grid_sample_skips_border() {
        let snapshot = Snapshot::from_fn(120, 120, |x, y| Argb::from_argb(255, x as u8, y as u8, 0))
            .expect("valid snapshot");
        // 120 / (10 + 2) = 10 pixel steps.
        assert_eq!(snapshot.grid_sample(0, 0, 10), Argb::from_argb(255, 10, 10, 0));
        assert_eq!(snapshot.grid_sample(9, 4, 10), Argb::from_argb(255, 50, 100, 0));
    }

    #[test]
    fn test_grid_sample_tiny_image() {
        let snapshot = Snapshot::solid(1, 1, Argb::WHITE).expect("valid snapshot");
        assert_eq!(snapshot.grid_sample(14, 14, 15), Argb::WHITE);
    }

    #[test]
    fn test_grid_sample_extreme_indices() {
        let snapshot = Snapshot::solid(4, 4, Argb::WHITE).expect("valid snapshot");
        assert_eq!(snapshot.grid_sample(u32::MAX, u32::MAX, u32::MAX), Argb::WHITE);
    }

    #[test]
    fn test_image_round_trip() {
        let snapshot = Snapshot::solid(3, 2, Argb::from_argb(10, 20, 30, 40)).expect("valid snapshot");
        let image: RgbaImage = snapshot.clone().into();
        assert_eq!(image.get_pixel(2, 1).0, [20, 30, 40, 10]);
        assert_eq!(Snapshot::try_from(image), Ok(snapshot));
    }

    #[test]
    fn test_capture_retries_out_of_memory() {
        let mut attempts = 0;
        let mut reclaimed = 0;
        let mut source = || {
            attempts += 1;
            if attempts < 3 {
                Err(SnapshotError::OutOfMemory)
            } else {
                Snapshot::solid(1, 1, Argb::BLACK)
            }
        };
        let result = capture_with_retry(&mut source, 2, || reclaimed += 1);
        assert!(result.is_ok());
        assert_eq!(reclaimed, 2);
    }

    #[test]
    fn test_capture_gives_up() {
        let mut reclaimed = 0;
        let mut source = || -> Result<Snapshot, SnapshotError> { Err(SnapshotError::OutOfMemory) };
        let result = capture_with_retry(&mut source, 1, || reclaimed += 1);
        assert_eq!(result, Err(SnapshotError::OutOfMemory));
        assert_eq!(reclaimed, 1);
    }

    #[test]
    fn test_capture_does_not_retry_other_errors() {
        let mut reclaimed = 0;
        let mut source =
            || -> Result<Snapshot, SnapshotError> { Err(SnapshotError::Unavailable("detached".into())) };
        let result = capture_with_retry(&mut source, 5, || reclaimed += 1);
        assert!(matches!(result, Err(SnapshotError::Unavailable(_))));
        assert_eq!(reclaimed, 0);
    }
}
