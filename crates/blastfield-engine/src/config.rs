//! Engine configuration.
//!
//! Canvas, output and run settings for the headless driver, plus the
//! `[explosion]` table handed to the kernel. Loaded from and saved to TOML.

use blastfield_common::Rect;
use blastfield_kernel::ExplosionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "blastfield.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Canvas Settings ===
    /// Canvas width in pixels
    pub canvas_width: u32,
    /// Canvas height in pixels
    pub canvas_height: u32,
    /// Display density (pixels per dp)
    pub density: f32,
    /// Simulated frames per second
    pub target_fps: u32,

    // === Source Settings ===
    /// Image to explode (None = generated test pattern)
    pub input_image: Option<PathBuf>,
    /// Where the exploding view sits on the canvas (None = centered)
    pub view: Option<Rect>,
    /// Explosion seed (None = random)
    pub seed: Option<u64>,

    // === Output Settings ===
    /// Directory for PNG frames
    pub output_dir: PathBuf,
    /// Write every Nth frame (0 = write nothing)
    pub frame_stride: u32,
    /// Hard cap on simulated frames
    pub max_frames: u32,

    /// Explosion parameters
    pub explosion: ExplosionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Canvas
            canvas_width: 480,
            canvas_height: 480,
            density: 1.0,
            target_fps: 60,

            // Source
            input_image: None,
            view: None,
            seed: None,

            // Output
            output_dir: PathBuf::from("frames"),
            frame_stride: 4,
            max_frames: 600,

            explosion: ExplosionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Config path from the first CLI argument, or [`CONFIG_FILE`].
    pub fn config_path(mut args: impl Iterator<Item = String>) -> PathBuf {
        args.next().map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from)
    }

    /// Clamp engine settings to sensible ranges.
    ///
    /// The `[explosion]` table is left alone; the kernel rejects invalid
    /// explosion settings when the session is created.
    pub fn validate(&mut self) {
        self.canvas_width = self.canvas_width.clamp(16, 4096);
        self.canvas_height = self.canvas_height.clamp(16, 4096);
        self.target_fps = self.target_fps.clamp(1, 240);
        self.max_frames = self.max_frames.clamp(1, 100_000);

        if !self.density.is_finite() || self.density <= 0.0 {
            warn!("Invalid density {}, using 1.0", self.density);
            self.density = 1.0;
        }
        self.density = self.density.clamp(0.5, 4.0);
    }

    /// View rectangle on the canvas for a source of `width × height`.
    #[must_use]
    pub fn view_rect(&self, width: u32, height: u32) -> Rect {
        self.view.unwrap_or_else(|| {
            let x = (self.canvas_width.saturating_sub(width) / 2) as i32;
            let y = (self.canvas_height.saturating_sub(height) / 2) as i32;
            Rect::from_origin_size(x, y, width as i32, height as i32)
        })
    }
}
