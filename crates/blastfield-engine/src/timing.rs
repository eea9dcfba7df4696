//! Frame timing for the headless loop.
//!
//! Simulated time advances in fixed steps so output is identical from
//! run to run; wall-clock render cost is tracked separately.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Fixed-step simulated frame clock.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Simulated frames per second
    target_fps: u32,
    /// Simulated time per frame
    frame_dt: Duration,
    /// Frames stepped so far
    frame: u64,
    /// Simulated time elapsed
    elapsed: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameClock {
    /// Create a clock stepping at `target_fps` (at least 1).
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        Self {
            target_fps,
            frame_dt: Duration::from_secs_f64(1.0 / f64::from(target_fps)),
            frame: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Advance one frame. Returns the step to feed the simulation.
    pub fn step(&mut self) -> Duration {
        self.frame += 1;
        self.elapsed += self.frame_dt;
        self.frame_dt
    }

    /// Simulated time per frame.
    #[must_use]
    pub fn frame_dt(&self) -> Duration {
        self.frame_dt
    }

    /// Frames stepped so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated time elapsed.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the target FPS.
    #[must_use]
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }
}

/// Wall-clock cost of rendering frames, averaged over a sliding window.
#[derive(Debug)]
pub struct RenderTimer {
    /// Start of the frame being measured
    frame_start: Option<Instant>,
    /// Recent frame times in seconds
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
    /// Frames measured in total
    total_frames: u64,
    /// Sum of all measured frame times
    total_time: Duration,
}

impl Default for RenderTimer {
    fn default() -> Self {
        Self::new(120)
    }
}

impl RenderTimer {
    /// Create a timer averaging over `max_samples` frames.
    #[must_use]
    pub fn new(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            frame_start: None,
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples,
            total_frames: 0,
            total_time: Duration::ZERO,
        }
    }

    /// Mark the start of a frame.
    pub fn begin(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    /// Mark the end of a frame started with [`begin`](Self::begin).
    /// Returns the measured time, or `None` without a matching `begin`.
    pub fn end(&mut self) -> Option<Duration> {
        let elapsed = self.frame_start.take()?.elapsed();
        self.record(elapsed);
        Some(elapsed)
    }

    /// Record a frame time measured elsewhere.
    pub fn record(&mut self, frame_time: Duration) {
        self.frame_times.push_back(frame_time.as_secs_f32());
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }
        self.total_frames += 1;
        self.total_time += frame_time;
    }

    /// Average frame time over the window, in milliseconds.
    #[must_use]
    pub fn average_frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        (self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32) * 1000.0
    }

    /// Frames per second the renderer could sustain, from the window average.
    #[must_use]
    pub fn achievable_fps(&self) -> f32 {
        let avg_ms = self.average_frame_time_ms();
        if avg_ms > 0.0 {
            1000.0 / avg_ms
        } else {
            0.0
        }
    }

    /// Frames measured in total.
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Total measured render time.
    #[must_use]
    pub fn total_time(&self) -> Duration {
        self.total_time
    }
}
