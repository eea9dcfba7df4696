//! Progress clock driving explosion sessions.
//!
//! A session's particles are advanced from a single progress value that
//! runs from `0.0` to [`PROGRESS_SCALE`] over the configured duration,
//! after an optional start delay, shaped by an [`Interpolator`].
//!
//! The clock holds no wall-clock state: the host feeds it elapsed time
//! through [`AnimationClock::tick`], which keeps runs reproducible.

use std::time::Duration;

use blastfield_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Upper end of the progress range. Headroom beyond `1.0` lets every
/// particle's delayed appear/fade window fit inside one run.
pub const PROGRESS_SCALE: f32 = 1.4;

/// Timing curve applied to linear time fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolator {
    /// Constant rate.
    Linear,
    /// Starts slow and speeds up; the factor controls the curve strength.
    Accelerate(f32),
    /// Starts fast and slows down; the factor controls the curve strength.
    Decelerate(f32),
    /// Slow start and end, fast middle.
    AccelerateDecelerate,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::Accelerate(0.6)
    }
}

impl Interpolator {
    /// Maps a time fraction in `[0, 1]` to an eased fraction.
    #[must_use]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Linear => t,
            Self::Accelerate(factor) => {
                if factor == 1.0 {
                    t * t
                } else {
                    t.powf(2.0 * factor)
                }
            },
            Self::Decelerate(factor) => {
                if factor == 1.0 {
                    1.0 - (1.0 - t) * (1.0 - t)
                } else {
                    1.0 - (1.0 - t).powf(2.0 * factor)
                }
            },
            Self::AccelerateDecelerate => ((t + 1.0) * std::f32::consts::PI).cos() / 2.0 + 0.5,
        }
    }

    /// Rejects non-positive or non-finite curve factors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Accelerate(factor) | Self::Decelerate(factor)
                if !(factor.is_finite() && factor > 0.0) =>
            {
                Err(ConfigError::InterpolatorFactor(factor))
            },
            _ => Ok(()),
        }
    }
}

/// Host clock interface consumed by sessions.
pub trait ProgressSource {
    /// Current progress in `[0, PROGRESS_SCALE]`.
    fn current_progress(&self) -> f32;

    /// Whether the clock has signalled completion.
    fn is_finished(&self) -> bool;
}

/// Clock phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockPhase {
    /// Not started.
    #[default]
    Idle,
    /// Started, waiting out the start delay.
    Delayed,
    /// Producing progress values.
    Running,
    /// Reached the end (or was finished early).
    Finished,
}

/// Result of one clock tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockEvent {
    /// Clock has not been started.
    Idle,
    /// Still inside the start delay.
    Delayed,
    /// Running with the given progress.
    Running(f32),
    /// Completed on this tick. Reported exactly once.
    Completed,
    /// Already completed on an earlier tick.
    Finished,
}

/// Deterministic value animator from `0.0` to [`PROGRESS_SCALE`].
#[derive(Debug, Clone)]
pub struct AnimationClock {
    duration: Duration,
    start_delay: Duration,
    interpolator: Interpolator,
    elapsed: Duration,
    phase: ClockPhase,
    progress: f32,
}

impl AnimationClock {
    /// Creates an idle clock.
    #[must_use]
    pub fn new(duration: Duration, interpolator: Interpolator) -> Self {
        Self {
            duration,
            start_delay: Duration::ZERO,
            interpolator,
            elapsed: Duration::ZERO,
            phase: ClockPhase::Idle,
            progress: 0.0,
        }
    }

    /// Sets the delay between [`start`](Self::start) and the first
    /// running tick.
    #[must_use]
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    /// Configured duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Configured start delay.
    #[must_use]
    pub fn start_delay(&self) -> Duration {
        self.start_delay
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    /// Whether the clock was started (delayed, running or finished).
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.phase != ClockPhase::Idle
    }

    /// Starts the clock. Has no effect unless idle.
    pub fn start(&mut self) {
        if self.phase == ClockPhase::Idle {
            self.elapsed = Duration::ZERO;
            self.progress = 0.0;
            self.phase = if self.start_delay.is_zero() {
                ClockPhase::Running
            } else {
                ClockPhase::Delayed
            };
        }
    }

    /// Advances the clock by `dt` of host time.
    pub fn tick(&mut self, dt: Duration) -> ClockEvent {
        match self.phase {
            ClockPhase::Idle => return ClockEvent::Idle,
            ClockPhase::Finished => return ClockEvent::Finished,
            ClockPhase::Delayed | ClockPhase::Running => {},
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < self.start_delay {
            self.phase = ClockPhase::Delayed;
            return ClockEvent::Delayed;
        }

        let running = self.elapsed - self.start_delay;
        let fraction = if self.duration.is_zero() {
            1.0
        } else {
            (running.as_secs_f64() / self.duration.as_secs_f64()).min(1.0) as f32
        };

        self.progress = self.interpolator.apply(fraction) * PROGRESS_SCALE;
        if fraction >= 1.0 {
            self.phase = ClockPhase::Finished;
            self.progress = PROGRESS_SCALE;
            ClockEvent::Completed
        } else {
            self.phase = ClockPhase::Running;
            ClockEvent::Running(self.progress)
        }
    }

    /// Jumps to the end without waiting. Returns `true` if the clock was
    /// not already finished.
    pub fn finish(&mut self) -> bool {
        if self.phase == ClockPhase::Finished {
            return false;
        }
        self.phase = ClockPhase::Finished;
        self.progress = PROGRESS_SCALE;
        true
    }
}

impl ProgressSource for AnimationClock {
    fn current_progress(&self) -> f32 {
        self.progress
    }

    fn is_finished(&self) -> bool {
        self.phase == ClockPhase::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn test_interpolator_endpoints() {
        for interpolator in [
            Interpolator::Linear,
            Interpolator::Accelerate(0.6),
            Interpolator::Accelerate(1.0),
            Interpolator::Decelerate(1.0),
            Interpolator::Decelerate(2.0),
            Interpolator::AccelerateDecelerate,
        ] {
            assert!(interpolator.apply(0.0).abs() < 1e-6, "{interpolator:?}");
            assert!((interpolator.apply(1.0) - 1.0).abs() < 1e-6, "{interpolator:?}");
        }
    }

    #[test]
    fn test_interpolator_shapes() {
        assert!(Interpolator::Accelerate(1.0).apply(0.5) < 0.5);
        assert!(Interpolator::Decelerate(1.0).apply(0.5) > 0.5);
        assert!((Interpolator::AccelerateDecelerate.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Interpolator::Linear.apply(2.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_interpolator_validation() {
        assert!(Interpolator::Accelerate(0.6).validate().is_ok());
        assert_eq!(
            Interpolator::Decelerate(0.0).validate(),
            Err(ConfigError::InterpolatorFactor(0.0))
        );
        assert!(Interpolator::Accelerate(f32::INFINITY).validate().is_err());
    }

    #[test]
    fn test_clock_idle_until_started() {
        let mut clock = AnimationClock::new(MS(100), Interpolator::Linear);
        assert_eq!(clock.tick(MS(50)), ClockEvent::Idle);
        assert!(!clock.is_started());
        assert_eq!(clock.current_progress(), 0.0);
    }

    #[test]
    fn test_clock_linear_run() {
        let mut clock = AnimationClock::new(MS(100), Interpolator::Linear);
        clock.start();

        match clock.tick(MS(50)) {
            ClockEvent::Running(progress) => {
                assert!((progress - PROGRESS_SCALE / 2.0).abs() < 1e-5);
            },
            other => panic!("unexpected event {other:?}"),
        }

        assert_eq!(clock.tick(MS(50)), ClockEvent::Completed);
        assert!(clock.is_finished());
        assert_eq!(clock.current_progress(), PROGRESS_SCALE);
        assert_eq!(clock.tick(MS(16)), ClockEvent::Finished);
    }

    #[test]
    fn test_clock_start_delay() {
        let mut clock =
            AnimationClock::new(MS(100), Interpolator::Linear).with_start_delay(MS(40));
        clock.start();
        assert_eq!(clock.phase(), ClockPhase::Delayed);
        assert_eq!(clock.tick(MS(30)), ClockEvent::Delayed);
        assert!(matches!(clock.tick(MS(20)), ClockEvent::Running(_)));
        assert_eq!(clock.tick(MS(90)), ClockEvent::Completed);
    }

    #[test]
    fn test_clock_progress_monotonic() {
        let mut clock = AnimationClock::new(MS(1024), Interpolator::Accelerate(0.6));
        clock.start();
        let mut last = 0.0;
        while !clock.is_finished() {
            clock.tick(MS(16));
            let progress = clock.current_progress();
            assert!(progress >= last);
            assert!(progress <= PROGRESS_SCALE);
            last = progress;
        }
    }

    #[test]
    fn test_clock_finish_early() {
        let mut clock = AnimationClock::new(MS(100), Interpolator::Linear);
        clock.start();
        assert!(clock.finish());
        assert!(!clock.finish());
        assert_eq!(clock.tick(MS(1)), ClockEvent::Finished);
    }
}
