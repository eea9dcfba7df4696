//! Explosion session: one surface exploding.
//!
//! A session generates its particle array once, at creation, and then
//! only mutates the particles' render state. It moves through
//! `Pending → Running → Completed`:
//! - `start()` begins the clock.
//! - The clock's completion (via [`ExplosionSession::tick`]) or a forced
//!   [`ExplosionSession::complete`] ends it.
//!
//! Hosts with their own animation clock can skip `tick` and feed progress
//! values through [`ExplosionSession::advance_to`].

use std::sync::Arc;
use std::time::Duration;

use blastfield_common::{BlastResult, Density, Rect, SessionId};
use fastrand::Rng;
use tracing::{debug, trace};

use crate::clock::{AnimationClock, ClockEvent, ProgressSource, PROGRESS_SCALE};
use crate::color::ColorProcessor;
use crate::config::{ExplosionConfig, ExplosionStyle};
use crate::particle::{Particle, ParticleInstance};
use crate::snapshot::Snapshot;
use crate::surface::Surface;

/// Number of vortex particles traced per session at generation.
const TRACE_SAMPLE: usize = 5;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Particles generated, clock not started.
    #[default]
    Pending,
    /// Clock running; particles advance every frame.
    Running,
    /// Clock ended or the session was cancelled.
    Completed,
}

/// Per-session counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    /// Particles generated.
    pub particles: usize,
    /// Particles whose visible window is empty.
    pub degenerate: usize,
    /// Frames drawn while running or completed.
    pub frames_drawn: u64,
    /// Particles that contributed pixels in the last drawn frame.
    pub last_frame_visible: usize,
}

/// One explosion: a fixed particle array driven by one progress value.
#[derive(Debug, Clone)]
pub struct ExplosionSession {
    id: SessionId,
    snapshot: Arc<Snapshot>,
    bounds: Rect,
    config: ExplosionConfig,
    seed: u64,
    particles: Box<[Particle]>,
    clock: AnimationClock,
    progress: f32,
    state: SessionState,
    stats: SessionStats,
}

impl ExplosionSession {
    /// Validates `config` and generates the particle grid.
    ///
    /// The same snapshot, bounds, config, seed and density always produce
    /// the same particles.
    pub fn new(
        snapshot: impl Into<Arc<Snapshot>>,
        bounds: Rect,
        config: ExplosionConfig,
        seed: u64,
        density: Density,
    ) -> BlastResult<Self> {
        config.validate()?;
        let snapshot = snapshot.into();
        let particles = generate_particles(&snapshot, &bounds, &config, seed, density);
        let degenerate = particles.iter().filter(|p| p.is_degenerate()).count();

        debug!(
            "Generated {} {} particles (seed {seed}, bounds {}x{})",
            particles.len(),
            config.style.name(),
            bounds.width(),
            bounds.height()
        );

        let clock = AnimationClock::new(config.duration(), config.interpolator);
        Ok(Self {
            id: SessionId::NULL,
            snapshot,
            bounds,
            seed,
            clock,
            progress: 0.0,
            state: SessionState::Pending,
            stats: SessionStats {
                particles: particles.len(),
                degenerate,
                ..SessionStats::default()
            },
            particles,
            config,
        })
    }

    /// Delays the first running tick after [`start`](Self::start).
    #[must_use]
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.clock = self.clock.with_start_delay(delay);
        self
    }

    pub(crate) fn set_id(&mut self, id: SessionId) {
        self.id = id;
    }

    /// Session ID (null until added to a field).
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session reached `Completed`.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Seed the particles were generated from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Explosion bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &ExplosionConfig {
        &self.config
    }

    /// Source snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    /// Particle array.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Counters.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Progress last applied, in `[0, PROGRESS_SCALE]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// The session's own clock.
    #[must_use]
    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// `Pending → Running`. Ignored in any other state.
    pub fn start(&mut self) {
        if self.state == SessionState::Pending {
            self.clock.start();
            self.state = SessionState::Running;
        }
    }

    /// Advances the owned clock by `dt`. The session completes when the
    /// clock reports completion.
    pub fn tick(&mut self, dt: Duration) -> ClockEvent {
        if self.state != SessionState::Running {
            return if self.is_completed() {
                ClockEvent::Finished
            } else {
                ClockEvent::Idle
            };
        }

        let event = self.clock.tick(dt);
        self.progress = self.clock.current_progress();
        if event == ClockEvent::Completed {
            self.state = SessionState::Completed;
            debug!("{} completed after {} frames", self.id, self.stats.frames_drawn);
        }
        event
    }

    /// Sets progress from an external clock. Values are clamped to
    /// `[0, PROGRESS_SCALE]`; ignored unless running.
    pub fn advance_to(&mut self, progress: f32) {
        if self.state == SessionState::Running && !progress.is_nan() {
            self.progress = progress.clamp(0.0, PROGRESS_SCALE);
        }
    }

    /// Forces `Completed` immediately. Returns `false` if already completed.
    pub fn complete(&mut self) -> bool {
        if self.is_completed() {
            return false;
        }
        self.clock.finish();
        self.progress = PROGRESS_SCALE;
        self.state = SessionState::Completed;
        true
    }

    /// Advances every particle to the current progress.
    pub fn advance_particles(&mut self) {
        let progress = self.progress;
        for particle in self.particles.iter_mut() {
            particle.advance(progress, PROGRESS_SCALE);
        }
    }

    /// Draws visible particles without advancing them. Returns how many
    /// were drawn. Particles whose combined alpha rounds down to zero are
    /// skipped.
    pub fn paint(&self, surface: &mut dyn Surface) -> usize {
        let mut drawn = 0;
        for particle in self.particles.iter().filter(|p| p.is_visible()) {
            let alpha = (f32::from(particle.color.alpha()) * particle.alpha) as u8;
            if alpha == 0 {
                continue;
            }
            surface.fill_circle(
                particle.cx,
                particle.cy,
                particle.radius,
                particle.color.with_alpha(alpha),
            );
            drawn += 1;
        }
        drawn
    }

    /// Advances and draws one frame. Returns `false` while pending
    /// (nothing to draw yet), `true` otherwise.
    pub fn draw(&mut self, surface: &mut dyn Surface) -> bool {
        if self.state == SessionState::Pending {
            return false;
        }
        self.advance_particles();
        self.stats.last_frame_visible = self.paint(surface);
        self.stats.frames_drawn += 1;
        true
    }

    /// Writes GPU instances for the currently visible particles.
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.extend(
            self.particles
                .iter()
                .filter(|p| p.is_visible())
                .map(ParticleInstance::from_particle),
        );
    }
}

fn generate_particles(
    snapshot: &Snapshot,
    bounds: &Rect,
    config: &ExplosionConfig,
    seed: u64,
    density: Density,
) -> Box<[Particle]> {
    let mut rng = Rng::with_seed(seed);
    let n = config.grid_size();
    let style = config.style;

    (0..(n as usize) * (n as usize))
        .map(|index| {
            let row = (index / n as usize) as u32;
            let col = (index % n as usize) as u32;

            let color = ColorProcessor::process(
                snapshot.grid_sample(row, col, n),
                config.color_mode,
                config.tint_color,
                &mut rng,
            );
            let particle = style.generate(&mut rng, bounds, config, density).with_color(color);

            if style == ExplosionStyle::Vortex && index < TRACE_SAMPLE {
                trace!(
                    "Vortex particle #{index}: start {:.0}°, rotation {:.0}°, final radius {:.1}",
                    particle.bottom.to_degrees(),
                    particle.top.to_degrees(),
                    particle.mag
                );
            }
            particle
        })
        .collect()
}
