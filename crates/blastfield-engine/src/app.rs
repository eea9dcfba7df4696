//! Headless explosion run.
//!
//! Loads (or generates) the source image, explodes it on a canvas, steps
//! the field at a fixed frame rate and writes PNG frames. The source view
//! itself is drawn here too: it shakes, then shrinks and fades while the
//! particles take over.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use blastfield_common::{Argb, Density, Rect, SessionId};
use blastfield_kernel::{
    ExplosionField, ExplosionListener, ExplosionSession, PixelCanvas,
    PreExplosionEffects, SessionStats, ShakeAnimation, Snapshot,
};

use crate::config::EngineConfig;
use crate::timing::{FrameClock, RenderTimer};

/// Time the source view takes to shrink away once particles start.
const VIEW_HIDE_DURATION: Duration = Duration::from_millis(150);

/// Size of the generated test card.
const TEST_CARD_SIZE: (u32, u32) = (160, 120);

/// Lifecycle notification queued by the field for the host.
#[derive(Debug)]
enum HostEvent {
    Start(SessionId, PreExplosionEffects),
    End(SessionId),
}

/// Listener that queues notifications for the frame loop.
#[derive(Debug, Clone, Default)]
struct EventQueue(Arc<Mutex<VecDeque<HostEvent>>>);

impl EventQueue {
    fn push(&self, event: HostEvent) {
        match self.0.lock() {
            Ok(mut queue) => queue.push_back(event),
            Err(e) => warn!("Host event queue poisoned: {e}"),
        }
    }

    fn drain(&self) -> Vec<HostEvent> {
        self.0
            .lock()
            .map(|mut queue| queue.drain(..).collect())
            .unwrap_or_default()
    }
}

impl ExplosionListener for EventQueue {
    fn on_explosion_start(&mut self, id: SessionId, effects: &PreExplosionEffects) {
        self.push(HostEvent::Start(id, effects.clone()));
    }

    fn on_explosion_end(&mut self, id: SessionId) {
        self.push(HostEvent::End(id));
    }
}

/// Presentation of the exploding source view.
#[derive(Debug)]
struct SourceView {
    snapshot: Arc<Snapshot>,
    rect: Rect,
    shake: Option<ShakeAnimation>,
    start_delay: Duration,
    elapsed: Duration,
    remove_after: bool,
}

impl SourceView {
    fn new(snapshot: Arc<Snapshot>, rect: Rect, effects: PreExplosionEffects) -> Self {
        Self {
            snapshot,
            rect,
            shake: effects.shake,
            start_delay: effects.start_delay,
            elapsed: Duration::ZERO,
            remove_after: effects.remove_view_after,
        }
    }

    /// Fraction of the hide animation completed.
    fn hidden_fraction(&self) -> f32 {
        let hiding = self.elapsed.saturating_sub(self.start_delay);
        (hiding.as_secs_f32() / VIEW_HIDE_DURATION.as_secs_f32()).min(1.0)
    }

    fn is_hidden(&self) -> bool {
        self.hidden_fraction() >= 1.0
    }

    fn draw(&mut self, canvas: &mut PixelCanvas, dt: Duration) {
        let offset = self
            .shake
            .as_mut()
            .and_then(|shake| shake.offset(dt))
            .unwrap_or_default();
        self.elapsed += dt;

        if self.is_hidden() {
            return;
        }
        let remaining = 1.0 - self.hidden_fraction();
        canvas.draw_snapshot(&self.snapshot, self.rect, offset, remaining, remaining);
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Seed the explosion used
    pub seed: u64,
    /// Frames simulated
    pub frames: u64,
    /// PNG frames written
    pub frames_written: u32,
    /// Counters of the exploded session, taken at creation
    pub session: SessionStats,
    /// Whether the explosion completed before the frame cap
    pub completed: bool,
    /// Whether the source view was removed after the explosion
    pub view_removed: bool,
}

/// Runs one explosion to completion (or the frame cap).
pub fn run(config: &EngineConfig) -> Result<RunSummary> {
    info!("Configuration:");
    info!("  Canvas: {}x{} @ {} fps", config.canvas_width, config.canvas_height, config.target_fps);
    info!("  Style: {}", config.explosion.style.name());
    info!("  Output: {}", config.output_dir.display());

    let snapshot = Arc::new(load_source(config)?);
    let view = config.view_rect(snapshot.width(), snapshot.height());
    let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));

    let events = EventQueue::default();
    let mut field = ExplosionField::new(Density::new(config.density), seed);
    field.set_listener(events.clone());

    let id = field
        .explode(Arc::clone(&snapshot), view, config.explosion.clone())
        .context("Failed to start explosion")?;
    let session = field.session(id).map(ExplosionSession::stats).unwrap_or_default();
    info!(
        "Exploding {}x{} view with {} particles ({} never visible)",
        view.width(),
        view.height(),
        session.particles,
        session.degenerate
    );

    if config.frame_stride > 0 {
        fs::create_dir_all(&config.output_dir).with_context(|| {
            format!("Failed to create output directory {}", config.output_dir.display())
        })?;
    }

    let mut source: Option<SourceView> = None;
    let mut canvas = PixelCanvas::new(config.canvas_width, config.canvas_height);
    let mut clock = FrameClock::new(config.target_fps);
    let mut timer = RenderTimer::default();
    debug!("Stepping {:?} per frame ({} fps)", clock.frame_dt(), clock.target_fps());
    let mut frames_written = 0;
    let mut completed = false;
    let mut view_removed = false;

    for event in events.drain() {
        view_removed |= handle_event(event, &mut source, &snapshot, view);
    }

    while clock.frame() < u64::from(config.max_frames) {
        let dt = clock.step();
        timer.begin();

        field.tick(dt);
        for event in events.drain() {
            completed |= matches!(event, HostEvent::End(ended) if ended == id);
            view_removed |= handle_event(event, &mut source, &snapshot, view);
        }

        canvas.clear(Argb::TRANSPARENT);
        if let Some(source_view) = source.as_mut() {
            source_view.draw(&mut canvas, dt);
        }
        field.draw_all(&mut canvas);
        timer.end();

        if config.frame_stride > 0 && clock.frame() % u64::from(config.frame_stride) == 0 {
            let path = frame_path(config, clock.frame());
            canvas
                .save_png(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            frames_written += 1;
        }

        if field.is_empty() && source.as_ref().map_or(true, SourceView::is_hidden) {
            break;
        }
    }

    if !completed {
        warn!("Frame cap of {} reached before the explosion finished", config.max_frames);
    }

    info!(
        "Simulated {} frames ({:.2}s), wrote {} PNGs",
        clock.frame(),
        clock.elapsed().as_secs_f32(),
        frames_written
    );
    info!(
        "Render cost: {:.3} ms/frame avg ({:.0} fps achievable), {:?} over {} frames",
        timer.average_frame_time_ms(),
        timer.achievable_fps(),
        timer.total_time(),
        timer.total_frames()
    );

    Ok(RunSummary {
        seed,
        frames: clock.frame(),
        frames_written,
        session,
        completed,
        view_removed,
    })
}

/// Applies one lifecycle event to the source view. Returns `true` when the
/// view was removed.
fn handle_event(
    event: HostEvent,
    source: &mut Option<SourceView>,
    snapshot: &Arc<Snapshot>,
    view: Rect,
) -> bool {
    match event {
        HostEvent::Start(id, effects) => {
            if effects.haptic {
                info!("{id}: haptic feedback");
            }
            if let Some(shake) = &effects.shake {
                debug!("{id}: shaking view for {:?}", shake.duration());
            }
            *source = Some(SourceView::new(Arc::clone(snapshot), view, effects));
            false
        },
        HostEvent::End(id) => {
            info!("{id}: explosion finished");
            // Without removal the view stays in place, shrunk to nothing.
            if source.as_ref().is_some_and(|s| s.remove_after) {
                *source = None;
                info!("{id}: source view removed");
                true
            } else {
                false
            }
        },
    }
}

fn frame_path(config: &EngineConfig, frame: u64) -> PathBuf {
    config.output_dir.join(format!("frame_{frame:05}.png"))
}

/// Loads the configured image, or generates a test card when none is set.
fn load_source(config: &EngineConfig) -> Result<Snapshot> {
    let snapshot = match &config.input_image {
        Some(path) => Snapshot::open(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            let (width, height) = TEST_CARD_SIZE;
            Snapshot::from_fn(width, height, |x, y| test_card(x, y, width, height))
                .context("Failed to generate test card")?
        },
    };

    debug!("Source image {}x{}", snapshot.width(), snapshot.height());
    Ok(snapshot)
}

/// Hue sweep across, brightness down, with a dark border.
fn test_card(x: u32, y: u32, width: u32, height: u32) -> Argb {
    const BORDER: u32 = 4;
    if x < BORDER || y < BORDER || x + BORDER >= width || y + BORDER >= height {
        return Argb::from_argb(255, 32, 32, 40);
    }
    let hue = 360.0 * x as f32 / width as f32;
    let value = 1.0 - 0.5 * y as f32 / height as f32;
    Argb::from_hsv(hue, 0.8, value)
}
