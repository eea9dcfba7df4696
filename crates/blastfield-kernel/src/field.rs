//! Field manager: the set of live explosions on one display surface.
//!
//! Sessions are kept in insertion order, which is also draw order. The
//! field drives their clocks, composites them, and drops each one after
//! its clock completes. Host-side effects (haptics, shaking the source
//! view, hiding it afterwards) are described to an [`ExplosionListener`]
//! rather than performed here.

use std::sync::Arc;
use std::time::Duration;

use blastfield_common::{BlastResult, Density, Rect, SessionId};
use fastrand::Rng;
use tracing::{debug, info};

use crate::clock::ClockEvent;
use crate::config::ExplosionConfig;
use crate::session::ExplosionSession;
use crate::shake::ShakeAnimation;
use crate::snapshot::Snapshot;
use crate::surface::Surface;

/// Delay between a shaking explode request and the first particle frame.
pub const SHAKE_START_DELAY: Duration = Duration::from_millis(100);

/// Effects the host should perform when an explosion starts.
#[derive(Debug, Clone)]
pub struct PreExplosionEffects {
    /// Trigger haptic feedback.
    pub haptic: bool,
    /// Shake the source view with these offsets before the particles appear.
    pub shake: Option<ShakeAnimation>,
    /// Delay before the first particle frame.
    pub start_delay: Duration,
    /// Hide the source view once the explosion completes.
    pub remove_view_after: bool,
}

/// Receives explosion lifecycle notifications.
///
/// Both methods default to no-ops.
pub trait ExplosionListener: Send {
    /// Called once the session is created and started.
    fn on_explosion_start(&mut self, _id: SessionId, _effects: &PreExplosionEffects) {}

    /// Called when a session completes and is removed by [`ExplosionField::tick`].
    fn on_explosion_end(&mut self, _id: SessionId) {}
}

/// Ordered collection of active explosion sessions.
pub struct ExplosionField {
    sessions: Vec<ExplosionSession>,
    next_id: SessionId,
    rng: Rng,
    density: Density,
    expand_override: Option<(u32, u32)>,
    listener: Option<Box<dyn ExplosionListener>>,
}

impl ExplosionField {
    /// Creates an empty field. `seed` feeds the per-session seeds handed
    /// out by [`explode`](Self::explode).
    #[must_use]
    pub fn new(density: Density, seed: u64) -> Self {
        Self {
            sessions: Vec::new(),
            next_id: SessionId::NULL,
            rng: Rng::with_seed(seed),
            density,
            expand_override: None,
            listener: None,
        }
    }

    /// Installs a lifecycle listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl ExplosionListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Overrides every config's bounds margin with `(dx, dy)` in dp.
    pub fn expand_explosion_bound(&mut self, dx: u32, dy: u32) {
        self.expand_override = Some((dx, dy));
    }

    /// Display density.
    #[must_use]
    pub fn density(&self) -> Density {
        self.density
    }

    /// Explodes a surface with a seed drawn from the field's RNG.
    pub fn explode(
        &mut self,
        snapshot: impl Into<Arc<Snapshot>>,
        view_bounds: Rect,
        config: ExplosionConfig,
    ) -> BlastResult<SessionId> {
        let seed = self.rng.u64(..);
        self.explode_seeded(snapshot, view_bounds, config, seed)
    }

    /// Explodes a surface with an explicit seed.
    ///
    /// Expands `view_bounds` by the margin, creates and starts the
    /// session, then notifies the listener.
    pub fn explode_seeded(
        &mut self,
        snapshot: impl Into<Arc<Snapshot>>,
        view_bounds: Rect,
        config: ExplosionConfig,
        seed: u64,
    ) -> BlastResult<SessionId> {
        let (dx, dy) = self
            .expand_override
            .unwrap_or((config.expand_bounds_dp, config.expand_bounds_dp));
        let bounds = view_bounds.expanded(self.density.dp_px(dx), self.density.dp_px(dy));

        let shake = config.shake_before_explode.then(|| {
            ShakeAnimation::new(
                config.shake_duration(),
                view_bounds.width() as f32,
                view_bounds.height() as f32,
                config.shake_intensity,
                seed,
            )
        });
        let start_delay = if shake.is_some() {
            SHAKE_START_DELAY
        } else {
            Duration::ZERO
        };
        let effects = PreExplosionEffects {
            haptic: config.haptic_feedback,
            shake,
            start_delay,
            remove_view_after: config.remove_view_after_explosion,
        };
        let style = config.style;

        let session = ExplosionSession::new(snapshot, bounds, config, seed, self.density)?
            .with_start_delay(start_delay);
        let id = self.add_session(session);

        info!("Exploding {id} ({}, seed {seed})", style.name());
        if let Some(listener) = self.listener.as_mut() {
            listener.on_explosion_start(id, &effects);
        }
        Ok(id)
    }

    /// Adds a session built by the caller, starting it if pending.
    pub fn add_session(&mut self, mut session: ExplosionSession) -> SessionId {
        self.next_id = self.next_id.next();
        let id = self.next_id;
        session.set_id(id);
        session.start();
        self.sessions.push(session);
        id
    }

    /// Removes a session without notifying the listener.
    pub fn remove_session(&mut self, id: SessionId) -> Option<ExplosionSession> {
        let index = self.sessions.iter().position(|s| s.id() == id)?;
        Some(self.sessions.remove(index))
    }

    /// Forces a session to complete. It is removed on the next
    /// [`tick`](Self::tick). Returns `false` for unknown or already
    /// completed sessions.
    pub fn cancel(&mut self, id: SessionId) -> bool {
        self.sessions
            .iter_mut()
            .find(|s| s.id() == id)
            .is_some_and(ExplosionSession::complete)
    }

    /// Advances every session's clock by `dt` and removes the ones that
    /// completed before this tick.
    ///
    /// A session completing on this tick stays for one more frame so its
    /// final (fully faded) state gets drawn. Returns the removed IDs.
    pub fn tick(&mut self, dt: Duration) -> Vec<SessionId> {
        let mut finished = Vec::new();
        for session in &mut self.sessions {
            if session.tick(dt) == ClockEvent::Finished {
                finished.push(session.id());
            }
        }

        if finished.is_empty() {
            return finished;
        }

        self.sessions.retain(|s| !finished.contains(&s.id()));
        for &id in &finished {
            info!("Explosion {id} complete");
            if let Some(listener) = self.listener.as_mut() {
                listener.on_explosion_end(id);
            }
        }
        debug!("{} explosions still active", self.sessions.len());
        finished
    }

    /// Draws every session in insertion order. Returns whether any session
    /// drew a frame.
    pub fn draw_all(&mut self, surface: &mut dyn Surface) -> bool {
        let mut drew = false;
        for session in &mut self.sessions {
            drew |= session.draw(surface);
        }
        drew
    }

    /// Drops every session without firing end notifications.
    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    /// Number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Looks up a session.
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<&ExplosionSession> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    /// Active sessions in draw order.
    pub fn sessions(&self) -> impl Iterator<Item = &ExplosionSession> {
        self.sessions.iter()
    }
}

impl std::fmt::Debug for ExplosionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplosionField")
            .field("sessions", &self.sessions.len())
            .field("next_id", &self.next_id)
            .field("density", &self.density)
            .field("expand_override", &self.expand_override)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}
