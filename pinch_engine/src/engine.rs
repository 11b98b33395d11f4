//! The hover/pinch interaction state machine.
//!
//! Two independent tracks run every frame:
//!
//! * **hover** — which key the cursor is over and for how long;
//! * **pinch** — whether thumb and index tips are closed.
//!
//! A closed pinch commits the hovered key once and latches `pinching`; the
//! latch is only set by a commit and drops when the fingers open.  A pinch
//! closed over empty space therefore still types the first key it reaches.
//! Holding the pinch never repeats.  Dwell is measured and reported but
//! never commits.

use std::time::{Duration, Instant};

use landmark_stream::HandFrame;
use tracing::{debug, trace};

use crate::geometry::{Point, Viewport};
use crate::layout::{KeyId, KeyValue, KeyboardLayout};

// ════════════════════════════════════════════════════════════════════════════
// EngineConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Normalized thumb–index distance below which the hand is pinching.
    pub pinch_threshold: f32,
    /// Hover age at which [`EngineEvent::DwellReached`] is reported.
    pub dwell: Duration,
    /// Flip x so the cursor follows the hand like a mirror.
    pub mirror: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            pinch_threshold: 0.05,
            dwell: Duration::from_millis(500),
            mirror: true,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InteractionState
// ════════════════════════════════════════════════════════════════════════════

/// Everything the engine remembers between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionState {
    pub hovered: Option<KeyId>,
    pub hover_started: Option<Instant>,
    /// Latched by a commit, cleared when the pinch opens.
    pub pinching: bool,
    dwell_reported: bool,
    /// Physical thumb–index closure seen on the last frame.
    closed: bool,
}

impl InteractionState {
    /// Time the current key has been hovered; zero when nothing is hovered.
    pub fn dwell_elapsed(&self, now: Instant) -> Duration {
        self.hover_started
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default()
    }

    /// Dwell as a fraction of `dwell`, clamped to `[0, 1]`.
    pub fn dwell_progress(&self, now: Instant, dwell: Duration) -> f32 {
        if self.hovered.is_none() {
            return 0.0;
        }
        if dwell.is_zero() {
            return 1.0;
        }
        (self.dwell_elapsed(now).as_secs_f32() / dwell.as_secs_f32()).clamp(0.0, 1.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════

/// A committed key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyTrigger {
    pub key: KeyId,
    pub value: KeyValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    HoverEntered { key: KeyId },
    HoverLeft { key: KeyId },
    DwellReached { key: KeyId },
    PinchClosed,
    PinchOpened,
    KeyTriggered(KeyTrigger),
}

/// Result of one [`InteractionEngine::update`].
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    pub state: InteractionState,
    /// Cursor in viewport pixels; `None` when no hand was seen.
    pub cursor: Option<Point>,
    pub events: Vec<EngineEvent>,
}

impl Update {
    pub fn triggers(&self) -> impl Iterator<Item = KeyTrigger> + '_ {
        self.events.iter().filter_map(|e| match e {
            EngineEvent::KeyTriggered(t) => Some(*t),
            _ => None,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InteractionEngine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct InteractionEngine {
    pub config: EngineConfig,
}

impl InteractionEngine {
    pub fn new(config: EngineConfig) -> Self {
        InteractionEngine { config }
    }

    /// Map the index fingertip onto the viewport.
    pub fn cursor_for(&self, hand: &HandFrame, viewport: Viewport) -> Point {
        let tip = hand.index_tip();
        let x = if self.config.mirror { 1.0 - tip.x } else { tip.x };
        Point::new(x * viewport.width, tip.y * viewport.height)
    }

    /// Advance one frame.
    ///
    /// With no hand the state comes back untouched: hover and pinch resume
    /// from where they were when the hand reappears.
    pub fn update(
        &self,
        mut state: InteractionState,
        hand: Option<&HandFrame>,
        layout: &KeyboardLayout,
        viewport: Viewport,
        now: Instant,
    ) -> Update {
        let mut events = Vec::new();

        let Some(hand) = hand else {
            return Update { state, cursor: None, events };
        };

        // ── hover ─────────────────────────────────────────────────────────
        let cursor = self.cursor_for(hand, viewport);
        let hit = layout.hit_test(cursor).map(|r| r.id);

        if hit != state.hovered {
            if let Some(prev) = state.hovered {
                events.push(EngineEvent::HoverLeft { key: prev });
            }
            if let Some(next) = hit {
                events.push(EngineEvent::HoverEntered { key: next });
            }
            state.hovered = hit;
            state.hover_started = hit.map(|_| now);
            state.dwell_reported = false;
        } else if let Some(key) = state.hovered {
            if !state.dwell_reported && state.dwell_elapsed(now) >= self.config.dwell {
                state.dwell_reported = true;
                events.push(EngineEvent::DwellReached { key });
            }
        }

        // ── pinch ─────────────────────────────────────────────────────────
        let distance = hand.pinch_distance();
        let closed = distance < self.config.pinch_threshold;
        trace!(distance, closed, "pinch");

        if closed != state.closed {
            state.closed = closed;
            events.push(if closed { EngineEvent::PinchClosed } else { EngineEvent::PinchOpened });
        }

        if !closed {
            state.pinching = false;
        } else if !state.pinching {
            let trigger = state
                .hovered
                .and_then(|id| layout.region(id))
                .map(|r| KeyTrigger { key: r.id, value: r.value });
            if let Some(t) = trigger {
                debug!(key = ?t.key, value = ?t.value, "key triggered");
                state.pinching = true;
                events.push(EngineEvent::KeyTriggered(t));
            }
        }

        Update { state, cursor: Some(cursor), events }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
