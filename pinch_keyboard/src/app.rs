//! Top-level application state machine.
//!
//! `AppState` owns the keyboard layout, the interaction engine and its
//! state, the typed text, the press effects and the cue player.  It
//! processes `SourceEvent`s and drives the visualizer each frame.

use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::time::Instant;

use landmark_stream::{DetectionFrame, HandFrame};
use pinch_engine::{
    EngineEvent, InteractionEngine, InteractionState, KeyboardLayout, Point, TextBuffer, Viewport,
};
use tracing::{debug, error, info, trace, warn};

use crate::config::AppConfig;
use crate::cues::{Cue, CuePlayer};
use crate::effects::Effects;
use crate::error::AppError;
#[cfg(feature = "leap")]
use crate::source::LeapSource;
use crate::source::{
    spawn_landmark_source, DetectorProcess, LandmarkSource, PipeSource, SimInput, SimSource,
    SourceEvent,
};
use crate::status::Status;
use crate::visualizer::{Scene, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// SourceKind
// ════════════════════════════════════════════════════════════════════════════

/// Where landmark frames come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Spawn the configured detector command.
    Detector,
    /// Detector NDJSON piped on stdin.
    Stdin,
    /// A recorded NDJSON session.
    Replay(PathBuf),
    /// Mouse drives a synthetic hand.
    Sim,
    #[cfg(feature = "leap")]
    Leap,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── keyboard ─────────────────────────────────────────────────────────
    layout:      KeyboardLayout,
    viewport:    Viewport,

    // ── interaction ──────────────────────────────────────────────────────
    engine:      InteractionEngine,
    interaction: InteractionState,
    hand:        Option<HandFrame>,
    cursor:      Option<Point>,

    // ── output ───────────────────────────────────────────────────────────
    text:        TextBuffer,
    effects:     Effects,
    cues:        CuePlayer,
    status:      Status,
}

impl AppState {
    pub fn new(cfg: &AppConfig, viewport: Viewport, effects: Effects, cues: CuePlayer) -> Self {
        AppState {
            layout:      KeyboardLayout::standard(viewport),
            viewport,
            engine:      InteractionEngine::new(cfg.engine_config()),
            interaction: InteractionState::default(),
            hand:        None,
            cursor:      None,
            text:        TextBuffer::new(),
            effects,
            cues,
            status:      Status::Starting,
        }
    }

    // ── process one SourceEvent ──────────────────────────────────────────

    pub fn handle_source_event(&mut self, event: SourceEvent, now: Instant) {
        if self.status.is_terminal() {
            trace!(?event, "ignored after capture failure");
            return;
        }
        match event {
            SourceEvent::Acquired => {
                info!("camera feed acquired");
                self.status = Status::CameraAcquired;
            }
            SourceEvent::Frame(frame) => self.handle_frame(frame, now),
            SourceEvent::Unavailable(reason) => {
                error!(%reason, "camera unavailable");
                warn!("no landmark feed; `--source sim` drives the keyboard with the mouse");
                self.hand = None;
                self.cursor = None;
                self.status = Status::CameraDenied(reason);
            }
            SourceEvent::Ended => {
                info!("landmark feed ended");
                self.hand = None;
                self.cursor = None;
                self.status = Status::FeedEnded;
            }
        }
    }

    fn handle_frame(&mut self, frame: DetectionFrame, now: Instant) {
        self.hand = frame.hands.into_iter().next();
        self.status = if self.hand.is_some() { Status::Tracking } else { Status::Searching };

        let update = self.engine.update(
            self.interaction,
            self.hand.as_ref(),
            &self.layout,
            self.viewport,
            now,
        );
        self.interaction = update.state;
        self.cursor = update.cursor;

        for event in update.events {
            self.apply_engine_event(event, now);
        }
    }

    fn apply_engine_event(&mut self, event: EngineEvent, now: Instant) {
        match event {
            EngineEvent::HoverEntered { .. } => self.cues.play(Cue::Hover),
            EngineEvent::KeyTriggered(trigger) => {
                self.text.apply(trigger.value);
                self.cues.play(Cue::Press);
                if let Some(region) = self.layout.region(trigger.key) {
                    self.effects.press(region.id, region.rect, now);
                    debug!(key = %region.label, text = %self.text.as_str(), "typed");
                }
            }
            other => trace!(?other, "engine event"),
        }
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, now: Instant) {
        self.effects.tick(now);
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn text(&self)        -> &str               { self.text.as_str() }
    pub fn status(&self)      -> &Status            { &self.status }
    pub fn interaction(&self) -> &InteractionState  { &self.interaction }
    pub fn cursor(&self)      -> Option<Point>      { self.cursor }
    pub fn hand(&self)        -> Option<&HandFrame> { self.hand.as_ref() }
    pub fn layout(&self)      -> &KeyboardLayout    { &self.layout }
    pub fn effects(&self)     -> &Effects           { &self.effects }

    pub fn scene(&self, now: Instant) -> Scene<'_> {
        let pressed = self
            .layout
            .regions()
            .iter()
            .map(|r| r.id)
            .filter(|&id| self.effects.is_pressed(id, now))
            .collect();
        Scene {
            layout:   &self.layout,
            hovered:  self.interaction.hovered,
            dwell:    self.interaction.dwell_progress(now, self.engine.config.dwell),
            pressed,
            hand:     self.hand.as_ref(),
            mirror:   self.engine.config.mirror,
            cursor:   self.cursor,
            pinching: self.interaction.pinching,
            text:     self.text.as_str(),
            status:   &self.status,
            bursts:   self.effects.bursts(),
            now,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

fn build_source(
    cfg:  &AppConfig,
    kind: SourceKind,
) -> Result<(Box<dyn LandmarkSource>, Option<Sender<SimInput>>), AppError> {
    let min_confidence = cfg.detector.min_confidence;
    Ok(match kind {
        SourceKind::Detector => {
            let source = DetectorProcess {
                command: cfg.detector.command.clone(),
                args: cfg.detector.args.clone(),
                min_confidence,
            };
            (Box::new(source), None)
        }
        SourceKind::Stdin => (Box::new(PipeSource::stdin(min_confidence)), None),
        SourceKind::Replay(path) => (Box::new(PipeSource::replay(&path, min_confidence)?), None),
        SourceKind::Sim => {
            let (tx, rx) = mpsc::channel();
            (Box::new(SimSource { rx }), Some(tx))
        }
        #[cfg(feature = "leap")]
        SourceKind::Leap => (Box::new(LeapSource), None),
    })
}

/// Run the full application.
///
/// Opens the window, starts the landmark source and the cue player, and
/// drives the input/render loop until the window closes or Escape is hit.
pub fn run(cfg: AppConfig, kind: SourceKind) -> Result<(), AppError> {
    info!(source = ?kind, "starting");
    let (source, sim_tx) = build_source(&cfg, kind)?;

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(&cfg.window, sim_tx)?;
    let source_rx = spawn_landmark_source(source);

    // ── App state ─────────────────────────────────────────────────────────
    let cues = CuePlayer::spawn(&cfg.audio);
    let mut app = AppState::new(&cfg, vis.viewport(), Effects::new(&cfg.effects), cues);

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Poll window input (forwards the mouse in sim mode)
        if !vis.poll_input() { break; }

        // 2. Drain landmark events
        let now = Instant::now();
        while let Ok(event) = source_rx.try_recv() {
            app.handle_source_event(event, now);
        }

        // 3. Per-frame logic
        app.tick(now);

        // 4. Render
        vis.render(&app.scene(now))?;
    }

    info!(text = %app.text(), "closing");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sim_hand;
    use std::time::Duration;

    fn viewport() -> Viewport {
        Viewport::new(1280.0, 720.0)
    }

    fn make_app() -> AppState {
        let cfg = AppConfig::default();
        let effects = Effects::with_seed(&cfg.effects, 42);
        AppState::new(&cfg, viewport(), effects, CuePlayer::muted())
    }

    /// A frame whose hand points at the centre of `label`.
    fn over(app: &AppState, label: &str, pinch: bool) -> SourceEvent {
        let c = app.layout().find(label).unwrap().rect.center();
        let vp = viewport();
        let hand = sim_hand(c.x / vp.width, c.y / vp.height, pinch).unwrap();
        SourceEvent::Frame(DetectionFrame::with_hand(hand))
    }

    /// Hover `label` with an open hand, then pinch.
    fn type_key(app: &mut AppState, label: &str, t: &mut Instant) {
        for pinch in [false, true] {
            *t += Duration::from_millis(16);
            let ev = over(app, label, pinch);
            app.handle_source_event(ev, *t);
        }
    }

    #[test]
    fn starts_initializing() {
        assert_eq!(*make_app().status(), Status::Starting);
    }

    #[test]
    fn acquired_then_tracking_then_searching() {
        let mut app = make_app();
        let t = Instant::now();
        app.handle_source_event(SourceEvent::Acquired, t);
        assert_eq!(*app.status(), Status::CameraAcquired);

        let ev = over(&app, "Q", false);
        app.handle_source_event(ev, t);
        assert_eq!(*app.status(), Status::Tracking);
        assert!(app.cursor().is_some());
        assert!(app.hand().is_some());

        app.handle_source_event(SourceEvent::Frame(DetectionFrame::empty()), t);
        assert_eq!(*app.status(), Status::Searching);
        assert!(app.cursor().is_none());
        assert!(app.hand().is_none());
    }

    #[test]
    fn camera_denied_is_terminal() {
        let mut app = make_app();
        let t = Instant::now();
        app.handle_source_event(SourceEvent::Unavailable("permission denied".into()), t);
        assert!(app.status().is_terminal());

        let ev = over(&app, "H", true);
        app.handle_source_event(ev, t);
        app.handle_source_event(SourceEvent::Acquired, t);
        assert_eq!(*app.status(), Status::CameraDenied("permission denied".into()));
        assert_eq!(app.text(), "");
    }

    #[test]
    fn pinch_types_hovered_key() {
        let mut app = make_app();
        let mut t = Instant::now();
        type_key(&mut app, "H", &mut t);
        type_key(&mut app, "I", &mut t);
        assert_eq!(app.text(), "HI");
    }

    #[test]
    fn held_pinch_types_once() {
        let mut app = make_app();
        let mut t = Instant::now();
        type_key(&mut app, "K", &mut t);
        for _ in 0..20 {
            t += Duration::from_millis(16);
            let ev = over(&app, "K", true);
            app.handle_source_event(ev, t);
        }
        assert_eq!(app.text(), "K");
    }

    #[test]
    fn pinch_closed_off_the_keys_types_the_key_it_slides_onto() {
        let mut app = make_app();
        let t = Instant::now();
        let hand = sim_hand(0.5, 0.02, true).unwrap();
        app.handle_source_event(SourceEvent::Frame(DetectionFrame::with_hand(hand)), t);
        assert!(!app.scene(t).pinching);
        assert_eq!(app.text(), "");

        let t = t + Duration::from_millis(16);
        let ev = over(&app, "W", true);
        app.handle_source_event(ev, t);
        assert_eq!(app.text(), "W");
        assert!(app.scene(t).pinching);
    }

    #[test]
    fn hovering_past_dwell_types_nothing() {
        let mut app = make_app();
        let t0 = Instant::now();
        for ms in [0u64, 400, 800, 1600] {
            let ev = over(&app, "A", false);
            app.handle_source_event(ev, t0 + Duration::from_millis(ms));
        }
        assert_eq!(app.text(), "");
        let scene = app.scene(t0 + Duration::from_millis(1600));
        assert_eq!(scene.dwell, 1.0);
        assert_eq!(scene.hovered, app.layout().find("A").map(|r| r.id));
    }

    #[test]
    fn space_and_backspace() {
        let mut app = make_app();
        let mut t = Instant::now();
        for label in ["BACK", "O", "K", "SPACE", "BACK", "?"] {
            type_key(&mut app, label, &mut t);
        }
        assert_eq!(app.text(), "OK?");
    }

    #[test]
    fn press_starts_pulse_and_burst_then_expires() {
        let mut app = make_app();
        let mut t = Instant::now();
        type_key(&mut app, "M", &mut t);
        let m = app.layout().find("M").unwrap().id;

        assert!(app.effects().is_pressed(m, t));
        assert_eq!(app.effects().bursts().len(), 1);
        assert_eq!(app.scene(t).pressed, vec![m]);

        let later = t + Duration::from_secs(1);
        app.tick(later);
        assert!(!app.effects().is_pressed(m, later));
        assert!(app.effects().bursts().is_empty());
        assert_eq!(app.text(), "M");
    }

    #[test]
    fn lost_hand_keeps_hover_and_pinch() {
        let mut app = make_app();
        let mut t = Instant::now();
        type_key(&mut app, "J", &mut t);
        let before = *app.interaction();

        app.handle_source_event(SourceEvent::Frame(DetectionFrame::empty()), t);
        assert_eq!(*app.interaction(), before);

        // Reappearing with the pinch still closed does not retype.
        let ev = over(&app, "J", true);
        app.handle_source_event(ev, t + Duration::from_millis(16));
        assert_eq!(app.text(), "J");
    }

    #[test]
    fn feed_end_clears_hand() {
        let mut app = make_app();
        let t = Instant::now();
        let ev = over(&app, "Q", false);
        app.handle_source_event(ev, t);
        app.handle_source_event(SourceEvent::Ended, t);
        assert_eq!(*app.status(), Status::FeedEnded);
        assert!(app.hand().is_none());
        assert!(app.scene(t).cursor.is_none());
    }

    #[test]
    fn replay_source_requires_file() {
        let cfg = AppConfig::default();
        let kind = SourceKind::Replay(PathBuf::from("/nonexistent/session.ndjson"));
        assert!(matches!(build_source(&cfg, kind), Err(AppError::Open { .. })));
    }

    #[test]
    fn sim_source_hands_out_a_sender() {
        let cfg = AppConfig::default();
        let (_, tx) = build_source(&cfg, SourceKind::Sim).unwrap();
        assert!(tx.is_some());
        let (_, tx) = build_source(&cfg, SourceKind::Detector).unwrap();
        assert!(tx.is_none());
    }
}
