//! Landmark sources: external detector, NDJSON pipe, mouse simulation and
//! LeapMotion hardware.
//!
//! The public interface is [`SourceEvent`] delivered over a `mpsc` channel.
//! Consumers don't need to know whether frames came from a camera detector,
//! a recording, or the mouse.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use landmark_stream::{
    index, DetectionFrame, DetectorMessage, FrameReader, HandFrame, Handedness, Landmark,
    LANDMARK_COUNT,
};
use tracing::{debug, error, info, warn};

use crate::error::AppError;

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// The capture device is open and frames will follow.
    Acquired,
    /// One processed video frame, possibly with no hands.
    Frame(DetectionFrame),
    /// Capture could not start or was lost.  Nothing follows.
    Unavailable(String),
    /// The stream finished normally (end of a recording, pipe closed).
    Ended,
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait — unified interface for every capture backend
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SourceEvent`]s over a channel.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source(source: Box<dyn LandmarkSource>) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || source.run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Stream forwarding shared by DetectorProcess and PipeSource
// ════════════════════════════════════════════════════════════════════════════

/// Frame interval assumed for recordings without timestamps.
const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);
/// Longest pause honoured between recorded frames.
const MAX_REPLAY_GAP: Duration = Duration::from_secs(2);

struct ForwardOptions {
    min_confidence: f32,
    /// Drop frames until the detector prints `READY`.
    require_ready: bool,
    /// Sleep between frames to reproduce the recorded timing.
    paced: bool,
}

/// Pump detector lines into `tx` until EOF, a fault, or the receiver hangs up.
fn forward_stream<R: BufRead>(reader: R, tx: &Sender<SourceEvent>, opts: &ForwardOptions) {
    let mut acquired = false;
    let mut last_ts: Option<u64> = None;

    if !opts.require_ready {
        acquired = true;
        if tx.send(SourceEvent::Acquired).is_err() {
            return;
        }
    }

    for msg in FrameReader::new(reader) {
        let event = match msg {
            Ok(DetectorMessage::Ready) => {
                if acquired {
                    continue;
                }
                acquired = true;
                info!("detector ready");
                SourceEvent::Acquired
            }
            Ok(DetectorMessage::Frame(mut frame)) => {
                if !acquired {
                    warn!("frame before READY; ignoring");
                    continue;
                }
                if opts.paced {
                    thread::sleep(replay_gap(last_ts, frame.timestamp_ms));
                    last_ts = frame.timestamp_ms;
                }
                frame.retain_confident(opts.min_confidence);
                SourceEvent::Frame(frame)
            }
            Ok(DetectorMessage::Fault(reason)) => {
                error!(%reason, "detector fault");
                let _ = tx.send(SourceEvent::Unavailable(reason));
                return;
            }
            Err(e) => {
                warn!(error = %e, "skipping detector line");
                continue;
            }
        };
        if tx.send(event).is_err() {
            return;
        }
    }

    let last = if acquired {
        SourceEvent::Ended
    } else {
        SourceEvent::Unavailable("detector exited before the camera opened".to_string())
    };
    let _ = tx.send(last);
}

fn replay_gap(prev: Option<u64>, next: Option<u64>) -> Duration {
    match (prev, next) {
        (Some(a), Some(b)) => Duration::from_millis(b.saturating_sub(a)).min(MAX_REPLAY_GAP),
        (None, Some(_)) => Duration::ZERO,
        _ => DEFAULT_FRAME_INTERVAL,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectorProcess — external camera + hand-landmark model
// ════════════════════════════════════════════════════════════════════════════

/// Runs an external detector that owns the camera and prints landmark NDJSON.
///
/// Start-up is a handshake: the detector prints `READY` once the camera is
/// open.  Failing to spawn, an `{"error": …}` line, or EOF before `READY` all
/// end in [`SourceEvent::Unavailable`].  There is no retry.
pub struct DetectorProcess {
    pub command: String,
    pub args: Vec<String>,
    pub min_confidence: f32,
}

/// Kills the detector when the source thread exits.
struct ChildGuard(Child);

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

impl LandmarkSource for DetectorProcess {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        info!(command = %self.command, args = ?self.args, "starting hand detector");

        let mut child = match Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
        {
            Ok(c) => c,
            Err(e) => {
                error!(command = %self.command, error = %e, "failed to start detector");
                let _ = tx.send(SourceEvent::Unavailable(format!(
                    "cannot start {}: {}",
                    self.command, e
                )));
                return;
            }
        };

        let stdout = child.stdout.take();
        let guard = ChildGuard(child);
        let Some(stdout) = stdout else {
            let _ = tx.send(SourceEvent::Unavailable("detector stdout unavailable".into()));
            return;
        };

        let opts = ForwardOptions {
            min_confidence: self.min_confidence,
            require_ready: true,
            paced: false,
        };
        forward_stream(BufReader::new(stdout), &tx, &opts);
        drop(guard);
        debug!("detector stopped");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PipeSource — NDJSON from stdin or a recording
// ════════════════════════════════════════════════════════════════════════════

/// Reads detector NDJSON from an already-running pipe or a recorded file.
/// The `READY` line is optional here.
pub struct PipeSource {
    reader: Box<dyn BufRead + Send>,
    min_confidence: f32,
    paced: bool,
}

impl PipeSource {
    /// Live frames on stdin, forwarded as fast as they arrive.
    pub fn stdin(min_confidence: f32) -> Self {
        PipeSource {
            reader: Box::new(BufReader::new(std::io::stdin())),
            min_confidence,
            paced: false,
        }
    }

    /// A recording, replayed at its `timestamp_ms` pace (≈30 fps without).
    pub fn replay(path: &Path, min_confidence: f32) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|source| AppError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(PipeSource {
            reader: Box::new(BufReader::new(file)),
            min_confidence,
            paced: true,
        })
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R, min_confidence: f32) -> Self {
        PipeSource { reader: Box::new(reader), min_confidence, paced: false }
    }
}

impl LandmarkSource for PipeSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let opts = ForwardOptions {
            min_confidence: self.min_confidence,
            require_ready: false,
            paced: self.paced,
        };
        forward_stream(self.reader, &tx, &opts);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimSource — mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Source driven by [`SimInput`] events from the visualizer's window.
pub struct SimSource {
    pub rx: Receiver<SimInput>,
}

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Pointer at `(x, y)` in window-normalized units; `pinch` while the
    /// left button is held.
    Pointer { x: f32, y: f32, pinch: bool },
    /// Pointer outside the window.
    PointerLost,
    Quit,
}

impl LandmarkSource for SimSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        if tx.send(SourceEvent::Acquired).is_err() {
            return;
        }
        for input in self.rx {
            let event = match input {
                SimInput::Pointer { x, y, pinch } => match sim_hand(x, y, pinch) {
                    Some(hand) => SourceEvent::Frame(DetectionFrame::with_hand(hand)),
                    None => SourceEvent::Frame(DetectionFrame::empty()),
                },
                SimInput::PointerLost => SourceEvent::Frame(DetectionFrame::empty()),
                SimInput::Quit => {
                    let _ = tx.send(SourceEvent::Ended);
                    return;
                }
            };
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

// ── synthetic hand ────────────────────────────────────────────────────────

/// Landmark offsets from the index tip in camera-image units, open hand.
const SIM_SHAPE: [(f32, f32); LANDMARK_COUNT] = [
    (-0.020, 0.260), // wrist
    (0.030, 0.220),  // thumb
    (0.070, 0.170),
    (0.090, 0.110),
    (0.100, 0.060),
    (0.000, 0.120),  // index
    (0.000, 0.070),
    (0.000, 0.035),
    (0.000, 0.000),
    (-0.030, 0.120), // middle
    (-0.030, 0.065),
    (-0.030, 0.030),
    (-0.030, -0.005),
    (-0.055, 0.130), // ring
    (-0.055, 0.080),
    (-0.055, 0.050),
    (-0.055, 0.020),
    (-0.080, 0.150), // pinky
    (-0.080, 0.110),
    (-0.080, 0.085),
    (-0.080, 0.060),
];

/// Thumb IP and tip curled in to meet the index tip.
const SIM_PINCH_THUMB_IP: (f32, f32) = (0.050, 0.060);
const SIM_PINCH_THUMB_TIP: (f32, f32) = (0.012, 0.012);

/// Build a 21-point hand whose index tip, once mirrored, sits at window
/// position `(x, y)`.  `None` for non-finite input.
pub fn sim_hand(x: f32, y: f32, pinch: bool) -> Option<HandFrame> {
    let tip_x = 1.0 - x;
    let mut points = [Landmark::default(); LANDMARK_COUNT];
    for (i, (dx, dy)) in SIM_SHAPE.iter().enumerate() {
        points[i] = Landmark::new(tip_x + dx, y + dy, 0.0);
    }
    if pinch {
        let (ix, iy) = SIM_PINCH_THUMB_IP;
        let (tx, ty) = SIM_PINCH_THUMB_TIP;
        points[index::THUMB_IP] = Landmark::new(tip_x + ix, y + iy, 0.0);
        points[index::THUMB_TIP] = Landmark::new(tip_x + tx, y + ty, 0.0);
    }
    HandFrame::from_points(&points, Some(Handedness::Right), 1.0).ok()
}

// ════════════════════════════════════════════════════════════════════════════
// LeapSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Joint positions (millimetres, y up from the device) are mapped onto the
/// 21-point layout and scaled into the unit square, x flipped so that the
/// downstream mirror yields natural motion.
#[cfg(feature = "leap")]
pub struct LeapSource;

#[cfg(feature = "leap")]
const LEAP_X_RANGE_MM: (f32, f32) = (-150.0, 150.0);
#[cfg(feature = "leap")]
const LEAP_Y_RANGE_MM: (f32, f32) = (100.0, 400.0);
#[cfg(feature = "leap")]
const LEAP_Z_SCALE_MM: f32 = 300.0;

#[cfg(feature = "leap")]
impl LandmarkSource for LeapSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(SourceEvent::Unavailable(format!("LeapC connection: {:?}", e)));
                return;
            }
        };
        if let Err(e) = connection.open() {
            let _ = tx.send(SourceEvent::Unavailable(format!("LeapMotion device: {:?}", e)));
            return;
        }

        let mut acquired = false;
        loop {
            let msg = match connection.poll(100) {
                Ok(m) => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                if !acquired {
                    acquired = true;
                    info!("LeapMotion tracking");
                    if tx.send(SourceEvent::Acquired).is_err() {
                        return;
                    }
                }
                let hands: Vec<HandFrame> = frame.hands().filter_map(|h| leap_hand(&h)).collect();
                let event = SourceEvent::Frame(DetectionFrame { hands, timestamp_ms: None });
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(feature = "leap")]
fn leap_hand(hand: &leaprs::Hand) -> Option<HandFrame> {
    let fingers: Vec<_> = hand.digits().collect();
    if fingers.len() < 5 {
        return None;
    }

    let wrist = fingers[1].metacarpal().prev_joint();
    let mut points = Vec::with_capacity(LANDMARK_COUNT);
    points.push(leap_point(wrist.x, wrist.y, wrist.z));
    for digit in &fingers {
        // MediaPipe orders each finger base → tip; the thumb's Leap
        // metacarpal is zero-length so its base joint stands in for the CMC.
        for joint in [
            digit.proximal().prev_joint(),
            digit.intermediate().prev_joint(),
            digit.distal().prev_joint(),
            digit.distal().next_joint(),
        ] {
            points.push(leap_point(joint.x, joint.y, joint.z));
        }
    }

    let handedness = match hand.hand_type() {
        leaprs::HandType::Left => Handedness::Left,
        _ => Handedness::Right,
    };
    HandFrame::from_points(&points, Some(handedness), 1.0).ok()
}

#[cfg(feature = "leap")]
fn leap_point(x: f32, y: f32, z: f32) -> Landmark {
    let (x0, x1) = LEAP_X_RANGE_MM;
    let (y0, y1) = LEAP_Y_RANGE_MM;
    Landmark::new(
        1.0 - (x - x0) / (x1 - x0),
        1.0 - (y - y0) / (y1 - y0),
        z / LEAP_Z_SCALE_MM,
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
