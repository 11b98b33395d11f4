//! # landmark_stream
//!
//! Per-frame hand landmarks as produced by an external hand detector, and the
//! newline-delimited JSON stream such detectors write on their stdout.
//!
//! A detector owns the camera.  Every processed video frame becomes one JSON
//! line listing the detected hands, each an ordered set of 21 normalized
//! `(x, y, z)` points in the MediaPipe hand-landmark convention:
//!
//! ```text
//! READY
//! {"hands":[{"landmarks":[{"x":0.51,"y":0.72,"z":0.0}, … 21 points],"handedness":"Right","score":0.93}],"timestamp_ms":33}
//! {"hands":[]}
//! {"error":"camera access denied"}
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::io::BufReader;
//! use landmark_stream::{DetectorMessage, FrameReader};
//!
//! let stdin = BufReader::new(std::io::stdin());
//! for msg in FrameReader::new(stdin) {
//!     if let Ok(DetectorMessage::Frame(frame)) = msg {
//!         if let Some(hand) = frame.primary() {
//!             println!("pinch distance {:.3}", hand.pinch_distance());
//!         }
//!     }
//! }
//! ```

pub mod hand;
pub mod wire;

pub use hand::{
    index, DetectionFrame, FrameError, HandFrame, Handedness, Landmark, HAND_CONNECTIONS,
    LANDMARK_COUNT,
};
pub use wire::{decode_line, encode_frame, DetectorMessage, FrameReader, WireError, READY_LINE};
