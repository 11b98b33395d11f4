//! Newline-delimited JSON spoken by external detectors.
//!
//! One message per line.  A detector prints [`READY_LINE`] once the camera is
//! open, then one frame object per processed video frame.  A line carrying an
//! `"error"` key reports that the detector gave up (camera denied, model
//! missing, …).

use std::io::{BufRead, Lines};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hand::{DetectionFrame, FrameError, HandFrame, Handedness, Landmark};

/// Line a detector prints once it is streaming.
pub const READY_LINE: &str = "READY";

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed detector line: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid hand: {0}")]
    Frame(#[from] FrameError),

    #[error("detector line has neither \"hands\" nor \"error\"")]
    MissingHands,

    #[error("reading detector stream: {0}")]
    Io(#[from] std::io::Error),
}

// ════════════════════════════════════════════════════════════════════════════
// DetectorMessage
// ════════════════════════════════════════════════════════════════════════════

/// One decoded line of detector output.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectorMessage {
    /// The detector opened its camera and will stream frames.
    Ready,
    /// Result for one processed video frame (possibly with no hands).
    Frame(DetectionFrame),
    /// The detector reported a terminal failure.
    Fault(String),
}

// ── JSON shapes ───────────────────────────────────────────────────────────

fn full_score() -> f32 {
    1.0
}

#[derive(Serialize, Deserialize)]
struct HandJson {
    landmarks: Vec<Landmark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    handedness: Option<Handedness>,
    #[serde(default = "full_score")]
    score: f32,
}

#[derive(Deserialize)]
struct LineJson {
    #[serde(default)]
    hands: Option<Vec<HandJson>>,
    #[serde(default)]
    timestamp_ms: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
struct FrameOut {
    hands: Vec<HandJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_ms: Option<u64>,
}

// ════════════════════════════════════════════════════════════════════════════
// decode / encode
// ════════════════════════════════════════════════════════════════════════════

/// Decode one line of detector output.
pub fn decode_line(line: &str) -> Result<DetectorMessage, WireError> {
    let line = line.trim();
    if line == READY_LINE {
        return Ok(DetectorMessage::Ready);
    }

    let raw: LineJson = serde_json::from_str(line)?;
    if let Some(reason) = raw.error {
        return Ok(DetectorMessage::Fault(reason));
    }

    let hands = raw
        .hands
        .ok_or(WireError::MissingHands)?
        .into_iter()
        .map(|h| HandFrame::from_points(&h.landmarks, h.handedness, h.score))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DetectorMessage::Frame(DetectionFrame { hands, timestamp_ms: raw.timestamp_ms }))
}

/// Encode a frame as a single JSON line (no trailing newline).
pub fn encode_frame(frame: &DetectionFrame) -> Result<String, WireError> {
    let out = FrameOut {
        hands: frame
            .hands
            .iter()
            .map(|h| HandJson {
                landmarks: h.landmarks().to_vec(),
                handedness: h.handedness,
                score: h.score,
            })
            .collect(),
        timestamp_ms: frame.timestamp_ms,
    };
    Ok(serde_json::to_string(&out)?)
}

// ════════════════════════════════════════════════════════════════════════════
// FrameReader
// ════════════════════════════════════════════════════════════════════════════

/// Iterator over the messages in a detector stream.  Blank lines are skipped;
/// a malformed line yields an `Err` and the iterator keeps going.
pub struct FrameReader<R> {
    lines: Lines<R>,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        FrameReader { lines: reader.lines() }
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<DetectorMessage, WireError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(l) => l,
                Err(e) => return Some(Err(e.into())),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(decode_line(&line));
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{index, LANDMARK_COUNT};

    fn hand_json(n: usize) -> String {
        let pts: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"x":{:.2},"y":0.5,"z":0.0}}"#, i as f32 / 40.0))
            .collect();
        format!(r#"{{"landmarks":[{}],"handedness":"Right","score":0.92}}"#, pts.join(","))
    }

    #[test]
    fn ready_line() {
        assert_eq!(decode_line("READY\n").unwrap(), DetectorMessage::Ready);
    }

    #[test]
    fn error_line_is_fault() {
        let msg = decode_line(r#"{"error":"camera access denied"}"#).unwrap();
        assert_eq!(msg, DetectorMessage::Fault("camera access denied".into()));
    }

    #[test]
    fn frame_with_one_hand() {
        let line = format!(r#"{{"hands":[{}],"timestamp_ms":33}}"#, hand_json(LANDMARK_COUNT));
        let DetectorMessage::Frame(frame) = decode_line(&line).unwrap() else {
            panic!("expected a frame");
        };
        assert_eq!(frame.timestamp_ms, Some(33));
        let hand = frame.primary().unwrap();
        assert_eq!(hand.handedness, Some(Handedness::Right));
        assert!((hand.score - 0.92).abs() < 1e-6);
        assert!((hand.landmarks()[index::INDEX_TIP].x - 0.2).abs() < 1e-6);
    }

    #[test]
    fn empty_hands_is_a_frame() {
        let msg = decode_line(r#"{"hands":[]}"#).unwrap();
        assert_eq!(msg, DetectorMessage::Frame(DetectionFrame::empty()));
    }

    #[test]
    fn missing_z_and_score_default() {
        let pts: Vec<String> = (0..LANDMARK_COUNT).map(|_| r#"{"x":0.1,"y":0.2}"#.to_string()).collect();
        let line = format!(r#"{{"hands":[{{"landmarks":[{}]}}]}}"#, pts.join(","));
        let DetectorMessage::Frame(frame) = decode_line(&line).unwrap() else {
            panic!("expected a frame");
        };
        let hand = frame.primary().unwrap();
        assert_eq!(hand.score, 1.0);
        assert_eq!(hand.handedness, None);
        assert_eq!(hand.thumb_tip().z, 0.0);
    }

    #[test]
    fn short_hand_is_rejected() {
        let line = format!(r#"{{"hands":[{}]}}"#, hand_json(20));
        assert!(matches!(
            decode_line(&line),
            Err(WireError::Frame(FrameError::WrongLandmarkCount(20)))
        ));
    }

    #[test]
    fn object_without_hands_is_rejected() {
        assert!(matches!(decode_line(r#"{"fps":30}"#), Err(WireError::MissingHands)));
    }

    #[test]
    fn encoded_frame_decodes_to_same_hand() {
        let line = format!(r#"{{"hands":[{}]}}"#, hand_json(LANDMARK_COUNT));
        let DetectorMessage::Frame(frame) = decode_line(&line).unwrap() else {
            panic!("expected a frame");
        };
        let again = decode_line(&encode_frame(&frame).unwrap()).unwrap();
        assert_eq!(again, DetectorMessage::Frame(frame));
    }

    #[test]
    fn reader_skips_blanks_and_survives_garbage() {
        let stream = format!("READY\n\n{{not json\n{{\"hands\":[]}}\n{}\n", r#"{"error":"gone"}"#);
        let msgs: Vec<_> = FrameReader::new(stream.as_bytes()).collect();
        assert_eq!(msgs.len(), 4);
        assert!(matches!(msgs[0], Ok(DetectorMessage::Ready)));
        assert!(matches!(msgs[1], Err(WireError::Json(_))));
        assert!(matches!(msgs[2], Ok(DetectorMessage::Frame(_))));
        assert!(matches!(msgs[3], Ok(DetectorMessage::Fault(_))));
    }
}
