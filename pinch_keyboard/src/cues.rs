//! Audio feedback: short tones on hover and on key press.
//!
//! Tones are voiced on a MIDI output so any General MIDI synth can play
//! them.  Each cue is a note-on followed by a note-off after the tone's
//! duration; cues may overlap.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::AudioConfig;

// ════════════════════════════════════════════════════════════════════════════
// Cue / Tone
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Cursor entered a key.
    Hover,
    /// A key was committed.
    Press,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
}

impl Waveform {
    /// General MIDI program with the closest timbre.
    pub fn program(self) -> u8 {
        match self {
            Waveform::Sine   => 79,  // Ocarina
            Waveform::Square => 80,  // Lead 1 (Square)
        }
    }

    /// Channel offset, so both timbres can sound at once.
    fn channel_offset(self) -> u8 {
        match self {
            Waveform::Sine   => 0,
            Waveform::Square => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub waveform:     Waveform,
    /// Linear gain, 0.0–1.0.
    pub gain:         f32,
    pub duration:     Duration,
}

impl Cue {
    pub fn tone(self) -> Tone {
        match self {
            Cue::Hover => Tone {
                frequency_hz: 400.0,
                waveform:     Waveform::Sine,
                gain:         0.05,
                duration:     Duration::from_millis(100),
            },
            Cue::Press => Tone {
                frequency_hz: 600.0,
                waveform:     Waveform::Square,
                gain:         0.1,
                duration:     Duration::from_millis(150),
            },
        }
    }
}

impl Tone {
    /// Nearest MIDI note (A4 = 440 Hz = 69).
    pub fn midi_note(&self) -> u8 {
        freq_to_midi(self.frequency_hz)
    }

    /// MIDI velocity; a gain of 0.1 maps to 100.
    pub fn velocity(&self) -> u8 {
        (self.gain * 1000.0).round().clamp(1.0, 127.0) as u8
    }
}

pub fn freq_to_midi(hz: f32) -> u8 {
    if !(hz > 0.0) {
        return 0;
    }
    (69.0 + 12.0 * (hz / 440.0).log2()).round().clamp(0.0, 127.0) as u8
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

pub(crate) trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self,  channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note, velocity]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note, 0]);
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

struct NullOut;
impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8)   {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8)  {}
    fn note_off(&mut self, _ch: u8, _n: u8)          {}
}

/// Open the output port matching `hint`, else the first softsynth-looking
/// port, else the first port.  Falls back to `NullOut` with a warning.
fn open_midi_output(hint: Option<&str>) -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("pinch_keyboard_cues") {
        Ok(m)  => m,
        Err(e) => {
            warn!(error = %e, "MIDI init failed; cues muted");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports; cues muted (try `timidity -iA` or `fluidsynth`)");
        return Box::new(NullOut);
    }

    let names: Vec<String> = ports
        .iter()
        .map(|p| midi_out.port_name(p).unwrap_or_default().to_lowercase())
        .collect();

    let by_hint = hint.and_then(|h| {
        let h = h.to_lowercase();
        names.iter().position(|n| n.contains(&h))
    });
    if let (Some(h), None) = (hint, by_hint) {
        warn!(hint = h, "no MIDI port matches hint");
    }
    let port_idx = by_hint
        .or_else(|| {
            names.iter().position(|n| {
                n.contains("fluid") || n.contains("timidity") ||
                n.contains("microsoft") || n.contains("gm") ||
                n.contains("synth")
            })
        })
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".to_string());
    info!(port = %name, "opening MIDI port");

    match midi_out.connect(port, "pinch-cues") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            warn!(error = %e, "MIDI connect failed; cues muted");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CuePlayer — handle to the cue thread
// ════════════════════════════════════════════════════════════════════════════

enum CueCommand {
    Play(Cue),
    Quit,
}

/// Plays cues without blocking the render loop.  Dropping the player
/// silences any sounding notes and joins the thread.
pub struct CuePlayer {
    tx:     Option<Sender<CueCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl CuePlayer {
    /// Open the configured MIDI output on a background thread.
    pub fn spawn(cfg: &AudioConfig) -> Self {
        if !cfg.enabled {
            info!("audio cues disabled");
            return CuePlayer::muted();
        }
        let hint = cfg.port_hint.clone();
        let channel = cfg.channel;
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let out = open_midi_output(hint.as_deref());
            cue_thread(out, channel, rx);
        });
        CuePlayer { tx: Some(tx), handle: Some(handle) }
    }

    /// A player that discards every cue.
    pub fn muted() -> Self {
        CuePlayer { tx: None, handle: None }
    }

    pub(crate) fn with_output(out: Box<dyn MidiOut>, channel: u8) -> Self {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || cue_thread(out, channel, rx));
        CuePlayer { tx: Some(tx), handle: Some(handle) }
    }

    pub fn play(&self, cue: Cue) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(CueCommand::Play(cue));
        }
    }

    pub fn is_muted(&self) -> bool {
        self.tx.is_none()
    }
}

impl Drop for CuePlayer {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(CueCommand::Quit);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// cue_thread — the actual loop
// ════════════════════════════════════════════════════════════════════════════

/// A sounding note and when to release it.
struct Voice {
    release_at: Instant,
    channel:    u8,
    note:       u8,
}

fn cue_thread(mut midi: Box<dyn MidiOut>, base_channel: u8, rx: Receiver<CueCommand>) {
    for w in [Waveform::Sine, Waveform::Square] {
        midi.program_change(base_channel + w.channel_offset(), w.program());
    }

    let mut voices: Vec<Voice> = Vec::new();

    loop {
        // ── wait for a command or the next release ───────────────────────
        let next_release = voices.iter().map(|v| v.release_at).min();
        let cmd = match next_release {
            Some(at) => rx.recv_timeout(at.saturating_duration_since(Instant::now())),
            None     => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match cmd {
            Ok(CueCommand::Play(cue)) => {
                let tone    = cue.tone();
                let channel = base_channel + tone.waveform.channel_offset();
                let note    = tone.midi_note();
                debug!(?cue, note, "cue");
                midi.note_on(channel, note, tone.velocity());
                voices.push(Voice { release_at: Instant::now() + tone.duration, channel, note });
            }
            Ok(CueCommand::Quit) | Err(RecvTimeoutError::Disconnected) => {
                for v in voices.drain(..) {
                    midi.note_off(v.channel, v.note);
                }
                return;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        // ── release expired notes ────────────────────────────────────────
        let now = Instant::now();
        voices.retain(|v| {
            if v.release_at <= now {
                midi.note_off(v.channel, v.note);
                false
            } else {
                true
            }
        });
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
