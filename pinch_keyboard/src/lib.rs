//! # pinch_keyboard
//!
//! Touch-free on-screen keyboard.  A hand detector reports landmarks each
//! video frame; the index fingertip becomes a mirrored cursor over the
//! keys, and a thumb–index pinch types the key under it.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Move index finger | Cursor follows (mirrored); key under it highlights, hover tone |
//! | Hold over a key | Dwell bar fills (never types on its own) |
//! | Pinch thumb + index | Type the hovered key once: press pulse, particle burst, press tone |
//! | Keep pinching | Nothing more until the fingers open again |
//! | Pinch over `BACK` / `SPACE` | Delete last character / type a space |
//!
//! ## Landmark sources
//!
//! * `detector` (default) — spawns the configured detector command, which
//!   owns the camera and writes NDJSON (see `landmark_stream`).
//! * `stdin` — detector NDJSON piped in.
//! * `replay` — a recorded NDJSON session, at its own pace.
//! * `sim` — **Simulation mode**: the mouse drives a synthetic hand.
//! * `leap` — **Hardware mode** (feature `leap`): a LeapMotion controller
//!   via LeapC.
//!
//! ### Simulation controls
//!
//! | Input | Gesture |
//! |---|---|
//! | Mouse position | Index fingertip |
//! | Left button held | Pinch |
//! | Mouse leaves window | Hand lost |
//! | `Escape` | Quit |

pub mod config;
pub mod error;
pub mod source;
pub mod cues;
pub mod effects;
pub mod status;
pub mod visualizer;
pub mod app;
