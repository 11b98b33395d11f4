//! # pinch_engine
//!
//! Turns per-frame hand landmarks into keyboard input.  The index fingertip
//! is a cursor over a static set of key rectangles; a thumb–index pinch
//! commits the hovered key.
//!
//! ## Per-frame flow
//!
//! | Step | Input | Result |
//! |---|---|---|
//! | Cursor | index tip `(x, y)` | `((1 − x)·W, y·H)` (selfie mirror) |
//! | Hover | cursor | first [`KeyRegion`] containing it; change → dwell timer restarts |
//! | Dwell | hover age ≥ 500 ms | [`EngineEvent::DwellReached`] once (visual only) |
//! | Pinch | thumb–index distance < 0.05 | open→closed edge + hovered key → one [`EngineEvent::KeyTriggered`] |
//!
//! State is explicit: [`InteractionEngine::update`] takes the previous
//! [`InteractionState`] by value and hands back the next one.
//!
//! ```rust
//! use std::time::Instant;
//! use pinch_engine::{InteractionEngine, InteractionState, KeyboardLayout, TextBuffer, Viewport};
//!
//! let viewport = Viewport::new(1280.0, 720.0);
//! let layout   = KeyboardLayout::standard(viewport);
//! let engine   = InteractionEngine::default();
//! let mut text = TextBuffer::new();
//!
//! let update = engine.update(InteractionState::default(), None, &layout, viewport, Instant::now());
//! for trigger in update.triggers() {
//!     text.apply(trigger.value);
//! }
//! assert!(update.cursor.is_none());
//! ```

pub mod engine;
pub mod geometry;
pub mod layout;
pub mod text;

pub use engine::{EngineConfig, EngineEvent, InteractionEngine, InteractionState, KeyTrigger, Update};
pub use geometry::{Point, Rect, Viewport};
pub use layout::{KeyId, KeyRegion, KeyValue, KeyboardLayout, STANDARD_ROWS};
pub use text::TextBuffer;
