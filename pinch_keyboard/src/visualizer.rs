//! Software-rendered HUD using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ status line                                                  │
//! │            ┌───────────────────────────────────┐             │
//! │            │ typed text_                       │             │
//! │            └───────────────────────────────────┘             │
//! │                    hand skeleton + cursor ring               │
//! │   ┌─┐┌─┐┌─┐┌─┐┌─┐┌─┐┌─┐┌─┐┌─┐┌─┐                             │
//! │   └─┘└─┘└─┘└─┘└─┘└─┘└─┘└─┘└─┘└─┘   five key rows             │
//! │      ┌──────────────────┐┌─────┐                             │
//! │      └──────────────────┘└─────┘   SPACE / BACK              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Drawing goes to a [`Canvas`] so the scene can be rendered without a
//! window.

use std::sync::mpsc::Sender;
use std::time::Instant;

use landmark_stream::{HandFrame, HAND_CONNECTIONS};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use pinch_engine::{KeyId, KeyboardLayout, Point, Viewport};

use crate::config::WindowConfig;
use crate::effects::ParticleBurst;
use crate::error::AppError;
use crate::source::SimInput;
use crate::status::Status;

// ════════════════════════════════════════════════════════════════════════════
// Palette / layout constants
// ════════════════════════════════════════════════════════════════════════════

pub mod palette {
    pub const BG:        u32 = 0xFF05050F;
    pub const CYAN:      u32 = 0xFF00F3FF;
    pub const PURPLE:    u32 = 0xFFBC13FE;
    pub const RED:       u32 = 0xFFFF3B3B;
    pub const DIM:       u32 = 0xFF80808A;
    pub const TEXT:      u32 = 0xFFEEEEEE;
    pub const KEY_IDLE:  u32 = 0xFF101028;
    pub const KEY_EDGE:  u32 = 0xFF2A4A66;
    pub const TEXT_BG:   u32 = 0xFF0B0B1E;
}

const STATUS_SCALE:   usize = 2;
const DETAIL_SCALE:   usize = 1;
const TEXT_SCALE:     usize = 4;
const KEY_SCALE:      usize = 4;
const MARGIN:         usize = 16;
const TEXT_BOX_Y:     usize = 48;
const TEXT_BOX_H:     usize = 20 + 5 * TEXT_SCALE;
const DWELL_BAR_H:    usize = 4;
const CURSOR_RADIUS:  f32   = 15.0;
const CURSOR_RING:    f32   = 3.0;
const JOINT_RADIUS:   f32   = 4.0;
const HOVER_TINT:     f32   = 0.35;

// ════════════════════════════════════════════════════════════════════════════
// Scene — everything one frame draws
// ════════════════════════════════════════════════════════════════════════════

pub struct Scene<'a> {
    pub layout:   &'a KeyboardLayout,
    pub hovered:  Option<KeyId>,
    /// Hover dwell, 0.0–1.0.
    pub dwell:    f32,
    pub pressed:  Vec<KeyId>,
    pub hand:     Option<&'a HandFrame>,
    pub mirror:   bool,
    pub cursor:   Option<Point>,
    pub pinching: bool,
    pub text:     &'a str,
    pub status:   &'a Status,
    pub bursts:   &'a [ParticleBurst],
    pub now:      Instant,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer — window + input
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    /// Present only in simulation mode.
    sim_tx: Option<Sender<SimInput>>,
}

impl Visualizer {
    pub fn new(cfg: &WindowConfig, sim_tx: Option<Sender<SimInput>>) -> Result<Self, AppError> {
        let mut window = Window::new(
            &cfg.title,
            cfg.width, cfg.height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        window.set_target_fps(cfg.fps as usize);

        Ok(Visualizer {
            window,
            canvas: Canvas::new(cfg.width, cfg.height),
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.canvas.width as f32, self.canvas.height as f32)
    }

    /// Poll the window.  Returns false when the app should quit.
    ///
    /// In simulation mode the mouse is forwarded as a [`SimInput`] each
    /// frame: position is the index tip, the left button is the pinch.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() || self.window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            if let Some(tx) = &self.sim_tx {
                let _ = tx.send(SimInput::Quit);
            }
            return false;
        }

        if let Some(tx) = &self.sim_tx {
            let input = match self.window.get_mouse_pos(MouseMode::Discard) {
                Some((x, y)) => SimInput::Pointer {
                    x:     x / self.canvas.width as f32,
                    y:     y / self.canvas.height as f32,
                    pinch: self.window.get_mouse_down(MouseButton::Left),
                },
                None => SimInput::PointerLost,
            };
            let _ = tx.send(input);
        }
        true
    }

    pub fn render(&mut self, scene: &Scene<'_>) -> Result<(), AppError> {
        draw_scene(&mut self.canvas, scene);
        self.window
            .update_with_buffer(&self.canvas.buf, self.canvas.width, self.canvas.height)
            .map_err(|e| AppError::Window(e.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// draw_scene
// ════════════════════════════════════════════════════════════════════════════

pub fn draw_scene(c: &mut Canvas, scene: &Scene<'_>) {
    c.buf.fill(palette::BG);

    // ── Status ────────────────────────────────────────────────────────────
    c.draw_label(scene.status.message(), MARGIN, MARGIN, STATUS_SCALE, scene.status.color());
    if let Some(detail) = scene.status.detail() {
        c.draw_label(detail, MARGIN, MARGIN + 7 * STATUS_SCALE, DETAIL_SCALE, palette::DIM);
    }

    // ── Text buffer ───────────────────────────────────────────────────────
    draw_text_box(c, scene.text);

    // ── Keys ──────────────────────────────────────────────────────────────
    for region in scene.layout.regions() {
        let r = region.rect;
        let (x, y, w, h) = (r.x as usize, r.y as usize, r.w as usize, r.h as usize);
        let hovered = scene.hovered == Some(region.id);
        let pressed = scene.pressed.contains(&region.id);

        let (fill, edge, ink) = if pressed {
            (palette::PURPLE, palette::TEXT, palette::TEXT)
        } else if hovered {
            (blend(palette::KEY_IDLE, palette::CYAN, HOVER_TINT), palette::CYAN, palette::TEXT)
        } else {
            (palette::KEY_IDLE, palette::KEY_EDGE, palette::CYAN)
        };
        c.fill_rect(x, y, w, h, fill);
        c.draw_border(x, y, w, h, edge);

        let label_w = text_width(&region.glyph, KEY_SCALE);
        let lx = x + w.saturating_sub(label_w) / 2;
        let ly = y + h.saturating_sub(5 * KEY_SCALE) / 2;
        c.draw_label(&region.glyph, lx, ly, KEY_SCALE, ink);

        if hovered && scene.dwell > 0.0 {
            let bar_w = (w as f32 * scene.dwell) as usize;
            c.fill_rect(x, (y + h).saturating_sub(DWELL_BAR_H), bar_w, DWELL_BAR_H, palette::CYAN);
        }
    }

    // ── Hand skeleton ─────────────────────────────────────────────────────
    if let Some(hand) = scene.hand {
        let vw = c.width as f32;
        let vh = c.height as f32;
        let to_screen = |i: usize| {
            let p = hand.landmarks()[i];
            let x = if scene.mirror { 1.0 - p.x } else { p.x };
            (x * vw, p.y * vh)
        };
        for &(a, b) in HAND_CONNECTIONS.iter() {
            c.draw_line(to_screen(a), to_screen(b), palette::CYAN);
        }
        for i in 0..hand.landmarks().len() {
            let (x, y) = to_screen(i);
            c.fill_circle(x, y, JOINT_RADIUS, palette::PURPLE, 1.0);
        }
    }

    // ── Particles ─────────────────────────────────────────────────────────
    for burst in scene.bursts {
        for s in burst.sprites(scene.now) {
            c.fill_circle(s.center.x, s.center.y, s.radius, s.color, s.opacity);
        }
    }

    // ── Cursor ────────────────────────────────────────────────────────────
    if let Some(p) = scene.cursor {
        if scene.pinching {
            c.fill_circle(p.x, p.y, CURSOR_RADIUS * 0.5, palette::PURPLE, 1.0);
        } else {
            c.draw_ring(p.x, p.y, CURSOR_RADIUS, CURSOR_RING, palette::CYAN);
        }
    }
}

fn draw_text_box(c: &mut Canvas, text: &str) {
    let box_w = c.width.saturating_sub(2 * MARGIN * 4);
    let box_x = (c.width - box_w) / 2;
    c.fill_rect(box_x, TEXT_BOX_Y, box_w, TEXT_BOX_H, palette::TEXT_BG);
    c.draw_border(box_x, TEXT_BOX_Y, box_w, TEXT_BOX_H, palette::CYAN);

    // Show the tail that fits, followed by the caret.
    let advance = 4 * TEXT_SCALE;
    let fits = (box_w.saturating_sub(2 * MARGIN) / advance).saturating_sub(1);
    let count = text.chars().count();
    let shown: String = text.chars().skip(count.saturating_sub(fits)).chain(['_']).collect();
    c.draw_label(&shown, box_x + MARGIN, TEXT_BOX_Y + 10, TEXT_SCALE, palette::TEXT);
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — primitive drawing helpers
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub width:  usize,
    pub height: usize,
    pub buf:    Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buf: vec![palette::BG; width * height] }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(self.height) {
            for col in x..(x+w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(self.width) {
            self.set_pixel(col as isize, y as isize, color);
            self.set_pixel(col as isize, (y+h-1) as isize, color);
        }
        for row in y..(y+h).min(self.height) {
            self.set_pixel(x as isize, row as isize, color);
            self.set_pixel((x+w-1) as isize, row as isize, color);
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    fn blend_pixel(&mut self, x: isize, y: isize, color: u32, alpha: f32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let i = y as usize * self.width + x as usize;
            self.buf[i] = blend(self.buf[i], color, alpha);
        }
    }

    /// Two-pixel-wide Bresenham line, clipped to the canvas first.
    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: u32) {
        let bounds = (-1.0, -1.0, self.width as f32, self.height as f32);
        let Some((from, to)) = clip_segment(from, to, bounds) else { return };
        let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
        let (x1, y1) = (to.0 as isize, to.1 as isize);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x0, y0, color);
            self.set_pixel(x0 + 1, y0, color);
            self.set_pixel(x0, y0 + 1, color);
            if x0 == x1 && y0 == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x0 += sx; }
            if e2 <= dx { err += dx; y0 += sy; }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: u32, alpha: f32) {
        if r <= 0.0 || alpha <= 0.0 { return; }
        self.for_disc(cx, cy, r, |c, x, y, d2| {
            if d2 <= r * r { c.blend_pixel(x, y, color, alpha); }
        });
    }

    fn draw_ring(&mut self, cx: f32, cy: f32, r: f32, thickness: f32, color: u32) {
        let inner = (r - thickness).max(0.0);
        self.for_disc(cx, cy, r, |c, x, y, d2| {
            if d2 <= r * r && d2 >= inner * inner { c.set_pixel(x, y, color); }
        });
    }

    /// Visit every pixel in the bounding square of a disc with its squared
    /// distance from the centre.
    fn for_disc<F>(&mut self, cx: f32, cy: f32, r: f32, mut f: F)
    where
        F: FnMut(&mut Canvas, isize, isize, f32),
    {
        let x0 = ((cx - r).floor() as isize).max(0);
        let x1 = ((cx + r).ceil() as isize).min(self.width as isize - 1);
        let y0 = ((cy - r).floor() as isize).max(0);
        let y1 = ((cy + r).ceil() as isize).min(self.height as isize - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                f(self, x, y, dx * dx + dy * dy);
            }
        }
    }

    /// Minimal bitmap font — 3×5 glyphs, each pixel drawn `scale`×`scale`.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            if cx + 3 * scale > self.width { break; }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
        }
    }
}

fn text_width(text: &str, scale: usize) -> usize {
    let n = text.chars().count();
    if n == 0 { 0 } else { n * 4 * scale - scale }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ';' => [0b000, 0b010, 0b000, 0b010, 0b100],
        '?' => [0b111, 0b001, 0b010, 0b000, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '⌫' => [0b001, 0b011, 0b111, 0b011, 0b001],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Liang–Barsky clip of a segment against `(min_x, min_y, max_x, max_y)`.
/// `None` when the segment misses the box or has a non-finite endpoint.
/// Clipped ends land exactly on the boundary that cut them.
fn clip_segment(
    from: (f32, f32),
    to: (f32, f32),
    (min_x, min_y, max_x, max_y): (f32, f32, f32, f32),
) -> Option<((f32, f32), (f32, f32))> {
    if ![from.0, from.1, to.0, to.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let (mut start, mut end) = ((0.0f32, None), (1.0f32, None));
    for (p, q, edge) in [
        (-dx, from.0 - min_x, (true, min_x)),
        (dx, max_x - from.0, (true, max_x)),
        (-dy, from.1 - min_y, (false, min_y)),
        (dy, max_y - from.1, (false, max_y)),
    ] {
        if p == 0.0 {
            if q < 0.0 { return None; }
            continue;
        }
        let t = q / p;
        if p < 0.0 && t > start.0 {
            start = (t, Some(edge));
        } else if p > 0.0 && t < end.0 {
            end = (t, Some(edge));
        }
    }
    // Rounding on very long segments can leave the two cuts an ulp apart.
    if start.0 - end.0 > 1e-6 {
        return None;
    }
    let at = |(t, edge): (f32, Option<(bool, f32)>)| {
        let x = (from.0 + t * dx).clamp(min_x, max_x);
        let y = (from.1 + t * dy).clamp(min_y, max_y);
        match edge {
            Some((true, bx))  => (bx, y),
            Some((false, by)) => (x, by),
            None              => (x, y),
        }
    };
    Some((at(start), at(end)))
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sim_hand;

    const W: usize = 640;
    const H: usize = 400;

    fn layout() -> KeyboardLayout {
        KeyboardLayout::standard(Viewport::new(W as f32, H as f32))
    }

    fn scene<'a>(layout: &'a KeyboardLayout, status: &'a Status) -> Scene<'a> {
        Scene {
            layout,
            hovered:  None,
            dwell:    0.0,
            pressed:  Vec::new(),
            hand:     None,
            mirror:   true,
            cursor:   None,
            pinching: false,
            text:     "",
            status,
            bursts:   &[],
            now:      Instant::now(),
        }
    }

    fn key_center(layout: &KeyboardLayout, label: &str) -> (usize, usize) {
        let r = layout.find(label).unwrap().rect;
        // top-left inner pixel, clear of the border and glyph
        (r.x as usize + 2, r.y as usize + 2)
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn idle_hovered_and_pressed_keys_differ() {
        let l = layout();
        let status = Status::Tracking;
        let mut s = scene(&l, &status);
        let a = l.find("A").unwrap().id;
        let b = l.find("B").unwrap().id;
        s.hovered = Some(a);
        s.pressed = vec![b];

        let mut c = Canvas::new(W, H);
        draw_scene(&mut c, &s);
        let (ax, ay) = key_center(&l, "A");
        let (bx, by) = key_center(&l, "B");
        let (zx, zy) = key_center(&l, "Z");
        assert_eq!(c.pixel(bx, by), Some(palette::PURPLE));
        assert_eq!(c.pixel(zx, zy), Some(palette::KEY_IDLE));
        assert_ne!(c.pixel(ax, ay), Some(palette::KEY_IDLE));
        assert_ne!(c.pixel(ax, ay), Some(palette::PURPLE));
    }

    #[test]
    fn dwell_bar_grows_from_left() {
        let l = layout();
        let status = Status::Tracking;
        let mut s = scene(&l, &status);
        let region = l.find("G").unwrap();
        s.hovered = Some(region.id);
        s.dwell = 0.5;

        let mut c = Canvas::new(W, H);
        draw_scene(&mut c, &s);
        let r = region.rect;
        let y = (r.y + r.h) as usize - 2;
        assert_eq!(c.pixel(r.x as usize + 2, y), Some(palette::CYAN));
        assert_ne!(c.pixel((r.x + r.w) as usize - 3, y), Some(palette::CYAN));
    }

    #[test]
    fn cursor_ring_and_pinch_dot() {
        let l = layout();
        let status = Status::Tracking;
        let mut s = scene(&l, &status);
        s.cursor = Some(Point::new(300.0, 30.0));

        let mut c = Canvas::new(W, H);
        draw_scene(&mut c, &s);
        assert_eq!(c.pixel(300, 30), Some(palette::BG), "ring is hollow");
        assert_eq!(c.pixel(300 + 13, 30), Some(palette::CYAN));

        s.pinching = true;
        draw_scene(&mut c, &s);
        assert_eq!(c.pixel(300, 30), Some(palette::PURPLE));
        assert_eq!(c.pixel(300 + 13, 30), Some(palette::BG));
    }

    #[test]
    fn skeleton_joints_drawn_mirrored() {
        let l = layout();
        let status = Status::Tracking;
        let hand = sim_hand(0.5, 0.2, false).unwrap();
        let mut s = scene(&l, &status);
        s.hand = Some(&hand);

        let mut c = Canvas::new(W, H);
        draw_scene(&mut c, &s);
        let tip = hand.index_tip();
        let x = ((1.0 - tip.x) * W as f32) as usize;
        let y = (tip.y * H as f32) as usize;
        assert_eq!(c.pixel(x, y), Some(palette::PURPLE));
    }

    #[test]
    fn status_drawn_in_its_color() {
        let l = layout();
        let status = Status::CameraDenied("no camera".into());
        let s = scene(&l, &status);
        let mut c = Canvas::new(W, H);
        draw_scene(&mut c, &s);
        // first column of "E" in "Error" is fully lit
        assert_eq!(c.pixel(MARGIN, MARGIN), Some(palette::RED));
    }

    #[test]
    fn label_clipped_at_edge() {
        let mut c = Canvas::new(20, 10);
        c.draw_label("WWWWWWWW", 0, 0, 1, palette::TEXT);
        c.fill_circle(-5.0, -5.0, 3.0, palette::TEXT, 1.0);
        c.draw_line((-10.0, -10.0), (30.0, 30.0), palette::TEXT);
    }

    #[test]
    fn far_off_landmarks_are_clipped() {
        use landmark_stream::{Landmark, LANDMARK_COUNT};
        let l = layout();
        let status = Status::Tracking;
        let mut pts = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        pts[0] = Landmark::new(-1e30, 0.5, 0.0);
        pts[1] = Landmark::new(1e30, 0.5, 0.0);
        pts[2] = Landmark::new(1e6, -1e6, 0.0);
        let hand = HandFrame::from_points(&pts, None, 1.0).unwrap();
        let mut s = scene(&l, &status);
        s.hand = Some(&hand);

        let mut c = Canvas::new(W, H);
        draw_scene(&mut c, &s);
        // Wrist-to-thumb connector crosses the whole canvas at mid height.
        assert_eq!(c.pixel(W / 4, H / 2), Some(palette::CYAN));
    }

    #[test]
    fn clip_segment_trims_to_box() {
        let b = (0.0, 0.0, 10.0, 10.0);
        assert_eq!(clip_segment((-10.0, 5.0), (20.0, 5.0), b), Some(((0.0, 5.0), (10.0, 5.0))));
        assert_eq!(clip_segment((-10.0, -5.0), (20.0, -5.0), b), None);
        assert_eq!(clip_segment((f32::MAX, 0.0), (f32::INFINITY, 0.0), b), None);
        assert_eq!(clip_segment((2.0, 3.0), (4.0, 5.0), b), Some(((2.0, 3.0), (4.0, 5.0))));
    }

    #[test]
    fn every_key_glyph_is_in_the_font() {
        let fallback = char_glyph('\u{1}');
        for region in layout().regions() {
            for ch in region.glyph.chars() {
                assert_ne!(char_glyph(ch), fallback, "missing glyph {:?}", ch);
            }
        }
    }
}
