//! Press feedback: the key pulse and the particle burst.
//!
//! Both are presentation only.  They are created when a key is committed
//! and expire on their own; nothing here touches the text buffer.

use std::f32::consts::TAU;
use std::time::{Duration, Instant};

use pinch_engine::{KeyId, Point, Rect};

use crate::config::EffectsConfig;

// ════════════════════════════════════════════════════════════════════════════
// Color — HSL → ARGB
// ════════════════════════════════════════════════════════════════════════════

/// Particle hue range in degrees (violet to magenta).
const HUE_RANGE:      (f32, f32) = (260.0, 320.0);
const SIZE_RANGE:     (f32, f32) = (4.0, 10.0);
/// Total travel of a particle over its lifetime, in pixels.
const TRAVEL_RANGE:   (f32, f32) = (50.0, 200.0);
const PARTICLE_SAT:   f32 = 1.0;
const PARTICLE_LIGHT: f32 = 0.5;

/// Convert HSL → packed ARGB (0xAARRGGBB, A=0xFF).
pub fn hsl_to_argb(h: f32, s: f32, l: f32) -> u32 {
    let h  = h.rem_euclid(360.0);
    let s  = s.clamp(0.0, 1.0);
    let l  = l.clamp(0.0, 1.0);
    let c  = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x  = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m  = l - c / 2.0;
    let ri = ((r + m) * 255.0).round() as u32;
    let gi = ((g + m) * 255.0).round() as u32;
    let bi = ((b + m) * 255.0).round() as u32;
    0xFF000000 | (ri << 16) | (gi << 8) | bi
}

/// Fast start, long settle.
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(4)
}

// ════════════════════════════════════════════════════════════════════════════
// PressPulse
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressPulse {
    pub key:   KeyId,
    pub until: Instant,
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleBurst
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Unit direction times total travel.
    pub travel: (f32, f32),
    pub size:   f32,
    pub color:  u32,
}

/// Where a particle is drawn at some point in its life.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSprite {
    pub center:  Point,
    pub radius:  f32,
    /// 1.0 at birth, 0.0 when gone.
    pub opacity: f32,
    pub color:   u32,
}

#[derive(Clone, Debug)]
pub struct ParticleBurst {
    pub origin:    Point,
    pub born:      Instant,
    pub lifetime:  Duration,
    pub particles: Vec<Particle>,
}

impl ParticleBurst {
    pub fn new(
        origin:   Point,
        count:    usize,
        lifetime: Duration,
        now:      Instant,
        rng:      &mut fastrand::Rng,
    ) -> Self {
        let particles = (0..count)
            .map(|_| {
                let angle    = rng.f32() * TAU;
                let distance = lerp(TRAVEL_RANGE, rng.f32());
                let hue      = lerp(HUE_RANGE, rng.f32());
                Particle {
                    travel: (angle.cos() * distance, angle.sin() * distance),
                    size:   lerp(SIZE_RANGE, rng.f32()),
                    color:  hsl_to_argb(hue, PARTICLE_SAT, PARTICLE_LIGHT),
                }
            })
            .collect();
        ParticleBurst { origin, born: now, lifetime, particles }
    }

    /// Age as a fraction of the lifetime, clamped to `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.lifetime.is_zero() {
            return 1.0;
        }
        let age = now.saturating_duration_since(self.born);
        (age.as_secs_f32() / self.lifetime.as_secs_f32()).min(1.0)
    }

    pub fn is_done(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.born) >= self.lifetime
    }

    /// Particles as they should be drawn at `now`: moved along an ease-out
    /// curve, fading and shrinking to nothing.
    pub fn sprites(&self, now: Instant) -> impl Iterator<Item = ParticleSprite> + '_ {
        let t    = self.progress(now);
        let e    = ease_out(t);
        let fade = 1.0 - t;
        self.particles.iter().map(move |p| ParticleSprite {
            center:  Point::new(self.origin.x + p.travel.0 * e, self.origin.y + p.travel.1 * e),
            radius:  p.size / 2.0 * fade,
            opacity: fade,
            color:   p.color,
        })
    }
}

fn lerp((lo, hi): (f32, f32), t: f32) -> f32 {
    lo + (hi - lo) * t
}

// ════════════════════════════════════════════════════════════════════════════
// Effects — all live pulses and bursts
// ════════════════════════════════════════════════════════════════════════════

pub struct Effects {
    pulses:   Vec<PressPulse>,
    bursts:   Vec<ParticleBurst>,
    rng:      fastrand::Rng,
    pulse:    Duration,
    count:    usize,
    lifetime: Duration,
}

impl Effects {
    pub fn new(cfg: &EffectsConfig) -> Self {
        Self::with_rng(cfg, fastrand::Rng::new())
    }

    /// Deterministic particles, for tests and recordings.
    pub fn with_seed(cfg: &EffectsConfig, seed: u64) -> Self {
        Self::with_rng(cfg, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(cfg: &EffectsConfig, rng: fastrand::Rng) -> Self {
        Effects {
            pulses:   Vec::new(),
            bursts:   Vec::new(),
            rng,
            pulse:    Duration::from_millis(cfg.press_pulse_ms),
            count:    cfg.particle_count,
            lifetime: Duration::from_millis(cfg.particle_lifetime_ms),
        }
    }

    /// Start the press pulse on `key` and a burst from its centre.
    pub fn press(&mut self, key: KeyId, rect: Rect, now: Instant) {
        self.pulses.retain(|p| p.key != key);
        self.pulses.push(PressPulse { key, until: now + self.pulse });
        if self.count > 0 {
            let burst = ParticleBurst::new(rect.center(), self.count, self.lifetime, now, &mut self.rng);
            self.bursts.push(burst);
        }
    }

    pub fn is_pressed(&self, key: KeyId, now: Instant) -> bool {
        self.pulses.iter().any(|p| p.key == key && now < p.until)
    }

    /// Drop expired pulses and bursts.
    pub fn tick(&mut self, now: Instant) {
        self.pulses.retain(|p| now < p.until);
        self.bursts.retain(|b| !b.is_done(now));
    }

    pub fn pulses(&self) -> &[PressPulse] {
        &self.pulses
    }

    pub fn bursts(&self) -> &[ParticleBurst] {
        &self.bursts
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn effects() -> Effects {
        Effects::with_seed(&EffectsConfig::default(), 7)
    }

    fn key_rect() -> Rect {
        Rect::new(100.0, 100.0, 80.0, 60.0)
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl_to_argb(0.0, 1.0, 0.5), 0xFFFF0000);
        assert_eq!(hsl_to_argb(120.0, 1.0, 0.5), 0xFF00FF00);
        assert_eq!(hsl_to_argb(240.0, 1.0, 0.5), 0xFF0000FF);
        assert_eq!(hsl_to_argb(0.0, 0.0, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn particle_colors_are_violet_to_magenta() {
        let mut fx = effects();
        let t0 = Instant::now();
        fx.press(KeyId(0), key_rect(), t0);
        for p in &fx.bursts()[0].particles {
            let r = (p.color >> 16) & 0xFF;
            let g = (p.color >> 8) & 0xFF;
            let b = p.color & 0xFF;
            assert!(r > g && b > g, "color {:08X}", p.color);
        }
    }

    #[test]
    fn ease_out_endpoints() {
        assert_eq!(ease_out(0.0), 0.0);
        assert_eq!(ease_out(1.0), 1.0);
        assert!(ease_out(0.5) > 0.5);
    }

    #[test]
    fn press_pulse_lasts_200ms() {
        let mut fx = effects();
        let t0 = Instant::now();
        fx.press(KeyId(3), key_rect(), t0);
        assert!(fx.is_pressed(KeyId(3), t0 + Duration::from_millis(199)));
        assert!(!fx.is_pressed(KeyId(3), t0 + Duration::from_millis(200)));
        assert!(!fx.is_pressed(KeyId(4), t0));
    }

    #[test]
    fn burst_has_configured_particles() {
        let mut fx = effects();
        let t0 = Instant::now();
        fx.press(KeyId(0), key_rect(), t0);
        let burst = &fx.bursts()[0];
        assert_eq!(burst.particles.len(), 15);
        assert_eq!(burst.origin, Point::new(140.0, 130.0));
        for p in &burst.particles {
            assert!((4.0..=10.0).contains(&p.size));
            let d = (p.travel.0 * p.travel.0 + p.travel.1 * p.travel.1).sqrt();
            assert!((49.9..=200.1).contains(&d), "travel {}", d);
        }
    }

    #[test]
    fn sprites_start_at_centre_and_vanish() {
        let mut fx = effects();
        let t0 = Instant::now();
        fx.press(KeyId(0), key_rect(), t0);
        let burst = &fx.bursts()[0];

        for s in burst.sprites(t0) {
            assert_eq!(s.center, burst.origin);
            assert_eq!(s.opacity, 1.0);
        }
        for s in burst.sprites(t0 + Duration::from_millis(800)) {
            assert_eq!(s.opacity, 0.0);
            assert_eq!(s.radius, 0.0);
        }
    }

    #[test]
    fn tick_expires_everything() {
        let mut fx = effects();
        let t0 = Instant::now();
        fx.press(KeyId(0), key_rect(), t0);
        fx.press(KeyId(1), key_rect(), t0 + Duration::from_millis(100));

        fx.tick(t0 + Duration::from_millis(250));
        assert_eq!(fx.pulses().len(), 1);
        assert_eq!(fx.bursts().len(), 2);

        fx.tick(t0 + Duration::from_millis(900));
        assert!(fx.pulses().is_empty());
        assert!(fx.bursts().is_empty());
    }

    #[test]
    fn same_seed_same_burst() {
        let t0 = Instant::now();
        let mut a = effects();
        let mut b = effects();
        a.press(KeyId(0), key_rect(), t0);
        b.press(KeyId(0), key_rect(), t0);
        assert_eq!(a.bursts()[0].particles, b.bursts()[0].particles);
    }

    #[test]
    fn zero_particles_means_no_burst() {
        let cfg = EffectsConfig { particle_count: 0, ..EffectsConfig::default() };
        let mut fx = Effects::with_seed(&cfg, 1);
        fx.press(KeyId(0), key_rect(), Instant::now());
        assert!(fx.bursts().is_empty());
        assert_eq!(fx.pulses().len(), 1);
    }
}
