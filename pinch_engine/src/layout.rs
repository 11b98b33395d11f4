//! Keyboard layout: the static set of key regions.
//!
//! Regions are built once for a viewport and never mutated.  They do not
//! overlap, so [`KeyboardLayout::hit_test`] has at most one answer.

use crate::geometry::{Point, Rect, Viewport};

// ════════════════════════════════════════════════════════════════════════════
// Key rows
// ════════════════════════════════════════════════════════════════════════════

/// Key labels, top row first.  `SPACE` and `BACK` are the two wide keys on
/// the bottom row.
pub const STANDARD_ROWS: [&[&str]; 5] = [
    &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"],
    &["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P"],
    &["A", "S", "D", "F", "G", "H", "J", "K", "L", ";"],
    &["Z", "X", "C", "V", "B", "N", "M", ",", ".", "?"],
    &["SPACE", "BACK"],
];

const COLUMNS: f32 = 10.0;
/// Fraction of the viewport width the keyboard spans.
const WIDTH_FRACTION: f32 = 0.9;
/// Gap between keys as a fraction of one column.
const GAP_FRACTION: f32 = 0.12;
/// Key height relative to one column.
const ROW_ASPECT: f32 = 0.85;
const BOTTOM_MARGIN: f32 = 0.04;

// Bottom row: SPACE spans columns 1..7, BACK spans 7..9.
const SPACE_SPAN: (f32, f32) = (1.0, 6.0);
const BACK_SPAN: (f32, f32) = (7.0, 2.0);

// ════════════════════════════════════════════════════════════════════════════
// KeyValue / KeyRegion
// ════════════════════════════════════════════════════════════════════════════

/// What committing a key does to the text buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyValue {
    Char(char),
    Space,
    Backspace,
}

impl KeyValue {
    /// `"SPACE"` and `"BACK"` are special; any single character is literal.
    pub fn from_label(label: &str) -> Option<KeyValue> {
        match label {
            "SPACE" => Some(KeyValue::Space),
            "BACK" => Some(KeyValue::Backspace),
            _ => {
                let mut chars = label.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(KeyValue::Char(c)),
                    _ => None,
                }
            }
        }
    }

    /// Text drawn on the key face.
    pub fn glyph(&self) -> String {
        match self {
            KeyValue::Char(c) => c.to_string(),
            KeyValue::Space => String::new(),
            KeyValue::Backspace => "⌫".to_string(),
        }
    }
}

/// Stable index of a region within its layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct KeyRegion {
    pub id: KeyId,
    pub rect: Rect,
    /// Label as written in the row table (`"Q"`, `"SPACE"`, …).
    pub label: String,
    pub glyph: String,
    pub value: KeyValue,
}

// ════════════════════════════════════════════════════════════════════════════
// KeyboardLayout
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardLayout {
    regions: Vec<KeyRegion>,
}

impl KeyboardLayout {
    /// Build a layout from explicit `(label, rect)` pairs.  Labels that are
    /// neither special nor a single character are skipped.
    pub fn from_regions<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Rect)>,
    {
        let mut regions = Vec::new();
        for (label, rect) in keys {
            if let Some(value) = KeyValue::from_label(label) {
                regions.push(KeyRegion {
                    id: KeyId(regions.len()),
                    rect,
                    label: label.to_string(),
                    glyph: value.glyph(),
                    value,
                });
            }
        }
        KeyboardLayout { regions }
    }

    /// The five-row keyboard centred horizontally near the bottom of the
    /// viewport.
    pub fn standard(viewport: Viewport) -> Self {
        let kb_w = viewport.width * WIDTH_FRACTION;
        let col = kb_w / COLUMNS;
        let gap = col * GAP_FRACTION;
        let row_h = col * ROW_ASPECT;
        let left = (viewport.width - kb_w) / 2.0;
        let top = (viewport.height * (1.0 - BOTTOM_MARGIN) - row_h * STANDARD_ROWS.len() as f32)
            .max(0.0);

        let cell = |col_start: f32, cols: f32, row: usize| {
            Rect::new(
                left + col_start * col + gap / 2.0,
                top + row as f32 * row_h + gap / 2.0,
                cols * col - gap,
                row_h - gap,
            )
        };

        let mut keys = Vec::new();
        for (row, labels) in STANDARD_ROWS.iter().enumerate() {
            for (i, &label) in labels.iter().enumerate() {
                let rect = match label {
                    "SPACE" => cell(SPACE_SPAN.0, SPACE_SPAN.1, row),
                    "BACK" => cell(BACK_SPAN.0, BACK_SPAN.1, row),
                    _ => cell(i as f32, 1.0, row),
                };
                keys.push((label, rect));
            }
        }
        Self::from_regions(keys)
    }

    pub fn regions(&self) -> &[KeyRegion] {
        &self.regions
    }

    pub fn region(&self, id: KeyId) -> Option<&KeyRegion> {
        self.regions.get(id.0)
    }

    pub fn find(&self, label: &str) -> Option<&KeyRegion> {
        self.regions.iter().find(|r| r.label == label)
    }

    /// First region whose bounds contain `p`.
    pub fn hit_test(&self, p: Point) -> Option<&KeyRegion> {
        self.regions.iter().find(|r| r.rect.contains(p))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layout() -> KeyboardLayout {
        KeyboardLayout::standard(Viewport::new(1280.0, 720.0))
    }

    #[test]
    fn standard_has_42_keys() {
        assert_eq!(layout().len(), 42);
    }

    #[test]
    fn special_keys() {
        let l = layout();
        let space = l.find("SPACE").unwrap();
        let back = l.find("BACK").unwrap();
        assert_eq!(space.value, KeyValue::Space);
        assert_eq!(space.glyph, "");
        assert_eq!(back.value, KeyValue::Backspace);
        assert_eq!(back.glyph, "⌫");
        assert!(space.rect.w > back.rect.w);
    }

    #[test]
    fn regions_never_overlap() {
        let l = layout();
        for a in l.regions() {
            for b in l.regions() {
                if a.id != b.id {
                    assert!(!a.rect.overlaps(&b.rect), "{} overlaps {}", a.label, b.label);
                }
            }
        }
    }

    #[test]
    fn keyboard_fits_viewport() {
        let vp = Viewport::new(1280.0, 720.0);
        for r in KeyboardLayout::standard(vp).regions() {
            assert!(r.rect.x >= 0.0 && r.rect.right() <= vp.width);
            assert!(r.rect.y >= 0.0 && r.rect.bottom() <= vp.height);
        }
    }

    #[test]
    fn gap_is_not_a_key() {
        let l = layout();
        let q = l.find("Q").unwrap().rect;
        let w = l.find("W").unwrap().rect;
        let between = Point::new((q.right() + w.x) / 2.0, q.center().y);
        assert!(l.hit_test(between).is_none());
    }

    #[test]
    fn from_label_rejects_words() {
        assert_eq!(KeyValue::from_label("SHIFT"), None);
        assert_eq!(KeyValue::from_label(""), None);
        assert_eq!(KeyValue::from_label("!"), Some(KeyValue::Char('!')));
    }

    proptest! {
        #[test]
        fn strictly_inside_selects_that_region(
            idx in 0usize..42,
            fx in 0.01f32..0.99,
            fy in 0.01f32..0.99,
        ) {
            let l = layout();
            let region = &l.regions()[idx];
            let p = Point::new(region.rect.x + fx * region.rect.w, region.rect.y + fy * region.rect.h);
            prop_assert_eq!(l.hit_test(p).map(|r| r.id), Some(region.id));
        }
    }
}
