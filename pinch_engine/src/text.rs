//! The typed-text buffer.

use crate::layout::KeyValue;

/// Append/trim-only text; changed only by committed keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        TextBuffer::default()
    }

    pub fn apply(&mut self, value: KeyValue) {
        match value {
            KeyValue::Backspace => {
                self.text.pop();
            }
            KeyValue::Space => self.text.push(' '),
            KeyValue::Char(c) => self.text.push(c),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        TextBuffer { text: s.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backspace_space_literal() {
        let mut buf = TextBuffer::from("HI");
        buf.apply(KeyValue::Backspace);
        assert_eq!(buf.as_str(), "H");
        buf.apply(KeyValue::Space);
        assert_eq!(buf.as_str(), "H ");
        buf.apply(KeyValue::Char('!'));
        assert_eq!(buf.as_str(), "H !");
    }

    #[test]
    fn backspace_on_empty_stays_empty() {
        let mut buf = TextBuffer::new();
        buf.apply(KeyValue::Backspace);
        buf.apply(KeyValue::Backspace);
        assert!(buf.is_empty());
    }

    #[test]
    fn backspace_removes_whole_char() {
        let mut buf = TextBuffer::from("aé");
        buf.apply(KeyValue::Backspace);
        assert_eq!(buf.as_str(), "a");
        assert_eq!(buf.len(), 1);
    }
}
