//! Single-line editing for the username field.
//!
//! The text itself lives in `ProfileQuery::username_input`; this module only
//! tracks the cursor (in chars) and applies editing keys to a borrowed string.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCursor {
    col: usize,
}

impl LineCursor {
    pub fn col(&self) -> usize {
        self.col
    }

    /// Puts the cursor after the last char.
    pub fn move_to_end(&mut self, text: &str) {
        self.col = text.chars().count();
    }

    pub fn reset(&mut self) {
        self.col = 0;
    }

    /// Inserts `s` at the cursor. Line breaks are dropped.
    pub fn insert_str(&mut self, text: &mut String, s: &str) {
        self.clamp(text);
        let clean: String = s.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        if clean.is_empty() {
            return;
        }
        text.insert_str(byte_index(text, self.col), &clean);
        self.col += clean.chars().count();
    }

    /// Applies an editing key. Returns whether the key was consumed.
    pub fn handle_key(&mut self, text: &mut String, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        self.clamp(text);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('a') if ctrl => self.col = 0,
            KeyCode::Char('e') if ctrl => self.move_to_end(text),
            KeyCode::Char('u') if ctrl => {
                text.replace_range(..byte_index(text, self.col), "");
                self.col = 0;
            }
            KeyCode::Char('w') if ctrl => self.delete_word_left(text),
            KeyCode::Char(ch) if !ctrl => {
                let mut buf = [0u8; 4];
                self.insert_str(text, ch.encode_utf8(&mut buf));
            }
            KeyCode::Backspace => {
                if self.col > 0 {
                    let start = byte_index(text, self.col - 1);
                    let end = byte_index(text, self.col);
                    text.replace_range(start..end, "");
                    self.col -= 1;
                }
            }
            KeyCode::Delete => {
                if self.col < text.chars().count() {
                    let start = byte_index(text, self.col);
                    let end = byte_index(text, self.col + 1);
                    text.replace_range(start..end, "");
                }
            }
            KeyCode::Left => self.col = self.col.saturating_sub(1),
            KeyCode::Right => self.col = (self.col + 1).min(text.chars().count()),
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.move_to_end(text),
            _ => return false,
        }
        true
    }

    fn delete_word_left(&mut self, text: &mut String) {
        let chars: Vec<char> = text.chars().collect();
        let mut start = self.col;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let (from, to) = (byte_index(text, start), byte_index(text, self.col));
        text.replace_range(from..to, "");
        self.col = start;
    }

    fn clamp(&mut self, text: &str) {
        self.col = self.col.min(text.chars().count());
    }
}

fn byte_index(text: &str, col: usize) -> usize {
    text.char_indices()
        .nth(col)
        .map_or(text.len(), |(idx, _)| idx)
}
