//! Width-aware text helpers for rendering.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Shortens `text` to fit `max_width` terminal columns, ending with `…`.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Terminal columns taken by the first `chars` characters of `text`.
pub fn width_of_prefix(text: &str, chars: usize) -> usize {
    text.chars()
        .take(chars)
        .map(|ch| ch.width().unwrap_or(0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_with_ellipsis("Notch", 10), "Notch");
    }

    #[test]
    fn long_text_ends_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("textures.minecraft.net", 8), "texture…");
    }

    #[test]
    fn wide_chars_count_double() {
        assert_eq!(width_of_prefix("日本a", 2), 4);
        assert_eq!(width_of_prefix("abc", 10), 3);
    }
}
