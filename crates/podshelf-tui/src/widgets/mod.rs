pub mod filter_input;
pub mod pagination;
pub mod toast;

use unicode_width::UnicodeWidthChar;

/// Cut `text` to at most `max` terminal cells, ending with "…" when cut.
pub fn fit_width(text: &str, max: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(c);
    }
    if max > 0 {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width("short", 10), "short");
        assert_eq!(fit_width("a longer title", 8), "a longe…");
        assert_eq!(fit_width("日本語の番組", 7), "日本語…");
        assert_eq!(fit_width("abc", 0), "");
    }
}
