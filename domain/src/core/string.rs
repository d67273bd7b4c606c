//! String helpers shared by log lines and console output.

/// Shorten `s` to at most `max_len` bytes, appending `...` when cut.
///
/// Cuts only on UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Collapse all whitespace runs (including newlines) into single spaces.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate("persona", 10), "persona");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate("the synthesizer said", 10), "the syn...");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // "é" is two bytes; a cut inside it must back off
        let out = truncate("ééééé", 6);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 6);
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("a\n  b\tc "), "a b c");
    }
}
