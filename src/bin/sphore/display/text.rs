/// Greedy word wrap. Always yields at least one line so callers can render
/// a box row even for an empty message.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for word in text.split_whitespace() {
        match lines.last_mut() {
            Some(line) if line.len() + 1 + word.len() <= width => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Truncates to `max_len` characters, ending with an ellipsis when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }

    if s.chars().count() <= max_len {
        return s.to_string();
    }

    let keep = max_len - 1;
    let cut = s.char_indices().nth(keep).map(|(idx, _)| idx).unwrap_or(0);

    format!("{}…", &s[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap("labels written", 20), vec!["labels written"]);
    }

    #[test]
    fn wrap_splits_at_word_boundaries() {
        let result = wrap("the quick brown fox", 10);
        assert_eq!(result, vec!["the quick", "brown fox"]);
    }

    #[test]
    fn wrap_empty_input_gives_one_empty_line() {
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn truncate_passes_fitting_text_through() {
        assert_eq!(truncate("pharm3", 10), "pharm3");
        assert_eq!(truncate("pharm3", 6), "pharm3");
    }

    #[test]
    fn truncate_cuts_with_ellipsis() {
        assert_eq!(truncate("hello world", 8), "hello w…");
        assert_eq!(truncate("hello", 1), "…");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("日本語テスト", 4), "日本語…");
    }
}
