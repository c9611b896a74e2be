use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Case-folded, NFC-composed form used on both sides of a containment test.
pub fn folded(s: &str) -> String {
    s.nfc().collect::<String>().to_lowercase()
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[a-z]{3,}\b").unwrap())
}

/// Lowercase words of three or more ASCII letters.
pub fn extract_words(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    word_re().find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// Builds a case-insensitive regex that matches `query` literally.
pub fn literal_regex(query: &str) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Wraps every case-insensitive literal occurrence of `query` with `prefix`/`suffix`,
/// keeping the original casing. Returns the decorated text and the number of hits.
/// Both sides are NFC-composed first, the same way `folded` compares them.
pub fn highlight(text: &str, query: &str, prefix: &str, suffix: &str) -> (String, usize) {
    let text: String = text.nfc().collect();
    let query: String = query.nfc().collect();
    let Some(re) = literal_regex(&query) else {
        return (text, 0);
    };
    let mut count = 0usize;
    let replaced = re.replace_all(&text, |caps: &regex::Captures| {
        count += 1;
        format!("{}{}{}", prefix, &caps[0], suffix)
    });
    (replaced.into_owned(), count)
}

/// First `n` characters of `s`, trimmed.
pub fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_case_folded_and_min_three_letters() {
        let w = extract_words("The Lord is my Shepherd");
        let expected: HashSet<String> = ["the", "lord", "shepherd"].iter().map(|s| s.to_string()).collect();
        assert_eq!(w, expected);
    }

    #[test]
    fn words_skip_digits_and_punctuation() {
        let w = extract_words("And it came to pass, 1830 A.D.; Nephi's");
        assert!(w.contains("and"));
        assert!(w.contains("came"));
        assert!(w.contains("pass"));
        assert!(w.contains("nephi"));
        assert!(!w.iter().any(|x| x.chars().any(|c| c.is_ascii_digit())));
    }

    #[test]
    fn highlight_preserves_case() {
        let (s, n) = highlight("God said, Let there be light: and there was light.", "LIGHT", "[", "]");
        assert_eq!(n, 2);
        assert_eq!(s, "God said, Let there be [light]: and there was [light].");
    }

    #[test]
    fn highlight_treats_metacharacters_literally() {
        let (s, n) = highlight("a (note) and a.b", "(note)", "<", ">");
        assert_eq!(n, 1);
        assert_eq!(s, "a <(note)> and a.b");
        let (s, n) = highlight("axb a.b", "a.b", "<", ">");
        assert_eq!(n, 1);
        assert_eq!(s, "axb <a.b>");
        let (_, n) = highlight("nothing here", "[", "<", ">");
        assert_eq!(n, 0);
    }

    #[test]
    fn empty_query_highlights_nothing() {
        assert_eq!(highlight("text", "", "<", ">"), ("text".to_string(), 0));
    }

    #[test]
    fn highlight_matches_across_normal_forms() {
        let (s, n) = highlight("A cafe\u{301} here", "café", "[", "]");
        assert_eq!(n, 1);
        assert_eq!(s, "A [caf\u{e9}] here");
        let (_, n) = highlight("A caf\u{e9} here", "cafe\u{301}", "[", "]");
        assert_eq!(n, 1);
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate_chars("Zarahemla is a city ", 19), "Zarahemla is a city");
        assert_eq!(truncate_chars("ÆØÅ", 2), "ÆØ");
    }
}
