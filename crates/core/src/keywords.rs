use crate::models::KeywordCount;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const TOP_KEYWORDS: usize = 5;

static WORD_RE: OnceLock<Regex> = OnceLock::new();

fn word_regex() -> &'static Regex {
    // `\w` is Unicode-aware, so Hangul, CJK and Cyrillic words split on the
    // same boundaries as Latin ones.
    WORD_RE.get_or_init(|| Regex::new(r"\w+").expect("static word regex is valid"))
}

pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    word_regex().find_iter(text).map(|token| token.as_str())
}

pub fn summarize(text: &str) -> Vec<KeywordCount> {
    summarize_top(text, TOP_KEYWORDS)
}

/// Counts tokens longer than one character and returns the `limit` most
/// frequent. Equal counts keep the order in which the token first appeared.
pub fn summarize_top(text: &str, limit: usize) -> Vec<KeywordCount> {
    let mut position = HashMap::<&str, usize>::new();
    let mut counts: Vec<KeywordCount> = Vec::new();

    for token in tokenize(text).filter(|token| token.chars().count() > 1) {
        match position.get(token) {
            Some(&index) => counts[index].count += 1,
            None => {
                position.insert(token, counts.len());
                counts.push(KeywordCount {
                    word: token.to_string(),
                    count: 1,
                });
            }
        }
    }

    // stable: ties stay in first-seen order
    counts.sort_by(|left, right| right.count.cmp(&left.count));
    counts.truncate(limit);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(summary: &[KeywordCount]) -> Vec<(&str, usize)> {
        summary
            .iter()
            .map(|entry| (entry.word.as_str(), entry.count))
            .collect()
    }

    #[test]
    fn returns_at_most_five_entries_by_descending_count() {
        let text = "alpha beta beta gamma gamma gamma delta epsilon zeta eta";
        let summary = summarize(text);
        assert_eq!(summary.len(), 5);
        assert_eq!(
            words(&summary),
            vec![
                ("gamma", 3),
                ("beta", 2),
                ("alpha", 1),
                ("delta", 1),
                ("epsilon", 1)
            ]
        );
    }

    #[test]
    fn ties_keep_first_seen_order_not_alphabetical() {
        let summary = summarize("zebra apple mango zebra apple mango");
        assert_eq!(
            words(&summary),
            vec![("zebra", 2), ("apple", 2), ("mango", 2)]
        );
    }

    #[test]
    fn single_character_tokens_are_skipped() {
        let summary = summarize("a a a I I x Rust go");
        assert_eq!(words(&summary), vec![("Rust", 1), ("go", 1)]);
    }

    #[test]
    fn counting_is_case_sensitive() {
        let summary = summarize("Travel travel TRAVEL travel");
        assert_eq!(
            words(&summary),
            vec![("travel", 2), ("Travel", 1), ("TRAVEL", 1)]
        );
    }

    #[test]
    fn punctuation_splits_words() {
        let summary = summarize("[VLOG] Tokyo, day-1: Tokyo!! #vlog");
        assert_eq!(
            words(&summary),
            vec![("Tokyo", 2), ("VLOG", 1), ("day", 1), ("vlog", 1)]
        );
    }

    #[test]
    fn segments_hangul_titles() {
        let summary = summarize("제주도 여행 브이로그 | 제주도 맛집 여행 제주도");
        assert_eq!(
            words(&summary),
            vec![("제주도", 3), ("여행", 2), ("브이로그", 1), ("맛집", 1)]
        );
    }

    #[test]
    fn segments_mixed_scripts() {
        let summary = summarize("Москва travel 東京 travel Москва 旅行");
        assert_eq!(
            words(&summary),
            vec![("Москва", 2), ("travel", 2), ("東京", 1), ("旅行", 1)]
        );
    }

    #[test]
    fn length_is_measured_in_characters_not_bytes() {
        // a single Hangul syllable is three bytes but one character
        let summary = summarize("집 집 집 여행");
        assert_eq!(words(&summary), vec![("여행", 1)]);
    }

    #[test]
    fn empty_text_yields_empty_summary() {
        assert!(summarize("").is_empty());
        assert!(summarize("  ... !!! ").is_empty());
    }

    #[test]
    fn custom_limit_is_respected() {
        let summary = summarize_top("one two three four", 2);
        assert_eq!(words(&summary), vec![("one", 1), ("two", 1)]);
    }
}
