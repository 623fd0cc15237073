use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LATIN_LETTER: Regex = Regex::new(r"[A-Za-z]").unwrap();
}

/// Joins tokens back into display text.
///
/// Absent and empty tokens are dropped. If any remaining token contains a
/// Latin letter the tokens are space separated (word-per-token scripts),
/// otherwise they are concatenated (character-per-token scripts like Chinese
/// or Japanese).
pub fn join_optional_tokens<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let kept: Vec<&str> = tokens
        .into_iter()
        .flatten()
        .filter(|t| !t.is_empty())
        .collect();

    if kept.iter().any(|t| LATIN_LETTER.is_match(t)) {
        kept.join(" ")
    } else {
        kept.concat()
    }
}

pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    join_optional_tokens(tokens.iter().map(|t| Some(t.as_ref())))
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Longest character prefix of `source` that occurs somewhere in `haystack`.
///
/// Prefixes grow one character at a time; a prefix that does not occur means
/// no longer one can, so the scan stops at the first miss.
pub fn longest_contained_prefix<'a>(source: &'a str, haystack: &str) -> Option<&'a str> {
    let mut longest = None;
    for (idx, c) in source.char_indices() {
        let prefix = &source[..idx + c.len_utf8()];
        if haystack.contains(prefix) {
            longest = Some(prefix);
        } else {
            break;
        }
    }
    longest
}

/// Character offset of the first occurrence of `needle` in `text` at or after
/// the character offset `from`.
pub fn find_char_offset(text: &str, needle: &str, from: usize) -> Option<usize> {
    let byte_start = match text.char_indices().nth(from) {
        Some((idx, _)) => idx,
        None if from == char_len(text) => text.len(),
        None => return None,
    };
    text[byte_start..]
        .find(needle)
        .map(|byte_pos| from + char_len(&text[byte_start..byte_start + byte_pos]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_latin_tokens_with_spaces() {
        assert_eq!(join_tokens(&["hello", "world"]), "hello world");
    }

    #[test]
    fn test_join_cjk_tokens_without_separator() {
        assert_eq!(join_tokens(&["你", "好"]), "你好");
        assert_eq!(join_tokens(&["今日", "は"]), "今日は");
    }

    #[test]
    fn test_join_mixed_script_uses_spaces() {
        assert_eq!(join_tokens(&["我", "love", "你"]), "我 love 你");
    }

    #[test]
    fn test_join_drops_absent_and_empty() {
        let joined = join_optional_tokens(vec![Some("a"), None, Some(""), Some("b")]);
        assert_eq!(joined, "a b");
        assert_eq!(join_optional_tokens(Vec::<Option<&str>>::new()), "");
    }

    #[test]
    fn test_digits_only_are_concatenated() {
        assert_eq!(join_tokens(&["9", "8"]), "98");
    }

    #[test]
    fn test_longest_contained_prefix() {
        assert_eq!(longest_contained_prefix("价格是多少", "这个价格很好"), Some("价格"));
        assert_eq!(longest_contained_prefix("abc", "xyz"), None);
        assert_eq!(longest_contained_prefix("abc", "zabcz"), Some("abc"));
    }

    #[test]
    fn test_find_char_offset_counts_characters() {
        assert_eq!(find_char_offset("这个商品的价格", "价格", 0), Some(5));
        assert_eq!(find_char_offset("a b a", "a", 1), Some(4));
        assert_eq!(find_char_offset("abc", "d", 0), None);
        assert_eq!(find_char_offset("abc", "a", 9), None);
    }
}
