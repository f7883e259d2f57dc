//! Text preparation for the synthesis service
//!
//! The speech endpoint accepts short inputs only. Text is cleaned up
//! and split at natural pauses into chunks of at most `max_chars`
//! characters, each of which becomes one request.

/// Marks after which speech naturally pauses
const TONE_MARKS: &[char] = &['?', '!', '？', '！'];

/// Characters that end a token
const DELIMITERS: &[char] = &[
    '?', '!', '？', '！', '。', '…', ',', '，', ';', '；', ':', '：', '、', '¿', '¡', '\n',
];

/// Abbreviations spoken the same with or without their period
const ABBREVIATIONS: &[&str] = &["dr", "jr", "mr", "mrs", "ms", "prof", "sr", "st"];

/// Split text into chunks the service accepts
///
/// Returns an empty list when nothing speakable remains, for example
/// for whitespace-only input.
#[must_use]
pub fn tokenize(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let text = preprocess(text);

    if text.chars().count() <= max_chars {
        return clean_tokens(vec![text]);
    }

    let tokens = split_at_delimiters(&text)
        .into_iter()
        .flat_map(|token| minimize(&token, max_chars))
        .collect();

    clean_tokens(tokens)
}

/// Apply the text pre-processors in order
#[must_use]
pub fn preprocess(text: &str) -> String {
    let text = space_after_tone_marks(text.trim());
    let text = join_line_breaks(&text);
    drop_abbreviation_periods(&text)
}

fn space_after_tone_marks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        let needs_space = chars
            .peek()
            .is_some_and(|next| !next.is_whitespace() && !TONE_MARKS.contains(next));
        if TONE_MARKS.contains(&c) && needs_space {
            out.push(' ');
        }
    }

    out
}

fn join_line_breaks(text: &str) -> String {
    text.replace("-\r\n", "")
        .replace("-\n", "")
        .replace("\r\n", " ")
        .replace('\n', " ")
}

fn drop_abbreviation_periods(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            word.strip_suffix('.')
                .filter(|stem| ABBREVIATIONS.iter().any(|a| a.eq_ignore_ascii_case(stem)))
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split after delimiters and after periods followed by whitespace
fn split_at_delimiters(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let period_break = c == '.' && chars.peek().is_none_or(|next| next.is_whitespace());
        if DELIMITERS.contains(&c) || period_break {
            tokens.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Break a token into pieces no longer than `max_chars`
///
/// Cuts at the last space within the limit, or hard at the limit
/// when the piece has no space.
fn minimize(token: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = token.trim();

    while rest.chars().count() > max_chars {
        let limit = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(idx, _)| idx);
        let cut = match rest[..limit].rfind(' ') {
            Some(idx) if idx > 0 => idx,
            _ => limit,
        };

        pieces.push(rest[..cut].to_string());
        rest = rest[cut..].trim_start();
    }

    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }

    pieces
}

fn clean_tokens(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !is_only_punctuation(t))
        .collect()
}

fn is_only_punctuation(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_whitespace() || c.is_ascii_punctuation() || DELIMITERS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(tokenize("Hello world", 100), vec!["Hello world"]);
    }

    #[test]
    fn whitespace_only_yields_nothing() {
        assert!(tokenize(" ", 100).is_empty());
        assert!(tokenize("", 100).is_empty());
        assert!(tokenize(" ... !", 100).is_empty());
    }

    #[test]
    fn long_text_splits_at_punctuation() {
        let chunks = tokenize("First part here, second part there. Third one!", 20);
        assert_eq!(
            chunks,
            vec!["First part here,", "second part there.", "Third one!"]
        );
    }

    #[test]
    fn chunks_respect_limit() {
        let text = "word ".repeat(60);
        let chunks = tokenize(&text, 100);

        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
        assert_eq!(chunks.join(" "), text.trim());
    }

    #[test]
    fn unbroken_text_is_hard_cut() {
        let text = "a".repeat(250);
        let chunks = tokenize(&text, 100);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 100);
        assert_eq!(chunks[2].len(), 50);
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let text = "日本語".repeat(50);
        let chunks = tokenize(&text, 100);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 100);
    }

    #[test]
    fn decimal_points_do_not_split() {
        let text = format!("{} pi is 3.14 roughly", "x ".repeat(50));
        let chunks = tokenize(&text, 100);
        assert!(chunks.iter().any(|c| c.contains("3.14")));
    }

    #[test]
    fn tone_marks_get_a_space() {
        assert_eq!(preprocess("Really?Yes!ok"), "Really? Yes! ok");
        assert_eq!(preprocess("What?!"), "What?!");
    }

    #[test]
    fn line_breaks_are_joined() {
        assert_eq!(preprocess("hyphen-\nated line\nbreak"), "hyphenated line break");
    }

    #[test]
    fn abbreviation_periods_are_dropped() {
        assert_eq!(preprocess("Dr. Smith met Mr. Jones."), "Dr Smith met Mr Jones.");
    }
}
