
// text preparation stages that run between loading and training:
// normalize -> segment -> clean -> tokenize

const SENTENCE_TERMINALS: [char; 3] = ['.', '?', '!'];
const LEFT_CURLY_QUOTE: char = '\u{201C}';
const RIGHT_CURLY_QUOTE: char = '\u{201D}';

// abbreviations that would otherwise end a sentence, applied in this order
const ABBREVIATIONS: [(&str, &str); 2] = [("Mrs.", "Mrs"), ("Mr.", "Mr")];

/// Strips a fixed-length preamble and rewrites the raw text so that
/// sentence segmentation only sees real sentence boundaries.
#[derive(Clone, Copy, Debug, Default)]
pub struct Normalizer {
    preamble_offset: usize,
}

impl Normalizer {

    pub fn new(preamble_offset: usize) -> Self {
        Self { preamble_offset }
    }

    pub fn normalize(&self, raw: &str) -> String {
        Normalizer::substitute(Normalizer::strip_preamble(raw, self.preamble_offset))
    }

    /// Drops the leading `offset` characters (not bytes).
    pub fn strip_preamble(raw: &str, offset: usize) -> &str {
        match raw.char_indices().nth(offset) {
            Some((start, _)) => &raw[start..],
            None => "",
        }
    }

    pub fn substitute(text: &str) -> String {
        let mut text = text.to_owned();
        for (from, to) in ABBREVIATIONS {
            text = text.replace(from, to);
        }
        text.replace('\n', " ").replace('\r', " ")
    }
}

/// Splits on every `.`, `?` and `!`. Delimiters are discarded and never merged,
/// so the result always has one more segment than there are delimiters.
pub fn segment(text: &str) -> Vec<&str> {
    text.split(SENTENCE_TERMINALS).collect()
}

// unicode White_Space plus the ascii information separators U+001C..U+001F
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1C}'..='\u{1F}').contains(&c)
}

fn is_removed(c: char) -> bool {
    c.is_ascii_punctuation() || c == LEFT_CURLY_QUOTE || c == RIGHT_CURLY_QUOTE
}

/// Removes punctuation and curly quotes, lowercases and trims.
pub fn clean_sentence(sentence: &str) -> String {
    let kept: String = sentence.chars().filter(|c| !is_removed(*c)).collect();
    kept.to_lowercase().trim_matches(is_separator).to_owned()
}


// defines the behavior needed for tokenizing a cleaned sentence
pub trait Tokenizer {
    fn tokenize(&self, sentence: &str) -> Vec<String>;
}

/// Splits on runs of whitespace (including the U+001C..U+001F separators);
/// blank input gives no tokens.
#[derive(Clone, Copy, Debug, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, sentence: &str) -> Vec<String> {
        sentence
            .split(is_separator)
            .filter(|x| !x.is_empty())
            .map(|x| x.to_string())
            .collect()
    }
}


#[cfg(test)]
mod tests {

    use super::*;

    fn tokenize_all(text: &str) -> Vec<Vec<String>> {
        let normalized = Normalizer::default().normalize(text);
        segment(&normalized)
            .iter()
            .map(|s| WhitespaceTokenizer.tokenize(&clean_sentence(s)))
            .collect()
    }

    #[test]
    fn walks_through_every_stage() {

        let normalized = Normalizer::new(0).normalize("He said Mr. Smith is here. She agreed!");
        assert_eq!(normalized, "He said Mr Smith is here. She agreed!");

        let segments = segment(&normalized);
        assert_eq!(segments, vec!["He said Mr Smith is here", " She agreed", ""]);

        let cleaned: Vec<String> = segments.iter().map(|s| clean_sentence(s)).collect();
        assert_eq!(cleaned, vec!["he said mr smith is here", "she agreed", ""]);

        let tokens: Vec<Vec<String>> = cleaned.iter().map(|s| WhitespaceTokenizer.tokenize(s)).collect();
        let expected: Vec<Vec<String>> = vec![
            vec!["he", "said", "mr", "smith", "is", "here"],
            vec!["she", "agreed"],
            vec![],
        ]
        .into_iter()
        .map(|s| s.into_iter().map(String::from).collect())
        .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn substitutes_abbreviations_and_line_breaks() {
        let text = "Mrs. Dursley\r\nand Mr. Dursley";
        assert_eq!(Normalizer::substitute(text), "Mrs Dursley  and Mr Dursley");
    }

    #[test]
    fn strips_preamble_by_characters() {

        assert_eq!(Normalizer::strip_preamble("ééabc", 2), "abc");
        assert_eq!(Normalizer::strip_preamble("abc", 0), "abc");
        assert_eq!(Normalizer::strip_preamble("abc", 3), "");
        assert_eq!(Normalizer::strip_preamble("abc", 10), "");

        let normalizer = Normalizer::new(7);
        assert_eq!(normalizer.normalize("HEADER\nMr. Potter."), "Mr Potter.");
    }

    #[test]
    fn substitution_is_idempotent_on_normalized_text() {
        let once = Normalizer::substitute("Mr. and Mrs. Dursley, of number four.\nPrivet Drive!\r");
        let twice = Normalizer::substitute(&once);
        assert_eq!(once, twice);
        assert!(!once.contains('\n') && !once.contains('\r'));
    }

    #[test]
    fn one_more_segment_than_terminals() {
        let cases = ["", "no stop", "a.b?c!d", "...", "end.", "what?! really.", "é. ü? ß!"];
        for text in cases {
            let terminals = text.chars().filter(|c| SENTENCE_TERMINALS.contains(c)).count();
            assert_eq!(segment(text).len(), terminals + 1, "text: {:?}", text);
        }
    }

    #[test]
    fn consecutive_terminals_leave_empty_segments() {
        let segments = segment("Well... wait");
        assert_eq!(segments, vec!["Well", "", "", " wait"]);

        let tokens = tokenize_all("Well... wait");
        assert_eq!(tokens.len(), 4);
        assert!(tokens[1].is_empty() && tokens[2].is_empty());
        assert_eq!(tokens[3], vec!["wait".to_string()]);
    }

    #[test]
    fn cleaner_removes_punctuation_and_curly_quotes() {
        assert_eq!(clean_sentence("  \u{201C}Hello,\u{201D} she (said) -- ‘ok’  "), "hello she said  ‘ok’");
        assert_eq!(clean_sentence("Don't"), "dont");
        assert_eq!(clean_sentence("ÉCOLE"), "école");
    }

    #[test]
    fn empty_inputs_stay_empty() {
        assert_eq!(clean_sentence(""), "");
        assert_eq!(clean_sentence(",;:"), "");
        assert!(WhitespaceTokenizer.tokenize("").is_empty());
        assert!(WhitespaceTokenizer.tokenize(" \t  ").is_empty());
    }

    #[test]
    fn information_separators_split_tokens() {
        assert_eq!(WhitespaceTokenizer.tokenize("a\u{1C}b\u{1D}c\u{1E}\u{1F}d"), vec!["a", "b", "c", "d"]);
        assert_eq!(WhitespaceTokenizer.tokenize("one\u{A0}two\u{2003}three"), vec!["one", "two", "three"]);
        assert!(WhitespaceTokenizer.tokenize("\u{1F}\u{1C} ").is_empty());
        assert_eq!(clean_sentence("\u{1E} word \u{1F}"), "word");
    }

    #[test]
    fn cleaning_ignores_case_and_punctuation() {
        let plain = WhitespaceTokenizer.tokenize(&clean_sentence("the boy who lived"));
        let noisy = WhitespaceTokenizer.tokenize(&clean_sentence("The, BOY \u{201C}who\u{201D} -lived;"));
        assert_eq!(plain, noisy);
    }
}
