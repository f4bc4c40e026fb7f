//! Text normalization and tokenization.
//!
//! Input is lowercased, stripped of everything except letters, digits,
//! whitespace and sentence punctuation, and whitespace-collapsed. Word tokens
//! used for comparison are "bare": sentence punctuation removed. Character
//! tokens keep punctuation but drop whitespace. Nothing here can fail.

/// Sentence punctuation kept by normalization and counted as pause points.
pub const SENTENCE_PUNCTUATION: [char; 6] = ['.', ',', '!', '?', ';', ':'];

/// Returns `true` for `. , ! ? ; :`.
pub fn is_sentence_punctuation(c: char) -> bool {
    SENTENCE_PUNCTUATION.contains(&c)
}

/// Lowercase, drop disallowed characters, collapse whitespace.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || is_sentence_punctuation(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip sentence punctuation from a single token.
pub fn bare(token: &str) -> String {
    token
        .chars()
        .filter(|c| !is_sentence_punctuation(*c))
        .collect()
}

/// Bare word tokens of already-normalized text, empty tokens removed.
fn bare_words(normalized: &str) -> Vec<String> {
    normalized
        .split_whitespace()
        .map(bare)
        .filter(|w| !w.is_empty())
        .collect()
}

/// A normalized text with its word and character token sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedText {
    /// The normalized form of the input.
    pub normalized: String,
    /// Bare word tokens.
    pub words: Vec<String>,
    /// Non-whitespace characters of the normalized text.
    pub chars: Vec<char>,
}

impl TokenizedText {
    pub fn new(text: &str) -> Self {
        let normalized = normalize(text);
        let words = bare_words(&normalized);
        let chars = normalized.chars().filter(|c| !c.is_whitespace()).collect();
        Self {
            normalized,
            words,
            chars,
        }
    }

    /// Keep at most `max_words` words. Returns `true` if anything was cut.
    ///
    /// The normalized text and character tokens are rebuilt from the
    /// surviving prefix so that all three views stay consistent.
    pub fn truncate(&mut self, max_words: usize) -> bool {
        if self.words.len() <= max_words {
            return false;
        }
        let kept: Vec<&str> = self
            .normalized
            .split_whitespace()
            .scan(0usize, |seen, token| {
                if !bare(token).is_empty() {
                    *seen += 1;
                }
                Some((*seen, token))
            })
            .take_while(|(seen, _)| *seen <= max_words)
            .map(|(_, token)| token)
            .collect();
        *self = TokenizedText::new(&kept.join(" "));
        true
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of sentence punctuation marks in the normalized text.
    pub fn sentence_punctuation_count(&self) -> usize {
        self.chars
            .iter()
            .filter(|c| is_sentence_punctuation(**c))
            .count()
    }
}
