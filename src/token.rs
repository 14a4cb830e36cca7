//! Phrase normalization and tokenization
//!
//! Headwords are matched token by token. Tokens are lowercased for matching,
//! while the whitespace-normalized text of the phrase keeps its original
//! casing so that remainders can be cut out of it unchanged.

use std::hash::{Hash, Hasher};
use std::ops::Range;

/// Characters that always form a token of their own
pub const PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '(', ')', '[', ']', '"', '«', '»', '…',
];

/// Sentence-final punctuation removed by [`clean_end_of_sentence`]
pub const END_OF_SENTENCE: &[char] = &['.', '!', '?', '…'];

/// Normalized possessive marker
pub const POSSESSIVE: &str = "'s";

/// A normalized token and its location in the normalized phrase
#[derive(Debug, Clone)]
pub struct Token {
    /// Lowercased token text
    pub text: String,
    /// Zero-based token position
    pub position: usize,
    /// Byte range in the normalized phrase
    pub span: Range<usize>,
}

// Tokens compare by normalized text only, so equality is case-insensitive
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl Token {
    /// True for a single character from [`PUNCTUATION`]
    pub fn is_punctuation(&self) -> bool {
        let mut chars = self.text.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if PUNCTUATION.contains(&c))
    }
}

/// Collapse whitespace runs (tabs, newlines, spaces) to single spaces and trim.
pub fn normalize(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip trailing sentence punctuation and whitespace
pub fn clean_end_of_sentence(phrase: &str) -> &str {
    phrase.trim_end_matches(|c: char| END_OF_SENTENCE.contains(&c) || c.is_whitespace())
}

fn is_boundary(c: char) -> bool {
    c.is_whitespace() || PUNCTUATION.contains(&c)
}

/// Returns true if the apostrophe at `idx` starts a word-final `'s`
fn is_possessive(text: &str, idx: usize, apostrophe: char) -> bool {
    let mut rest = text[idx + apostrophe.len_utf8()..].chars();
    matches!(rest.next(), Some('s' | 'S')) && rest.next().is_none_or(is_boundary)
}

/// Split a phrase into lowercase tokens.
///
/// Spans refer to `text` as given, so callers normally pass text already run
/// through [`normalize`]. Blank input yields no tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut skip_to = 0;

    let push = |tokens: &mut Vec<Token>, span: Range<usize>, normalized: Option<&str>| {
        let value = match normalized {
            Some(s) => s.to_string(),
            None => text[span.clone()].to_lowercase(),
        };
        let position = tokens.len();
        tokens.push(Token {
            text: value,
            position,
            span,
        });
    };

    for (idx, c) in text.char_indices() {
        if idx < skip_to {
            continue;
        }
        if c.is_whitespace() {
            if let Some(start) = word_start.take() {
                push(&mut tokens, start..idx, None);
            }
        } else if PUNCTUATION.contains(&c) {
            if let Some(start) = word_start.take() {
                push(&mut tokens, start..idx, None);
            }
            push(&mut tokens, idx..idx + c.len_utf8(), None);
        } else if (c == '\'' || c == '’') && word_start.is_some() && is_possessive(text, idx, c) {
            if let Some(start) = word_start.take() {
                push(&mut tokens, start..idx, None);
            }
            // apostrophe plus the ASCII 's'
            skip_to = idx + c.len_utf8() + 1;
            push(&mut tokens, idx..skip_to, Some(POSSESSIVE));
        } else if word_start.is_none() {
            word_start = Some(idx);
        }
    }
    if let Some(start) = word_start {
        push(&mut tokens, start..text.len(), None);
    }

    tokens
}

/// A whitespace-normalized phrase together with its tokens
#[derive(Debug, Clone)]
pub struct Phrase {
    text: String,
    tokens: Vec<Token>,
}

impl Phrase {
    pub fn parse(phrase: &str) -> Self {
        let text = normalize(phrase);
        let tokens = tokenize(&text);
        Self { text, tokens }
    }

    /// Normalized text with original casing
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Text covered by the first `n` tokens
    pub fn leading(&self, n: usize) -> &str {
        match n.min(self.len()) {
            0 => "",
            n => &self.text[..self.tokens[n - 1].span.end],
        }
    }

    /// Text covered by the last `n` tokens
    pub fn trailing(&self, n: usize) -> &str {
        match n.min(self.len()) {
            0 => "",
            n => &self.text[self.tokens[self.len() - n].span.start..],
        }
    }

    /// Text after dropping the first `n` tokens
    pub fn without_leading(&self, n: usize) -> &str {
        if n >= self.len() {
            return "";
        }
        self.text[self.tokens[n].span.start..].trim()
    }

    /// Text after dropping the last `n` tokens
    pub fn without_trailing(&self, n: usize) -> &str {
        if n >= self.len() {
            return "";
        }
        self.text[..self.tokens[self.len() - n - 1].span.end].trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(phrase: &str) -> Vec<String> {
        tokenize(&normalize(phrase))
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize(" \t\nTO ALLOW   credit "), "TO ALLOW credit");
        assert_eq!(normalize("one\ttwo\nthree"), "one two three");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t \n "), "");
    }

    #[test]
    fn test_tokenize_lowercases() {
        assert_eq!(texts("To Go AT"), vec!["to", "go", "at"]);
        assert_eq!(texts("Идти Домой"), vec!["идти", "домой"]);
    }

    #[test]
    fn test_tokenize_blank() {
        assert!(tokenize("").is_empty());
        assert!(Phrase::parse(" \t\n").is_empty());
    }

    #[test]
    fn test_tokenize_punctuation() {
        assert_eq!(texts("stop!"), vec!["stop", "!"]);
        assert_eq!(texts("и т.п."), vec!["и", "т", ".", "п", "."]);
        assert_eq!(texts("мыть(ся)"), vec!["мыть", "(", "ся", ")"]);
        assert_eq!(texts("well, well"), vec!["well", ",", "well"]);
    }

    #[test]
    fn test_tokenize_keeps_hyphens() {
        assert_eq!(texts("что-л."), vec!["что-л", "."]);
        assert_eq!(texts("well-known"), vec!["well-known"]);
    }

    #[test]
    fn test_tokenize_possessive() {
        assert_eq!(texts("one's"), vec!["one", "'s"]);
        assert_eq!(texts("Smb’s way"), vec!["smb", "'s", "way"]);
        // not word-final
        assert_eq!(texts("o'sullivan"), vec!["o'sullivan"]);
        // no word before it
        assert_eq!(texts("'s"), vec!["'s"]);
    }

    #[test]
    fn test_token_positions_and_spans() {
        let phrase = Phrase::parse("  Take  one's time ");
        let tokens = phrase.tokens();
        assert_eq!(phrase.text(), "Take one's time");
        assert_eq!(tokens.len(), 4);
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.position, i);
        }
        assert_eq!(&phrase.text()[tokens[0].span.clone()], "Take");
        assert_eq!(&phrase.text()[tokens[2].span.clone()], "'s");
    }

    #[test]
    fn test_token_is_punctuation() {
        let tokens = tokenize("что-л. (ся) one's");
        let flags: Vec<bool> = tokens.iter().map(Token::is_punctuation).collect();
        assert_eq!(flags, vec![false, true, true, false, true, false, false]);
    }

    #[test]
    fn test_token_equality_ignores_position() {
        let a = tokenize("GO home");
        let b = tokenize("home go");
        assert_eq!(a[0], b[1]);
        assert_ne!(a[0], a[1]);
    }

    #[test]
    fn test_phrase_slicing() {
        let phrase = Phrase::parse("To go to the Shortest hotel");
        assert_eq!(phrase.leading(2), "To go");
        assert_eq!(phrase.without_leading(2), "to the Shortest hotel");
        assert_eq!(phrase.trailing(1), "hotel");
        assert_eq!(phrase.without_trailing(1), "To go to the Shortest");
        assert_eq!(phrase.leading(0), "");
        assert_eq!(phrase.without_leading(6), "");
        assert_eq!(phrase.without_trailing(0), "To go to the Shortest hotel");
    }

    #[test]
    fn test_phrase_slicing_around_punctuation() {
        let phrase = Phrase::parse("мыть (ся)");
        assert_eq!(phrase.without_trailing(3), "мыть");
        assert_eq!(phrase.trailing(3), "(ся)");
    }

    #[test]
    fn test_clean_end_of_sentence() {
        assert_eq!(clean_end_of_sentence("go away!"), "go away");
        assert_eq!(clean_end_of_sentence("really?!. "), "really");
        assert_eq!(clean_end_of_sentence("wait…"), "wait");
        assert_eq!(clean_end_of_sentence("!!!"), "");
        assert_eq!(clean_end_of_sentence("a, b"), "a, b");
    }
}
