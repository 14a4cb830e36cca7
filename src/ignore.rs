//! Caller-supplied headwords that must never be stripped as scaffolding

use rustc_hash::FxHashSet;

use crate::token::{Token, normalize, tokenize};

/// Case-insensitive set of protected headwords.
///
/// Single-token entries block every path through that token. Entries of
/// several tokens protect a whole remainder during base-form computation.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    tokens: FxHashSet<String>,
    phrases: FxHashSet<String>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, headword: &str) {
        let tokens = tokenize(&normalize(headword));
        match tokens.len() {
            0 => {}
            1 => {
                self.tokens.extend(tokens.into_iter().map(|t| t.text));
            }
            _ => {
                self.phrases.insert(normalized_key(&tokens));
            }
        }
    }

    pub fn contains_token(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// True if `phrase` normalizes to a protected multi-token headword
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        if self.phrases.is_empty() {
            return false;
        }
        self.phrases
            .contains(&normalized_key(&tokenize(&normalize(phrase))))
    }

    pub fn len(&self) -> usize {
        self.tokens.len() + self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.phrases.is_empty()
    }
}

fn normalized_key(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

impl<S: AsRef<str>> FromIterator<S> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = IgnoreSet::new();
        set.extend(iter);
        set
    }
}

impl<S: AsRef<str>> Extend<S> for IgnoreSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for headword in iter {
            self.insert(headword.as_ref());
        }
    }
}
