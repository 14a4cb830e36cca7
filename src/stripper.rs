//! Scaffolding removal and base-form computation
//!
//! The public surface used by dictionary code:
//! 1. Normalize and tokenize the phrase
//! 2. Map tokens to graph keys, hiding ignored headwords
//! 3. Walk the prefix or suffix automaton for the longest match
//! 4. Cut the match out of the normalized text
//!
//! [`BaseFormEngine::compute_base_form`] repeats this from both ends until
//! nothing more is recognized, without ever reducing a phrase to nothing.

use std::sync::Arc;

use lasso::Spur;
use tracing::trace;

use crate::builder::BuildError;
use crate::graph::{Direction, PatternGraph};
use crate::ignore::IgnoreSet;
use crate::templates::default_graph;
use crate::token::{Phrase, Token, clean_end_of_sentence, normalize};
use crate::walker::{MatchEnd, Walker};

/// Caller-controlled matching options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripperConfig {
    /// Strip trailing `.`, `!`, `?` and `…` before matching
    pub clean_punctuation_at_end_of_sentence: bool,
}

impl StripperConfig {
    pub fn with_punctuation_cleaning(mut self, enabled: bool) -> Self {
        self.clean_punctuation_at_end_of_sentence = enabled;
        self
    }
}

/// A compiled graph together with the ignore set and options it runs with.
///
/// Immutable and cheap to clone; the graph is shared between clones.
#[derive(Debug, Clone)]
pub struct BaseFormEngine {
    graph: Arc<PatternGraph>,
    ignore: Arc<IgnoreSet>,
    config: StripperConfig,
}

impl BaseFormEngine {
    pub fn new(graph: Arc<PatternGraph>) -> Self {
        Self {
            graph,
            ignore: Arc::new(IgnoreSet::new()),
            config: StripperConfig::default(),
        }
    }

    /// Engine over the built-in English and Russian scaffolding grammar
    pub fn english() -> Result<Self, BuildError> {
        Ok(Self::new(Arc::new(default_graph()?)))
    }

    pub fn with_ignored(mut self, ignore: IgnoreSet) -> Self {
        self.ignore = Arc::new(ignore);
        self
    }

    pub fn with_config(mut self, config: StripperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn graph(&self) -> &Arc<PatternGraph> {
        &self.graph
    }

    pub fn ignored(&self) -> &IgnoreSet {
        &self.ignore
    }

    pub fn config(&self) -> StripperConfig {
        self.config
    }

    pub fn stripper(&self, direction: Direction) -> Stripper<'_> {
        Stripper {
            engine: self,
            direction,
        }
    }

    /// Stripper for leading scaffolding ("to go ...")
    pub fn prefixes(&self) -> Stripper<'_> {
        self.stripper(Direction::Forward)
    }

    /// Stripper for trailing markers ("... smb", "...(ся)")
    pub fn suffixes(&self) -> Stripper<'_> {
        self.stripper(Direction::Backward)
    }

    /// Text of the longest leading scaffold
    pub fn find_match(&self, phrase: &str) -> Option<String> {
        self.prefixes().find_match(phrase)
    }

    /// Phrase without its longest leading scaffold
    pub fn remove_match(&self, phrase: &str) -> String {
        self.prefixes().remove_match(phrase)
    }

    /// Lowercase sort key left after repeatedly stripping scaffolding.
    ///
    /// Suffixes and prefixes are stripped alternately, trailing markers
    /// first, until neither matches. When a match would consume everything
    /// that is left, only its literal lead-in is dropped ("to go at" gives
    /// "go at") and stripping stops. A lead-in of nothing but punctuation is
    /// not dropped. The result is empty only for blank input.
    pub fn compute_base_form(&self, phrase: &str) -> String {
        let normalized = normalize(phrase).to_lowercase();
        let mut current = if self.config.clean_punctuation_at_end_of_sentence {
            match clean_end_of_sentence(&normalized) {
                "" => Phrase::parse(&normalized),
                cleaned => Phrase::parse(cleaned),
            }
        } else {
            Phrase::parse(&normalized)
        };

        loop {
            let mut stripped = false;

            for direction in BASE_FORM_ORDER {
                if current.is_empty() || self.ignore.contains_phrase(current.text()) {
                    return current.text().to_string();
                }
                let Some(found) = self.longest(&current, direction) else {
                    continue;
                };

                let remainder = without_match(&current, direction, found.len);
                if remainder.is_empty() {
                    let lead_in = matched_tokens(&current, direction, found.literal_len);
                    let kept = match without_match(&current, direction, found.literal_len) {
                        _ if lead_in.iter().all(Token::is_punctuation) => current.text(),
                        "" => current.text(),
                        kept => kept,
                    };
                    trace!(
                        phrase = current.text(),
                        kept,
                        ?direction,
                        "scaffold covers whole phrase"
                    );
                    return kept.to_string();
                }

                trace!(phrase = current.text(), remainder, ?direction, "stripped scaffold");
                current = Phrase::parse(remainder);
                stripped = true;
            }

            if !stripped {
                return current.text().to_string();
            }
        }
    }

    /// Graph keys in walk order; ignored tokens get no key
    fn keys(&self, phrase: &Phrase, direction: Direction) -> Vec<Option<Spur>> {
        let key = |text: &str| {
            self.graph
                .key(text)
                .filter(|_| !self.ignore.contains_token(text))
        };
        let tokens = phrase.tokens().iter().map(|token| key(&token.text));
        match direction {
            Direction::Forward => tokens.collect(),
            Direction::Backward => tokens.rev().collect(),
        }
    }

    fn longest(&self, phrase: &Phrase, direction: Direction) -> Option<MatchEnd> {
        if phrase.is_empty() {
            return None;
        }
        let keys = self.keys(phrase, direction);
        Walker::new(&self.graph, direction).find_longest_match(&keys)
    }
}

/// Trailing markers go first so a prefix scaffold never reaches into them
const BASE_FORM_ORDER: [Direction; 2] = [Direction::Backward, Direction::Forward];

/// The `len` tokens a match covers at its end of the phrase
fn matched_tokens(phrase: &Phrase, direction: Direction, len: usize) -> &[Token] {
    let tokens = phrase.tokens();
    let len = len.min(tokens.len());
    match direction {
        Direction::Forward => &tokens[..len],
        Direction::Backward => &tokens[tokens.len() - len..],
    }
}

fn without_match(phrase: &Phrase, direction: Direction, len: usize) -> &str {
    match direction {
        Direction::Forward => phrase.without_leading(len),
        Direction::Backward => phrase.without_trailing(len),
    }
}

/// One direction of an engine
#[derive(Debug, Clone, Copy)]
pub struct Stripper<'e> {
    engine: &'e BaseFormEngine,
    direction: Direction,
}

impl Stripper<'_> {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn prepare(&self, phrase: &str) -> Phrase {
        if self.engine.config.clean_punctuation_at_end_of_sentence {
            Phrase::parse(clean_end_of_sentence(phrase))
        } else {
            Phrase::parse(phrase)
        }
    }

    /// Matched text with its original casing, or `None`
    pub fn find_match(&self, phrase: &str) -> Option<String> {
        let phrase = self.prepare(phrase);
        let found = self.engine.longest(&phrase, self.direction)?;
        let text = match self.direction {
            Direction::Forward => phrase.leading(found.len),
            Direction::Backward => phrase.trailing(found.len),
        };
        Some(text.to_string())
    }

    /// Remainder after removing the longest match.
    ///
    /// Returns the normalized input when nothing matches, and may return an
    /// empty string when the whole phrase is scaffolding.
    pub fn remove_match(&self, phrase: &str) -> String {
        let phrase = self.prepare(phrase);
        match self.engine.longest(&phrase, self.direction) {
            Some(found) => without_match(&phrase, self.direction, found.len).to_string(),
            None => phrase.text().to_string(),
        }
    }
}
