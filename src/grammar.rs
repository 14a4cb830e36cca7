//! Template grammar parser
//!
//! Parses the declarative scaffolding grammar into fragment and template
//! definitions using a pest grammar. Literals are split with the same
//! tokenizer used for input phrases, so a literal such as `"one's"` becomes
//! the two tokens `one` and `'s`.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use thiserror::Error;

use crate::graph::Direction;
use crate::token::{normalize, tokenize};

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct GrammarParser;

/// Error type for grammar failures
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("Grammar error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("Grammar error: Malformed declaration: {0}")]
    Malformed(&'static str),

    #[error("Grammar error: Duplicate fragment: {0}")]
    DuplicateFragment(String),

    #[error("Grammar error: Duplicate template: {0}")]
    DuplicateTemplate(String),

    #[error("Grammar error: Empty sequence in {0}")]
    EmptySequence(String),
}

/// One element of a template sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// A single normalized token
    Literal(String),
    /// Reference to a named shared fragment
    Fragment(String),
}

/// A sequence of literal tokens and fragment references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    pub elements: Vec<Element>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the tokens of `text` as literals
    pub fn literal(mut self, text: &str) -> Self {
        self.elements.extend(
            tokenize(&normalize(text))
                .into_iter()
                .map(|token| Element::Literal(token.text)),
        );
        self
    }

    /// Append a reference to the fragment `name`
    pub fn fragment(mut self, name: &str) -> Self {
        self.elements.push(Element::Fragment(name.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Names of fragments referenced by this sequence
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            Element::Fragment(name) => Some(name.as_str()),
            Element::Literal(_) => None,
        })
    }
}

/// A named set of alternatives shared by many templates
#[derive(Debug, Clone)]
pub struct FragmentDef {
    pub name: String,
    pub alternatives: Vec<Sequence>,
}

/// A named scaffolding template, matched from one end of a phrase
#[derive(Debug, Clone)]
pub struct TemplateDef {
    pub name: String,
    pub direction: Direction,
    pub alternatives: Vec<Sequence>,
}

/// Fragment and template definitions, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    fragments: Vec<FragmentDef>,
    templates: Vec<TemplateDef>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse grammar source text
    pub fn parse(source: &str) -> Result<Self, GrammarError> {
        let mut pairs = GrammarParser::parse(Rule::grammar, source).map_err(Box::new)?;
        let mut grammar = Grammar::new();

        let Some(root) = pairs.next() else {
            return Ok(grammar);
        };
        for pair in root.into_inner() {
            if pair.as_rule() == Rule::declaration {
                grammar.add_declaration(pair)?;
            }
        }

        Ok(grammar)
    }

    pub fn add_fragment(
        &mut self,
        name: &str,
        alternatives: Vec<Sequence>,
    ) -> Result<(), GrammarError> {
        if self.fragment(name).is_some() {
            return Err(GrammarError::DuplicateFragment(name.to_string()));
        }
        check_alternatives(name, &alternatives)?;
        self.fragments.push(FragmentDef {
            name: name.to_string(),
            alternatives,
        });
        Ok(())
    }

    pub fn add_template(
        &mut self,
        name: &str,
        direction: Direction,
        alternatives: Vec<Sequence>,
    ) -> Result<(), GrammarError> {
        if self.templates.iter().any(|t| t.name == name) {
            return Err(GrammarError::DuplicateTemplate(name.to_string()));
        }
        check_alternatives(name, &alternatives)?;
        self.templates.push(TemplateDef {
            name: name.to_string(),
            direction,
            alternatives,
        });
        Ok(())
    }

    pub fn fragments(&self) -> &[FragmentDef] {
        &self.fragments
    }

    pub fn templates(&self) -> &[TemplateDef] {
        &self.templates
    }

    pub fn fragment(&self, name: &str) -> Option<&FragmentDef> {
        self.fragments.iter().find(|f| f.name == name)
    }

    /// Parse a declaration: kind name = alternation;
    fn add_declaration(&mut self, pair: Pair<Rule>) -> Result<(), GrammarError> {
        let mut inner = pair.into_inner();

        let Some(kind) = inner.next() else {
            return Err(GrammarError::Malformed("expected declaration kind"));
        };
        let Some(name) = inner.next() else {
            return Err(GrammarError::Malformed("expected declaration name"));
        };
        let Some(alternation) = inner.next() else {
            return Err(GrammarError::Malformed("expected alternatives"));
        };

        let alternatives = alternation
            .into_inner()
            .map(parse_sequence)
            .collect::<Vec<_>>();

        match kind.as_str() {
            "fragment" => self.add_fragment(name.as_str(), alternatives),
            "prefix" => self.add_template(name.as_str(), Direction::Forward, alternatives),
            "suffix" => self.add_template(name.as_str(), Direction::Backward, alternatives),
            _ => Err(GrammarError::Malformed("unknown declaration kind")),
        }
    }
}

fn check_alternatives(name: &str, alternatives: &[Sequence]) -> Result<(), GrammarError> {
    if alternatives.is_empty() || alternatives.iter().any(Sequence::is_empty) {
        return Err(GrammarError::EmptySequence(name.to_string()));
    }
    Ok(())
}

/// Parse a sequence of references, quoted literals and bare literals
fn parse_sequence(pair: Pair<Rule>) -> Sequence {
    pair.into_inner()
        .fold(Sequence::new(), |sequence, element| match element.as_rule() {
            Rule::reference => match element.into_inner().next() {
                Some(name) => sequence.fragment(name.as_str()),
                None => sequence,
            },
            Rule::quoted => match element.into_inner().next() {
                Some(text) => sequence.literal(text.as_str()),
                None => sequence,
            },
            _ => sequence.literal(element.as_str()),
        })
}
