//! Longest-match walker
//!
//! Walks a direction's automaton over a key sequence and reports the longest
//! prefix of the sequence that ends on a template terminal. Entering a
//! fragment pushes the link node as a return point; reaching a fragment
//! terminal pops it and continues with the link node's own edges, so a
//! template can chain several fragments and fragments can nest.
//!
//! The walker is direction-agnostic: for suffix matching the caller passes
//! keys in reverse order.

use lasso::Spur;

use crate::graph::{Direction, NodeId, NodeRole, PatternGraph, TemplateId};

/// End boundary of the longest match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchEnd {
    /// Tokens consumed
    pub len: usize,
    /// Tokens consumed before the match first entered a fragment.
    /// Equal to `len` when the matching alternative has no fragments.
    pub literal_len: usize,
    /// Alternative that produced the match
    pub template: TemplateId,
}

impl MatchEnd {
    /// Longer matches win; equal lengths go to the earlier template
    fn beats(&self, other: &MatchEnd) -> bool {
        self.len > other.len || (self.len == other.len && self.template < other.template)
    }
}

/// Matches one direction of a compiled graph
#[derive(Debug, Clone, Copy)]
pub struct Walker<'g> {
    graph: &'g PatternGraph,
    direction: Direction,
}

/// Per-call walk state
struct Walk<'k> {
    keys: &'k [Option<Spur>],
    returns: Vec<NodeId>,
    best: Option<MatchEnd>,
}

impl<'g> Walker<'g> {
    pub fn new(graph: &'g PatternGraph, direction: Direction) -> Self {
        Self { graph, direction }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Find the longest match at the start of `keys`.
    ///
    /// A `None` key (a token no template uses, or an ignored one) has no
    /// outgoing edge.
    pub fn find_longest_match(&self, keys: &[Option<Spur>]) -> Option<MatchEnd> {
        let mut walk = Walk {
            keys,
            returns: Vec::new(),
            best: None,
        };
        self.visit(self.graph.root(self.direction), 0, None, &mut walk);
        walk.best
    }

    fn visit(&self, id: NodeId, pos: usize, entry: Option<usize>, walk: &mut Walk) {
        let node = self.graph.node(id);

        if node.role.contains(NodeRole::TERMINATES_FRAGMENT) {
            if let Some(link) = walk.returns.pop() {
                self.visit(link, pos, entry, walk);
                walk.returns.push(link);
            }
        }

        if walk.returns.is_empty() && node.role.contains(NodeRole::TERMINATES_MATCH) {
            if let Some(template) = node.template {
                let candidate = MatchEnd {
                    len: pos,
                    literal_len: entry.unwrap_or(pos),
                    template,
                };
                if walk.best.is_none_or(|best| candidate.beats(&best)) {
                    walk.best = Some(candidate);
                }
            }
        }

        if pos >= walk.keys.len() {
            // fragment content always consumes tokens, nothing more can match
            return;
        }

        for &link in &node.links {
            let Some(fragment) = self.graph.node(link).fragment else {
                continue;
            };
            let entry = if walk.returns.is_empty() {
                entry.or(Some(pos))
            } else {
                entry
            };
            walk.returns.push(link);
            self.visit(fragment.root, pos, entry, walk);
            walk.returns.pop();
        }

        if let Some(child) = walk.keys[pos].and_then(|key| node.child(key)) {
            self.visit(child, pos + 1, entry, walk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_str;
    use crate::token::tokenize;

    fn keys(graph: &PatternGraph, phrase: &str, direction: Direction) -> Vec<Option<Spur>> {
        let mut keys: Vec<_> = tokenize(phrase)
            .iter()
            .map(|token| graph.key(&token.text))
            .collect();
        if direction == Direction::Backward {
            keys.reverse();
        }
        keys
    }

    fn longest(graph: &PatternGraph, phrase: &str) -> Option<MatchEnd> {
        Walker::new(graph, Direction::Forward).find_longest_match(&keys(graph, phrase, Direction::Forward))
    }

    fn longest_len(graph: &PatternGraph, phrase: &str) -> Option<usize> {
        longest(graph, phrase).map(|m| m.len)
    }

    const GRAMMAR: &str = r#"
        fragment verbs = be | go | get;
        fragment articles = a | an | the;
        fragment prepositions = at | to | up | "up to";
        fragment superlatives = the most | the shortest;
        prefix infinitive = to;
        prefix to-be-prep = to be {prepositions};
        prefix verb = to {verbs};
        prefix verb-article = to {verbs} {articles};
        prefix verb-prep = to {verbs} {prepositions};
        prefix verb-to-superlative = to {verbs} to {superlatives};
        suffix marker = smb | sth;
    "#;

    #[test]
    fn test_longest_match_wins() {
        let graph = build_str(GRAMMAR).unwrap();
        assert_eq!(longest_len(&graph, "to go a hotel"), Some(3));
        assert_eq!(longest_len(&graph, "to go hotel"), Some(2));
        assert_eq!(longest_len(&graph, "to allow credit"), Some(1));
    }

    #[test]
    fn test_no_match() {
        let graph = build_str(GRAMMAR).unwrap();
        assert_eq!(longest(&graph, "hotel"), None);
        assert_eq!(longest(&graph, ""), None);
        // fragment alone is not a template here
        assert_eq!(longest(&graph, "a door"), None);
    }

    #[test]
    fn test_chained_fragments() {
        let graph = build_str(GRAMMAR).unwrap();
        // verbs, then literal "to", then a multi-token superlative
        assert_eq!(longest_len(&graph, "to go to the shortest hotel"), Some(5));
        // without a superlative the preposition path is the best
        assert_eq!(longest_len(&graph, "to go to hotel"), Some(3));
    }

    #[test]
    fn test_multi_token_fragment_alternative() {
        let graph = build_str(GRAMMAR).unwrap();
        let m = longest(&graph, "to be up to").unwrap();
        assert_eq!(m.len, 4);
        // to-be-prep is declared before verb-prep
        assert_eq!(graph.template_name(m.template), Some("to-be-prep"));
        assert_eq!(m.literal_len, 2);
    }

    #[test]
    fn test_literal_len() {
        let graph = build_str(GRAMMAR).unwrap();
        let m = longest(&graph, "to go at").unwrap();
        assert_eq!(m.len, 3);
        assert_eq!(m.literal_len, 1);

        let m = longest(&graph, "to do it").unwrap();
        assert_eq!(m.len, 1);
        assert_eq!(m.literal_len, 1);
    }

    #[test]
    fn test_unknown_key_blocks_edge() {
        let graph = build_str(GRAMMAR).unwrap();
        let mut keys = keys(&graph, "to go at", Direction::Forward);
        keys[1] = None;
        let m = Walker::new(&graph, Direction::Forward).find_longest_match(&keys);
        assert_eq!(m.map(|m| m.len), Some(1));
    }

    #[test]
    fn test_backward_walk() {
        let graph = build_str(GRAMMAR).unwrap();
        let walker = Walker::new(&graph, Direction::Backward);
        let m = walker.find_longest_match(&keys(&graph, "look after smb", Direction::Backward));
        assert_eq!(m.map(|m| m.len), Some(1));

        // prefixes are not suffixes
        let m = walker.find_longest_match(&keys(&graph, "to go", Direction::Backward));
        assert_eq!(m, None);
    }

    #[test]
    fn test_nested_fragment_then_literal() {
        let graph = build_str(
            r#"
            fragment owners = my | "one's";
            fragment articles = a | {owners};
            prefix own = take {articles} time;
            "#,
        )
        .unwrap();
        assert_eq!(longest_len(&graph, "take one's time off"), Some(4));
        assert_eq!(longest_len(&graph, "take my time"), Some(3));
        assert_eq!(longest_len(&graph, "take my"), None);
    }

    #[test]
    fn test_equal_length_tie_goes_to_first_template() {
        let graph = build_str(
            r#"
            fragment x = go;
            fragment y = go;
            prefix second = to {y};
            prefix first = to {x};
            "#,
        )
        .unwrap();
        let m = longest(&graph, "to go").unwrap();
        assert_eq!(graph.template_name(m.template), Some("second"));
    }
}
