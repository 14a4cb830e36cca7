//! Pattern graph representation
//!
//! The compiled automaton is an arena of [`PatternNode`]s. Literal runs form
//! a trie; shared fragments are separate subgraphs entered through link
//! nodes, so many templates reach the same vocabulary without copying it.
//! Counting link nodes as single nodes, the graph is a DAG and it is never
//! mutated once built.

use bitflags::bitflags;
use lasso::{RodeoReader, Spur};
use rustc_hash::FxHashMap;

use crate::fragment::{FragmentHandle, FragmentRegistry};

/// Index of a node in the graph arena
pub type NodeId = usize;

/// Which end of a phrase a template is matched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Prefixes, matched from the first token on
    Forward,
    /// Suffixes, matched from the last token back
    Backward,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Forward, Direction::Backward];

    fn index(self) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
        }
    }
}

/// Position of a template alternative in declaration order.
///
/// Lower ids win ties between matches of equal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId(pub u32);

bitflags! {
    /// Roles a node can play in a match
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeRole: u8 {
        /// The empty set, used only as the default role. Every role
        /// `contains` it, so test with `is_empty` instead.
        const PLAIN = 0;
        /// A template ends here
        const TERMINATES_MATCH = 1 << 0;
        /// A fragment alternative ends here
        const TERMINATES_FRAGMENT = 1 << 1;
    }
}

impl Default for NodeRole {
    fn default() -> Self {
        NodeRole::PLAIN
    }
}

/// A node in the matching automaton
#[derive(Debug, Clone, Default)]
pub struct PatternNode {
    pub(crate) children: FxHashMap<Spur, NodeId>,
    /// Fragment reference nodes reachable from this node
    pub(crate) links: Vec<NodeId>,
    /// Set on fragment reference nodes. Their own children and links
    /// continue the sequence after the fragment.
    pub(crate) fragment: Option<FragmentHandle>,
    pub(crate) role: NodeRole,
    pub(crate) template: Option<TemplateId>,
}

impl PatternNode {
    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn fragment(&self) -> Option<FragmentHandle> {
        self.fragment
    }

    pub fn template(&self) -> Option<TemplateId> {
        self.template
    }

    pub fn child(&self, key: Spur) -> Option<NodeId> {
        self.children.get(&key).copied()
    }

    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Root and fragments of one direction
#[derive(Debug)]
pub struct Automaton {
    pub(crate) root: NodeId,
    pub(crate) fragments: FragmentRegistry,
}

impl Automaton {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn fragments(&self) -> &FragmentRegistry {
        &self.fragments
    }
}

/// A compiled, immutable scaffolding automaton for both directions
#[derive(Debug)]
pub struct PatternGraph {
    pub(crate) nodes: Vec<PatternNode>,
    pub(crate) vocabulary: RodeoReader,
    pub(crate) automata: [Automaton; 2],
    pub(crate) template_names: Vec<String>,
}

impl PatternGraph {
    #[inline]
    pub fn node(&self, id: NodeId) -> &PatternNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn automaton(&self, direction: Direction) -> &Automaton {
        &self.automata[direction.index()]
    }

    pub fn root(&self, direction: Direction) -> NodeId {
        self.automaton(direction).root
    }

    /// Interned key for a normalized token, if any template uses it
    #[inline]
    pub fn key(&self, token: &str) -> Option<Spur> {
        self.vocabulary.get(token)
    }

    /// Number of distinct literal tokens
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Name of the template an alternative belongs to
    pub fn template_name(&self, id: TemplateId) -> Option<&str> {
        self.template_names.get(id.0 as usize).map(String::as_str)
    }

    pub fn template_count(&self) -> usize {
        self.template_names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_graph_is_send_sync() {
        assert_send_sync::<PatternGraph>();
    }

    #[test]
    fn test_role_union_is_idempotent() {
        let mut role = NodeRole::PLAIN;
        role |= NodeRole::TERMINATES_MATCH;
        role |= NodeRole::TERMINATES_MATCH;
        assert_eq!(role, NodeRole::TERMINATES_MATCH);
        assert!(!role.contains(NodeRole::TERMINATES_FRAGMENT));

        role |= NodeRole::TERMINATES_FRAGMENT;
        assert!(role.contains(NodeRole::TERMINATES_MATCH | NodeRole::TERMINATES_FRAGMENT));
    }

    #[test]
    fn test_plain_is_empty_default() {
        assert_eq!(NodeRole::default(), NodeRole::PLAIN);
        assert!(NodeRole::PLAIN.is_empty());
        assert!(NodeRole::TERMINATES_MATCH.contains(NodeRole::PLAIN));
    }

    #[test]
    fn test_template_id_order() {
        assert!(TemplateId(0) < TemplateId(1));
        assert_eq!(TemplateId(3).max(TemplateId(2)), TemplateId(3));
    }
}
