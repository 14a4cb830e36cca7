//! Grammar compilation to a pattern graph
//!
//! Every template alternative is inserted as a chain of nodes from its
//! direction's root. Literal runs are merged trie-style and fragment
//! references splice in a link node pointing at the fragment's single shared
//! subgraph. Suffix templates and the fragments they use are inserted in
//! reverse, so the walker only ever reads forward.

use std::time::Instant;

use lasso::{Rodeo, Spur};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::fragment::{FragmentHandle, FragmentRegistry};
use crate::grammar::{Element, FragmentDef, Grammar, GrammarError, Sequence, TemplateDef};
use crate::graph::{Automaton, Direction, NodeId, NodeRole, PatternGraph, PatternNode, TemplateId};

/// Error during graph construction
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("Build error: Undefined fragment {{{name}}} referenced from {from}")]
    UndefinedFragment { name: String, from: String },

    #[error("Build error: Fragment cycle: {}", .0.join(" -> "))]
    FragmentCycle(Vec<String>),
}

/// Parse grammar source and build its graph
pub fn build_str(source: &str) -> Result<PatternGraph, BuildError> {
    let grammar = Grammar::parse(source)?;
    build(&grammar)
}

/// Compile a grammar into an immutable pattern graph
pub fn build(grammar: &Grammar) -> Result<PatternGraph, BuildError> {
    let started = Instant::now();

    check_template_references(grammar)?;
    let order = fragment_order(grammar)?;

    let mut builder = GraphBuilder::new();
    let forward = builder.automaton(grammar, &order, Direction::Forward)?;
    let backward = builder.automaton(grammar, &order, Direction::Backward)?;

    let template_names = alternatives(grammar)
        .map(|(_, template, _)| template.name.clone())
        .collect();

    let graph = PatternGraph {
        nodes: builder.nodes,
        vocabulary: builder.vocabulary.into_reader(),
        automata: [forward, backward],
        template_names,
    };

    debug!(
        nodes = graph.node_count(),
        vocabulary = graph.vocabulary_size(),
        fragments = grammar.fragments().len(),
        templates = graph.template_count(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "built pattern graph"
    );

    Ok(graph)
}

/// All template alternatives with their ids, in declaration order
fn alternatives(grammar: &Grammar) -> impl Iterator<Item = (TemplateId, &TemplateDef, &Sequence)> {
    grammar
        .templates()
        .iter()
        .flat_map(|template| template.alternatives.iter().map(move |seq| (template, seq)))
        .enumerate()
        .map(|(idx, (template, seq))| (TemplateId(idx as u32), template, seq))
}

fn check_template_references(grammar: &Grammar) -> Result<(), BuildError> {
    for template in grammar.templates() {
        for name in template.alternatives.iter().flat_map(|s| s.references()) {
            if grammar.fragment(name).is_none() {
                return Err(BuildError::UndefinedFragment {
                    name: name.to_string(),
                    from: template.name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

/// Order fragments so that every fragment comes after the ones it references.
///
/// Fails on undefined references and on reference cycles.
fn fragment_order(grammar: &Grammar) -> Result<Vec<&FragmentDef>, BuildError> {
    let mut marks = FxHashMap::default();
    let mut path = Vec::new();
    let mut order = Vec::with_capacity(grammar.fragments().len());

    for fragment in grammar.fragments() {
        visit_fragment(grammar, fragment, &mut marks, &mut path, &mut order)?;
    }

    Ok(order)
}

fn visit_fragment<'g>(
    grammar: &'g Grammar,
    fragment: &'g FragmentDef,
    marks: &mut FxHashMap<&'g str, Mark>,
    path: &mut Vec<&'g str>,
    order: &mut Vec<&'g FragmentDef>,
) -> Result<(), BuildError> {
    match marks.get(fragment.name.as_str()) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Active) => {
            let start = path
                .iter()
                .position(|name| *name == fragment.name)
                .unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
            cycle.push(fragment.name.clone());
            return Err(BuildError::FragmentCycle(cycle));
        }
        None => {}
    }

    marks.insert(fragment.name.as_str(), Mark::Active);
    path.push(fragment.name.as_str());

    for name in fragment.alternatives.iter().flat_map(|s| s.references()) {
        let Some(dependency) = grammar.fragment(name) else {
            return Err(BuildError::UndefinedFragment {
                name: name.to_string(),
                from: fragment.name.clone(),
            });
        };
        visit_fragment(grammar, dependency, marks, path, order)?;
    }

    path.pop();
    marks.insert(fragment.name.as_str(), Mark::Done);
    order.push(fragment);
    Ok(())
}

/// Mutable arena used only while building
struct GraphBuilder {
    nodes: Vec<PatternNode>,
    vocabulary: Rodeo,
}

impl GraphBuilder {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            vocabulary: Rodeo::default(),
        }
    }

    fn add_node(&mut self) -> NodeId {
        self.nodes.push(PatternNode::default());
        self.nodes.len() - 1
    }

    /// Literal child of `parent`, created if missing
    fn child(&mut self, parent: NodeId, key: Spur) -> NodeId {
        if let Some(&child) = self.nodes[parent].children.get(&key) {
            return child;
        }
        let child = self.add_node();
        self.nodes[parent].children.insert(key, child);
        child
    }

    /// Link node from `parent` into `fragment`, created if missing
    fn link(&mut self, parent: NodeId, fragment: FragmentHandle) -> NodeId {
        let existing = self.nodes[parent]
            .links
            .iter()
            .copied()
            .find(|&link| self.nodes[link].fragment.map(|h| h.id) == Some(fragment.id));
        if let Some(link) = existing {
            return link;
        }
        let link = self.add_node();
        self.nodes[link].fragment = Some(fragment);
        self.nodes[parent].links.push(link);
        link
    }

    /// Insert one sequence below `from` and return the node it ends on
    fn insert(
        &mut self,
        from: NodeId,
        sequence: &Sequence,
        direction: Direction,
        registry: &FragmentRegistry,
        owner: &str,
    ) -> Result<NodeId, BuildError> {
        let mut elements: Vec<&Element> = sequence.elements.iter().collect();
        if direction == Direction::Backward {
            elements.reverse();
        }

        let mut current = from;
        for element in elements {
            current = match element {
                Element::Literal(text) => {
                    let key = self.vocabulary.get_or_intern(text);
                    self.child(current, key)
                }
                Element::Fragment(name) => {
                    let Some(fragment) = registry.resolve(name) else {
                        return Err(BuildError::UndefinedFragment {
                            name: name.clone(),
                            from: owner.to_string(),
                        });
                    };
                    self.link(current, fragment)
                }
            };
        }
        Ok(current)
    }

    /// Build fragments and templates for one direction
    fn automaton(
        &mut self,
        grammar: &Grammar,
        fragments: &[&FragmentDef],
        direction: Direction,
    ) -> Result<Automaton, BuildError> {
        let mut registry = FragmentRegistry::new();

        for fragment in fragments {
            let root = self.add_node();
            for sequence in &fragment.alternatives {
                let end = self.insert(root, sequence, direction, &registry, &fragment.name)?;
                self.nodes[end].role |= NodeRole::TERMINATES_FRAGMENT;
            }
            registry.register(&fragment.name, root);
        }

        let root = self.add_node();
        for (id, template, sequence) in alternatives(grammar) {
            if template.direction != direction {
                continue;
            }
            let end = self.insert(root, sequence, direction, &registry, &template.name)?;
            let node = &mut self.nodes[end];
            node.role |= NodeRole::TERMINATES_MATCH;
            node.template = Some(node.template.map_or(id, |existing| existing.min(id)));
        }

        Ok(Automaton {
            root,
            fragments: registry,
        })
    }
}
