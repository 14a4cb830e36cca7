//! Shared fragment registry
//!
//! A fragment is a named subgraph for a bounded set of alternatives (support
//! verbs, articles, prepositions). Templates link to the one registered
//! instance instead of copying it, which keeps the graph a DAG.

use rustc_hash::FxHashMap;

use crate::graph::NodeId;

/// Index of a fragment within one direction's registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentId(pub u32);

/// A resolved fragment: its id and the root node of its subgraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentHandle {
    pub id: FragmentId,
    pub root: NodeId,
}

/// Owns the name -> fragment mapping for one compiled direction
#[derive(Debug, Clone, Default)]
pub struct FragmentRegistry {
    by_name: FxHashMap<String, FragmentHandle>,
    names: Vec<String>,
}

impl FragmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fragment rooted at `root`.
    ///
    /// Registering a name again returns the handle from the first call.
    pub fn register(&mut self, name: &str, root: NodeId) -> FragmentHandle {
        if let Some(handle) = self.by_name.get(name) {
            return *handle;
        }
        let handle = FragmentHandle {
            id: FragmentId(self.names.len() as u32),
            root,
        };
        self.by_name.insert(name.to_string(), handle);
        self.names.push(name.to_string());
        handle
    }

    pub fn resolve(&self, name: &str) -> Option<FragmentHandle> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: FragmentId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
