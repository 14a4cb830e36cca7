//! Atomically published engine for long-running callers
//!
//! Readers take a cheap `Arc` snapshot with [`SharedEngine::load`] and keep
//! using it for as long as they like. A new ignore set or grammar is applied
//! by building a complete engine off to the side and swapping it in, so no
//! reader ever observes a half-built graph.

use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::builder::build_str;
use crate::ignore::IgnoreSet;
use crate::stripper::BaseFormEngine;

#[derive(Debug)]
pub struct SharedEngine {
    current: RwLock<Arc<BaseFormEngine>>,
}

impl SharedEngine {
    pub fn new(engine: BaseFormEngine) -> Self {
        Self {
            current: RwLock::new(Arc::new(engine)),
        }
    }

    /// Snapshot of the engine published last
    pub fn load(&self) -> Arc<BaseFormEngine> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }

    /// Replace the current engine
    pub fn publish(&self, engine: BaseFormEngine) {
        let engine = Arc::new(engine);
        debug!(
            nodes = engine.graph().node_count(),
            ignored = engine.ignored().len(),
            "publishing engine"
        );
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = engine;
    }

    /// Publish an engine with a new ignore set on a worker thread.
    ///
    /// The compiled graph and config of the current engine are reused.
    pub fn rebuild_in_background(self: &Arc<Self>, ignore: IgnoreSet) -> JoinHandle<()> {
        let shared = Arc::clone(self);
        thread::spawn(move || {
            let engine = shared.load().as_ref().clone().with_ignored(ignore);
            shared.publish(engine);
        })
    }

    /// Compile `source` on a worker thread and publish it on success.
    ///
    /// The ignore set and config of the current engine carry over. On a
    /// build error the current engine stays published.
    pub fn replace_grammar_in_background(self: &Arc<Self>, source: String) -> JoinHandle<()> {
        let shared = Arc::clone(self);
        thread::spawn(move || match build_str(&source) {
            Ok(graph) => {
                let current = shared.load();
                let engine = BaseFormEngine::new(Arc::new(graph))
                    .with_ignored(current.ignored().clone())
                    .with_config(current.config());
                shared.publish(engine);
            }
            Err(err) => warn!(error = %err, "grammar rebuild failed, keeping current engine"),
        })
    }
}
