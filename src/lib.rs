//! Baseform: scaffolding-phrase matching for dictionary headwords
//!
//! Recognizes and strips scaffolding such as "to {verb} {article}" or a
//! trailing "smb" from English and Russian headwords, leaving a canonical
//! base form for sorting, deduplication and grouping.
//!
//! ```
//! use baseform::BaseFormEngine;
//!
//! let engine = BaseFormEngine::english().unwrap();
//! assert_eq!(engine.compute_base_form("To go at"), "go at");
//! assert_eq!(engine.remove_match("a door to success"), "door to success");
//! ```

// Core modules
pub mod builder; // Grammar to pattern graph compilation
pub mod fragment; // Shared fragment registry
pub mod grammar; // Template grammar parser
pub mod graph; // Pattern node arena and compiled graph
pub mod ignore; // Caller-protected headwords
pub mod shared; // Atomically published engine
pub mod stripper; // Match removal and base forms
pub mod templates; // Built-in English and Russian grammar
pub mod token; // Normalization and tokenization
pub mod walker; // Longest-match traversal

// Re-exports for convenience
pub use builder::{BuildError, build, build_str};
pub use grammar::{Grammar, GrammarError, Sequence};
pub use graph::{Direction, PatternGraph, TemplateId};
pub use ignore::IgnoreSet;
pub use shared::SharedEngine;
pub use stripper::{BaseFormEngine, Stripper, StripperConfig};
pub use templates::{DEFAULT_GRAMMAR, default_graph};
pub use token::{Phrase, Token, normalize, tokenize};
pub use walker::{MatchEnd, Walker};
