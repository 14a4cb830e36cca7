//! Built-in scaffolding grammar for English and Russian dictionary headwords

use crate::builder::{BuildError, build_str};
use crate::graph::PatternGraph;

/// Default grammar source.
///
/// Order matters: among matches of equal length the earlier alternative
/// wins, so `to-be-prep` is declared before the generic support-verb forms.
pub const DEFAULT_GRAMMAR: &str = r#"
// Shared fragments

fragment verbs =
    be | have | get | go | make | do | take | give | put | keep
  | come | set | bring | let | run | turn | hold | fall | pay | catch;

fragment possessives =
    my | your | his | her | its | our | their
  | "one's" | "smb's" | "somebody's" | "smth's";

fragment articles =
    a | an | the | this | that | these | those | some | any | no
  | next | {possessives};

fragment prepositions =
    at | in | on | to | up | "up to" | for | with | by | from | into
  | about | of | off | out | "out of" | over | under | through | after
  | down | away | back | along | across;

fragment superlatives =
    the most | the least | the best | the worst | the first | the last
  | the shortest | the longest | the fastest | the highest | the lowest;

fragment pronouns =
    smb | smth | sth | sb | somebody | something | someone | oneself;

fragment ru-pronouns =
    что-л | кого-л | чего-л | кому-л | чему-л | кем-л | чем-л | ком-л;

fragment et-cetera = и т.п | т.п | и т.д | т.д | etc;

// Leading scaffolding

prefix infinitive = to;
prefix to-be-prep = to be {prepositions};
prefix support-verb = to {verbs};
prefix support-verb-article = to {verbs} {articles};
prefix support-verb-prep = to {verbs} {prepositions};
prefix support-verb-prep-article = to {verbs} {prepositions} {articles};
prefix support-verb-to-superlative = to {verbs} to {superlatives};
prefix article = {articles};

// Trailing markers

suffix pronoun = {pronouns};
suffix reflexive = "(ся)" | "(сь)";
suffix ru-pronoun = {ru-pronouns} | {ru-pronouns} .;
suffix et-cetera = {et-cetera} | {et-cetera} .;
"#;

/// Compile [`DEFAULT_GRAMMAR`]
pub fn default_graph() -> Result<PatternGraph, BuildError> {
    build_str(DEFAULT_GRAMMAR)
}
