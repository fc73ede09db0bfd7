// Grammar operations run inside the host's change loop; report through tracing, not stderr.
#![deny(clippy::print_stderr)]

//! Languages and grammars for code-block highlighting.
//!
//! # Architecture
//!
//! * [`catalog`]: selectable language tags and their display names
//! * [`grammar`]: the [`Grammar`] trait every tokenizer engine implements
//! * [`rules`]: the built-in regex rule engine ([`RuleGrammar`])
//! * [`builtin`]: built-in grammars for every catalog language
//! * [`tokenizer`]: checked, region-relative token streams
//! * [`registry`]: the shared [`GrammarRegistry`] with single-flight loading

pub mod builtin;
pub mod catalog;
pub mod grammar;
pub mod registry;
pub mod rules;
pub mod tokenizer;

pub use builtin::{BuiltinLoader, builtin_grammar};
pub use catalog::{LANGUAGES, PLAIN, is_plain, language_name};
pub use grammar::{Grammar, GrammarError};
pub use registry::{GrammarLoad, GrammarLoader, GrammarRegistry, GrammarRegistryBuilder, GrammarStatus, LoadOutcome, RetryPolicy};
pub use rules::{RuleGrammar, RuleGrammarBuilder, words};
pub use tokenizer::{Token, TokenizeError, TokenizeLimits, tokenize};
