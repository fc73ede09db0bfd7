//! Grammar abstraction.
//!
//! A grammar is the language-specific ruleset that classifies text into syntax
//! categories. The highlighter only depends on [`Grammar`]; the built-in engine is
//! [`crate::rules::RuleGrammar`], but hosts can plug in any tokenizer.

use std::fmt;

use thiserror::Error;

use crate::tokenizer::{Token, TokenizeError, TokenizeLimits};

/// Errors that can occur when loading a grammar.
#[derive(Error, Debug)]
pub enum GrammarError {
	/// No loader provides this language.
	#[error("grammar not found: {0}")]
	NotFound(String),

	/// A grammar pattern failed to compile.
	#[error("grammar '{grammar}' has an invalid pattern for '{label}': {source}")]
	InvalidPattern {
		grammar: String,
		label: String,
		#[source]
		source: Box<regex::Error>,
	},

	/// The loader failed for a reason of its own (fetch, decode, ...).
	#[error("failed to load grammar '{language}': {reason}")]
	LoadFailed { language: String, reason: String },

	/// The load task ended without reporting a result.
	#[error("grammar load for '{0}' was abandoned")]
	Abandoned(String),
}

/// A language-specific tokenizer.
///
/// Implementations must be pure: the same text always yields the same tokens.
/// Returned offsets are character offsets relative to the start of `text`, in
/// ascending order and non-overlapping. Text not covered by a token is plain.
pub trait Grammar: Send + Sync + fmt::Debug {
	/// Name of the language this grammar classifies.
	fn name(&self) -> &str;

	/// Classifies `text` into labeled spans.
	fn tokenize(&self, text: &str, limits: &TokenizeLimits) -> Result<Vec<Token>, TokenizeError>;
}
