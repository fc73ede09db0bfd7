//! Token stream produced by grammars.

use codefence_primitives::Labels;
use thiserror::Error;

use crate::grammar::Grammar;

/// A classified span of region text.
///
/// Offsets are character offsets relative to the region's content start.
/// `labels` accumulates the labels of every enclosing scope, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub start: usize,
	pub end: usize,
	pub labels: Labels,
}

/// Bounds that keep a single region from monopolizing a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeLimits {
	/// Maximum number of tokens a region may produce.
	pub max_tokens: usize,
	/// Maximum nesting depth of embedded grammars.
	pub max_depth: usize,
}

impl Default for TokenizeLimits {
	fn default() -> Self {
		Self {
			max_tokens: 100_000,
			max_depth: 8,
		}
	}
}

/// Errors raised while tokenizing a region.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenizeError {
	#[error("region produced more than {limit} tokens")]
	TooManyTokens { limit: usize },
	#[error("grammar nesting exceeded depth {limit}")]
	NestingTooDeep { limit: usize },
	#[error("grammar '{grammar}' returned a malformed token at index {index}")]
	MalformedOutput { grammar: String, index: usize },
}

/// Tokenizes `text` with `grammar` and checks the result.
///
/// Pure and deterministic. A grammar whose output is out of bounds, unordered or
/// overlapping is reported as [`TokenizeError::MalformedOutput`] rather than
/// passed on.
pub fn tokenize(text: &str, grammar: &dyn Grammar, limits: &TokenizeLimits) -> Result<Vec<Token>, TokenizeError> {
	let tokens = grammar.tokenize(text, limits)?;
	if tokens.len() > limits.max_tokens {
		return Err(TokenizeError::TooManyTokens { limit: limits.max_tokens });
	}

	let len_chars = text.chars().count();
	let mut prev_end = 0;
	for (index, token) in tokens.iter().enumerate() {
		if token.start < prev_end || token.start >= token.end || token.end > len_chars {
			return Err(TokenizeError::MalformedOutput {
				grammar: grammar.name().to_string(),
				index,
			});
		}
		prev_end = token.end;
	}
	Ok(tokens)
}
