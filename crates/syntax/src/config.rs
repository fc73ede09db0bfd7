//! Highlighter configuration.
//!
//! Every field is optional in TOML; missing fields take their defaults.
//!
//! ```toml
//! code_block_type = "code_block"
//! defer_delay_ms = 10
//!
//! [grammar]
//! max_attempts = 3
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use codefence_language::{GrammarRegistry, RetryPolicy, TokenizeLimits};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a [`HighlightConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The file is not valid TOML or does not match the schema.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// A value is out of its allowed range.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration of a highlight pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
	/// Node type designated as highlightable code block.
	pub code_block_type: String,
	/// Delay of the first pass after mounting, in milliseconds.
	pub defer_delay_ms: u64,
	/// Token budget per region; regions over budget render plain.
	pub max_tokens_per_region: usize,
	/// Maximum nesting depth of embedded grammars.
	pub max_nesting_depth: usize,
	/// Grammar load retry behaviour.
	pub grammar: GrammarConfig,
}

impl Default for HighlightConfig {
	fn default() -> Self {
		let limits = TokenizeLimits::default();
		Self {
			code_block_type: "code_block".to_string(),
			defer_delay_ms: 10,
			max_tokens_per_region: limits.max_tokens,
			max_nesting_depth: limits.max_depth,
			grammar: GrammarConfig::default(),
		}
	}
}

/// The `[grammar]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrammarConfig {
	pub max_attempts: u32,
	pub backoff_base_ms: u64,
	pub backoff_max_ms: u64,
}

impl Default for GrammarConfig {
	fn default() -> Self {
		let retry = RetryPolicy::default();
		Self {
			max_attempts: retry.max_attempts,
			backoff_base_ms: retry.backoff_base.as_millis() as u64,
			backoff_max_ms: retry.backoff_max.as_millis() as u64,
		}
	}
}

impl HighlightConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	pub fn validate(&self) -> Result<()> {
		if self.code_block_type.is_empty() {
			return Err(ConfigError::Invalid("code_block_type must not be empty".into()));
		}
		if self.max_tokens_per_region == 0 {
			return Err(ConfigError::Invalid("max_tokens_per_region must be positive".into()));
		}
		if self.grammar.max_attempts == 0 {
			return Err(ConfigError::Invalid("grammar.max_attempts must be positive".into()));
		}
		if self.grammar.backoff_base_ms > self.grammar.backoff_max_ms {
			return Err(ConfigError::Invalid("grammar.backoff_base_ms exceeds grammar.backoff_max_ms".into()));
		}
		Ok(())
	}

	pub fn defer_delay(&self) -> Duration {
		Duration::from_millis(self.defer_delay_ms)
	}

	pub fn limits(&self) -> TokenizeLimits {
		TokenizeLimits {
			max_tokens: self.max_tokens_per_region,
			max_depth: self.max_nesting_depth,
		}
	}

	pub fn retry_policy(&self) -> RetryPolicy {
		RetryPolicy {
			max_attempts: self.grammar.max_attempts,
			backoff_base: Duration::from_millis(self.grammar.backoff_base_ms),
			backoff_max: Duration::from_millis(self.grammar.backoff_max_ms),
		}
	}

	/// Registry of the built-in grammars, retrying loads per the `[grammar]` section.
	///
	/// One registry is meant to be shared by every pass in the process.
	pub fn registry(&self) -> GrammarRegistry {
		GrammarRegistry::builtin(self.retry_policy())
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn test_empty_document_yields_defaults() {
		assert_eq!(HighlightConfig::from_toml_str("").unwrap(), HighlightConfig::default());
		let config = HighlightConfig::default();
		assert_eq!(config.defer_delay(), Duration::from_millis(10));
		assert_eq!(config.limits(), TokenizeLimits::default());
		assert_eq!(config.retry_policy(), RetryPolicy::default());
	}

	#[test]
	fn test_partial_document_overrides_fields() {
		let config = HighlightConfig::from_toml_str(
			r#"
code_block_type = "fence"
max_nesting_depth = 4

[grammar]
max_attempts = 5
"#,
		)
		.unwrap();
		assert_eq!(config.code_block_type, "fence");
		assert_eq!(config.max_nesting_depth, 4);
		assert_eq!(config.defer_delay_ms, 10);
		assert_eq!(config.grammar.max_attempts, 5);
		assert_eq!(config.grammar.backoff_base_ms, 250);
		assert_eq!(config.retry_policy().backoff_max, Duration::from_secs(10));
	}

	#[test]
	fn test_grammar_section_reaches_registry() {
		let config = HighlightConfig::from_toml_str("[grammar]\nmax_attempts = 1\nbackoff_base_ms = 50\nbackoff_max_ms = 400").unwrap();
		let policy = config.registry().retry_policy();
		assert_eq!(policy.max_attempts, 1);
		assert_eq!(policy.backoff_base, Duration::from_millis(50));
		assert_eq!(policy.backoff_max, Duration::from_millis(400));
	}

	#[test]
	fn test_unknown_fields_are_rejected() {
		assert!(matches!(HighlightConfig::from_toml_str("colour = true"), Err(ConfigError::Parse(_))));
	}

	#[test]
	fn test_validation() {
		let err = HighlightConfig::from_toml_str("[grammar]\nmax_attempts = 0").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)));
		let err = HighlightConfig::from_toml_str("max_tokens_per_region = 0").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)));
		let err = HighlightConfig::from_toml_str("[grammar]\nbackoff_base_ms = 20000").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)));
	}

	#[test]
	fn test_load_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "defer_delay_ms = 25").unwrap();
		let config = HighlightConfig::load(file.path()).unwrap();
		assert_eq!(config.defer_delay(), Duration::from_millis(25));

		let missing = file.path().with_extension("missing");
		assert!(matches!(HighlightConfig::load(&missing), Err(ConfigError::Io { path, .. }) if path == missing));
	}
}
