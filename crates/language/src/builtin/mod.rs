//! Built-in grammars for every language in the catalog.
//!
//! Grammars are plain data compiled on demand. [`BuiltinLoader`] compiles them on
//! the blocking pool so the interactive path never pays for regex construction.

use std::sync::Arc;

use async_trait::async_trait;
use codefence_worker::{TaskClass, join_error_panic_message, spawn_blocking};

use crate::grammar::{Grammar, GrammarError};
use crate::registry::GrammarLoader;
use crate::rules::{RuleGrammar, RuleGrammarBuilder, words};

mod clike;
mod data;
mod scripting;

pub(crate) const C_COMMENT: &str = r"//.*|/\*[\s\S]*?\*/";
pub(crate) const DQ_STRING: &str = r#""(?:\\.|[^"\\\n])*""#;
pub(crate) const SQ_STRING: &str = r"'(?:\\.|[^'\\\n])*'";
pub(crate) const NUMBER: &str = r"\b0[xX][\da-fA-F_]+\b|\b0[bB][01_]+\b|(?:\b\d[\d_]*(?:\.\d[\d_]*)?|\B\.\d+)(?:[eE][+-]?\d+)?\b";
pub(crate) const FUNCTION: &str = r"\b(?P<t>[A-Za-z_]\w*)\s*\(";
pub(crate) const IDENTIFIER: &str = r"\b[A-Za-z_]\w*\b";
pub(crate) const OPERATOR: &str = r"[-+*/%=!<>&|^~?]+";
pub(crate) const PUNCTUATION: &str = r"[{}\[\]();,.:]";
pub(crate) const CLASS_NAME: &str = r"\b(?:class|struct|interface|enum|trait|type|impl|new|extends|implements)\s+(?P<t>[A-Za-z_]\w*)";

type BuildFn = fn() -> Result<RuleGrammar, GrammarError>;

/// Returns the constructor for a built-in grammar.
fn constructor(tag: &str) -> Option<BuildFn> {
	let build: BuildFn = match tag {
		"bash" => scripting::bash,
		"clike" => clike::c,
		"csharp" => clike::csharp,
		"css" => data::css,
		"go" => clike::go,
		"java" => clike::java,
		"javascript" => clike::javascript,
		"json" => data::json,
		"markup" => data::markup,
		"objectivec" => clike::objectivec,
		"perl" => scripting::perl,
		"php" => scripting::php,
		"powershell" => scripting::powershell,
		"python" => scripting::python,
		"ruby" => scripting::ruby,
		"rust" => clike::rust,
		"sql" => data::sql,
		"typescript" => clike::typescript,
		"yaml" => data::yaml,
		_ => return None,
	};
	Some(build)
}

/// Compiles a built-in grammar synchronously.
///
/// Returns `None` for tags without a built-in grammar.
pub fn builtin_grammar(tag: &str) -> Option<Result<RuleGrammar, GrammarError>> {
	constructor(tag).map(|build| build())
}

/// Loader for the built-in grammars.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinLoader;

impl BuiltinLoader {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl GrammarLoader for BuiltinLoader {
	fn provides(&self, language: &str) -> bool {
		constructor(language).is_some()
	}

	async fn load(&self, language: &str) -> Result<Arc<dyn Grammar>, GrammarError> {
		let build = constructor(language).ok_or_else(|| GrammarError::NotFound(language.to_string()))?;
		let grammar = spawn_blocking(TaskClass::CpuBlocking, build).await.map_err(|err| GrammarError::LoadFailed {
			language: language.to_string(),
			reason: join_error_panic_message(err).unwrap_or_else(|| "compile task cancelled".to_string()),
		})??;
		Ok(Arc::new(grammar))
	}
}

/// Appends the rules shared by most languages, in priority order.
pub(crate) fn common_tail(b: RuleGrammarBuilder, keywords: &str, constants: &[&str], builtins: &[&str]) -> RuleGrammarBuilder {
	let mut b = b.rule("class-name", CLASS_NAME).rule("keyword", keywords);
	if !constants.is_empty() {
		b = b.rule("boolean", words(constants));
	}
	if !builtins.is_empty() {
		b = b.rule("builtin", words(builtins));
	}
	b.rule("function", FUNCTION)
		.rule("number", NUMBER)
		.rule("identifier", IDENTIFIER)
		.rule("operator", OPERATOR)
		.rule("punctuation", PUNCTUATION)
}

/// Grammar for `{ ... }` style interpolations whose body is the enclosing language.
pub(crate) fn interpolation(open: &str) -> RuleGrammarBuilder {
	RuleGrammar::builder("interpolation")
		.rule("punctuation", format!(r"^{}|\}}$", regex::escape(open)))
		.rest_root()
}
