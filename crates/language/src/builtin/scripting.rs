//! Grammars for dynamic scripting languages and shells.

use super::{DQ_STRING, NUMBER, OPERATOR, PUNCTUATION, SQ_STRING, common_tail, interpolation};
use crate::grammar::GrammarError;
use crate::rules::{RuleGrammar, RuleGrammarBuilder, words};

const HASH_COMMENT: &str = r"#.*";

/// Grammar for variables interpolated into double-quoted strings.
fn variables_in_string(name: &str, variable: &str) -> RuleGrammarBuilder {
	RuleGrammar::builder(name).rule("variable", variable)
}

pub(super) fn python() -> Result<RuleGrammar, GrammarError> {
	const KEYWORDS: &[&str] = &[
		"and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif", "else", "except", "finally", "for", "from",
		"global", "if", "import", "in", "is", "lambda", "match", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with",
		"yield",
	];
	const BUILTINS: &[&str] = &[
		"abs", "all", "any", "bool", "bytes", "dict", "enumerate", "filter", "float", "format", "getattr", "hasattr", "input", "int",
		"isinstance", "iter", "len", "list", "map", "max", "min", "next", "object", "open", "print", "range", "repr", "reversed", "round", "set",
		"setattr", "sorted", "str", "sum", "super", "tuple", "type", "zip",
	];
	common_tail(
		RuleGrammar::builder("python")
			.rule("comment", HASH_COMMENT)
			.rule("string", r#"(?:\b(?i:[rub]|rb|br))?(?:"""[\s\S]*?"""|'''[\s\S]*?''')"#)
			.nested(
				"string",
				r#"\b(?i:f|rf|fr)(?:"(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*')"#,
				RuleGrammar::builder("f-string").nested("interpolation", r"\{[^{}]*\}", interpolation("{")),
			)
			.rule("string", r#"\b(?i:[rub]|rb|br)(?:"(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*')"#)
			.rule("string", DQ_STRING)
			.rule("string", SQ_STRING)
			.rule("decorator", r"(?m)^[ \t]*(?P<t>@[\w.]+)"),
		&words(KEYWORDS),
		&["True", "False", "None"],
		BUILTINS,
	)
	.build()
}

pub(super) fn ruby() -> Result<RuleGrammar, GrammarError> {
	const KEYWORDS: &[&str] = &[
		"BEGIN", "END", "alias", "and", "begin", "break", "case", "class", "def", "defined", "do", "else", "elsif", "end", "ensure", "for", "if",
		"in", "module", "next", "not", "or", "redo", "rescue", "retry", "return", "self", "super", "then", "undef", "unless", "until", "when",
		"while", "yield",
	];
	common_tail(
		RuleGrammar::builder("ruby")
			.rule("comment", r"(?m)^=begin\b[\s\S]*?^=end\b.*|#.*")
			.nested(
				"string",
				r#""(?:\\.|#\{[^{}]*\}|[^"\\])*""#,
				RuleGrammar::builder("interpolated-string").nested("interpolation", r"#\{[^{}]*\}", interpolation("#{")),
			)
			.rule("string", SQ_STRING)
			.rule("symbol", r"(?:^|[^:\w])(?P<t>:[A-Za-z_]\w*[?!]?)")
			.rule("variable", r"@@?[A-Za-z_]\w*|\$[A-Za-z_]\w*"),
		&words(KEYWORDS),
		&["true", "false", "nil"],
		&["attr_accessor", "attr_reader", "attr_writer", "include", "extend", "puts", "print", "require", "require_relative", "raise"],
	)
	.build()
}

pub(super) fn perl() -> Result<RuleGrammar, GrammarError> {
	const KEYWORDS: &[&str] = &[
		"and", "cmp", "continue", "do", "else", "elsif", "eq", "for", "foreach", "ge", "gt", "if", "last", "le", "local", "lt", "my", "ne", "next",
		"no", "not", "or", "our", "package", "redo", "require", "return", "sub", "unless", "until", "use", "while", "xor",
	];
	const VARIABLE: &str = r"[$@%]\{?\^?[A-Za-z_]\w*(?:::\w+)*\}?|\$[0-9&`'+!@/\\,;.]";
	common_tail(
		RuleGrammar::builder("perl")
			.rule("comment", r"(?m)^=\w+[\s\S]*?^=cut\b.*|#.*")
			.nested("string", DQ_STRING, variables_in_string("interpolated-string", r"[$@]\{?[A-Za-z_]\w*\}?"))
			.rule("string", SQ_STRING)
			.rule("regex", r"\b(?:m|qr)/(?:\\.|[^/\\\n])*/[a-z]*|\bs/(?:\\.|[^/\\\n])*/(?:\\.|[^/\\\n])*/[a-z]*")
			.rule("variable", VARIABLE),
		&words(KEYWORDS),
		&[],
		&["chomp", "chop", "die", "exists", "join", "keys", "length", "open", "print", "printf", "push", "shift", "split", "values", "warn"],
	)
	.build()
}

pub(super) fn php() -> Result<RuleGrammar, GrammarError> {
	const KEYWORDS: &[&str] = &[
		"abstract", "and", "array", "as", "break", "callable", "case", "catch", "class", "clone", "const", "continue", "declare", "default", "do",
		"echo", "else", "elseif", "empty", "enum", "extends", "final", "finally", "fn", "for", "foreach", "function", "global", "if", "implements",
		"include", "include_once", "instanceof", "interface", "isset", "list", "match", "namespace", "new", "or", "print", "private", "protected",
		"public", "readonly", "require", "require_once", "return", "static", "switch", "throw", "trait", "try", "unset", "use", "var", "while",
		"xor", "yield",
	];
	common_tail(
		RuleGrammar::builder("php")
			.rule("comment", r"//.*|#.*|/\*[\s\S]*?\*/")
			.rule("delimiter", r"<\?(?:php\b|=)?|\?>")
			.nested("string", DQ_STRING, variables_in_string("interpolated-string", r"\$[A-Za-z_]\w*"))
			.rule("string", SQ_STRING)
			.rule("variable", r"\$+[A-Za-z_]\w*"),
		&format!("(?i){}", words(KEYWORDS)),
		&["true", "false", "null", "TRUE", "FALSE", "NULL"],
		&[],
	)
	.build()
}

pub(super) fn bash() -> Result<RuleGrammar, GrammarError> {
	const KEYWORDS: &[&str] = &[
		"case", "do", "done", "elif", "else", "esac", "fi", "for", "function", "if", "in", "select", "then", "until", "while",
	];
	const BUILTINS: &[&str] = &[
		"alias", "cd", "declare", "echo", "eval", "exec", "exit", "export", "local", "printf", "read", "readonly", "return", "set", "shift",
		"source", "test", "trap", "unset",
	];
	const VARIABLE: &str = r"\$(?:\{[^}]*\}|[A-Za-z_]\w*|[0-9#@?*!$-])";
	RuleGrammar::builder("bash")
		.rule("shebang", r"\A#!.*")
		.rule("comment", r"(?m)(?:^|[ \t;])(?P<t>#.*)")
		.nested("string", DQ_STRING, variables_in_string("interpolated-string", VARIABLE))
		.rule("string", r"'[^']*'")
		.rule("variable", VARIABLE)
		.rule("keyword", words(KEYWORDS))
		.rule("boolean", words(&["true", "false"]))
		.rule("builtin", words(BUILTINS))
		.rule("function", r"\b(?P<t>[A-Za-z_][\w-]*)\s*\(\)")
		.rule("number", NUMBER)
		.rule("operator", r"&&|\|\||[|&;<>]=?|!=?|==?")
		.rule("punctuation", r"[{}\[\]();]")
		.build()
}

pub(super) fn powershell() -> Result<RuleGrammar, GrammarError> {
	const KEYWORDS: &[&str] = &[
		"begin", "break", "catch", "class", "continue", "data", "do", "dynamicparam", "else", "elseif", "end", "enum", "exit", "filter", "finally",
		"for", "foreach", "function", "if", "in", "param", "process", "return", "switch", "throw", "trap", "try", "until", "using", "while",
	];
	const VARIABLE: &str = r"\$(?:\{[^}]*\}|[\w:?^$]+)";
	RuleGrammar::builder("powershell")
		.rule("comment", r"<#[\s\S]*?#>|#.*")
		.nested(
			"string",
			r#""(?:`[\s\S]|""|[^"`])*""#,
			variables_in_string("interpolated-string", VARIABLE),
		)
		.rule("string", r"'(?:''|[^'])*'")
		.rule("boolean", r"(?i)\$(?:true|false|null)\b")
		.rule("variable", VARIABLE)
		.rule("keyword", format!("(?i){}", words(KEYWORDS)))
		.rule(
			"operator",
			r"(?i)-(?:eq|ne|gt|ge|lt|le|like|notlike|match|notmatch|contains|notcontains|in|notin|replace|and|or|not|xor|is|isnot|as)\b",
		)
		.rule("function", r"\b[A-Za-z]+-[A-Za-z]\w*")
		.rule("number", NUMBER)
		.rule("operator", OPERATOR)
		.rule("punctuation", PUNCTUATION)
		.build()
}
