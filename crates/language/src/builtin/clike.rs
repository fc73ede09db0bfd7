//! C family grammars.

use super::{C_COMMENT, DQ_STRING, SQ_STRING, common_tail, interpolation};
use crate::grammar::GrammarError;
use crate::rules::{RuleGrammar, words};

const C_KEYWORDS: &[&str] = &[
	"auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else", "enum", "extern", "float", "for", "goto", "if", "inline",
	"int", "long", "register", "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned",
	"void", "volatile", "while",
];

const JS_KEYWORDS: &[&str] = &[
	"as", "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do", "else", "export",
	"extends", "finally", "for", "from", "function", "get", "if", "import", "in", "instanceof", "let", "new", "of", "return", "set", "static",
	"super", "switch", "this", "throw", "try", "typeof", "var", "void", "while", "with", "yield",
];

const TS_KEYWORDS: &[&str] = &[
	"abstract", "declare", "enum", "implements", "interface", "is", "keyof", "module", "namespace", "private", "protected", "public", "readonly",
	"satisfies", "type",
];

const JS_CONSTANTS: &[&str] = &["true", "false", "null", "undefined", "NaN", "Infinity"];

const TEMPLATE_STRING: &str = r"`(?:\\[\s\S]|[^\\`])*`";

const C_PREPROCESSOR: &str = r"(?m)^[ \t]*#[ \t]*\w+.*";

pub(super) fn c() -> Result<RuleGrammar, GrammarError> {
	common_tail(
		RuleGrammar::builder("clike")
			.rule("comment", C_COMMENT)
			.rule("macro", C_PREPROCESSOR)
			.rule("string", DQ_STRING)
			.rule("char", SQ_STRING),
		&words(C_KEYWORDS),
		&["true", "false", "NULL"],
		&[],
	)
	.build()
}

pub(super) fn objectivec() -> Result<RuleGrammar, GrammarError> {
	let keywords: Vec<&str> = C_KEYWORDS.iter().copied().chain(["id", "in", "nil", "self", "super", "Class", "SEL", "BOOL"]).collect();
	common_tail(
		RuleGrammar::builder("objectivec")
			.rule("comment", C_COMMENT)
			.rule("macro", C_PREPROCESSOR)
			.rule("string", r#"@?"(?:\\.|[^"\\\n])*""#)
			.rule("char", SQ_STRING)
			.rule(
				"keyword",
				r"@(?:interface|implementation|end|protocol|property|synthesize|dynamic|selector|class|public|private|protected|optional|required|autoreleasepool|try|catch|finally|throw|encode)\b",
			),
		&words(&keywords),
		&["YES", "NO", "true", "false", "NULL"],
		&[],
	)
	.build()
}

pub(super) fn csharp() -> Result<RuleGrammar, GrammarError> {
	const KEYWORDS: &[&str] = &[
		"abstract", "as", "async", "await", "base", "bool", "break", "byte", "case", "catch", "char", "checked", "class", "const", "continue",
		"decimal", "default", "delegate", "do", "double", "else", "enum", "event", "explicit", "extern", "finally", "fixed", "float", "for",
		"foreach", "get", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock", "long", "namespace", "new", "object",
		"operator", "out", "override", "params", "private", "protected", "public", "readonly", "record", "ref", "return", "sbyte", "sealed", "set",
		"short", "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "try", "typeof", "uint", "ulong", "unchecked",
		"unsafe", "ushort", "using", "var", "virtual", "void", "volatile", "when", "where", "while", "yield",
	];
	common_tail(
		RuleGrammar::builder("csharp")
			.rule("comment", C_COMMENT)
			.rule("macro", C_PREPROCESSOR)
			.nested(
				"string",
				r#"\$@?"(?:\{[^{}"]*\}|""|\\.|[^"\\{])*""#,
				RuleGrammar::builder("interpolated-string").nested("interpolation", r"\{[^{}]*\}", interpolation("{")),
			)
			.rule("string", r#"@"(?:""|[^"])*""#)
			.rule("string", DQ_STRING)
			.rule("char", SQ_STRING)
			.rule("attribute", r"(?m)^[ \t]*\[(?P<t>[A-Za-z_][\w.]*)"),
		&words(KEYWORDS),
		&["true", "false", "null"],
		&[],
	)
	.build()
}

pub(super) fn go() -> Result<RuleGrammar, GrammarError> {
	const KEYWORDS: &[&str] = &[
		"break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for", "func", "go", "goto", "if", "import",
		"interface", "map", "package", "range", "return", "select", "struct", "switch", "type", "var",
	];
	const BUILTINS: &[&str] = &[
		"append", "bool", "byte", "cap", "close", "complex", "copy", "delete", "error", "float32", "float64", "imag", "int", "int8", "int16",
		"int32", "int64", "len", "make", "new", "panic", "print", "println", "real", "recover", "rune", "string", "uint", "uint8", "uint16",
		"uint32", "uint64", "uintptr",
	];
	common_tail(
		RuleGrammar::builder("go")
			.rule("comment", C_COMMENT)
			.rule("string", r"`[^`]*`")
			.rule("string", DQ_STRING)
			.rule("char", SQ_STRING),
		&words(KEYWORDS),
		&["true", "false", "nil", "iota"],
		BUILTINS,
	)
	.build()
}

pub(super) fn java() -> Result<RuleGrammar, GrammarError> {
	const KEYWORDS: &[&str] = &[
		"abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const", "continue", "default", "do", "double", "else",
		"enum", "exports", "extends", "final", "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
		"long", "module", "native", "new", "non-sealed", "package", "permits", "private", "protected", "public", "record", "requires", "return",
		"sealed", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try", "var", "void",
		"volatile", "while", "yield",
	];
	common_tail(
		RuleGrammar::builder("java")
			.rule("comment", C_COMMENT)
			.rule("string", r#""""[\s\S]*?""""#)
			.rule("string", DQ_STRING)
			.rule("char", SQ_STRING)
			.rule("annotation", r"@\w+"),
		&words(KEYWORDS),
		&["true", "false", "null"],
		&[],
	)
	.build()
}

fn template_string() -> crate::rules::RuleGrammarBuilder {
	RuleGrammar::builder("template-string").nested("interpolation", r"\$\{[^{}]*\}", interpolation("${"))
}

pub(super) fn javascript() -> Result<RuleGrammar, GrammarError> {
	common_tail(
		RuleGrammar::builder("javascript")
			.rule("comment", C_COMMENT)
			.nested("template-string", TEMPLATE_STRING, template_string())
			.rule("string", DQ_STRING)
			.rule("string", SQ_STRING),
		&words(JS_KEYWORDS),
		JS_CONSTANTS,
		&["console", "window", "document", "globalThis", "require", "module"],
	)
	.build()
}

pub(super) fn typescript() -> Result<RuleGrammar, GrammarError> {
	let keywords: Vec<&str> = JS_KEYWORDS.iter().chain(TS_KEYWORDS).copied().collect();
	common_tail(
		RuleGrammar::builder("typescript")
			.rule("comment", C_COMMENT)
			.nested("template-string", TEMPLATE_STRING, template_string())
			.rule("string", DQ_STRING)
			.rule("string", SQ_STRING)
			.rule("decorator", r"@[A-Za-z_]\w*"),
		&words(&keywords),
		JS_CONSTANTS,
		&["any", "bigint", "boolean", "never", "number", "object", "string", "symbol", "unknown", "console"],
	)
	.build()
}

pub(super) fn rust() -> Result<RuleGrammar, GrammarError> {
	const KEYWORDS: &[&str] = &[
		"as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern", "fn", "for", "if", "impl", "in", "let",
		"loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "type", "unsafe",
		"use", "where", "while",
	];
	const PRIMITIVES: &[&str] = &[
		"bool", "char", "f32", "f64", "i8", "i16", "i32", "i64", "i128", "isize", "str", "u8", "u16", "u32", "u64", "u128", "usize",
	];
	common_tail(
		RuleGrammar::builder("rust")
			.rule("comment", C_COMMENT)
			.rule("attribute", r"#!?\[[^\]]*\]")
			.rule("string", r##"b?r#"[\s\S]*?"#|b?r"[^"]*""##)
			.rule("string", r#"b?"(?:\\[\s\S]|[^"\\])*""#)
			.rule("char", r"b?'(?:\\(?:x[0-9a-fA-F]{2}|u\{[0-9a-fA-F]{1,6}\}|.)|[^'\\\n])'")
			.rule("lifetime", r"'[A-Za-z_]\w*\b")
			.rule("macro", r"\b[A-Za-z_]\w*!"),
		&words(KEYWORDS),
		&["true", "false"],
		PRIMITIVES,
	)
	.build()
}
