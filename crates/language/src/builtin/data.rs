//! Grammars for markup, stylesheets, data formats and SQL.

use super::{DQ_STRING, NUMBER, SQ_STRING};
use crate::grammar::GrammarError;
use crate::rules::{RuleGrammar, words};

pub(super) fn markup() -> Result<RuleGrammar, GrammarError> {
	let attr_value = RuleGrammar::builder("attr-value").rule("punctuation", r#"^=\s*["']?|["']$"#);
	let tag = RuleGrammar::builder("tag")
		.rule("punctuation", r"^</?|/?>$")
		.rule("name", r"^</?(?P<t>[^\s>/]+)")
		.nested("attr-value", r#"=\s*(?:"[^"]*"|'[^']*'|[^\s'">=]+)"#, attr_value)
		.rule("attr-name", r"[^\s/>=]+");
	RuleGrammar::builder("markup")
		.rule("comment", r"<!--[\s\S]*?-->")
		.rule("prolog", r"<\?[\s\S]+?\?>")
		.rule("doctype", r"(?i)<!DOCTYPE[^>]*>")
		.rule("cdata", r"(?i)<!\[CDATA\[[\s\S]*?\]\]>")
		.nested(
			"tag",
			r#"</?[A-Za-z][\w:.-]*(?:\s+[^\s/>=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s'">=]+))?)*\s*/?>"#,
			tag,
		)
		.rule("entity", r"&#?[\da-zA-Z]{1,8};")
		.build()
}

pub(super) fn css() -> Result<RuleGrammar, GrammarError> {
	RuleGrammar::builder("css")
		.rule("comment", r"/\*[\s\S]*?\*/")
		.rule("atrule", r"@[\w-]+")
		.rule("url", r#"(?i)\burl\((?:"[^"]*"|'[^']*'|[^)]*)\)"#)
		.rule("string", DQ_STRING)
		.rule("string", SQ_STRING)
		.rule("selector", r"(?P<t>[^{}\s;@/][^{};@]*?)\s*\{")
		.rule("property", r"(?P<t>-?-?[A-Za-z][\w-]*)\s*:")
		.rule("important", r"(?i)!important\b")
		.rule("hexcode", r"#[\da-fA-F]{3,8}\b")
		.rule("function", r"\b(?P<t>[A-Za-z][\w-]*)\(")
		.rule("number", r"\b\d+(?:\.\d+)?(?:%|[A-Za-z]+)?|\B\.\d+(?:%|[A-Za-z]+)?")
		.rule("punctuation", r"[(){};:,]")
		.build()
}

pub(super) fn json() -> Result<RuleGrammar, GrammarError> {
	RuleGrammar::builder("json")
		.rule("comment", r"//.*|/\*[\s\S]*?\*/")
		.rule("property", r#"(?P<t>"(?:\\.|[^"\\\n])*")\s*:"#)
		.rule("string", DQ_STRING)
		.rule("number", r"-?\b\d+(?:\.\d+)?(?:[eE][+-]?\d+)?\b")
		.rule("boolean", words(&["true", "false"]))
		.rule("null", words(&["null"]))
		.rule("operator", ":")
		.rule("punctuation", r"[{}\[\],]")
		.build()
}

pub(super) fn yaml() -> Result<RuleGrammar, GrammarError> {
	RuleGrammar::builder("yaml")
		.rule("comment", r"(?m)(?:^|[ \t])(?P<t>#.*)")
		.rule("directive", r"(?m)^%.*")
		.rule("punctuation", r"(?m)^(?:---|\.\.\.)")
		.rule("key", r#"(?m)(?P<t>"[^"\n]*"|'[^'\n]*'|[^\s#:\[\]{},'"-][^\n#:]*?)[ \t]*:(?:[ \t]|$)"#)
		.rule("variable", r"[&*][\w-]+")
		.rule("tag", r"!!?[\w-]*")
		.rule("string", DQ_STRING)
		.rule("string", r"'(?:''|[^'\n])*'")
		.rule("boolean", r"(?i)\b(?:true|false|yes|no|on|off)\b")
		.rule("null", r"\bnull\b|~")
		.rule("number", NUMBER)
		.rule("punctuation", r"(?m)^[ \t]*(?P<t>-)(?:[ \t]|$)|[\[\]{},]|[|>][-+]?")
		.build()
}

pub(super) fn sql() -> Result<RuleGrammar, GrammarError> {
	const KEYWORDS: &[&str] = &[
		"add", "all", "alter", "as", "asc", "begin", "by", "case", "cascade", "check", "column", "commit", "constraint", "create", "cross",
		"database", "default", "delete", "desc", "distinct", "drop", "else", "end", "exists", "foreign", "from", "full", "group", "having", "if",
		"index", "inner", "insert", "into", "join", "key", "left", "limit", "offset", "on", "order", "outer", "primary", "references", "right",
		"rollback", "select", "set", "table", "then", "top", "transaction", "truncate", "union", "unique", "update", "values", "view", "when",
		"where", "with",
	];
	RuleGrammar::builder("sql")
		.rule("comment", r"--.*|#.*|/\*[\s\S]*?\*/")
		.rule("variable", r"@[\w.$]+")
		.rule("string", r"'(?:''|\\.|[^'\\])*'")
		.rule("string", DQ_STRING)
		.rule("identifier", r"`[^`]*`")
		.rule(
			"function",
			r"(?i)\b(?P<t>avg|coalesce|count|first|format|last|lcase|len|lower|max|mid|min|mod|now|round|sum|ucase|upper)\s*\(",
		)
		.rule(
			"operator",
			r"(?i)\b(?:and|between|div|in|ilike|is|like|not|or|regexp|rlike|xor)\b",
		)
		.rule("keyword", format!("(?i){}", words(KEYWORDS)))
		.rule("boolean", r"(?i)\b(?:true|false|null)\b")
		.rule("number", NUMBER)
		.rule("operator", r"[-+*/=%^~]|&&?|\|\|?|!=?|<(?:=>?|<|>)?|>[>=]?")
		.rule("punctuation", r"[;\[\]().,]")
		.build()
}
