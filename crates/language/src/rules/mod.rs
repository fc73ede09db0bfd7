//! Rule-based grammar engine.
//!
//! A [`RuleGrammar`] is an ordered list of labeled regular expressions. Scanning
//! repeatedly picks the rule whose next match starts first (ties go to the rule
//! listed first), emits it, and continues after it. A rule may embed another
//! grammar that re-tokenizes the matched text, and a grammar may hand the text
//! between its own matches to a `rest` grammar. Labels accumulate top-down, so a
//! keyword inside an interpolation inside a string carries all three labels.
//!
//! A pattern containing a capture group named `t` emits only that group. Text the
//! pattern matches around the group acts as context: it is required for the match
//! but is not consumed, and may overlap text already emitted by an earlier token.

use std::sync::Arc;

use codefence_primitives::Labels;
use regex::Regex;

use crate::grammar::{Grammar, GrammarError};
use crate::tokenizer::{Token, TokenizeError, TokenizeLimits};

/// Where the text matched by a rule (or left between matches) is re-tokenized.
#[derive(Debug)]
enum Inside {
	/// A dedicated embedded grammar.
	Grammar(Box<RuleGrammar>),
	/// The top-level grammar of the language being tokenized.
	Root,
}

#[derive(Debug)]
struct Rule {
	label: Arc<str>,
	pattern: Regex,
	token_group: bool,
	inside: Option<Inside>,
}

/// Next match of a rule, in haystack byte offsets.
#[derive(Debug, Clone, Copy)]
struct Found {
	match_start: usize,
	start: usize,
	end: usize,
}

#[derive(Debug, Clone, Copy)]
enum Cursor {
	Unsearched,
	At(Found),
	Exhausted,
}

impl Rule {
	/// Finds the first non-empty token at or after `at`.
	fn find_from(&self, hay: &str, mut at: usize) -> Option<Found> {
		loop {
			if at > hay.len() {
				return None;
			}
			let found = if self.token_group {
				let caps = self.pattern.captures_at(hay, at)?;
				let whole = caps.get(0)?;
				let token = caps.name("t").unwrap_or(whole);
				Found {
					match_start: whole.start(),
					start: token.start(),
					end: token.end(),
				}
			} else {
				let m = self.pattern.find_at(hay, at)?;
				Found {
					match_start: m.start(),
					start: m.start(),
					end: m.end(),
				}
			};
			if found.start < found.end {
				return Some(found);
			}
			let step = hay[found.match_start..].chars().next().map_or(1, char::len_utf8);
			at = found.match_start + step;
		}
	}
}

/// A compiled rule-based grammar.
#[derive(Debug)]
pub struct RuleGrammar {
	name: Arc<str>,
	rules: Vec<Rule>,
	rest: Option<Inside>,
}

/// Byte-offset span with its accumulated labels.
type RawToken = (usize, usize, Labels);

struct Scan<'a> {
	root: &'a RuleGrammar,
	text: &'a str,
	limits: &'a TokenizeLimits,
	out: Vec<RawToken>,
}

impl<'a> Scan<'a> {
	fn push(&mut self, start: usize, end: usize, labels: &Labels) -> Result<(), TokenizeError> {
		if self.out.len() >= self.limits.max_tokens {
			return Err(TokenizeError::TooManyTokens {
				limit: self.limits.max_tokens,
			});
		}
		self.out.push((start, end, labels.clone()));
		Ok(())
	}

	fn inside<'g>(&self, inside: &'g Inside) -> &'g RuleGrammar
	where
		'a: 'g,
	{
		match inside {
			Inside::Grammar(grammar) => grammar,
			Inside::Root => self.root,
		}
	}

	/// Tokenizes `self.text[base..end]` with `grammar`.
	fn run(&mut self, grammar: &RuleGrammar, base: usize, end: usize, labels: &Labels, depth: usize) -> Result<(), TokenizeError> {
		if depth > self.limits.max_depth {
			return Err(TokenizeError::NestingTooDeep {
				limit: self.limits.max_depth,
			});
		}
		let text = self.text;
		let hay = &text[base..end];
		let mut cursors = vec![Cursor::Unsearched; grammar.rules.len()];
		let mut pos = 0;

		loop {
			let mut best: Option<(usize, Found)> = None;
			for (idx, rule) in grammar.rules.iter().enumerate() {
				let found = match cursors[idx] {
					Cursor::At(found) if found.start >= pos => found,
					Cursor::Exhausted => continue,
					_ => match rule.find_from(hay, pos) {
						Some(found) => {
							cursors[idx] = Cursor::At(found);
							found
						}
						None => {
							cursors[idx] = Cursor::Exhausted;
							continue;
						}
					},
				};
				if best.is_none_or(|(_, b)| found.start < b.start) {
					best = Some((idx, found));
				}
			}

			let Some((idx, found)) = best else { break };
			self.gap(grammar, base + pos, base + found.start, labels, depth)?;

			let rule = &grammar.rules[idx];
			let mut token_labels = labels.clone();
			token_labels.push(rule.label.clone());
			match &rule.inside {
				Some(inside) => {
					let inner = self.inside(inside);
					self.run(inner, base + found.start, base + found.end, &token_labels, depth + 1)?;
				}
				None => self.push(base + found.start, base + found.end, &token_labels)?,
			}
			pos = found.end;
		}

		self.gap(grammar, base + pos, end, labels, depth)
	}

	/// Handles text between matches: hands it to `rest`, or keeps the enclosing labels.
	fn gap(&mut self, grammar: &RuleGrammar, start: usize, end: usize, labels: &Labels, depth: usize) -> Result<(), TokenizeError> {
		if start >= end {
			return Ok(());
		}
		match &grammar.rest {
			Some(rest) => {
				let rest = self.inside(rest);
				self.run(rest, start, end, labels, depth + 1)
			}
			None if !labels.is_empty() => self.push(start, end, labels),
			None => Ok(()),
		}
	}
}

impl RuleGrammar {
	/// Starts building a grammar for `name`.
	pub fn builder(name: &str) -> RuleGrammarBuilder {
		RuleGrammarBuilder {
			name: name.into(),
			rules: Vec::new(),
			rest: None,
		}
	}
}

impl Grammar for RuleGrammar {
	fn name(&self) -> &str {
		&self.name
	}

	fn tokenize(&self, text: &str, limits: &TokenizeLimits) -> Result<Vec<Token>, TokenizeError> {
		let mut scan = Scan {
			root: self,
			text,
			limits,
			out: Vec::new(),
		};
		scan.run(self, 0, text.len(), &Labels::new(), 0)?;

		// Byte offsets are emitted in ascending order, so one forward walk converts them.
		let mut byte_pos = 0;
		let mut char_pos = 0;
		let mut to_chars = |byte: usize| {
			char_pos += text[byte_pos..byte].chars().count();
			byte_pos = byte;
			char_pos
		};
		Ok(scan
			.out
			.into_iter()
			.map(|(start, end, labels)| {
				let start = to_chars(start);
				let end = to_chars(end);
				Token { start, end, labels }
			})
			.collect())
	}
}

enum InsideSpec {
	Grammar(Box<RuleGrammarBuilder>),
	Root,
}

struct RuleSpec {
	label: Arc<str>,
	pattern: String,
	inside: Option<InsideSpec>,
}

/// Builder for [`RuleGrammar`]. Patterns are compiled by [`RuleGrammarBuilder::build`].
pub struct RuleGrammarBuilder {
	name: Arc<str>,
	rules: Vec<RuleSpec>,
	rest: Option<InsideSpec>,
}

impl RuleGrammarBuilder {
	/// Adds a rule emitting `label` for each match of `pattern`.
	pub fn rule(mut self, label: &str, pattern: impl Into<String>) -> Self {
		self.rules.push(RuleSpec {
			label: label.into(),
			pattern: pattern.into(),
			inside: None,
		});
		self
	}

	/// Adds a rule whose matched text is re-tokenized by `inside`.
	pub fn nested(mut self, label: &str, pattern: impl Into<String>, inside: RuleGrammarBuilder) -> Self {
		self.rules.push(RuleSpec {
			label: label.into(),
			pattern: pattern.into(),
			inside: Some(InsideSpec::Grammar(Box::new(inside))),
		});
		self
	}

	/// Adds a rule whose matched text is re-tokenized by the language's top-level grammar.
	pub fn nested_root(mut self, label: &str, pattern: impl Into<String>) -> Self {
		self.rules.push(RuleSpec {
			label: label.into(),
			pattern: pattern.into(),
			inside: Some(InsideSpec::Root),
		});
		self
	}

	/// Re-tokenizes text between this grammar's matches with the top-level grammar.
	pub fn rest_root(mut self) -> Self {
		self.rest = Some(InsideSpec::Root);
		self
	}

	/// Compiles every pattern, including embedded grammars.
	pub fn build(self) -> Result<RuleGrammar, GrammarError> {
		let name = self.name;
		let rules = self
			.rules
			.into_iter()
			.map(|spec| {
				let pattern = Regex::new(&spec.pattern).map_err(|source| GrammarError::InvalidPattern {
					grammar: name.to_string(),
					label: spec.label.to_string(),
					source: Box::new(source),
				})?;
				let token_group = pattern.capture_names().any(|n| n == Some("t"));
				Ok(Rule {
					label: spec.label,
					pattern,
					token_group,
					inside: spec.inside.map(build_inside).transpose()?,
				})
			})
			.collect::<Result<Vec<_>, GrammarError>>()?;
		let rest = self.rest.map(build_inside).transpose()?;
		Ok(RuleGrammar { name, rules, rest })
	}
}

fn build_inside(spec: InsideSpec) -> Result<Inside, GrammarError> {
	Ok(match spec {
		InsideSpec::Grammar(builder) => Inside::Grammar(Box::new(builder.build()?)),
		InsideSpec::Root => Inside::Root,
	})
}

/// Builds an alternation of whole words: `\b(?:a|b|c)\b`.
pub fn words(words: &[&str]) -> String {
	let escaped: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
	format!(r"\b(?:{})\b", escaped.join("|"))
}
