//! Languages offered for code blocks.

/// Tag of the pseudo language that disables highlighting.
pub const PLAIN: &str = "none";

/// Selectable language tags with their display names, in menu order.
pub const LANGUAGES: &[(&str, &str)] = &[
	(PLAIN, "None"),
	("bash", "Bash"),
	("css", "CSS"),
	("clike", "C"),
	("csharp", "C#"),
	("go", "Go"),
	("markup", "HTML"),
	("objectivec", "Objective-C"),
	("java", "Java"),
	("javascript", "JavaScript"),
	("json", "JSON"),
	("perl", "Perl"),
	("php", "PHP"),
	("powershell", "Powershell"),
	("python", "Python"),
	("ruby", "Ruby"),
	("rust", "Rust"),
	("sql", "SQL"),
	("typescript", "TypeScript"),
	("yaml", "YAML"),
];

/// Returns the display name of a language tag.
pub fn language_name(tag: &str) -> Option<&'static str> {
	LANGUAGES.iter().find(|(t, _)| *t == tag).map(|(_, name)| *name)
}

/// Returns true if a region with this language tag is never highlighted.
pub fn is_plain(tag: Option<&str>) -> bool {
	match tag {
		None => true,
		Some(tag) => tag.is_empty() || tag == PLAIN,
	}
}
