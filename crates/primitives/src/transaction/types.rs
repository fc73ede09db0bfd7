/// A position in the document, measured in characters.
///
/// Block boundaries count as one position each, so the content of a block at
/// position `p` starts at `p + 1`.
pub type CharIdx = usize;

/// A length or count in the document, measured in characters.
pub type CharLen = usize;

/// Bias determines how positions at change boundaries are mapped.
///
/// When mapping a position through an insertion at the same location, bias
/// determines whether the position stays before the inserted text or moves past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// A single operation in a changeset.
///
/// Only lengths are tracked: a changeset describes how positions move, not
/// which text was written. The document snapshot carries the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	/// Retain the next N characters from the source document.
	Retain(CharLen),
	/// Delete the next N characters from the source document.
	Delete(CharLen),
	/// Insert N new characters at the current position.
	Insert(CharLen),
}
