//! Presentational decorations over document ranges.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::transaction::{ChangeSet, CharIdx};

/// Classification labels of a token, outermost scope first.
///
/// A token nested in `string > interpolation > keyword` carries all three.
pub type Labels = SmallVec<[Arc<str>; 3]>;

/// An inline decoration: a half-open range plus its classification labels.
///
/// Ranges are absolute document positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
	pub from: CharIdx,
	pub to: CharIdx,
	pub labels: Labels,
}

impl Decoration {
	pub fn new(from: CharIdx, to: CharIdx, labels: Labels) -> Self {
		debug_assert!(from < to, "decoration range {from}..{to} is empty");
		Self { from, to, labels }
	}

	/// Returns the labels joined by spaces, the form renderers apply as a class list.
	pub fn class(&self) -> String {
		self.labels.join(" ")
	}

	/// Returns true if `label` is one of this decoration's labels.
	pub fn has_label(&self, label: &str) -> bool {
		self.labels.iter().any(|l| &**l == label)
	}

	/// Returns a copy shifted by `delta` positions.
	pub fn shifted(&self, delta: isize) -> Self {
		Self {
			from: self.from.saturating_add_signed(delta),
			to: self.to.saturating_add_signed(delta),
			labels: self.labels.clone(),
		}
	}

	pub fn len(&self) -> usize {
		self.to - self.from
	}

	pub fn is_empty(&self) -> bool {
		self.from >= self.to
	}
}

/// An ordered, immutable set of decorations for one document snapshot.
///
/// Cloning is cheap; the decorations are shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
	decorations: Arc<[Decoration]>,
}

impl DecorationSet {
	/// Creates a set, ordering the decorations by start position.
	pub fn new(mut decorations: Vec<Decoration>) -> Self {
		decorations.sort_by_key(|d| (d.from, d.to));
		Self {
			decorations: decorations.into(),
		}
	}

	pub fn len(&self) -> usize {
		self.decorations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.decorations.is_empty()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Decoration> {
		self.decorations.iter()
	}

	pub fn as_slice(&self) -> &[Decoration] {
		&self.decorations
	}

	/// Maps every decoration through `changes`.
	///
	/// Insertions at a decoration's edges stay outside it; decorations whose content
	/// was deleted are dropped.
	pub fn map(&self, changes: &ChangeSet) -> Self {
		if changes.is_identity() {
			return self.clone();
		}
		let decorations: Vec<_> = self
			.decorations
			.iter()
			.filter_map(|d| {
				changes.map_range(d.from, d.to).map(|(from, to)| Decoration {
					from,
					to,
					labels: d.labels.clone(),
				})
			})
			.collect();
		Self {
			decorations: decorations.into(),
		}
	}
}

impl<'a> IntoIterator for &'a DecorationSet {
	type Item = &'a Decoration;
	type IntoIter = std::slice::Iter<'a, Decoration>;

	fn into_iter(self) -> Self::IntoIter {
		self.decorations.iter()
	}
}
