//! Per-region decoration cache.
//!
//! Entries are keyed by the block's structural identity, so edits elsewhere in the
//! document that only move a block keep its entry. An entry is reused only when its
//! fingerprint (exact language and text) still matches; decorations computed at an
//! older position are rebased onto the block's current position.

use std::sync::Arc;

use codefence_primitives::{CharIdx, Decoration, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::scan::Region;

/// Content a cache entry was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
	language: Option<Arc<str>>,
	text: Box<str>,
}

impl Fingerprint {
	fn of(region: &Region<'_>) -> Self {
		Self {
			language: region.language.map(Into::into),
			text: region.text.into(),
		}
	}

	fn matches(&self, region: &Region<'_>) -> bool {
		self.text.len() == region.text.len() && self.language.as_deref() == region.language && &*self.text == region.text
	}
}

#[derive(Debug, Clone)]
struct CacheEntry {
	fingerprint: Fingerprint,
	/// Content start the decorations are expressed against.
	origin: CharIdx,
	decorations: Vec<Decoration>,
}

/// Decorations of the last tokenization of each live region.
#[derive(Debug, Default)]
pub struct TokenCache {
	entries: FxHashMap<NodeId, CacheEntry>,
}

impl TokenCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached decorations of `region`, if still valid.
	///
	/// A stale fingerprint is a miss; the entry stays until overwritten or pruned.
	pub fn get(&mut self, region: &Region<'_>) -> Option<&[Decoration]> {
		let entry = self.entries.get_mut(&region.id)?;
		if !entry.fingerprint.matches(region) {
			return None;
		}
		if entry.origin != region.content_start {
			let delta = region.content_start as isize - entry.origin as isize;
			for decoration in &mut entry.decorations {
				*decoration = decoration.shifted(delta);
			}
			entry.origin = region.content_start;
		}
		Some(&entry.decorations)
	}

	/// Stores the decorations computed for `region`, replacing any previous entry.
	pub fn put(&mut self, region: &Region<'_>, decorations: Vec<Decoration>) {
		self.entries.insert(
			region.id,
			CacheEntry {
				fingerprint: Fingerprint::of(region),
				origin: region.content_start,
				decorations,
			},
		);
	}

	/// Drops entries of regions that are not in `live`. Returns how many were dropped.
	pub fn prune(&mut self, live: &[Region<'_>]) -> usize {
		let live: FxHashSet<NodeId> = live.iter().map(|region| region.id).collect();
		let before = self.entries.len();
		self.entries.retain(|id, _| live.contains(id));
		before - self.entries.len()
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.entries.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
