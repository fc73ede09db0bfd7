//! Change descriptors consumed by a highlight pass, and the dispatch seam used to
//! request future passes.

use codefence_primitives::{ChangeSet, DocumentTree};
use tokio::sync::mpsc;

/// Metadata attached to a change cycle the highlighter requested itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassMeta {
	/// The deferred first pass after mounting.
	DeferredPass,
	/// Grammar loads awaited by an incomplete pass have finished.
	GrammarLoaded,
}

/// Host hook that starts a new change cycle carrying `meta`.
///
/// The host answers by calling [`crate::HighlightPass::apply`] with a change built by
/// [`Change::meta`]. Called from worker tasks, never from inside `apply`.
pub trait Dispatch: Send + Sync + 'static {
	fn dispatch(&self, meta: PassMeta);
}

impl Dispatch for mpsc::UnboundedSender<PassMeta> {
	fn dispatch(&self, meta: PassMeta) {
		if self.send(meta).is_err() {
			tracing::debug!(?meta, "highlight.dispatch.receiver_closed");
		}
	}
}

/// One change cycle as seen by the highlighter.
#[derive(Debug)]
pub struct Change<'a, D> {
	/// Snapshot after the change.
	pub doc: &'a D,
	/// Whether document content (or a node attribute) changed.
	pub doc_changed: bool,
	/// Node type holding the focus before the change.
	pub focus_before: Option<&'a str>,
	/// Node type holding the focus after the change.
	pub focus_after: Option<&'a str>,
	/// Content arrived through a collaborative sync rather than local editing.
	pub external_sync: bool,
	/// Maps positions of the previous snapshot onto `doc`. `None` means identity.
	pub mapping: Option<&'a ChangeSet>,
	/// Metadata of a highlighter-requested cycle.
	pub meta: Option<PassMeta>,
}

impl<'a, D: DocumentTree> Change<'a, D> {
	/// A local edit described by `mapping`.
	pub fn edit(doc: &'a D, mapping: &'a ChangeSet) -> Self {
		Self {
			doc,
			doc_changed: true,
			focus_before: None,
			focus_after: None,
			external_sync: false,
			mapping: Some(mapping),
			meta: None,
		}
	}

	/// A cycle that only carries `meta`; the document is unchanged.
	pub fn meta(doc: &'a D, meta: PassMeta) -> Self {
		Self {
			doc,
			doc_changed: false,
			focus_before: None,
			focus_after: None,
			external_sync: false,
			mapping: None,
			meta: Some(meta),
		}
	}

	/// Sets the node types holding the focus before and after the change.
	pub fn with_focus(mut self, before: Option<&'a str>, after: Option<&'a str>) -> Self {
		self.focus_before = before;
		self.focus_after = after;
		self
	}

	/// Marks the change as coming from a collaborative sync.
	pub fn external(mut self) -> Self {
		self.external_sync = true;
		self
	}
}
