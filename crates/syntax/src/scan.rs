//! Region discovery.

use std::sync::Arc;

use codefence_primitives::{CharIdx, DocumentTree, NodeId};

/// A code block found by a scan. Borrowed from the snapshot it was scanned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region<'d> {
	/// Structural identity of the block; the cache key.
	pub id: NodeId,
	/// Position of the block node.
	pub pos: CharIdx,
	/// Absolute position of the first text character.
	pub content_start: CharIdx,
	/// Absolute position just past the last text character.
	pub end: CharIdx,
	/// Declared language tag.
	pub language: Option<&'d str>,
	pub text: &'d str,
}

/// Extracts the highlightable code blocks of a snapshot, in document order.
#[derive(Debug, Clone)]
pub struct BlockScanner {
	code_block_type: Arc<str>,
}

impl BlockScanner {
	pub fn new(code_block_type: &str) -> Self {
		Self {
			code_block_type: code_block_type.into(),
		}
	}

	/// Returns true if `node_type` is the highlightable code block type.
	pub fn is_region_type(&self, node_type: Option<&str>) -> bool {
		node_type == Some(&*self.code_block_type)
	}

	pub fn scan<'d, D: DocumentTree>(&self, doc: &'d D) -> Vec<Region<'d>> {
		doc.blocks()
			.filter(|block| block.node_type == &*self.code_block_type)
			.map(|block| {
				let content_start = block.content_start();
				Region {
					id: block.id,
					pos: block.pos,
					content_start,
					end: content_start + block.text.chars().count(),
					language: block.language,
					text: block.text,
				}
			})
			.collect()
	}
}
