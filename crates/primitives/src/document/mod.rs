//! Document tree snapshots.
//!
//! The highlighter never owns the document model. It consumes a snapshot through
//! [`DocumentTree`], which exposes the block nodes in document order together with
//! their structural identity, position, declared language and text content.
//!
//! [`Document`] is a small in-memory implementation with flat block structure,
//! used by hosts without a richer model and throughout the tests.

use std::sync::Arc;

use thiserror::Error;

use crate::transaction::{ChangeSet, CharIdx};

/// Stable structural identity of a block node.
///
/// Survives edits elsewhere in the document; a host must hand out a fresh id when a
/// block is split, merged or recreated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Borrowed view of one block node in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef<'a> {
	/// Structural identity of the node.
	pub id: NodeId,
	/// Schema type name of the node (e.g. `"paragraph"`, `"code_block"`).
	pub node_type: &'a str,
	/// Position of the node's opening boundary.
	pub pos: CharIdx,
	/// Declared language attribute, if the node type carries one.
	pub language: Option<&'a str>,
	/// Text content of the node.
	pub text: &'a str,
}

impl BlockRef<'_> {
	/// Position where the node's content starts.
	#[inline]
	pub fn content_start(&self) -> CharIdx {
		self.pos + 1
	}
}

/// A document snapshot queryable for its block nodes.
pub trait DocumentTree {
	/// Returns every block node in document order.
	fn blocks(&self) -> impl Iterator<Item = BlockRef<'_>>;

	/// Total size of the document in positions.
	fn size(&self) -> usize;
}

/// Errors raised when editing an in-memory [`Document`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
	/// The position does not fall inside any block's content.
	#[error("position {0} is not inside block content")]
	OutsideContent(CharIdx),
	/// The range spans more than one block or runs past a block's content.
	#[error("range {from}..{to} does not lie within a single block")]
	CrossesBlocks {
		/// Start of the rejected range.
		from: CharIdx,
		/// End of the rejected range.
		to: CharIdx,
	},
	/// No block carries the given id.
	#[error("no block with id {0:?}")]
	UnknownNode(NodeId),
}

/// Result type for document edits.
pub type Result<T> = std::result::Result<T, EditError>;

/// A single top-level block of an in-memory document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
	id: NodeId,
	node_type: Arc<str>,
	language: Option<Arc<str>>,
	text: String,
	len_chars: usize,
}

impl Block {
	/// Creates a block of an arbitrary node type.
	pub fn new(id: NodeId, node_type: &str, text: &str) -> Self {
		Self {
			id,
			node_type: node_type.into(),
			language: None,
			len_chars: text.chars().count(),
			text: text.to_string(),
		}
	}

	/// Creates a paragraph block.
	pub fn paragraph(id: NodeId, text: &str) -> Self {
		Self::new(id, "paragraph", text)
	}

	/// Creates a `code_block` node with a declared language.
	pub fn code(id: NodeId, language: &str, text: &str) -> Self {
		Self::new(id, "code_block", text).with_language(Some(language))
	}

	/// Sets the language attribute.
	pub fn with_language(mut self, language: Option<&str>) -> Self {
		self.language = language.map(Into::into);
		self
	}

	pub fn id(&self) -> NodeId {
		self.id
	}

	pub fn node_type(&self) -> &str {
		&self.node_type
	}

	pub fn language(&self) -> Option<&str> {
		self.language.as_deref()
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	/// Size of the block including its two boundary positions.
	#[inline]
	pub fn node_size(&self) -> usize {
		self.len_chars + 2
	}

	fn byte_offset(&self, char_offset: usize) -> usize {
		self.text.char_indices().nth(char_offset).map_or(self.text.len(), |(idx, _)| idx)
	}
}

/// Immutable in-memory document made of flat top-level blocks.
///
/// Edits return a new snapshot plus the [`ChangeSet`] mapping old positions onto
/// new ones, mirroring how a transaction hands both to its listeners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
	blocks: Vec<Block>,
}

impl Document {
	pub fn new(blocks: Vec<Block>) -> Self {
		Self { blocks }
	}

	pub fn block_list(&self) -> &[Block] {
		&self.blocks
	}

	/// Returns the block whose content contains `pos` and the block's position.
	///
	/// Content is the closed range `[pos + 1, pos + 1 + len]`, so both edges of the
	/// text count as inside.
	pub fn block_at(&self, pos: CharIdx) -> Option<(CharIdx, &Block)> {
		self.locate(pos).map(|(index, block_pos)| (block_pos, &self.blocks[index]))
	}

	/// Returns the node type whose content contains `pos`.
	///
	/// Hosts use this to fill the focus fields of a change descriptor.
	pub fn node_type_at(&self, pos: CharIdx) -> Option<&str> {
		self.block_at(pos).map(|(_, block)| block.node_type())
	}

	/// Returns the position of the block with the given id.
	pub fn position_of(&self, id: NodeId) -> Option<CharIdx> {
		let mut block_pos = 0;
		for block in &self.blocks {
			if block.id == id {
				return Some(block_pos);
			}
			block_pos += block.node_size();
		}
		None
	}

	/// Inserts `text` at `pos`, which must lie within a block's content.
	pub fn insert_text(&self, pos: CharIdx, text: &str) -> Result<(Document, ChangeSet)> {
		self.replace(pos, pos, text)
	}

	/// Deletes the range `from..to`, which must lie within a single block's content.
	pub fn delete_text(&self, from: CharIdx, to: CharIdx) -> Result<(Document, ChangeSet)> {
		self.replace(from, to, "")
	}

	/// Replaces `from..to` with `text` inside a single block's content.
	pub fn replace(&self, from: CharIdx, to: CharIdx, text: &str) -> Result<(Document, ChangeSet)> {
		if from > to {
			return Err(EditError::CrossesBlocks { from, to });
		}
		let (index, block_pos) = self.locate(from).ok_or(EditError::OutsideContent(from))?;
		let block = &self.blocks[index];
		let start = block_pos + 1;
		if to > start + block.len_chars {
			return Err(EditError::CrossesBlocks { from, to });
		}

		let byte_from = block.byte_offset(from - start);
		let byte_to = block.byte_offset(to - start);
		let mut new_text = String::with_capacity(block.text.len() + text.len());
		new_text.push_str(&block.text[..byte_from]);
		new_text.push_str(text);
		new_text.push_str(&block.text[byte_to..]);

		let inserted = text.chars().count();
		let mut changes = ChangeSet::new();
		changes.retain(from).delete(to - from).insert(inserted).retain(self.size() - to);

		let mut next = self.clone();
		let edited = &mut next.blocks[index];
		edited.len_chars = edited.len_chars - (to - from) + inserted;
		edited.text = new_text;
		Ok((next, changes))
	}

	/// Changes the language attribute of a block. Positions do not move.
	pub fn set_language(&self, id: NodeId, language: Option<&str>) -> Result<(Document, ChangeSet)> {
		let mut next = self.clone();
		let block = next.blocks.iter_mut().find(|b| b.id == id).ok_or(EditError::UnknownNode(id))?;
		block.language = language.map(Into::into);
		let changes = ChangeSet::identity(self.size());
		Ok((next, changes))
	}

	/// Inserts a whole block before the block at `index` (or at the end).
	pub fn insert_block(&self, index: usize, block: Block) -> (Document, ChangeSet) {
		let index = index.min(self.blocks.len());
		let at: usize = self.blocks[..index].iter().map(Block::node_size).sum();
		let mut changes = ChangeSet::new();
		changes.retain(at).insert(block.node_size()).retain(self.size() - at);

		let mut next = self.clone();
		next.blocks.insert(index, block);
		(next, changes)
	}

	/// Removes the block with the given id.
	pub fn remove_block(&self, id: NodeId) -> Result<(Document, ChangeSet)> {
		let index = self.blocks.iter().position(|b| b.id == id).ok_or(EditError::UnknownNode(id))?;
		let at: usize = self.blocks[..index].iter().map(Block::node_size).sum();
		let size = self.blocks[index].node_size();
		let mut changes = ChangeSet::new();
		changes.retain(at).delete(size).retain(self.size() - at - size);

		let mut next = self.clone();
		next.blocks.remove(index);
		Ok((next, changes))
	}

	fn locate(&self, pos: CharIdx) -> Option<(usize, CharIdx)> {
		let mut block_pos = 0;
		for (index, block) in self.blocks.iter().enumerate() {
			let start = block_pos + 1;
			if pos >= start && pos <= start + block.len_chars {
				return Some((index, block_pos));
			}
			block_pos += block.node_size();
		}
		None
	}
}

impl DocumentTree for Document {
	fn blocks(&self) -> impl Iterator<Item = BlockRef<'_>> {
		self.blocks.iter().scan(0usize, |pos, block| {
			let item = BlockRef {
				id: block.id,
				node_type: &*block.node_type,
				pos: *pos,
				language: block.language.as_deref(),
				text: &block.text,
			};
			*pos += block.node_size();
			Some(item)
		})
	}

	fn size(&self) -> usize {
		self.blocks.iter().map(Block::node_size).sum()
	}
}
