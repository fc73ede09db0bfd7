use super::types::{Bias, CharIdx, CharLen, Operation};

/// A sequence of operations describing how one document snapshot maps onto the next.
///
/// ChangeSet represents a mutation as retain, delete, and insert runs. It is the
/// position-mapping function handed to decoration consumers: ranges computed against
/// the old snapshot are translated through [`ChangeSet::map_pos`] instead of being
/// recomputed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
	ops: Vec<Operation>,
	/// Size of the old snapshot.
	before: CharLen,
	/// Size of the new snapshot.
	after: CharLen,
}

impl ChangeSet {
	/// Creates a new empty changeset.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a changeset that keeps a document of `len` characters unchanged.
	pub fn identity(len: CharLen) -> Self {
		let mut cs = Self::new();
		cs.retain(len);
		cs
	}

	/// Size of the snapshot this changeset applies to.
	pub fn len(&self) -> CharLen {
		self.before
	}

	/// Size of the snapshot it produces.
	pub fn len_after(&self) -> CharLen {
		self.after
	}

	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}

	/// Returns true if no position moves through this changeset.
	pub fn is_identity(&self) -> bool {
		self.ops.iter().all(|op| matches!(op, Operation::Retain(_)))
	}

	pub fn changes(&self) -> &[Operation] {
		&self.ops
	}

	/// Keeps the next `n` positions. Adjacent retains merge.
	pub fn retain(&mut self, n: CharLen) -> &mut Self {
		if n > 0 {
			self.before += n;
			self.after += n;
			match self.ops.last_mut() {
				Some(Operation::Retain(run)) => *run += n,
				_ => self.ops.push(Operation::Retain(n)),
			}
		}
		self
	}

	/// Removes the next `n` positions. Adjacent deletes merge.
	pub fn delete(&mut self, n: CharLen) -> &mut Self {
		if n > 0 {
			self.before += n;
			match self.ops.last_mut() {
				Some(Operation::Delete(run)) => *run += n,
				_ => self.ops.push(Operation::Delete(n)),
			}
		}
		self
	}

	/// Adds an insert operation of N characters at the current position.
	///
	/// Inserts are kept ahead of an adjacent delete so that `[Insert, Delete]` is the
	/// canonical form of a replacement.
	pub fn insert(&mut self, n: CharLen) -> &mut Self {
		if n == 0 {
			return self;
		}

		self.after += n;

		match self.ops.as_mut_slice() {
			[.., Operation::Insert(prev)] | [.., Operation::Insert(prev), Operation::Delete(_)] => {
				*prev += n;
			}
			[.., last @ Operation::Delete(_)] => {
				let del = std::mem::replace(last, Operation::Insert(n));
				self.ops.push(del);
			}
			_ => {
				self.ops.push(Operation::Insert(n));
			}
		}
		self
	}

	/// Maps a position through this changeset using the specified bias.
	///
	/// Positions inside a deleted run collapse onto the start of the deletion.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		let mut old_pos = 0;
		let mut new_pos = 0;

		for op in &self.ops {
			if old_pos > pos {
				break;
			}

			match *op {
				Operation::Retain(n) => {
					if old_pos + n > pos {
						return new_pos + (pos - old_pos);
					}
					old_pos += n;
					new_pos += n;
				}
				Operation::Delete(n) => {
					if old_pos + n > pos {
						return new_pos;
					}
					old_pos += n;
				}
				Operation::Insert(n) => {
					if old_pos == pos && bias == Bias::Left {
						// Exactly at the insertion point: stay before it.
					} else {
						new_pos += n;
					}
				}
			}
		}

		new_pos + (pos - old_pos)
	}

	/// Maps a half-open range so that insertions at either edge stay outside it.
	///
	/// Returns `None` when the range collapses, i.e. its content was deleted.
	pub fn map_range(&self, from: CharIdx, to: CharIdx) -> Option<(CharIdx, CharIdx)> {
		let new_from = self.map_pos(from, Bias::Right);
		let new_to = self.map_pos(to, Bias::Left);
		(new_from < new_to).then_some((new_from, new_to))
	}
}
