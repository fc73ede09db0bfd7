//! Core types shared by the highlighter: document snapshots, position mapping and decorations.

/// Inline decorations and decoration sets.
pub mod decoration;
/// Document tree snapshots and the in-memory document.
pub mod document;
/// Position mapping through document changes.
pub mod transaction;

pub use decoration::{Decoration, DecorationSet, Labels};
pub use document::{Block, BlockRef, Document, DocumentTree, EditError, NodeId};
pub use transaction::{Bias, ChangeSet, CharIdx, CharLen, Operation};
