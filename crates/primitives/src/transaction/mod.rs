//! Position mapping between document snapshots.

mod changeset;
mod types;

pub use changeset::ChangeSet;
pub use types::{Bias, CharIdx, CharLen, Operation};
