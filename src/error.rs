//! Invariant violations reported by [`PieceTable::check_invariants`].
//!
//! None of these can be produced by misuse of the public API: edits clamp
//! their arguments instead of failing. Seeing one means the tree itself is
//! corrupt.
//!
//! [`PieceTable::check_invariants`]: crate::PieceTable::check_invariants

use thiserror::Error;

use crate::piece::Store;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// A node's cached subtree length disagrees with its pieces.
    #[error("subtree length {cached} at piece {index} does not match actual {actual}")]
    SizeMismatch {
        index: usize,
        cached: usize,
        actual: usize,
    },

    /// A child outranks its parent.
    #[error("child priority {child} exceeds parent priority {parent} at piece {index}")]
    HeapViolation {
        index: usize,
        parent: u64,
        child: u64,
    },

    /// A zero-length piece was left in the tree.
    #[error("empty piece at index {index}")]
    EmptyPiece { index: usize },

    /// A piece points past the end of its store.
    #[error("piece {index} ends at {end} but the {store:?} store holds {store_len}")]
    OutOfBounds {
        index: usize,
        store: Store,
        end: usize,
        store_len: usize,
    },

    /// Two neighbouring pieces should have been coalesced.
    #[error("piece {index} is contiguous with its successor in the same store")]
    Uncoalesced { index: usize },
}
