//! The public piece table.
//!
//! Edits locate their position with an order-statistic split, splice the tree,
//! then coalesce. Recording edits push one event and drop the redo branch;
//! undo and redo replay events through the non-recording entry points.
//!
//! Arguments are clamped rather than rejected: positions past the end
//! saturate, oversized lengths shrink to what is left, and empty edits do
//! nothing at all.

use tracing::{debug, trace};

use crate::config::Config;
use crate::error::InvariantError;
use crate::history::{EditEvent, History, Replay};
use crate::piece::{Buffers, Piece, Store};
use crate::treap::Treap;

/// An editable sequence with bounded undo/redo.
#[derive(Debug)]
pub struct PieceTable<T> {
    buffers: Buffers<T>,
    tree: Treap,
    history: History<T>,
}

// ========== Construction ==========

impl<T> PieceTable<T> {
    /// An empty table with the default configuration.
    pub fn new() -> PieceTable<T> {
        return PieceTable::with_config(Vec::new(), Config::default());
    }

    /// A table whose original store is `original`.
    pub fn from_vec(original: Vec<T>) -> PieceTable<T> {
        return PieceTable::with_config(original, Config::default());
    }

    pub fn with_config(original: Vec<T>, config: Config) -> PieceTable<T> {
        let buffers = Buffers::new(original);
        let mut tree = Treap::new(config.rng());
        if let Some(piece) = buffers.original_piece() {
            tree.insert_piece(0, piece);
        }
        return PieceTable {
            buffers,
            tree,
            history: History::new(config.max_history),
        };
    }
}

// ========== Queries ==========

impl<T> PieceTable<T> {
    /// Number of elements in the sequence.
    pub fn len(&self) -> usize {
        return self.tree.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.tree.is_empty();
    }

    /// The element at `index`, found by descending the tree.
    pub fn get(&self, index: usize) -> Option<&T> {
        let (piece, offset) = self.tree.locate(index)?;
        return self.buffers.slice(piece).get(offset);
    }

    /// Iterate over the elements in order without copying them.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        return self.tree.pieces().flat_map(|piece| self.buffers.slice(piece));
    }

    /// The pieces making up the sequence, in order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        return self.tree.pieces();
    }

    pub fn piece_count(&self) -> usize {
        return self.tree.piece_count();
    }

    /// Size of the store the table was built from.
    pub fn original_len(&self) -> usize {
        return self.buffers.store_len(Store::Original);
    }

    /// Everything ever inserted, including elements since deleted.
    pub fn add_len(&self) -> usize {
        return self.buffers.store_len(Store::Add);
    }

    pub fn history(&self) -> &History<T> {
        return &self.history;
    }

    pub fn can_undo(&self) -> bool {
        return self.history.undo_len() > 0;
    }

    pub fn can_redo(&self) -> bool {
        return self.history.redo_len() > 0;
    }

    /// Forget every undoable and redoable edit.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Walk the whole tree and confirm its structural invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let buffers = &self.buffers;
        return self.tree.check(|piece| buffers.store_len(piece.store));
    }
}

impl<T: Clone> PieceTable<T> {
    /// Materialize the whole sequence.
    pub fn collect(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        for piece in self.tree.pieces() {
            out.extend_from_slice(self.buffers.slice(piece));
        }
        return out;
    }
}

// ========== Edits ==========

impl<T: Clone> PieceTable<T> {
    /// Insert `elements` so the first lands at `pos`. Positions past the end
    /// append. Inserting nothing is a no-op.
    pub fn insert(&mut self, pos: usize, elements: &[T]) {
        if let Some(pos) = self.insert_raw(pos, elements) {
            self.history.record(EditEvent::Insert {
                pos,
                elements: elements.to_vec(),
            });
        }
    }

    pub fn insert_one(&mut self, pos: usize, element: T) {
        self.insert(pos, std::slice::from_ref(&element));
    }

    /// Remove up to `len` elements starting at `pos` and return them.
    /// Nothing happens when `pos` is at or past the end or `len` is zero.
    pub fn delete(&mut self, pos: usize, len: usize) -> Vec<T> {
        let Some((pos, removed)) = self.delete_raw(pos, len) else {
            return Vec::new();
        };
        self.history.record(EditEvent::Delete {
            pos,
            elements: removed.clone(),
        });
        return removed;
    }

    /// Replace the element at `index` with `transform` of it. Out-of-range
    /// indices and transforms that return an equal value change nothing and
    /// leave history untouched.
    pub fn modify(&mut self, index: usize, transform: impl FnOnce(&T) -> T)
    where
        T: PartialEq,
    {
        let Some(old) = self.get(index).cloned() else {
            return;
        };
        let new = transform(&old);
        if new == old {
            return;
        }

        self.delete_raw(index, 1);
        self.insert_raw(index, std::slice::from_ref(&new));
        self.history.record(EditEvent::Modify { pos: index, old, new });
    }

    /// Revert the most recent recorded edit. Returns false if there was none.
    pub fn undo(&mut self) -> bool {
        let Some(event) = self.history.pop_undo() else {
            return false;
        };
        debug!(pos = event.pos(), remaining = self.history.undo_len(), "undo");
        event.undo(self);
        self.history.push_redo(event);
        return true;
    }

    /// Reapply the most recently undone edit. Returns false if there was none.
    pub fn redo(&mut self) -> bool {
        let Some(event) = self.history.pop_redo() else {
            return false;
        };
        debug!(pos = event.pos(), remaining = self.history.redo_len(), "redo");
        event.redo(self);
        self.history.push_undo(event);
        return true;
    }

    /// Insert without recording. Returns the clamped position, or `None` if
    /// nothing was inserted.
    fn insert_raw(&mut self, pos: usize, elements: &[T]) -> Option<usize> {
        if elements.is_empty() {
            return None;
        }
        let pos = pos.min(self.len());
        trace!(pos, len = elements.len(), "insert");

        let piece = self.buffers.append(elements);
        self.tree.insert_piece(pos, piece);
        self.tree.coalesce();
        return Some(pos);
    }

    /// Delete without recording. Returns the position and the removed
    /// elements, or `None` if the range was empty.
    fn delete_raw(&mut self, pos: usize, len: usize) -> Option<(usize, Vec<T>)> {
        let total = self.len();
        if len == 0 || pos >= total {
            return None;
        }
        let len = len.min(total - pos);
        trace!(pos, len, "delete");

        let pieces = self.tree.remove_range(pos, len);
        let mut removed = Vec::with_capacity(len);
        for piece in &pieces {
            removed.extend_from_slice(self.buffers.slice(piece));
        }
        debug_assert_eq!(removed.len(), len);

        self.tree.coalesce();
        return Some((pos, removed));
    }
}

impl<T: Clone> Replay<T> for PieceTable<T> {
    fn replay_insert(&mut self, pos: usize, elements: &[T]) {
        self.insert_raw(pos, elements);
    }

    fn replay_delete(&mut self, pos: usize, len: usize) -> Vec<T> {
        return self.delete_raw(pos, len).map(|(_, removed)| removed).unwrap_or_default();
    }
}

// ========== Conversions ==========

impl<T> Default for PieceTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for PieceTable<T> {
    fn from(original: Vec<T>) -> Self {
        Self::from_vec(original)
    }
}

impl<T> FromIterator<T> for PieceTable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> PieceTable<char> {
        return PieceTable::with_config(text.chars().collect(), Config::new().seed(1));
    }

    fn text(table: &PieceTable<char>) -> String {
        return table.iter().collect();
    }

    #[test]
    fn from_text() {
        let table = table("Hello, world!");
        assert_eq!(table.len(), 13);
        assert_eq!(table.piece_count(), 1);
        assert_eq!(table.original_len(), 13);
        assert_eq!(table.add_len(), 0);
        assert_eq!(text(&table), "Hello, world!");
    }

    #[test]
    fn empty_table() {
        let table: PieceTable<char> = PieceTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.piece_count(), 0);
        assert!(table.collect().is_empty());
        assert!(table.get(0).is_none());
    }

    #[test]
    fn insert_in_middle_splits_piece() {
        let mut table = table("Hello world");
        table.insert(5, &[',']);
        assert_eq!(text(&table), "Hello, world");

        let pieces: Vec<Piece> = table.pieces().copied().collect();
        assert_eq!(pieces, vec![
            Piece::new(Store::Original, 0, 5),
            Piece::new(Store::Add, 0, 1),
            Piece::new(Store::Original, 5, 6),
        ]);
        table.check_invariants().unwrap();
    }

    #[test]
    fn typing_coalesces_into_one_piece() {
        let mut table = table("");
        for (i, c) in "typing forward".chars().enumerate() {
            table.insert_one(i, c);
        }
        assert_eq!(text(&table), "typing forward");
        assert_eq!(table.piece_count(), 1);
    }

    #[test]
    fn undone_delete_comes_back_through_add_store() {
        let mut table = table("abcdef");
        table.delete(2, 2);
        assert_eq!(table.piece_count(), 2);
        table.undo();

        assert_eq!(text(&table), "abcdef");
        assert_eq!(table.piece_count(), 3);
        table.check_invariants().unwrap();
    }

    #[test]
    fn get_reads_across_pieces() {
        let mut table = table("ace");
        table.insert(1, &['b']);
        table.insert(3, &['d']);

        let got: Vec<char> = (0..5).filter_map(|i| table.get(i).copied()).collect();
        assert_eq!(got, vec!['a', 'b', 'c', 'd', 'e']);
        assert!(table.get(5).is_none());
    }

    #[test]
    fn delete_returns_removed_and_keeps_add_store() {
        let mut table = table("abc");
        table.insert(3, &['x', 'y', 'z']);
        let removed = table.delete(2, 3);

        assert_eq!(removed, vec!['c', 'x', 'y']);
        assert_eq!(text(&table), "abz");
        assert_eq!(table.add_len(), 3);
    }

    #[test]
    fn modify_records_single_event() {
        let mut table = table("abc");
        table.modify(1, |c| c.to_ascii_uppercase());
        assert_eq!(text(&table), "aBc");
        assert_eq!(table.history().undo_len(), 1);
        assert_eq!(
            table.history().undo_events().next(),
            Some(&EditEvent::Modify { pos: 1, old: 'b', new: 'B' })
        );
    }

    #[test]
    fn modify_identity_is_ignored() {
        let mut table = table("abc");
        table.modify(0, |c| *c);
        table.modify(3, |_| 'z');
        assert_eq!(text(&table), "abc");
        assert!(!table.can_undo());
        assert_eq!(table.add_len(), 0);
    }

    #[test]
    fn undo_redo_report_whether_they_ran() {
        let mut table = table("abc");
        assert!(!table.undo());
        assert!(!table.redo());

        table.insert(0, &['z']);
        assert!(table.undo());
        assert!(table.redo());
        assert!(!table.redo());
        assert_eq!(text(&table), "zabc");
    }

    #[test]
    fn clear_history_forgets_everything() {
        let mut table = table("abc");
        table.insert(0, &['z']);
        table.delete(0, 2);
        table.undo();
        table.clear_history();

        assert!(!table.can_undo());
        assert!(!table.can_redo());
        assert_eq!(text(&table), "zabc");
    }

    #[test]
    fn collect_matches_iter() {
        let mut table = table("0123456789");
        table.delete(3, 4);
        table.insert(1, &['a', 'b']);
        assert_eq!(table.collect(), table.iter().copied().collect::<Vec<_>>());
    }

    #[test]
    fn conversions() {
        let from: PieceTable<u8> = vec![1, 2, 3].into();
        let collected: PieceTable<u8> = (1..=3).collect();
        assert_eq!(from.collect(), collected.collect());
    }
}
