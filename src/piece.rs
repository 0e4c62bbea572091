//! Pieces and the two backing stores they point into.
//!
//! A piece never owns elements. It names a contiguous run inside either the
//! original store (filled once at construction) or the add store (append-only,
//! grows with every insert and never shrinks). Deleting from the table drops
//! pieces, not the elements behind them.

/// Which backing store a piece reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Store {
    Original,
    Add,
}

/// A contiguous run of elements inside one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub store: Store,
    pub start: usize,
    pub len: usize,
}

impl Piece {
    pub fn new(store: Store, start: usize, len: usize) -> Piece {
        debug_assert!(len > 0, "live pieces are never empty");
        return Piece { store, start, len };
    }

    /// One past the last store index covered by this piece.
    pub fn end(&self) -> usize {
        return self.start + self.len;
    }

    /// Cut the piece in two at `offset`. Both halves stay in the same store
    /// and neither is empty.
    pub fn split_at(&self, offset: usize) -> (Piece, Piece) {
        debug_assert!(offset > 0 && offset < self.len);
        let head = Piece::new(self.store, self.start, offset);
        let tail = Piece::new(self.store, self.start + offset, self.len - offset);
        return (head, tail);
    }

    /// True when `next` continues this piece in the same store, so the two
    /// can be represented by a single piece.
    pub fn is_contiguous_with(&self, next: &Piece) -> bool {
        return self.store == next.store && self.end() == next.start;
    }
}

/// The original and add stores.
#[derive(Debug, Clone)]
pub struct Buffers<T> {
    original: Vec<T>,
    add: Vec<T>,
}

impl<T> Buffers<T> {
    pub fn new(original: Vec<T>) -> Buffers<T> {
        return Buffers { original, add: Vec::new() };
    }

    /// A piece covering the whole original store, if it has anything in it.
    pub fn original_piece(&self) -> Option<Piece> {
        if self.original.is_empty() {
            return None;
        }
        return Some(Piece::new(Store::Original, 0, self.original.len()));
    }

    pub fn store_len(&self, store: Store) -> usize {
        return match store {
            Store::Original => self.original.len(),
            Store::Add => self.add.len(),
        };
    }

    /// The elements a piece refers to.
    pub fn slice(&self, piece: &Piece) -> &[T] {
        let store = match piece.store {
            Store::Original => &self.original,
            Store::Add => &self.add,
        };
        return &store[piece.start..piece.end()];
    }
}

impl<T: Clone> Buffers<T> {
    /// Copy `elements` onto the end of the add store and return the piece
    /// covering them. `elements` must not be empty.
    pub fn append(&mut self, elements: &[T]) -> Piece {
        let start = self.add.len();
        self.add.extend_from_slice(elements);
        return Piece::new(Store::Add, start, elements.len());
    }
}
