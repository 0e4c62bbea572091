//! Piecetable - a generic editable sequence with bounded undo/redo.
//!
//! Elements live in two stores: the original sequence the table was built
//! from, and an append-only add store for everything inserted since. The
//! logical sequence is a list of pieces pointing into those stores, kept in an
//! implicit treap keyed by element count so edits at any position take
//! expected logarithmic time to locate.
//!
//! # Quick Start
//!
//! ```
//! use piecetable::PieceTable;
//!
//! let mut table = PieceTable::from_vec(vec!['a', 'b', 'c']);
//!
//! table.insert(1, &['x']);
//! assert_eq!(table.collect(), vec!['a', 'x', 'b', 'c']);
//!
//! assert_eq!(table.delete(1, 1), vec!['x']);
//! table.undo();
//! assert_eq!(table.collect(), vec!['a', 'x', 'b', 'c']);
//!
//! table.modify(1, |_| 'y');
//! assert_eq!(table.collect(), vec!['a', 'y', 'b', 'c']);
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod piece;
mod table;
mod treap;

pub use config::Config;
pub use error::InvariantError;
pub use history::{EditEvent, History};
pub use piece::{Piece, Store};
pub use table::PieceTable;
