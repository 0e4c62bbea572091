//! AFL fuzz harness for the piece table.
//!
//! Every input is decoded into a stream of edits and history moves that are
//! applied both to a `PieceTable` and to a snapshot-based `Vec` model. After
//! each operation the two must hold the same sequence and the tree must pass
//! its invariant check.

use afl::fuzz;
use piecetable::{Config, PieceTable};

const MAX_HISTORY: usize = 8;

/// Operation types the fuzzer can generate
#[derive(Debug, Clone, Copy)]
enum FuzzOp {
    Insert { pos_frac: u8, len: u8, byte: u8 },
    Delete { pos_frac: u8, len: u8 },
    Modify { pos_frac: u8, byte: u8 },
    Undo,
    Redo,
}

impl FuzzOp {
    fn from_bytes(bytes: &[u8]) -> Option<(FuzzOp, &[u8])> {
        let (&tag, rest) = bytes.split_first()?;
        match tag % 5 {
            0 if rest.len() >= 3 => {
                let op = FuzzOp::Insert {
                    pos_frac: rest[0],
                    len: (rest[1] % 16).saturating_add(1),
                    byte: rest[2],
                };
                Some((op, &rest[3..]))
            }
            1 if rest.len() >= 2 => {
                let op = FuzzOp::Delete { pos_frac: rest[0], len: rest[1] };
                Some((op, &rest[2..]))
            }
            2 if rest.len() >= 2 => {
                let op = FuzzOp::Modify { pos_frac: rest[0], byte: rest[1] };
                Some((op, &rest[2..]))
            }
            3 => Some((FuzzOp::Undo, rest)),
            4 => Some((FuzzOp::Redo, rest)),
            _ => None,
        }
    }
}

/// Scale a byte onto `0..=len`.
fn scaled(frac: u8, len: usize) -> usize {
    return frac as usize * len / 255;
}

struct Model {
    current: Vec<u8>,
    undo: Vec<Vec<u8>>,
    redo: Vec<Vec<u8>>,
}

impl Model {
    fn record(&mut self) {
        self.undo.push(self.current.clone());
        if self.undo.len() > MAX_HISTORY {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    fn swap(from: &mut Vec<Vec<u8>>, to: &mut Vec<Vec<u8>>, current: &mut Vec<u8>) {
        if let Some(snapshot) = from.pop() {
            to.push(std::mem::replace(current, snapshot));
            if to.len() > MAX_HISTORY {
                to.remove(0);
            }
        }
    }
}

fn main() {
    fuzz!(|data: &[u8]| {
        let config = Config::new().seed(0).max_history(MAX_HISTORY);
        let mut table = PieceTable::with_config(b"seed".to_vec(), config);
        let mut model = Model { current: b"seed".to_vec(), undo: Vec::new(), redo: Vec::new() };
        let mut remaining = data;

        while let Some((op, rest)) = FuzzOp::from_bytes(remaining) {
            remaining = rest;
            let len = model.current.len();

            match op {
                FuzzOp::Insert { pos_frac, len: count, byte } => {
                    let pos = scaled(pos_frac, len);
                    let content = vec![byte; count as usize];
                    table.insert(pos, &content);
                    model.record();
                    model.current.splice(pos..pos, content);
                }
                FuzzOp::Delete { pos_frac, len: count } => {
                    let pos = scaled(pos_frac, len);
                    let removed = table.delete(pos, count as usize);
                    if pos < len && count > 0 {
                        let end = (pos + count as usize).min(len);
                        model.record();
                        let expected: Vec<u8> = model.current.drain(pos..end).collect();
                        assert_eq!(removed, expected);
                    } else {
                        assert!(removed.is_empty());
                    }
                }
                FuzzOp::Modify { pos_frac, byte } => {
                    let pos = scaled(pos_frac, len);
                    table.modify(pos, |_| byte);
                    if pos < len && model.current[pos] != byte {
                        model.record();
                        model.current[pos] = byte;
                    }
                }
                FuzzOp::Undo => {
                    table.undo();
                    Model::swap(&mut model.undo, &mut model.redo, &mut model.current);
                }
                FuzzOp::Redo => {
                    table.redo();
                    Model::swap(&mut model.redo, &mut model.undo, &mut model.current);
                }
            }

            assert_eq!(table.collect(), model.current, "diverged after {:?}", op);
            table.check_invariants().expect("tree invariants");
        }
    });
}
