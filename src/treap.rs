//! Implicit treap of pieces.
//!
//! The tree is keyed by position rather than by comparison: a node's key is the
//! number of elements in its left subtree, which every node caches through
//! `subtree_len`. Inorder traversal yields the pieces in document order.
//! Priorities form a max-heap, which keeps the expected height logarithmic
//! without any rotations.
//!
//! After every structural edit the table calls [`Treap::coalesce`], which
//! flattens the tree, fuses neighbouring pieces that continue each other in the
//! same store, and rebuilds a balanced tree by bisection. The rebuilt tree gets
//! depth-derived priorities so the heap property holds before the next merge.

use rand::Rng;
use rand::rngs::SmallRng;

use crate::error::InvariantError;
use crate::piece::Piece;

/// An owned, possibly empty subtree.
pub type Link = Option<Box<Node>>;

/// Priority of the root of a rebuilt tree. Each level below gets one less.
const REBUILD_PRIORITY: u64 = u64::MAX;

#[derive(Debug)]
pub struct Node {
    pub piece: Piece,
    pub priority: u64,
    pub left: Link,
    pub right: Link,
    /// Elements in this subtree: own piece plus both children.
    pub subtree_len: usize,
}

impl Node {
    fn new(piece: Piece, priority: u64, left: Link, right: Link) -> Box<Node> {
        let mut node = Box::new(Node {
            piece,
            priority,
            left,
            right,
            subtree_len: 0,
        });
        node.recalc();
        return node;
    }

    /// Restore `subtree_len` after the children changed.
    #[inline]
    pub fn recalc(&mut self) {
        self.subtree_len = self.piece.len + len_of(&self.left) + len_of(&self.right);
    }
}

#[inline]
pub fn len_of(link: &Link) -> usize {
    return link.as_ref().map_or(0, |node| node.subtree_len);
}

/// Split a subtree so the left half holds exactly the first `pos` elements.
///
/// If `pos` lands inside a piece, that piece is cut into two descriptors. The
/// halves keep the original node's priority, so each side still satisfies the
/// heap property with the subtree it inherits.
pub fn split(link: Link, pos: usize) -> (Link, Link) {
    let Some(mut node) = link else {
        return (None, None);
    };

    let left_len = len_of(&node.left);
    let piece_len = node.piece.len;

    if pos < left_len {
        let (l, r) = split(node.left.take(), pos);
        node.left = r;
        node.recalc();
        return (l, Some(node));
    }

    if pos > left_len + piece_len {
        let (l, r) = split(node.right.take(), pos - left_len - piece_len);
        node.right = l;
        node.recalc();
        return (Some(node), r);
    }

    let offset = pos - left_len;
    if offset == 0 {
        let left = node.left.take();
        node.recalc();
        return (left, Some(node));
    }
    if offset == piece_len {
        let right = node.right.take();
        node.recalc();
        return (Some(node), right);
    }

    let (head, tail) = node.piece.split_at(offset);
    let Node { priority, left, right, .. } = *node;
    let head = Node::new(head, priority, left, None);
    let tail = Node::new(tail, priority, None, right);
    return (Some(head), Some(tail));
}

/// Concatenate two subtrees. Every element of `a` must precede every element
/// of `b`.
pub fn merge(a: Link, b: Link) -> Link {
    match (a, b) {
        (None, b) => b,
        (a, None) => a,
        (Some(mut a), Some(mut b)) => {
            if a.priority > b.priority {
                a.right = merge(a.right.take(), Some(b));
                a.recalc();
                Some(a)
            } else {
                b.left = merge(Some(a), b.left.take());
                b.recalc();
                Some(b)
            }
        }
    }
}

/// Move every piece of a subtree into `out`, in order.
fn drain_inorder(link: Link, out: &mut Vec<Piece>) {
    if let Some(node) = link {
        let Node { piece, left, right, .. } = *node;
        drain_inorder(left, out);
        out.push(piece);
        drain_inorder(right, out);
    }
}

/// Build a balanced tree over `pieces` by always bisecting the slice.
fn build_balanced(pieces: &[Piece], depth: u64) -> Link {
    if pieces.is_empty() {
        return None;
    }
    let mid = pieces.len() / 2;
    let left = build_balanced(&pieces[..mid], depth + 1);
    let right = build_balanced(&pieces[mid + 1..], depth + 1);
    return Some(Node::new(pieces[mid], REBUILD_PRIORITY - depth, left, right));
}

/// Inorder iterator over the pieces of a treap.
pub struct Pieces<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Pieces<'a> {
    fn new(root: Option<&'a Node>) -> Pieces<'a> {
        let mut pieces = Pieces { stack: Vec::new() };
        pieces.descend_left(root);
        return pieces;
    }

    fn descend_left(&mut self, mut link: Option<&'a Node>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = &'a Piece;

    fn next(&mut self) -> Option<&'a Piece> {
        let node = self.stack.pop()?;
        self.descend_left(node.right.as_deref());
        return Some(&node.piece);
    }
}

/// The tree root together with the random source for new node priorities.
#[derive(Debug)]
pub struct Treap {
    root: Link,
    rng: SmallRng,
}

impl Treap {
    pub fn new(rng: SmallRng) -> Treap {
        return Treap { root: None, rng };
    }

    /// Total number of elements covered by the tree.
    pub fn len(&self) -> usize {
        return len_of(&self.root);
    }

    pub fn is_empty(&self) -> bool {
        return self.root.is_none();
    }

    pub fn piece_count(&self) -> usize {
        return self.pieces().count();
    }

    pub fn pieces(&self) -> Pieces<'_> {
        return Pieces::new(self.root.as_deref());
    }

    /// Place `piece` so that it starts at `pos`. Positions past the end append.
    pub fn insert_piece(&mut self, pos: usize, piece: Piece) {
        let pos = pos.min(self.len());
        let node = Node::new(piece, self.rng.r#gen(), None, None);
        let (left, right) = split(self.root.take(), pos);
        self.root = merge(merge(left, Some(node)), right);
    }

    /// Detach `len` elements starting at `pos` and return their pieces in
    /// order. Both arguments are clamped to the current length.
    pub fn remove_range(&mut self, pos: usize, len: usize) -> Vec<Piece> {
        let total = self.len();
        let pos = pos.min(total);
        let len = len.min(total - pos);

        let (left, rest) = split(self.root.take(), pos);
        let (middle, right) = split(rest, len);
        self.root = merge(left, right);

        let mut removed = Vec::new();
        drain_inorder(middle, &mut removed);
        return removed;
    }

    /// Fuse contiguous same-store neighbours and rebuild a balanced tree.
    pub fn coalesce(&mut self) {
        let mut flat = Vec::new();
        drain_inorder(self.root.take(), &mut flat);

        let mut fused: Vec<Piece> = Vec::with_capacity(flat.len());
        for piece in flat {
            match fused.last_mut() {
                Some(last) if last.is_contiguous_with(&piece) => last.len += piece.len,
                _ => fused.push(piece),
            }
        }

        self.root = build_balanced(&fused, 0);
    }

    /// Find the piece holding element `pos` and the offset of that element
    /// inside the piece.
    pub fn locate(&self, mut pos: usize) -> Option<(&Piece, usize)> {
        let mut node = self.root.as_deref()?;
        loop {
            let left_len = len_of(&node.left);
            if pos < left_len {
                node = node.left.as_deref()?;
            } else if pos < left_len + node.piece.len {
                return Some((&node.piece, pos - left_len));
            } else {
                pos -= left_len + node.piece.len;
                node = node.right.as_deref()?;
            }
        }
    }

    /// Verify sizes, heap order, piece bounds and coalescing.
    pub fn check(&self, store_len: impl Fn(&Piece) -> usize) -> Result<(), InvariantError> {
        let mut index = 0;
        check_node(self.root.as_deref(), &mut index, &store_len)?;

        let mut prev: Option<&Piece> = None;
        for (index, piece) in self.pieces().enumerate() {
            if let Some(prev) = prev {
                if prev.is_contiguous_with(piece) {
                    return Err(InvariantError::Uncoalesced { index: index - 1 });
                }
            }
            prev = Some(piece);
        }
        return Ok(());
    }
}

/// Walk a subtree inorder, numbering pieces, and return its real length.
fn check_node(
    node: Option<&Node>,
    index: &mut usize,
    store_len: &impl Fn(&Piece) -> usize,
) -> Result<usize, InvariantError> {
    let Some(node) = node else {
        return Ok(0);
    };

    let left = check_node(node.left.as_deref(), index, store_len)?;
    let here = *index;
    *index += 1;

    let piece = &node.piece;
    if piece.len == 0 {
        return Err(InvariantError::EmptyPiece { index: here });
    }
    let available = store_len(piece);
    if piece.end() > available {
        return Err(InvariantError::OutOfBounds {
            index: here,
            store: piece.store,
            end: piece.end(),
            store_len: available,
        });
    }

    for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
        if child.priority > node.priority {
            return Err(InvariantError::HeapViolation {
                index: here,
                parent: node.priority,
                child: child.priority,
            });
        }
    }

    let right = check_node(node.right.as_deref(), index, store_len)?;
    let actual = left + piece.len + right;
    if actual != node.subtree_len {
        return Err(InvariantError::SizeMismatch {
            index: here,
            cached: node.subtree_len,
            actual,
        });
    }
    return Ok(actual);
}
