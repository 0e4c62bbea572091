//! Bounded undo/redo log.
//!
//! Each event carries its own copy of the elements it touched, so replaying it
//! never depends on what the tree looks like after later coalescing. Both
//! stacks hold at most `max_depth` events; pushing past that evicts the oldest.

use std::collections::VecDeque;

use tracing::debug;

/// A reversible record of one edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent<T> {
    Insert { pos: usize, elements: Vec<T> },
    Delete { pos: usize, elements: Vec<T> },
    Modify { pos: usize, old: T, new: T },
}

/// The non-recording edit entry points that events replay through.
pub(crate) trait Replay<T> {
    fn replay_insert(&mut self, pos: usize, elements: &[T]);
    fn replay_delete(&mut self, pos: usize, len: usize) -> Vec<T>;
}

impl<T> EditEvent<T> {
    /// Position the event applies at.
    pub fn pos(&self) -> usize {
        return match self {
            EditEvent::Insert { pos, .. } => *pos,
            EditEvent::Delete { pos, .. } => *pos,
            EditEvent::Modify { pos, .. } => *pos,
        };
    }
}

impl<T: Clone> EditEvent<T> {
    /// Apply the semantic inverse of this event.
    pub(crate) fn undo(&self, target: &mut impl Replay<T>) {
        match self {
            EditEvent::Insert { pos, elements } => {
                target.replay_delete(*pos, elements.len());
            }
            EditEvent::Delete { pos, elements } => target.replay_insert(*pos, elements),
            EditEvent::Modify { pos, old, .. } => {
                target.replay_delete(*pos, 1);
                target.replay_insert(*pos, std::slice::from_ref(old));
            }
        }
    }

    /// Apply this event again in its original direction.
    pub(crate) fn redo(&self, target: &mut impl Replay<T>) {
        match self {
            EditEvent::Insert { pos, elements } => target.replay_insert(*pos, elements),
            EditEvent::Delete { pos, elements } => {
                target.replay_delete(*pos, elements.len());
            }
            EditEvent::Modify { pos, new, .. } => {
                target.replay_delete(*pos, 1);
                target.replay_insert(*pos, std::slice::from_ref(new));
            }
        }
    }
}

/// Undo and redo stacks with a shared depth limit.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo: VecDeque<EditEvent<T>>,
    redo: VecDeque<EditEvent<T>>,
    max_depth: usize,
}

impl<T> History<T> {
    pub fn new(max_depth: usize) -> History<T> {
        return History {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            max_depth,
        };
    }

    pub fn max_depth(&self) -> usize {
        return self.max_depth;
    }

    pub fn undo_len(&self) -> usize {
        return self.undo.len();
    }

    pub fn redo_len(&self) -> usize {
        return self.redo.len();
    }

    /// Undoable events, most recent first.
    pub fn undo_events(&self) -> impl Iterator<Item = &EditEvent<T>> {
        return self.undo.iter().rev();
    }

    /// Redoable events, most recently undone first.
    pub fn redo_events(&self) -> impl Iterator<Item = &EditEvent<T>> {
        return self.redo.iter().rev();
    }

    /// Record a fresh edit. This starts a new branch of history, so anything
    /// that could have been redone is dropped.
    pub(crate) fn record(&mut self, event: EditEvent<T>) {
        self.push_undo(event);
        self.redo.clear();
    }

    pub(crate) fn push_undo(&mut self, event: EditEvent<T>) {
        push_bounded(&mut self.undo, event, self.max_depth);
    }

    pub(crate) fn push_redo(&mut self, event: EditEvent<T>) {
        push_bounded(&mut self.redo, event, self.max_depth);
    }

    pub(crate) fn pop_undo(&mut self) -> Option<EditEvent<T>> {
        return self.undo.pop_back();
    }

    pub(crate) fn pop_redo(&mut self) -> Option<EditEvent<T>> {
        return self.redo.pop_back();
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

fn push_bounded<T>(stack: &mut VecDeque<EditEvent<T>>, event: EditEvent<T>, max_depth: usize) {
    stack.push_back(event);
    while stack.len() > max_depth {
        stack.pop_front();
        debug!(max_depth, "history full, evicted oldest event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays straight onto a `Vec`, so events can be checked in isolation.
    impl<T: Clone> Replay<T> for Vec<T> {
        fn replay_insert(&mut self, pos: usize, elements: &[T]) {
            let pos = pos.min(self.len());
            self.splice(pos..pos, elements.iter().cloned());
        }

        fn replay_delete(&mut self, pos: usize, len: usize) -> Vec<T> {
            let pos = pos.min(self.len());
            let end = (pos + len).min(self.len());
            return self.drain(pos..end).collect();
        }
    }

    fn insert(pos: usize, elements: &[char]) -> EditEvent<char> {
        return EditEvent::Insert { pos, elements: elements.to_vec() };
    }

    #[test]
    fn insert_event_round_trip() {
        let mut seq = vec!['a', 'b', 'c'];
        let event = insert(1, &['x', 'y']);

        event.redo(&mut seq);
        assert_eq!(seq, vec!['a', 'x', 'y', 'b', 'c']);
        event.undo(&mut seq);
        assert_eq!(seq, vec!['a', 'b', 'c']);
    }

    #[test]
    fn delete_event_round_trip() {
        let mut seq = vec!['a', 'b', 'c'];
        let event = EditEvent::Delete { pos: 0, elements: vec!['a', 'b'] };

        event.redo(&mut seq);
        assert_eq!(seq, vec!['c']);
        event.undo(&mut seq);
        assert_eq!(seq, vec!['a', 'b', 'c']);
    }

    #[test]
    fn modify_event_round_trip() {
        let mut seq = vec!['a', 'b', 'c'];
        let event = EditEvent::Modify { pos: 2, old: 'c', new: 'z' };

        event.redo(&mut seq);
        assert_eq!(seq, vec!['a', 'b', 'z']);
        event.undo(&mut seq);
        assert_eq!(seq, vec!['a', 'b', 'c']);
        assert_eq!(event.pos(), 2);
    }

    #[test]
    fn record_clears_redo() {
        let mut history = History::new(10);
        history.record(insert(0, &['a']));
        let event = history.pop_undo().unwrap();
        history.push_redo(event);
        assert_eq!(history.redo_len(), 1);

        history.record(insert(0, &['b']));
        assert_eq!(history.redo_len(), 0);
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn eviction_drops_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.record(insert(i, &['x']));
        }

        assert_eq!(history.undo_len(), 3);
        let positions: Vec<usize> = history.undo_events().map(|e| e.pos()).collect();
        assert_eq!(positions, vec![4, 3, 2]);
    }

    #[test]
    fn zero_depth_keeps_nothing() {
        let mut history = History::new(0);
        history.record(insert(0, &['x']));
        history.push_redo(insert(0, &['y']));
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 0);
    }
}
