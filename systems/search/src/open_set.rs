//! Priority queue that reproduces the "latest minimum wins" scan order.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
};

use pathviz_core::Position;

/// Frontier of positions awaiting expansion.
///
/// Selection returns the position with the lowest score. Among equal scores
/// the position that entered the frontier most recently wins, which matches
/// a front-to-back scan that keeps every candidate comparing `<=` to the
/// current best. A position keeps its place in that order when its score
/// changes while it is still queued, and receives a fresh place when it
/// re-enters after being popped.
#[derive(Clone, Debug, Default)]
pub struct OpenSet {
    heap: BinaryHeap<Entry>,
    members: HashMap<Position, Member>,
    next_sequence: u64,
}

#[derive(Clone, Copy, Debug)]
struct Member {
    sequence: u64,
    score: f64,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    score: f64,
    sequence: u64,
    position: Position,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lowest score first, then the latest sequence.
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl OpenSet {
    /// Creates an empty frontier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `position` with `score`, or rescores it when already queued.
    pub fn upsert(&mut self, position: Position, score: f64) {
        let sequence = match self.members.get_mut(&position) {
            Some(member) => {
                member.score = score;
                member.sequence
            }
            None => {
                let sequence = self.next_sequence;
                self.next_sequence += 1;
                let _ = self.members.insert(position, Member { sequence, score });
                sequence
            }
        };

        self.heap.push(Entry {
            score,
            sequence,
            position,
        });
    }

    /// Removes and returns the position that would be selected next.
    pub fn pop(&mut self) -> Option<Position> {
        while let Some(entry) = self.heap.pop() {
            let current = match self.members.get(&entry.position) {
                Some(member) => *member,
                None => continue,
            };
            if current.sequence != entry.sequence
                || current.score.to_bits() != entry.score.to_bits()
            {
                continue;
            }

            let _ = self.members.remove(&entry.position);
            return Some(entry.position);
        }

        None
    }

    /// Reports whether the position is currently queued.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.members.contains_key(&position)
    }

    /// Current score of a queued position.
    #[must_use]
    pub fn score(&self, position: Position) -> Option<f64> {
        self.members.get(&position).map(|member| member.score)
    }

    /// Number of queued positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Reports whether no position is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
