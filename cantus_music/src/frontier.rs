// Search frontier: partial sequences ordered by priority, best first.
//
// A `BinaryHeap` of entries carrying the priority computed when the entry
// was pushed. Ties are broken by insertion order, most recent first, so that
// among equally scored continuations the one the candidate generator
// preferred (and the driver pushed last) is expanded first. The insertion
// counter makes the order total and the search reproducible for a seed.

use crate::scoring::ScoredCantus;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct FrontierEntry {
    priority: f64,
    /// Monotonic insertion counter; higher wins ties.
    sequence: u64,
    candidate: ScoredCantus,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// Max-priority queue of candidate sequences.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    inserted: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, candidate: ScoredCantus, priority: f64) {
        self.heap.push(FrontierEntry {
            priority,
            sequence: self.inserted,
            candidate,
        });
        self.inserted += 1;
    }

    /// Remove and return the highest-priority candidate with its priority.
    pub fn pop(&mut self) -> Option<(ScoredCantus, f64)> {
        self.heap.pop().map(|e| (e.candidate, e.priority))
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
