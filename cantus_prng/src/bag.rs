// Weighted draw without replacement.
//
// Items go in with a positive weight; each `remove` picks one with
// probability proportional to its weight among the items still in the bag.
// Draining a bag therefore yields a weighted-random *ordering* of its
// contents, which is how the candidate generator decides which continuations
// to explore first.

use crate::RandomSource;

/// A bag of weighted items drawn without replacement.
#[derive(Clone, Debug)]
pub struct WeightedBag<T> {
    items: Vec<(T, f64)>,
    total: f64,
}

impl<T> Default for WeightedBag<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WeightedBag<T> {
    pub fn new() -> Self {
        WeightedBag {
            items: Vec::new(),
            total: 0.0,
        }
    }

    /// Add an item. Non-positive (or NaN) weights can never be drawn and are
    /// ignored.
    pub fn add(&mut self, item: T, weight: f64) {
        if weight > 0.0 {
            self.items.push((item, weight));
            self.total += weight;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Draw one item, weighted by the remaining weights.
    pub fn remove(&mut self, rng: &mut impl RandomSource) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let target = rng.next_f64() * self.total;
        let mut cumulative = 0.0;
        // Rounding can leave `target` just above the final cumulative sum.
        let mut chosen = self.items.len() - 1;
        for (i, (_, weight)) in self.items.iter().enumerate() {
            cumulative += weight;
            if target < cumulative {
                chosen = i;
                break;
            }
        }
        let (item, weight) = self.items.remove(chosen);
        self.total -= weight;
        if self.items.is_empty() {
            self.total = 0.0;
        }
        Some(item)
    }

    /// Draw every item, returning them in draw order.
    pub fn drain(mut self, rng: &mut impl RandomSource) -> Vec<T> {
        let mut order = Vec::with_capacity(self.items.len());
        while let Some(item) = self.remove(rng) {
            order.push(item);
        }
        order
    }
}
