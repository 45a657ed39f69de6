//! Bounded, score-ordered candidate lists.
//!
//! [`TopK`] keeps at most `capacity` items sorted by non-increasing score.
//! Probabilistic classifiers use it to rank entity types, and the search
//! uses it to rank whole hypotheses.

/// What happened to an item offered to a [`TopK`].
#[derive(Debug, PartialEq)]
pub enum Admission<T> {
    Admitted,
    /// Admitted, pushing the lowest-ranked item out.
    Evicted(T),
    /// Not admitted: it outranked nothing and the list was full.
    Rejected(T),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub score: f64,
    pub item: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopK<T> {
    capacity: usize,
    entries: Vec<Ranked<T>>,
}

impl<T> TopK<T> {
    pub fn new(capacity: usize) -> Self {
        TopK {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert ahead of the first entry scoring strictly lower, so ties keep
    /// the earlier arrival in front. Rejected and evicted items are handed
    /// back to the caller.
    pub fn insert(&mut self, score: f64, item: T) -> Admission<T> {
        match self.entries.iter().position(|entry| entry.score < score) {
            Some(position) => {
                let evicted = if self.entries.len() >= self.capacity {
                    self.entries.pop()
                } else {
                    None
                };
                self.entries.insert(position, Ranked { score, item });
                match evicted {
                    Some(entry) => Admission::Evicted(entry.item),
                    None => Admission::Admitted,
                }
            }
            None if self.entries.len() < self.capacity => {
                self.entries.push(Ranked { score, item });
                Admission::Admitted
            }
            None => Admission::Rejected(item),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&Ranked<T>> {
        self.entries.get(index)
    }

    pub fn best(&self) -> Option<&Ranked<T>> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ranked<T>> {
        self.entries.iter()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.entries.iter().map(|entry| entry.score).collect()
    }

    /// Exchange the items at two ranks while each rank keeps its score.
    pub fn swap_items(&mut self, a: usize, b: usize) {
        if a == b || a >= self.entries.len() || b >= self.entries.len() {
            return;
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.entries.split_at_mut(high);
        std::mem::swap(&mut head[low].item, &mut tail[0].item);
    }

    pub fn into_vec(self) -> Vec<Ranked<T>> {
        self.entries
    }

    pub fn into_items(self) -> Vec<T> {
        self.entries.into_iter().map(|entry| entry.item).collect()
    }
}

impl<T> IntoIterator for TopK<T> {
    type Item = Ranked<T>;
    type IntoIter = std::vec::IntoIter<Ranked<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn keeps_descending_order() {
        let mut list = TopK::new(4);
        for (score, name) in [(-3.0, "c"), (-1.0, "a"), (-2.0, "b")] {
            assert_eq!(list.insert(score, name), Admission::Admitted);
        }
        assert_eq!(list.scores(), vec![-1.0, -2.0, -3.0]);
        assert_eq!(list.into_items(), vec!["a", "b", "c"]);
    }

    #[test]
    fn ties_keep_earlier_arrival_first() {
        let mut list = TopK::new(3);
        list.insert(-1.0, "first");
        list.insert(-1.0, "second");
        list.insert(-0.5, "best");
        assert_eq!(list.into_items(), vec!["best", "first", "second"]);
    }

    #[test]
    fn full_list_evicts_lowest() {
        let mut list = TopK::new(2);
        list.insert(-1.0, "a");
        list.insert(-2.0, "b");
        assert_eq!(list.insert(-1.5, "c"), Admission::Evicted("b"));
        assert_eq!(list.into_items(), vec!["a", "c"]);
    }

    #[test]
    fn candidate_below_minimum_of_full_list_is_rejected() {
        let mut list = TopK::new(3);
        list.insert(-1.0, "a");
        list.insert(-2.0, "b");
        list.insert(-3.0, "c");
        let before = list.clone();

        assert_eq!(list.insert(-4.0, "d"), Admission::Rejected("d"));
        assert_eq!(list.insert(-3.0, "tie"), Admission::Rejected("tie"));
        assert_eq!(list, before);
    }

    #[test]
    fn zero_capacity_admits_nothing() {
        let mut list = TopK::new(0);
        assert_eq!(list.insert(0.0, 1), Admission::Rejected(1));
        assert!(list.is_empty());
    }

    #[test]
    fn swapping_items_keeps_scores_in_place() {
        let mut list = TopK::new(3);
        list.insert(-1.0, "OTH");
        list.insert(-2.0, "PER");
        list.swap_items(0, 1);
        assert_eq!(list.scores(), vec![-1.0, -2.0]);
        assert_eq!(list.into_items(), vec!["PER", "OTH"]);
    }

    proptest! {
        #[test]
        fn stays_sorted_and_bounded(
            capacity in 0usize..8,
            scores in proptest::collection::vec(-100.0f64..0.0, 0..40),
        ) {
            let mut list = TopK::new(capacity);
            let mut returned = 0usize;
            for (index, &score) in scores.iter().enumerate() {
                match list.insert(score, index) {
                    Admission::Admitted => {}
                    Admission::Evicted(_) | Admission::Rejected(_) => returned += 1,
                }
                prop_assert!(list.len() <= capacity);
                let ranked = list.scores();
                prop_assert!(ranked.windows(2).all(|pair| pair[0] >= pair[1]));
            }
            prop_assert_eq!(list.len() + returned, scores.len());

            let mut best = scores.clone();
            best.sort_by(|a, b| b.total_cmp(a));
            best.truncate(capacity);
            prop_assert_eq!(list.scores(), best);
        }
    }
}
