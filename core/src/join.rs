//! Join-latest accumulator.
//!
//! Holds the most recent value from each of `N` independent sources and
//! only reports a joined result once every source has produced at least
//! one value. Later values from any source replace that source's slot.

/// Latest value per source, joined once all sources have emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinLatest<T, const N: usize> {
    slots: [Option<T>; N],
}

impl<T, const N: usize> JoinLatest<T, N> {
    /// Create an accumulator with no values yet
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Record the latest value for source `index`
    ///
    /// # Returns
    ///
    /// `false` when `index` is out of range (the value is discarded)
    pub fn set(&mut self, index: usize, value: T) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = Some(value);
                true
            },
            None => false,
        }
    }

    /// Latest value for source `index`, if it has emitted
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Whether every source has emitted at least once
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Apply `predicate` to every latest value
    ///
    /// # Returns
    ///
    /// `None` until every source has emitted, then whether all values satisfy `predicate`
    pub fn all<F>(&self, mut predicate: F) -> Option<bool>
    where
        F: FnMut(&T) -> bool,
    {
        if !self.is_complete() {
            return None;
        }
        Some(self.slots.iter().flatten().all(|value| predicate(value)))
    }

    /// Forget every value
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

impl<T, const N: usize> Default for JoinLatest<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::JoinLatest;

    #[test]
    fn reports_nothing_until_every_source_emits() {
        let mut join: JoinLatest<bool, 3> = JoinLatest::new();

        assert!(join.set(0, true));
        assert!(join.set(2, true));
        assert_eq!(join.all(|ok| *ok), None);

        assert!(join.set(1, true));
        assert_eq!(join.all(|ok| *ok), Some(true));
    }

    #[test]
    fn later_values_replace_earlier_ones() {
        let mut join: JoinLatest<u8, 2> = JoinLatest::new();
        join.set(0, 1);
        join.set(1, 1);
        join.set(0, 9);

        assert_eq!(join.get(0), Some(&9));
        assert_eq!(join.all(|v| *v == 1), Some(false));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut join: JoinLatest<u8, 1> = JoinLatest::new();

        assert!(!join.set(1, 5));
        assert!(!join.is_complete());
    }

    #[test]
    fn clear_forgets_everything() {
        let mut join: JoinLatest<u8, 1> = JoinLatest::new();
        join.set(0, 5);
        join.clear();

        assert_eq!(join.get(0), None);
        assert_eq!(join.all(|_| true), None);
    }

    mod properties {
        use super::JoinLatest;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn joined_view_reflects_last_write_per_slot(
                writes in prop::collection::vec((0_usize..3, any::<bool>()), 0..32)
            ) {
                let mut join: JoinLatest<bool, 3> = JoinLatest::new();
                let mut last = [None; 3];
                for (index, value) in writes {
                    join.set(index, value);
                    last[index] = Some(value);
                }

                let expected = if last.iter().all(Option::is_some) {
                    Some(last.iter().flatten().all(|value| *value))
                } else {
                    None
                };
                prop_assert_eq!(join.all(|value| *value), expected);
            }
        }
    }
}
