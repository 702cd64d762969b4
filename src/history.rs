use std::collections::VecDeque;

/// An ordered, append-only sample history with optional bounded retention.
///
/// Insertion order is arrival order. The parsing core itself treats
/// histories as unbounded; the trailing-window trim is a retention policy
/// layered on top for long-running live sessions.
#[derive(Clone, Debug)]
pub struct History<T> {
    capacity: Option<usize>,
    items: VecDeque<T>,
}

impl<T> History<T> {
    pub fn unbounded() -> Self {
        Self {
            capacity: None,
            items: VecDeque::new(),
        }
    }

    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            items: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, item: T) {
        if let Some(cap) = self.capacity {
            if self.items.len() >= cap {
                self.items.pop_front();
            }
        }
        self.items.push_back(item);
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Mutable access to the most recent entry, for composite records whose
    /// secondary fields arrive on later lines.
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.items.back_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> History<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_history_trims_oldest() {
        let mut h = History::bounded(3);
        for i in 1..=4 {
            h.push(i);
        }
        assert_eq!(h.to_vec(), vec![2, 3, 4]);
        assert_eq!(h.last(), Some(&4));
    }

    #[test]
    fn unbounded_history_keeps_everything() {
        let mut h = History::unbounded();
        for i in 0..100 {
            h.push(i);
        }
        assert_eq!(h.len(), 100);
    }

    #[test]
    fn last_mut_edits_in_place() {
        let mut h = History::bounded(2);
        h.push(10);
        *h.last_mut().unwrap() = 11;
        assert_eq!(h.to_vec(), vec![11]);
        assert!(History::<u8>::bounded(1).last_mut().is_none());
    }
}
