//! Step store: the ordered steps and the current position
//!
//! Pure index arithmetic. Nothing here touches presentation.

use crate::core::Step;

/// Ordered steps plus a bounded cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepStore {
    steps: Vec<Step>,
    /// `None` exactly when `steps` is empty
    current: Option<usize>,
}

impl StepStore {
    pub fn new(steps: Vec<Step>) -> Self {
        let current = if steps.is_empty() { None } else { Some(0) };
        Self { steps, current }
    }

    /// Advance by one; false at the last step (no wraparound)
    pub fn next(&mut self) -> bool {
        match self.current {
            Some(index) if index + 1 < self.steps.len() => {
                self.current = Some(index + 1);
                true
            }
            _ => false,
        }
    }

    /// Retreat by one; false at the first step
    pub fn previous(&mut self) -> bool {
        match self.current {
            Some(index) if index > 0 => {
                self.current = Some(index - 1);
                true
            }
            _ => false,
        }
    }

    /// Back to the first step (no-op when empty)
    pub fn reset(&mut self) {
        if !self.steps.is_empty() {
            self.current = Some(0);
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Step> {
        self.current.and_then(|index| self.steps.get(index))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.current.map_or(true, |index| index == 0)
    }

    pub fn is_last(&self) -> bool {
        self.current
            .map_or(true, |index| index + 1 == self.steps.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(count: usize) -> StepStore {
        StepStore::new(
            (0..count)
                .map(|i| Step::new(format!("s{}", i), format!("Step {}", i)))
                .collect(),
        )
    }

    #[test]
    fn test_starts_at_zero() {
        let store = store(3);
        assert_eq!(store.index(), Some(0));
        assert_eq!(store.current().unwrap().id, "s0");
        assert!(store.is_first());
        assert!(!store.is_last());
    }

    #[test]
    fn test_next_stops_at_last() {
        let mut store = store(2);
        assert!(store.next());
        assert!(!store.next());
        assert_eq!(store.index(), Some(1));
        assert!(store.is_last());
    }

    #[test]
    fn test_previous_stops_at_first() {
        let mut store = store(2);
        assert!(!store.previous());
        store.next();
        assert!(store.previous());
        assert_eq!(store.index(), Some(0));
    }

    #[test]
    fn test_reset() {
        let mut store = store(4);
        store.next();
        store.next();
        store.reset();
        assert_eq!(store.index(), Some(0));
    }

    #[test]
    fn test_empty_store_is_inert() {
        let mut store = store(0);
        assert!(!store.next());
        assert!(!store.previous());
        store.reset();
        assert_eq!(store.index(), None);
        assert!(store.current().is_none());
        assert!(store.is_first() && store.is_last());
    }
}
