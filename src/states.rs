use bitvec::prelude::*;

/// A fixed number of states `0..n`, each either final or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSet {
    final_states: BitVec<u8>,
}

impl StateSet {
    /// Create `count` states, none of them final.
    pub fn new(count: usize) -> Self {
        StateSet {
            final_states: BitVec::repeat(false, count),
        }
    }

    pub fn len(&self) -> usize {
        self.final_states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.final_states.is_empty()
    }

    /// Mark the state as a final state. The caller must make sure the index is in range, use
    /// [`StateSet::parse_index`] to check a user provided token first.
    pub fn mark_final(&mut self, index: usize) {
        assert!(
            index < self.len(),
            "state {} is out of range for {} states",
            index,
            self.len()
        );
        self.final_states.set(index, true);
    }

    /// Returns false for non-final states as well as for indices that do not exist
    pub fn is_final(&self, index: usize) -> bool {
        self.final_states.get(index).map(|bit| *bit).unwrap_or(false)
    }

    /// Get the indices of all final states in ascending order
    pub fn final_states(&self) -> Vec<usize> {
        self.final_states.iter_ones().collect()
    }

    pub fn as_bits(&self) -> &BitVec<u8> {
        &self.final_states
    }

    /// Parse a user provided token as a state index. Returns None when the token is not an
    /// integer or names a state that does not exist.
    pub fn parse_index(&self, token: &str) -> Option<usize> {
        token
            .parse::<usize>()
            .ok()
            .filter(|index| *index < self.len())
    }
}

#[cfg(test)]
mod states_tests {
    use super::*;

    #[test]
    fn test_new_states_are_not_final() {
        let states = StateSet::new(3);
        assert_eq!(states.len(), 3);
        assert!(states.final_states().is_empty());
        assert!(!states.is_final(0));
        assert!(!states.is_final(3));
    }

    #[test]
    fn test_mark_final() {
        let mut states = StateSet::new(4);
        states.mark_final(3);
        states.mark_final(1);
        states.mark_final(3);
        assert_eq!(states.final_states(), vec![1, 3]);
        assert!(states.is_final(1));
        assert!(!states.is_final(2));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_mark_final_out_of_range() {
        let mut states = StateSet::new(2);
        states.mark_final(2);
    }

    #[test]
    fn test_parse_index() {
        let states = StateSet::new(3);
        assert_eq!(states.parse_index("0"), Some(0));
        assert_eq!(states.parse_index("2"), Some(2));
        assert_eq!(states.parse_index(" 2 "), None);
        assert_eq!(states.parse_index("+1"), Some(1));
        assert_eq!(states.parse_index("3"), None);
        assert_eq!(states.parse_index("-1"), None);
        assert_eq!(states.parse_index("one"), None);
        assert_eq!(states.parse_index(""), None);
        assert_eq!(states.parse_index("99999999999999999999999"), None);
    }

    #[test]
    fn test_zero_states() {
        let states = StateSet::new(0);
        assert!(states.is_empty());
        assert_eq!(states.parse_index("0"), None);
    }
}
