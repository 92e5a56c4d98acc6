//! ID generation utilities
//!
//! Each graph owns one allocator, so two graphs never share a counter and a
//! generated id is only checked against the graph it is used in.

/// Generates `<prefix><n>` ids ("+1", "+2", ...) that skip ids already taken
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    prefix: String,
    last: u64,
}

impl IdAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last: 0,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Counter value of the most recently generated id
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Next id for which `taken` returns false
    pub fn next_free(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            self.last += 1;
            let id = format!("{}{}", self.prefix, self.last);
            if !taken(&id) {
                return id;
            }
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new("+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next_free(|_| false), "+1");
        assert_eq!(ids.next_free(|_| false), "+2");
        assert_eq!(ids.last(), 2);
    }

    #[test]
    fn test_skips_taken_ids() {
        let taken: HashSet<&str> = ["+1", "+2", "+4"].into_iter().collect();
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next_free(|id| taken.contains(id)), "+3");
        assert_eq!(ids.next_free(|id| taken.contains(id)), "+5");
    }

    #[test]
    fn test_custom_prefix() {
        let mut ids = IdAllocator::new("n_");
        assert_eq!(ids.prefix(), "n_");
        assert_eq!(ids.next_free(|_| false), "n_1");
    }

    #[test]
    fn test_allocators_are_independent() {
        let mut a = IdAllocator::default();
        let mut b = IdAllocator::default();
        a.next_free(|_| false);
        a.next_free(|_| false);
        assert_eq!(b.next_free(|_| false), "+1");
    }
}
