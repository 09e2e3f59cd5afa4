//! Named counters for tracking state transitions

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Counter {
    counters: HashMap<&'static str, usize>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            counters: HashMap::new(),
        }
    }

    pub fn increment(&mut self, name: &'static str, value: usize) {
        *self.counters.entry(name).or_insert(0) += value;
    }

    pub fn set(&mut self, name: &'static str, value: usize) {
        self.counters.insert(name, value);
    }

    pub fn get(&self, name: &str) -> usize {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn reset(&mut self, name: &'static str) {
        self.counters.insert(name, 0);
    }

    pub fn reset_all(&mut self) {
        self.counters.clear();
    }

    /// Sum over every counter whose name ends with `suffix`.
    pub fn total(&self, suffix: &str) -> usize {
        self.counters
            .iter()
            .filter(|(k, _)| k.ends_with(suffix))
            .map(|(_, v)| *v)
            .sum()
    }

    /// Entries sorted by name.
    pub fn sorted(&self) -> Vec<(&'static str, usize)> {
        let mut entries: Vec<_> = self.counters.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_unstable_by_key(|(k, _)| *k);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_and_totals() {
        let mut c = Counter::new();
        c.increment("texture.applied", 1);
        c.increment("texture.applied", 2);
        c.increment("sampler.applied", 1);
        c.increment("texture.skipped", 5);

        assert_eq!(c.get("texture.applied"), 3);
        assert_eq!(c.get("missing"), 0);
        assert_eq!(c.total(".applied"), 4);
        assert_eq!(c.sorted()[0], ("sampler.applied", 1));

        c.reset("texture.applied");
        assert_eq!(c.get("texture.applied"), 0);
        c.reset_all();
        assert_eq!(c.total(""), 0);
    }
}
