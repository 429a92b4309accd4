//! Topic table — maps MQTT-style patterns to values.
//!
//! - `+` matches exactly one level
//! - `#` matches any number of remaining levels, including zero; it must be
//!   the last segment
//!
//! The table is small (one entry per handler or subscription), so matching
//! is a linear scan over pre-split patterns in registration order.

use std::sync::RwLock;

pub struct TopicTable<T> {
    entries: RwLock<Vec<Entry<T>>>,
}

struct Entry<T> {
    pattern: String,
    segments: Vec<String>,
    value: T,
}

impl<T: Clone> TopicTable<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn insert(&self, pattern: &str, value: T) {
        let segments = pattern.split('/').map(str::to_string).collect();
        self.entries.write().unwrap().push(Entry {
            pattern: pattern.to_string(),
            segments,
            value,
        });
    }

    /// All values whose pattern matches the concrete `topic`, in
    /// registration order.
    pub fn match_topic(&self, topic: &str) -> Vec<T> {
        let levels: Vec<&str> = topic.split('/').collect();
        self.entries
            .read()
            .unwrap()
            .iter()
            .filter(|e| matches(&e.segments, &levels))
            .map(|e| e.value.clone())
            .collect()
    }

    /// Remove values registered under exactly `pattern` that satisfy
    /// `predicate`. Returns true if anything was removed.
    pub fn remove<F>(&self, pattern: &str, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|e| !(e.pattern == pattern && predicate(&e.value)));
        entries.len() < before
    }

    pub fn has_pattern(&self, pattern: &str) -> bool {
        self.entries
            .read()
            .unwrap()
            .iter()
            .any(|e| e.pattern == pattern)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for TopicTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(pattern: &[String], topic: &[&str]) -> bool {
    match pattern.split_first() {
        None => topic.is_empty(),
        Some((head, _)) if head == "#" => true,
        Some((head, rest)) => match topic.split_first() {
            None => false,
            Some((level, remaining)) => {
                (head == "+" || head == level) && matches(rest, remaining)
            }
        },
    }
}
