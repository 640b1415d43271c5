use crate::strength::estimate_entropy;
use std::collections::VecDeque;
use std::fmt;
use zeroize::Zeroizing;

pub const HISTORY_CAPACITY: usize = 10;

/// Recently generated passwords, newest first, kept in memory only.
///
/// Pushing a password that is already present moves it to the front. Once
/// full, the oldest entry is dropped (and zeroized).
#[derive(Clone)]
pub struct History {
    entries: VecDeque<Zeroizing<String>>,
    capacity: usize,
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, password: &str) {
        if self.capacity == 0 || password.is_empty() {
            return;
        }

        if let Some(pos) = self.entries.iter().position(|e| e.as_str() == password) {
            self.entries.remove(pos);
        }

        self.entries.push_front(Zeroizing::new(password.to_string()));
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.as_str())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.as_str())
    }

    /// Entry at `index` with a presence-based entropy estimate. The
    /// parameters that generated it are not retained, so the estimate is
    /// all that can be reported.
    pub fn rescore(&self, index: usize, special_pool: &str) -> Option<(&str, f64)> {
        self.get(index)
            .map(|password| (password, estimate_entropy(password, special_pool)))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
