use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Result of trying to claim a URL in the [`VisitedIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The URL was new and has been recorded; the caller owns the fetch
    Claimed,
    /// The URL had already been claimed
    AlreadyVisited,
    /// The index is full; nothing more may be fetched
    CapacityReached,
}

/// Thread-safe set of normalized URLs that have been claimed for fetching
///
/// Membership test and insertion happen under one lock, so concurrent
/// callers can never claim the same URL twice and the set never grows
/// beyond `capacity`.
#[derive(Debug)]
pub struct VisitedIndex {
    seen: Mutex<HashSet<String>>,
    capacity: usize,
}

impl VisitedIndex {
    /// Creates an empty index that admits at most `capacity` URLs
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Atomically checks and records a normalized URL
    pub fn try_claim(&self, normalized: &str) -> Claim {
        let mut seen = self.lock();
        if seen.contains(normalized) {
            Claim::AlreadyVisited
        } else if seen.len() >= self.capacity {
            Claim::CapacityReached
        } else {
            seen.insert(normalized.to_string());
            Claim::Claimed
        }
    }

    /// Returns true if the URL has been claimed
    pub fn contains(&self, normalized: &str) -> bool {
        self.lock().contains(normalized)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once no further URL can be claimed
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
