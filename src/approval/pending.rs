//! The set of requests still waiting for an answer.
//!
//! The detector only ever reads pending requests through `PendingApprovals`.
//! `PendingSet` is a ready-made insertion-ordered store for callers that
//! don't already keep one.

use crate::approval::types::SentApproval;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read-only view of pending requests, keyed by id.
///
/// `ids` must yield keys in a stable order (normally insertion order): the
/// prefix match in the detector resolves ambiguity by taking the first key.
pub trait PendingApprovals {
    fn contains(&self, id: &str) -> bool;

    fn ids(&self) -> impl Iterator<Item = &str>;

    fn is_empty(&self) -> bool {
        self.ids().next().is_none()
    }
}

impl PendingApprovals for [SentApproval] {
    fn contains(&self, id: &str) -> bool {
        self.iter().any(|entry| entry.id() == id)
    }

    fn ids(&self) -> impl Iterator<Item = &str> {
        self.iter().map(SentApproval::id)
    }

    fn is_empty(&self) -> bool {
        <[SentApproval]>::is_empty(self)
    }
}

/// Insertion-ordered map of id → `SentApproval`.
/// Serialized as a JSON array in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SentApproval>", into = "Vec<SentApproval>")]
pub struct PendingSet {
    order: Vec<String>,
    entries: HashMap<String, SentApproval>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request. Re-inserting a known id replaces the entry but keeps
    /// its original position. Returns the replaced entry, if any.
    pub fn insert(&mut self, entry: SentApproval) -> Option<SentApproval> {
        let id = entry.id().to_string();
        let previous = self.entries.insert(id.clone(), entry);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    pub fn remove(&mut self, id: &str) -> Option<SentApproval> {
        let removed = self.entries.remove(id)?;
        self.order.retain(|known| known != id);
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&SentApproval> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SentApproval> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Remove and return, in insertion order, every entry that has lapsed
    /// by `now`. Entries whose `expires` field can't be read use
    /// `default_ttl`.
    pub fn expire(&mut self, now: DateTime<Utc>, default_ttl: Duration) -> Vec<SentApproval> {
        let lapsed: Vec<String> = self
            .iter()
            .filter(|entry| entry.expires_at(default_ttl) <= now)
            .map(|entry| entry.id().to_string())
            .collect();

        lapsed.iter().filter_map(|id| self.remove(id)).collect()
    }
}

impl PendingApprovals for PendingSet {
    fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    fn is_empty(&self) -> bool {
        PendingSet::is_empty(self)
    }
}

impl From<Vec<SentApproval>> for PendingSet {
    fn from(entries: Vec<SentApproval>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<PendingSet> for Vec<SentApproval> {
    fn from(mut set: PendingSet) -> Self {
        let order = std::mem::take(&mut set.order);
        order
            .into_iter()
            .filter_map(|id| set.entries.remove(&id))
            .collect()
    }
}

impl FromIterator<SentApproval> for PendingSet {
    fn from_iter<I: IntoIterator<Item = SentApproval>>(iter: I) -> Self {
        let mut set = PendingSet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}
