use std::collections::HashMap;
use time::OffsetDateTime;

use crate::utils::truncate_to_second;

/// First time each device address was observed in this scan session.
///
/// Entries are write-once and never pruned.
#[derive(Debug, Default)]
pub struct FirstSeenRegistry {
    entries: HashMap<String, OffsetDateTime>,
}

impl FirstSeenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `now` for `address` unless it has been seen before
    pub fn touch(&mut self, address: &str, now: OffsetDateTime) {
        if !self.entries.contains_key(address) {
            self.entries
                .insert(address.to_string(), truncate_to_second(now));
        }
    }

    pub fn first_seen_of(&self, address: &str) -> Option<OffsetDateTime> {
        self.entries.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
