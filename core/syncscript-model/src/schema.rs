use serde::{Deserialize, Serialize};

/// Where new records go in a collection's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Insertion {
    /// Newest first (feeds, logs shown most-recent-first).
    Prepend,
    /// Oldest first.
    Append,
}

/// Per-collection storage policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection name; becomes the last segment of the storage key.
    pub name: String,
    pub insertion: Insertion,
    /// Keep at most this many records; the oldest are evicted after insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<usize>,
    /// Append-only collections reject `remove`.
    #[serde(default)]
    pub append_only: bool,
}

impl CollectionSchema {
    fn new(name: &str, insertion: Insertion) -> Self {
        Self {
            name: name.into(),
            insertion,
            retention: None,
            append_only: false,
        }
    }

    /// Shorthand for a newest-first collection.
    pub fn prepend(name: &str) -> Self {
        Self::new(name, Insertion::Prepend)
    }

    /// Shorthand for an oldest-first collection.
    pub fn append(name: &str) -> Self {
        Self::new(name, Insertion::Append)
    }

    /// Caps the collection at `max` records.
    #[must_use]
    pub fn with_retention(mut self, max: usize) -> Self {
        self.retention = Some(max);
        self
    }

    /// Marks the collection as a log that is never deleted from.
    #[must_use]
    pub fn append_only(mut self) -> Self {
        self.append_only = true;
        self
    }

    /// Inserts `item` according to the insertion policy.
    pub fn insert<T>(&self, items: &mut Vec<T>, item: T) {
        match self.insertion {
            Insertion::Prepend => items.insert(0, item),
            Insertion::Append => items.push(item),
        }
    }

    /// Evicts the oldest records beyond the retention cap.
    /// Returns how many were evicted.
    pub fn enforce_retention<T>(&self, items: &mut Vec<T>) -> usize {
        let Some(max) = self.retention else {
            return 0;
        };
        if items.len() <= max {
            return 0;
        }
        let excess = items.len() - max;
        match self.insertion {
            Insertion::Prepend => items.truncate(max),
            Insertion::Append => {
                items.drain(..excess);
            }
        }
        excess
    }
}
