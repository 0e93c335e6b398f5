//! Session console: an ordered, append-only log of execution events.
//!
//! The sink owns its entries; observer surfaces only ever see snapshots and
//! change notifications. Entries are immutable once appended. IDs are
//! timestamp-derived and only need to be monotonically distinguishing —
//! entries are rendered in order, never looked up by id, so collisions are
//! tolerated.

use std::fmt::{Display, Formatter};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

/// Capacity of the change-notification channel. Slow observers that fall
/// further behind than this re-sync from `snapshot`.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Info,
    Success,
    Error,
    Warning,
    Command,
}

impl Display for EntryKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntryKind::Info => "info",
            EntryKind::Success => "success",
            EntryKind::Error => "error",
            EntryKind::Warning => "warning",
            EntryKind::Command => "command",
        };
        formatter.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub kind: EntryKind,
    pub message: String,
}

/// Change notification delivered to console observers.
#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    Appended(ConsoleEntry),
    /// The log was reset; mirrored surfaces clear in lockstep.
    Cleared,
}

pub struct ConsoleSink {
    entries: Mutex<Vec<ConsoleEntry>>,
    events: broadcast::Sender<ConsoleEvent>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            entries: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Appends an entry and notifies observers. Returns the stored entry.
    pub fn append(&self, kind: EntryKind, message: impl Into<String>) -> ConsoleEntry {
        let timestamp = Utc::now();
        let entry = ConsoleEntry {
            id: timestamp.timestamp_millis(),
            timestamp,
            kind,
            message: message.into(),
        };

        {
            let mut entries = self.entries.lock().expect("console lock poisoned");
            entries.push(entry.clone());
        }

        // Nobody listening is fine.
        let _ = self.events.send(ConsoleEvent::Appended(entry.clone()));

        entry
    }

    /// Returns a copy of all entries in insertion order.
    pub fn snapshot(&self) -> Vec<ConsoleEntry> {
        self.entries.lock().expect("console lock poisoned").clone()
    }

    /// Removes all entries and notifies observers.
    pub fn clear(&self) {
        {
            let mut entries = self.entries.lock().expect("console lock poisoned");
            entries.clear();
        }

        let _ = self.events.send(ConsoleEvent::Cleared);
    }

    /// Subscribes to change notifications. Dropping the receiver
    /// unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.events.subscribe()
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}
