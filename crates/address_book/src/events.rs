//! Notifications emitted by successful address book mutations
//!
//! Every successful `add`, `remove` or `clear` appends exactly one
//! [`EventRecord`] to the book's [`EventLog`] and then hands the same record
//! to each registered [`EventListener`]. Rejected calls emit nothing.

use crate::address::Address;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of records retained by an [`EventLog`].
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 1024;

/// Notification payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum AddressBookEvent {
    AddressAdded {
        #[serde(rename = "newAddress")]
        new_address: Address,
    },
    AddressRemoved {
        #[serde(rename = "removedAddress")]
        removed_address: Address,
    },
    AddressBookCleared,
}

/// Notification shape, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AddressAdded,
    AddressRemoved,
    AddressBookCleared,
}

impl AddressBookEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::AddressAdded { .. } => EventKind::AddressAdded,
            Self::AddressRemoved { .. } => EventKind::AddressRemoved,
            Self::AddressBookCleared => EventKind::AddressBookCleared,
        }
    }

    /// Address carried by the notification, if any
    pub fn address(&self) -> Option<Address> {
        match self {
            Self::AddressAdded { new_address } => Some(*new_address),
            Self::AddressRemoved { removed_address } => Some(*removed_address),
            Self::AddressBookCleared => None,
        }
    }
}

/// A notification together with its position in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Strictly increasing for the lifetime of the log, eviction included
    pub sequence: u64,
    pub event: AddressBookEvent,
}

/// Observer invoked synchronously after each successful mutation
pub trait EventListener: Send + Sync {
    fn on_event(&self, record: &EventRecord);
}

/// Bounded append-only notification log
///
/// When full, the oldest record is evicted to make room for the new one.
#[derive(Debug, Clone)]
pub struct EventLog {
    records: VecDeque<EventRecord>,
    capacity: usize,
    next_sequence: u64,
}

impl EventLog {
    /// Create a log retaining at most `capacity` records (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(DEFAULT_EVENT_LOG_CAPACITY)),
            capacity,
            next_sequence: 0,
        }
    }

    /// Append an event, returning the stored record
    pub fn push(&mut self, event: AddressBookEvent) -> EventRecord {
        let record = EventRecord {
            sequence: self.next_sequence,
            event,
        };
        self.next_sequence += 1;

        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
        record
    }

    /// Most recent record of any shape
    pub fn last(&self) -> Option<&EventRecord> {
        self.records.back()
    }

    /// Most recent record matching `kind`
    pub fn last_of(&self, kind: EventKind) -> Option<&EventRecord> {
        self.records.iter().rev().find(|r| r.event.kind() == kind)
    }

    /// Retained records, oldest first
    pub fn records(&self) -> impl Iterator<Item = &EventRecord> + '_ {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sequence number the next pushed record will receive
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_LOG_CAPACITY)
    }
}
