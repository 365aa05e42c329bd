//! Thread-safe handle serializing calls into one [`AddressBook`]

use crate::address::Address;
use crate::errors::Result;
use crate::events::{EventKind, EventListener, EventRecord};
use crate::registry::AddressBook;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle to a shared address book.
///
/// Each mutation holds the write lock for its entire duration, so calls
/// submitted from different threads execute one at a time in a single
/// total order. Queries take the read lock and never see a half-applied
/// mutation.
///
/// Listeners run after the write lock is released, so they may query the
/// same handle. By then another mutation may already have been applied.
#[derive(Debug, Clone)]
pub struct SharedAddressBook {
    inner: Arc<RwLock<AddressBook>>,
}

impl SharedAddressBook {
    pub fn new(book: AddressBook) -> Self {
        Self {
            inner: Arc::new(RwLock::new(book)),
        }
    }

    pub fn add(&self, caller: &Address, address: Address) -> Result<EventRecord> {
        self.mutate(|book| book.commit_add(caller, address))
    }

    pub fn remove(&self, caller: &Address, address: Address) -> Result<EventRecord> {
        self.mutate(|book| book.commit_remove(caller, address))
    }

    pub fn clear(&self, caller: &Address) -> Result<EventRecord> {
        self.mutate(|book| book.commit_clear(caller))
    }

    fn mutate(
        &self,
        commit: impl FnOnce(&mut AddressBook) -> Result<EventRecord>,
    ) -> Result<EventRecord> {
        let (record, listeners) = {
            let mut book = self.inner.write();
            let record = commit(&mut *book)?;
            (record, book.listeners())
        };

        for listener in &listeners {
            listener.on_event(&record);
        }
        Ok(record)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.inner.read().contains(address)
    }

    pub fn get(&self) -> Vec<Address> {
        self.inner.read().get()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn owner(&self) -> Address {
        *self.inner.read().owner()
    }

    pub fn last_event_of(&self, kind: EventKind) -> Option<EventRecord> {
        self.inner.read().last_event_of(kind)
    }

    pub fn subscribe(&self, listener: Arc<dyn EventListener>) {
        self.inner.write().subscribe(listener);
    }

    /// Run several queries against one consistent state
    pub fn with_read<R>(&self, f: impl FnOnce(&AddressBook) -> R) -> R {
        f(&self.inner.read())
    }
}

impl From<AddressBook> for SharedAddressBook {
    fn from(book: AddressBook) -> Self {
        Self::new(book)
    }
}
