//! Owner-gated address book
//!
//! Members are kept in a vector for ordered enumeration and indexed by a
//! map from address to position. Presence of a key in the index is the
//! existence flag, so position 0 is never confused with "absent".
//!
//! Removal is swap-and-pop: the last member is moved into the freed slot
//! and the vector shrinks by one. This keeps removal O(1) at the cost of
//! changing the position of (at most) one other member.

use crate::address::Address;
use crate::config::AddressBookConfig;
use crate::errors::{AddressBookError, Result};
use crate::events::{
    AddressBookEvent, EventKind, EventListener, EventLog, EventRecord, DEFAULT_EVENT_LOG_CAPACITY,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Address book with a single owner fixed at construction.
pub struct AddressBook {
    owner: Address,
    /// Members in enumeration order
    members: Vec<Address>,
    /// Address → position in `members`
    index: HashMap<Address, usize>,
    events: EventLog,
    listeners: Vec<Arc<dyn EventListener>>,
}

impl AddressBook {
    /// Create an empty book owned by `owner`
    pub fn new(owner: Address) -> Self {
        Self::build(owner, DEFAULT_EVENT_LOG_CAPACITY)
    }

    /// Create an empty book, validating `config` first
    pub fn with_config(owner: Address, config: &AddressBookConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(owner, config.event_log_capacity))
    }

    fn build(owner: Address, event_log_capacity: usize) -> Self {
        info!(owner = %owner, event_log_capacity, "Address book created");
        Self {
            owner,
            members: Vec::new(),
            index: HashMap::new(),
            events: EventLog::with_capacity(event_log_capacity),
            listeners: Vec::new(),
        }
    }

    /// Append `address` to the book.
    pub fn add(&mut self, caller: &Address, address: Address) -> Result<EventRecord> {
        let record = self.commit_add(caller, address)?;
        self.notify(&record);
        Ok(record)
    }

    /// Remove `address` from the book using swap-and-pop.
    pub fn remove(&mut self, caller: &Address, address: Address) -> Result<EventRecord> {
        let record = self.commit_remove(caller, address)?;
        self.notify(&record);
        Ok(record)
    }

    /// Remove every member. Succeeds (and notifies) on an empty book too.
    pub fn clear(&mut self, caller: &Address) -> Result<EventRecord> {
        let record = self.commit_clear(caller)?;
        self.notify(&record);
        Ok(record)
    }

    // The `commit_*` methods apply a mutation and append its record to the
    // log without running listeners.

    pub(crate) fn commit_add(
        &mut self,
        caller: &Address,
        address: Address,
    ) -> Result<EventRecord> {
        self.ensure_owner(caller, "add")?;
        Self::ensure_not_zero(&address, "add")?;

        if self.index.contains_key(&address) {
            return Err(Self::rejected("add", AddressBookError::AlreadyExists { address }));
        }

        self.index.insert(address, self.members.len());
        self.members.push(address);
        debug!(address = %address, position = self.members.len() - 1, "Address added");

        Ok(self.record(AddressBookEvent::AddressAdded {
            new_address: address,
        }))
    }

    pub(crate) fn commit_remove(
        &mut self,
        caller: &Address,
        address: Address,
    ) -> Result<EventRecord> {
        self.ensure_owner(caller, "remove")?;
        Self::ensure_not_zero(&address, "remove")?;

        let Some(position) = self.index.remove(&address) else {
            return Err(Self::rejected("remove", AddressBookError::NotFound { address }));
        };

        // `index` held the address, so `members` is non-empty.
        let last_position = self.members.len() - 1;
        if position != last_position {
            let last = self.members[last_position];
            self.members[position] = last;
            self.index.insert(last, position);
            debug!(moved = %last, from = last_position, to = position, "Member relocated");
        }
        self.members.pop();
        debug!(address = %address, "Address removed");

        Ok(self.record(AddressBookEvent::AddressRemoved {
            removed_address: address,
        }))
    }

    pub(crate) fn commit_clear(&mut self, caller: &Address) -> Result<EventRecord> {
        self.ensure_owner(caller, "clear")?;

        let removed = self.members.len();
        self.members.clear();
        self.index.clear();
        debug!(removed, "Address book cleared");

        Ok(self.record(AddressBookEvent::AddressBookCleared))
    }

    /// True iff `address` is currently a member
    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    /// Snapshot of the members in their current order
    pub fn get(&self) -> Vec<Address> {
        self.members.clone()
    }

    pub fn members(&self) -> &[Address] {
        &self.members
    }

    /// Current position of `address`, if it is a member
    pub fn position(&self, address: &Address) -> Option<usize> {
        self.index.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Most recent notification of the given shape
    pub fn last_event_of(&self, kind: EventKind) -> Option<EventRecord> {
        self.events.last_of(kind).copied()
    }

    /// Register a listener; listeners run in registration order.
    pub fn subscribe(&mut self, listener: Arc<dyn EventListener>) {
        self.listeners.push(listener);
    }

    /// Verify that `members` and `index` describe the same set.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        if self.members.len() != self.index.len() {
            return Err(format!(
                "members has {} entries but index has {}",
                self.members.len(),
                self.index.len()
            ));
        }
        for (position, address) in self.members.iter().enumerate() {
            if address.is_zero() {
                return Err(format!("zero address stored at position {position}"));
            }
            match self.index.get(address) {
                Some(&indexed) if indexed == position => {}
                Some(&indexed) => {
                    return Err(format!(
                        "{address} is at position {position} but indexed at {indexed}"
                    ))
                }
                None => return Err(format!("{address} at position {position} is not indexed")),
            }
        }
        Ok(())
    }

    fn record(&mut self, event: AddressBookEvent) -> EventRecord {
        #[cfg(test)]
        assert_eq!(self.check_invariants(), Ok(()));

        self.events.push(event)
    }

    fn notify(&self, record: &EventRecord) {
        for listener in &self.listeners {
            listener.on_event(record);
        }
    }

    pub(crate) fn listeners(&self) -> Vec<Arc<dyn EventListener>> {
        self.listeners.clone()
    }

    fn ensure_owner(&self, caller: &Address, operation: &str) -> Result<()> {
        if *caller != self.owner {
            return Err(Self::rejected(
                operation,
                AddressBookError::Unauthorized { caller: *caller },
            ));
        }
        Ok(())
    }

    fn ensure_not_zero(address: &Address, operation: &str) -> Result<()> {
        if address.is_zero() {
            return Err(Self::rejected(operation, AddressBookError::InvalidAddress));
        }
        Ok(())
    }

    fn rejected(operation: &str, error: AddressBookError) -> AddressBookError {
        warn!(operation, %error, "Address book call rejected");
        error
    }
}

impl fmt::Debug for AddressBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressBook")
            .field("owner", &self.owner)
            .field("members", &self.members)
            .field("events", &self.events.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    fn book_with(owner: Address, members: &[Address]) -> AddressBook {
        let mut book = AddressBook::new(owner);
        for member in members {
            book.add(&owner, *member).unwrap();
        }
        book
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<EventRecord>>);

    impl EventListener for Recorder {
        fn on_event(&self, record: &EventRecord) {
            self.0.lock().push(*record);
        }
    }

    #[test]
    fn add_appends_and_indexes() {
        let owner = addr(1);
        let book = book_with(owner, &[addr(2), addr(3)]);

        assert_eq!(book.get(), vec![addr(2), addr(3)]);
        assert_eq!(book.position(&addr(2)), Some(0));
        assert_eq!(book.position(&addr(3)), Some(1));
        assert!(book.contains(&addr(2)));
        assert!(!book.contains(&addr(4)));
    }

    #[test]
    fn owner_may_list_itself() {
        let owner = addr(1);
        let book = book_with(owner, &[owner]);
        assert!(book.contains(&owner));
    }

    #[test]
    fn remove_first_moves_last_into_slot() {
        let owner = addr(9);
        let members = [addr(1), addr(2), addr(3), addr(4), addr(5)];
        let mut book = book_with(owner, &members);

        book.remove(&owner, addr(1)).unwrap();

        assert_eq!(book.get(), vec![addr(5), addr(2), addr(3), addr(4)]);
        assert_eq!(book.position(&addr(5)), Some(0));
        assert_eq!(book.position(&addr(1)), None);
        assert_eq!(book.check_invariants(), Ok(()));
    }

    #[test]
    fn remove_last_truncates() {
        let owner = addr(9);
        let members = [addr(1), addr(2), addr(3), addr(4), addr(5)];
        let mut book = book_with(owner, &members);

        book.remove(&owner, addr(5)).unwrap();

        assert_eq!(book.get(), vec![addr(1), addr(2), addr(3), addr(4)]);
    }

    #[test]
    fn remove_only_member_leaves_empty_book() {
        let owner = addr(9);
        let mut book = book_with(owner, &[addr(1)]);

        book.remove(&owner, addr(1)).unwrap();

        assert!(book.is_empty());
        assert!(!book.contains(&addr(1)));
        assert_eq!(book.check_invariants(), Ok(()));
    }

    #[test]
    fn rejections_check_owner_first() {
        let owner = addr(1);
        let mut book = AddressBook::new(owner);
        let stranger = addr(2);

        let err = book.add(&stranger, Address::ZERO).unwrap_err();
        assert!(matches!(err, AddressBookError::Unauthorized { caller } if caller == stranger));

        let err = book.remove(&stranger, addr(3)).unwrap_err();
        assert!(matches!(err, AddressBookError::Unauthorized { .. }));
    }

    #[test]
    fn zero_address_checked_before_membership() {
        let owner = addr(1);
        let mut book = AddressBook::new(owner);

        assert!(matches!(
            book.remove(&owner, Address::ZERO),
            Err(AddressBookError::InvalidAddress)
        ));
        assert!(!book.contains(&Address::ZERO));
    }

    #[test]
    fn failed_calls_emit_nothing() {
        let owner = addr(1);
        let mut book = book_with(owner, &[addr(2)]);
        let recorder = Arc::new(Recorder::default());
        book.subscribe(recorder.clone());
        let before = book.events().next_sequence();

        assert!(book.add(&owner, addr(2)).is_err());
        assert!(book.remove(&owner, addr(3)).is_err());
        assert!(book.clear(&addr(3)).is_err());

        assert_eq!(book.events().next_sequence(), before);
        assert!(recorder.0.lock().is_empty());
        assert_eq!(book.get(), vec![addr(2)]);
    }

    #[test]
    fn listeners_receive_records_in_order() {
        let owner = addr(1);
        let mut book = AddressBook::new(owner);
        let recorder = Arc::new(Recorder::default());
        book.subscribe(recorder.clone());

        let added = book.add(&owner, addr(2)).unwrap();
        let removed = book.remove(&owner, addr(2)).unwrap();
        let cleared = book.clear(&owner).unwrap();

        let seen = recorder.0.lock().clone();
        assert_eq!(seen, vec![added, removed, cleared]);
        assert_eq!(
            seen.iter().map(|r| r.sequence).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn clear_on_empty_book_still_notifies() {
        let owner = addr(1);
        let mut book = AddressBook::new(owner);

        let record = book.clear(&owner).unwrap();

        assert_eq!(record.event, AddressBookEvent::AddressBookCleared);
        assert!(book.last_event_of(EventKind::AddressBookCleared).is_some());
    }

    #[test]
    fn event_log_capacity_follows_config() {
        let owner = addr(1);
        let config = AddressBookConfig {
            event_log_capacity: 2,
        };
        let mut book = AddressBook::with_config(owner, &config).unwrap();
        for byte in 2..=5 {
            book.add(&owner, addr(byte)).unwrap();
        }

        assert_eq!(book.events().len(), 2);
        assert_eq!(book.len(), 4);
        let last = book.last_event_of(EventKind::AddressAdded).unwrap();
        assert_eq!(last.event.address(), Some(addr(5)));
    }

    #[test]
    fn with_config_rejects_zero_capacity() {
        let config = AddressBookConfig {
            event_log_capacity: 0,
        };

        let err = AddressBook::with_config(addr(1), &config).unwrap_err();
        assert!(matches!(err, AddressBookError::Config(_)));
    }
}
