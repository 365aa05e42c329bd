//! Owner-gated Address Book
//!
//! A deduplicated set of account addresses with ordered enumeration and
//! O(1) removal. Only the owner fixed at construction may mutate the book;
//! anyone may query it. Every successful mutation emits exactly one
//! notification, retrievable from the book's event log or observed through
//! registered listeners.

pub mod address;
pub mod config;
pub mod errors;
pub mod events;
pub mod registry;
pub mod shared;

pub use address::*;
pub use config::AddressBookConfig;
pub use errors::*;
pub use events::*;
pub use registry::AddressBook;
pub use shared::SharedAddressBook;
