//! Error types for the address book

use crate::address::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AddressBookError {
    /// Caller is not the owner of the book
    #[error("Unauthorized: {caller} is not the address book owner")]
    Unauthorized { caller: Address },

    /// Operation targeted the null/zero address
    #[error("Invalid address: the zero address cannot be a member")]
    InvalidAddress,

    #[error("Address already exists: {address}")]
    AlreadyExists { address: Address },

    #[error("Address not found: {address}")]
    NotFound { address: Address },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AddressBookError {
    /// True for errors that reject an address book call, as opposed to
    /// configuration or I/O failures.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::InvalidAddress
                | Self::AlreadyExists { .. }
                | Self::NotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AddressBookError>;
