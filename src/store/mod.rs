//! Data access for the three item collections.
//!
//! The projection engine is agnostic to which backing store supplied the
//! collections; [`session::open_store`] picks one based on authentication
//! state.

pub mod json_file;
pub mod memory;
pub mod session;

use serde::{Deserialize, Serialize};

use crate::core::{Account, Revenue, Subscription};

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use session::{open_store, AuthState};

/// Errors that can occur when accessing a backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with the given id exists.
    NotFound,
    /// Reading or writing the backing medium failed.
    Io(String),
    /// The stored document could not be encoded or decoded.
    Serialization(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::Io(e) => write!(f, "store io error: {e}"),
            StoreError::Serialization(e) => write!(f, "store serialization error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// One owner's complete data set, the unit a store loads and saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub revenues: Vec<Revenue>,
}

/// Abstraction over the persistence backend.
///
/// Removing an account must not cascade: recurring items keep their
/// dangling reference and are simply ignored for balance purposes.
pub trait DataStore {
    fn accounts(&self) -> Result<Vec<Account>, StoreError>;
    fn add_account(&mut self, account: Account) -> Result<(), StoreError>;
    fn update_account(&mut self, account: Account) -> Result<(), StoreError>;
    fn remove_account(&mut self, id: &str) -> Result<(), StoreError>;

    fn subscriptions(&self) -> Result<Vec<Subscription>, StoreError>;
    fn add_subscription(&mut self, subscription: Subscription) -> Result<(), StoreError>;
    fn update_subscription(&mut self, subscription: Subscription) -> Result<(), StoreError>;
    fn remove_subscription(&mut self, id: &str) -> Result<(), StoreError>;

    fn revenues(&self) -> Result<Vec<Revenue>, StoreError>;
    fn add_revenue(&mut self, revenue: Revenue) -> Result<(), StoreError>;
    fn update_revenue(&mut self, revenue: Revenue) -> Result<(), StoreError>;
    fn remove_revenue(&mut self, id: &str) -> Result<(), StoreError>;
}

/// In-place list edits shared by the store implementations.
pub(crate) fn replace_by_id<T, F>(items: &mut [T], id_of: F, replacement: T) -> Result<(), StoreError>
where
    F: Fn(&T) -> &str,
{
    let id = id_of(&replacement).to_string();
    match items.iter_mut().find(|item| id_of(item) == id) {
        Some(slot) => {
            *slot = replacement;
            Ok(())
        }
        None => Err(StoreError::NotFound),
    }
}

pub(crate) fn remove_by_id<T, F>(items: &mut Vec<T>, id_of: F, id: &str) -> Result<(), StoreError>
where
    F: Fn(&T) -> &str,
{
    let before = items.len();
    items.retain(|item| id_of(item) != id);
    if items.len() == before {
        return Err(StoreError::NotFound);
    }
    Ok(())
}
