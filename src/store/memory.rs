use crate::core::{Account, Revenue, Subscription};

use super::{remove_by_id, replace_by_id, DataStore, Profile, StoreError};

/// In-memory store holding one profile. Contents vanish with the process;
/// also serves as the store double in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profile: Profile,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing profile, e.g. one assembled by a test.
    pub fn with_profile(profile: Profile) -> Self {
        Self { profile }
    }
}

impl DataStore for MemoryStore {
    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.profile.accounts.clone())
    }

    fn add_account(&mut self, account: Account) -> Result<(), StoreError> {
        self.profile.accounts.push(account);
        Ok(())
    }

    fn update_account(&mut self, account: Account) -> Result<(), StoreError> {
        replace_by_id(&mut self.profile.accounts, |a| &a.id, account)
    }

    fn remove_account(&mut self, id: &str) -> Result<(), StoreError> {
        remove_by_id(&mut self.profile.accounts, |a| &a.id, id)
    }

    fn subscriptions(&self) -> Result<Vec<Subscription>, StoreError> {
        Ok(self.profile.subscriptions.clone())
    }

    fn add_subscription(&mut self, subscription: Subscription) -> Result<(), StoreError> {
        self.profile.subscriptions.push(subscription);
        Ok(())
    }

    fn update_subscription(&mut self, subscription: Subscription) -> Result<(), StoreError> {
        replace_by_id(&mut self.profile.subscriptions, |s| &s.id, subscription)
    }

    fn remove_subscription(&mut self, id: &str) -> Result<(), StoreError> {
        remove_by_id(&mut self.profile.subscriptions, |s| &s.id, id)
    }

    fn revenues(&self) -> Result<Vec<Revenue>, StoreError> {
        Ok(self.profile.revenues.clone())
    }

    fn add_revenue(&mut self, revenue: Revenue) -> Result<(), StoreError> {
        self.profile.revenues.push(revenue);
        Ok(())
    }

    fn update_revenue(&mut self, revenue: Revenue) -> Result<(), StoreError> {
        replace_by_id(&mut self.profile.revenues, |r| &r.id, revenue)
    }

    fn remove_revenue(&mut self, id: &str) -> Result<(), StoreError> {
        remove_by_id(&mut self.profile.revenues, |r| &r.id, id)
    }
}
