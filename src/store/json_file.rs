use std::path::PathBuf;

use crate::core::{Account, Revenue, Subscription};

use super::{remove_by_id, replace_by_id, DataStore, Profile, StoreError};

/// Store that keeps one owner's profile in a single JSON document on disk.
///
/// Every operation loads, edits and rewrites the document; a missing file
/// reads as an empty profile.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Profile, StoreError> {
        if !self.path.exists() {
            return Ok(Profile::default());
        }
        let data = std::fs::read_to_string(&self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        if data.trim().is_empty() {
            return Ok(Profile::default());
        }
        serde_json::from_str(&data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let data = serde_json::to_string_pretty(profile)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, data).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn edit<F>(&mut self, op: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Profile) -> Result<(), StoreError>,
    {
        let mut profile = self.load()?;
        op(&mut profile)?;
        self.save(&profile)
    }
}

impl DataStore for JsonFileStore {
    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.load()?.accounts)
    }

    fn add_account(&mut self, account: Account) -> Result<(), StoreError> {
        self.edit(|p| {
            p.accounts.push(account);
            Ok(())
        })
    }

    fn update_account(&mut self, account: Account) -> Result<(), StoreError> {
        self.edit(|p| replace_by_id(&mut p.accounts, |a| &a.id, account))
    }

    fn remove_account(&mut self, id: &str) -> Result<(), StoreError> {
        self.edit(|p| remove_by_id(&mut p.accounts, |a| &a.id, id))
    }

    fn subscriptions(&self) -> Result<Vec<Subscription>, StoreError> {
        Ok(self.load()?.subscriptions)
    }

    fn add_subscription(&mut self, subscription: Subscription) -> Result<(), StoreError> {
        self.edit(|p| {
            p.subscriptions.push(subscription);
            Ok(())
        })
    }

    fn update_subscription(&mut self, subscription: Subscription) -> Result<(), StoreError> {
        self.edit(|p| replace_by_id(&mut p.subscriptions, |s| &s.id, subscription))
    }

    fn remove_subscription(&mut self, id: &str) -> Result<(), StoreError> {
        self.edit(|p| remove_by_id(&mut p.subscriptions, |s| &s.id, id))
    }

    fn revenues(&self) -> Result<Vec<Revenue>, StoreError> {
        Ok(self.load()?.revenues)
    }

    fn add_revenue(&mut self, revenue: Revenue) -> Result<(), StoreError> {
        self.edit(|p| {
            p.revenues.push(revenue);
            Ok(())
        })
    }

    fn update_revenue(&mut self, revenue: Revenue) -> Result<(), StoreError> {
        self.edit(|p| replace_by_id(&mut p.revenues, |r| &r.id, revenue))
    }

    fn remove_revenue(&mut self, id: &str) -> Result<(), StoreError> {
        self.edit(|p| remove_by_id(&mut p.revenues, |r| &r.id, id))
    }
}
