use super::*;
use crate::auction::{ItemId, UserId};
use anyhow::bail;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
struct Entries {
    /// Users and their funding profile, if they set one
    users: BTreeMap<UserId, Option<FundingProfile>>,
    items: BTreeMap<ItemId, Item>,
}

#[derive(Default)]
pub struct InMemoryDirectory(RwLock<Entries>);

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Directory for InMemoryDirectory {
    fn user_exists(&self, user: UserIdRef) -> Result<bool> {
        Ok(self.0.read().users.contains_key(user))
    }

    fn item(&self, item: ItemIdRef) -> Result<Option<Item>> {
        Ok(self.0.read().items.get(item).cloned())
    }

    fn funding_profile(&self, user: UserIdRef) -> Result<Option<FundingProfile>> {
        Ok(self.0.read().users.get(user).copied().flatten())
    }

    fn add_user(&self, user: UserIdRef) -> Result<()> {
        self.0.write().users.entry(user.to_owned()).or_default();
        Ok(())
    }

    fn add_item(&self, item: Item) -> Result<()> {
        let mut entries = self.0.write();
        if !entries.users.contains_key(&item.owner) {
            bail!("unknown item owner: {}", item.owner);
        }
        entries.items.insert(item.id.clone(), item);
        Ok(())
    }

    fn set_funding_profile(&self, user: UserIdRef, profile: FundingProfile) -> Result<()> {
        match self.0.write().users.get_mut(user) {
            Some(entry) => {
                *entry = Some(profile);
                Ok(())
            }
            None => bail!("unknown user: {user}"),
        }
    }
}
