//! Users, items and funding profiles
//!
//! The authoritative source the engine consults before touching the ledger.
//! Creating users and items belongs to other parts of the marketplace; the
//! write methods here exist so they (and tests) can populate it.
mod in_memory;
mod postgres;

pub use self::{in_memory::*, postgres::*};

use crate::auction::{FundingProfile, Item, ItemIdRef, UserIdRef};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub trait Directory {
    fn user_exists(&self, user: UserIdRef) -> Result<bool>;

    fn item(&self, item: ItemIdRef) -> Result<Option<Item>>;

    fn funding_profile(&self, user: UserIdRef) -> Result<Option<FundingProfile>>;

    fn add_user(&self, user: UserIdRef) -> Result<()>;

    fn add_item(&self, item: Item) -> Result<()>;

    fn set_funding_profile(&self, user: UserIdRef, profile: FundingProfile) -> Result<()>;

    fn item_exists(&self, item: ItemIdRef) -> Result<bool> {
        Ok(self.item(item)?.is_some())
    }

    fn item_close_time(&self, item: ItemIdRef) -> Result<Option<DateTime<Utc>>> {
        Ok(self.item(item)?.map(|item| item.closes_at))
    }
}

pub type SharedDirectory = Arc<dyn Directory + Send + Sync + 'static>;
