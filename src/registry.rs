//! Auto-Bid Registry
//!
//! Bookkeeping of which bidders asked to be bid for automatically on which
//! item. The registry does not know about users or items; callers check
//! that both exist before registering.
mod in_memory;
mod postgres;

pub use self::{in_memory::*, postgres::*};

use crate::auction::{AutoBidRegistration, ItemId, ItemIdRef, UserId, UserIdRef};
use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("{bidder} already has an auto bid on {item}")]
    AlreadyRegistered { item: ItemId, bidder: UserId },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub trait AutoBidRegistry {
    /// Register `bidder` on `item`; at most once per pair, even under races
    fn register(
        &self,
        item: ItemIdRef,
        bidder: UserIdRef,
    ) -> Result<AutoBidRegistration, RegisterError>;

    /// Bidders registered on `item`, in registration order, without `exclude`
    fn candidates_excluding(&self, item: ItemIdRef, exclude: UserIdRef) -> Result<Vec<UserId>>;

    fn exists(&self, item: ItemIdRef, bidder: UserIdRef) -> Result<bool>;

    /// Number of items `bidder` currently has an auto bid on
    fn active_registrations(&self, bidder: UserIdRef) -> Result<u64>;
}

pub type SharedAutoBidRegistry = Arc<dyn AutoBidRegistry + Send + Sync + 'static>;
