use super::*;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct Registrations {
    by_item: HashMap<ItemId, Vec<AutoBidRegistration>>,
    per_bidder: HashMap<UserId, u64>,
    last_id: u64,
}

/// Fake in-memory registry.
///
/// Reads share the lock; a registration checks and inserts under one write
/// lock.
#[derive(Default)]
pub struct InMemoryAutoBidRegistry(RwLock<Registrations>);

impl InMemoryAutoBidRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AutoBidRegistry for InMemoryAutoBidRegistry {
    fn register(
        &self,
        item: ItemIdRef,
        bidder: UserIdRef,
    ) -> Result<AutoBidRegistration, RegisterError> {
        let mut registrations = self.0.write();

        if registrations
            .by_item
            .get(item)
            .map(|item_registrations| item_registrations.iter().any(|r| r.bidder == bidder))
            .unwrap_or(false)
        {
            return Err(RegisterError::AlreadyRegistered {
                item: item.to_owned(),
                bidder: bidder.to_owned(),
            });
        }

        registrations.last_id += 1;
        let registration = AutoBidRegistration {
            id: registrations.last_id,
            uuid: Uuid::new_v4(),
            item: item.to_owned(),
            bidder: bidder.to_owned(),
        };
        registrations
            .by_item
            .entry(item.to_owned())
            .or_default()
            .push(registration.clone());
        *registrations
            .per_bidder
            .entry(bidder.to_owned())
            .or_default() += 1;

        debug!(item, bidder, "auto bid registered");
        Ok(registration)
    }

    fn candidates_excluding(&self, item: ItemIdRef, exclude: UserIdRef) -> Result<Vec<UserId>> {
        Ok(self
            .0
            .read()
            .by_item
            .get(item)
            .map(|item_registrations| {
                item_registrations
                    .iter()
                    .filter(|r| r.bidder != exclude)
                    .map(|r| r.bidder.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn exists(&self, item: ItemIdRef, bidder: UserIdRef) -> Result<bool> {
        Ok(self
            .0
            .read()
            .by_item
            .get(item)
            .map(|item_registrations| item_registrations.iter().any(|r| r.bidder == bidder))
            .unwrap_or(false))
    }

    fn active_registrations(&self, bidder: UserIdRef) -> Result<u64> {
        Ok(self.0.read().per_bidder.get(bidder).copied().unwrap_or(0))
    }
}
