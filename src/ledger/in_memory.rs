use super::*;
use crate::auction::ItemId;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};
use tracing::debug;
use uuid::Uuid;

type ItemBids = Arc<Mutex<Vec<Bid>>>;

/// Fake in-memory ledger.
///
/// Each item gets its own lock; the outer map is only locked long enough
/// to find (or create) the item's slot.
#[derive(Default)]
pub struct InMemoryBidLedger {
    items: Mutex<HashMap<ItemId, ItemBids>>,
    next_id: AtomicU64,
}

impl InMemoryBidLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, item: ItemIdRef) -> ItemBids {
        self.items
            .lock()
            .entry(item.to_owned())
            .or_default()
            .clone()
    }

    fn existing_slot(&self, item: ItemIdRef) -> Option<ItemBids> {
        self.items.lock().get(item).cloned()
    }
}

impl BidLedger for InMemoryBidLedger {
    fn record_bid(
        &self,
        item: ItemIdRef,
        bidder: UserIdRef,
        price: Amount,
    ) -> Result<Bid, RecordError> {
        let slot = self.slot(item);
        let mut bids = slot.lock();

        ensure_outbids(bids.last().map(|bid| bid.price).unwrap_or(0), price)?;

        let bid = Bid {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            uuid: Uuid::new_v4(),
            item: item.to_owned(),
            bidder: bidder.to_owned(),
            price,
            sequence: bids.len() as u64 + 1,
        };
        debug!(item, bidder, price, sequence = bid.sequence, "bid recorded");
        bids.push(bid.clone());

        Ok(bid)
    }

    fn highest_bid(&self, item: ItemIdRef) -> Result<Option<Bid>> {
        Ok(self
            .existing_slot(item)
            .and_then(|slot| slot.lock().last().cloned()))
    }

    fn all_bids(&self, item: ItemIdRef) -> Result<Vec<Bid>> {
        Ok(self
            .existing_slot(item)
            .map(|slot| slot.lock().clone())
            .unwrap_or_default())
    }
}
