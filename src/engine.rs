//! Bid Cascade Engine
//!
//! Accepts manual bids and then bids on behalf of auto-bidders: every
//! recorded bid gives each other auto-bidder registered on the item, if
//! they can afford it, the chance to outbid it by one. Each of those
//! follow-up bids triggers the same again, depth first, until nobody
//! eligible is left or the auction closes.
//!
//! Only the bidder of the triggering bid is left out of its responders.
//! A bidder outbid earlier in the same cascade can respond again once
//! somebody else outbids them later on.
use crate::{
    auction::{
        Amount, AutoBidRegistration, Bid, FundingProfile, Item, ItemId, ItemIdRef, UserId,
        UserIdRef,
    },
    clock::{ClockGuard, SharedClock},
    directory::SharedDirectory,
    eligibility::FundsEligibility,
    ledger::{RecordError, SharedBidLedger},
    persistence::Stores,
    registry::{RegisterError, SharedAutoBidRegistry},
};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum BidError {
    #[error("{kind} with uuid {id} does not exist")]
    NotFound { kind: &'static str, id: String },
    #[error("bid price should be higher than {highest}")]
    PriceTooLow { highest: Amount, offered: Amount },
    #[error("bidding on item {0} is closed")]
    AuctionClosed(ItemId),
    #[error("auto bid on item {item} already exists for {bidder}")]
    AlreadyRegistered { item: ItemId, bidder: UserId },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RegisterError> for BidError {
    fn from(e: RegisterError) -> Self {
        match e {
            RegisterError::AlreadyRegistered { item, bidder } => {
                BidError::AlreadyRegistered { item, bidder }
            }
            RegisterError::Storage(e) => BidError::Internal(e),
        }
    }
}

/// One auto-bid waiting to be attempted
struct Attempt {
    bidder: UserId,
    price: Amount,
}

/// A lock per item, serializing whole top-level operations on that item
#[derive(Default)]
struct ItemLocks(Mutex<HashMap<ItemId, Arc<Mutex<()>>>>);

impl ItemLocks {
    fn get(&self, item: ItemIdRef) -> Arc<Mutex<()>> {
        self.0.lock().entry(item.to_owned()).or_default().clone()
    }
}

pub struct BiddingEngine {
    ledger: SharedBidLedger,
    registry: SharedAutoBidRegistry,
    directory: SharedDirectory,
    eligibility: FundsEligibility,
    clock: ClockGuard,
    locks: ItemLocks,
}

impl BiddingEngine {
    pub fn new(stores: &Stores, clock: SharedClock) -> Self {
        Self {
            ledger: stores.ledger.clone(),
            registry: stores.registry.clone(),
            directory: stores.directory.clone(),
            eligibility: FundsEligibility::new(
                stores.directory.clone(),
                stores.registry.clone(),
            ),
            clock: ClockGuard::new(clock),
            locks: ItemLocks::default(),
        }
    }

    /// Place a manual bid and run the cascade of auto-bids it triggers
    ///
    /// Returns the manual bid once the cascade has settled. Auto-bids
    /// placed along the way are only visible through the ledger.
    pub fn place_bid(
        &self,
        item_id: ItemIdRef,
        bidder: UserIdRef,
        price: Amount,
    ) -> Result<Bid, BidError> {
        self.require_user(bidder)?;
        let item = self.require_item(item_id)?;

        let lock = self.locks.get(item_id);
        let _serialized = lock.lock();

        if !self.clock.is_open(&item) {
            warn!(item = item_id, bidder, price, "bid after close rejected");
            return Err(BidError::AuctionClosed(item.id));
        }

        // re-check right before the write, the client may have seen a stale price
        let highest = self
            .ledger
            .highest_bid(item_id)?
            .map(|bid| bid.price)
            .unwrap_or(0);
        if price <= highest {
            warn!(item = item_id, bidder, price, highest, "bid too low");
            return Err(BidError::PriceTooLow {
                highest,
                offered: price,
            });
        }

        let bid = match self.ledger.record_bid(item_id, bidder, price) {
            Ok(bid) => bid,
            Err(RecordError::InvalidPrice { highest, offered }) => {
                warn!(item = item_id, bidder, offered, highest, "bid lost a race");
                return Err(BidError::PriceTooLow { highest, offered });
            }
            Err(RecordError::Storage(e)) => return Err(BidError::Internal(e)),
        };
        info!(item = item_id, bidder, price, "bid accepted");

        let auto_bids = self.run_cascade(&item, &bid)?;
        if auto_bids > 0 {
            info!(item = item_id, auto_bids, "cascade settled");
        }

        Ok(bid)
    }

    /// Register `bidder` to be bid for automatically on `item_id`
    ///
    /// A given `max_total_commitment` replaces the bidder's funding
    /// profile, which is shared by all their registrations.
    pub fn register_auto_bid(
        &self,
        item_id: ItemIdRef,
        bidder: UserIdRef,
        max_total_commitment: Option<Amount>,
    ) -> Result<AutoBidRegistration, BidError> {
        self.require_user(bidder)?;
        self.require_item(item_id)?;

        if self.registry.exists(item_id, bidder)? {
            warn!(item = item_id, bidder, "duplicate auto bid rejected");
            return Err(BidError::AlreadyRegistered {
                item: item_id.to_owned(),
                bidder: bidder.to_owned(),
            });
        }

        if let Some(max_total_commitment) = max_total_commitment {
            self.directory.set_funding_profile(
                bidder,
                FundingProfile {
                    max_total_commitment,
                },
            )?;
        }

        let registration = self.registry.register(item_id, bidder)?;
        info!(item = item_id, bidder, "auto bid registered");
        Ok(registration)
    }

    /// Every bid recorded for `item_id`, oldest first
    pub fn bids(&self, item_id: ItemIdRef) -> Result<Vec<Bid>, BidError> {
        self.require_item(item_id)?;
        Ok(self.ledger.all_bids(item_id)?)
    }

    pub fn highest_bid(&self, item_id: ItemIdRef) -> Result<Option<Bid>, BidError> {
        self.require_item(item_id)?;
        Ok(self.ledger.highest_bid(item_id)?)
    }

    /// Auto-bid in response to `trigger` until the cascade settles
    ///
    /// Pending attempts are kept on an explicit stack instead of the call
    /// stack, popped in the same order recursion would visit them. Returns
    /// the number of auto-bids recorded.
    fn run_cascade(&self, item: &Item, trigger: &Bid) -> anyhow::Result<usize> {
        let mut pending = Vec::new();
        self.push_responders(&mut pending, item, trigger)?;

        let mut recorded = 0;
        while let Some(Attempt { bidder, price }) = pending.pop() {
            if !self.clock.is_open(item) {
                debug!(item = %item.id, %bidder, price, "auction closed mid-cascade, branch dropped");
                continue;
            }

            match self.ledger.record_bid(&item.id, &bidder, price) {
                Ok(bid) => {
                    recorded += 1;
                    debug!(item = %item.id, %bidder, price, "auto bid placed");
                    self.push_responders(&mut pending, item, &bid)?;
                }
                // an earlier sibling's cascade already went past this price
                Err(RecordError::InvalidPrice { highest, offered }) => {
                    debug!(item = %item.id, %bidder, offered, highest, "auto bid outdated, branch dropped");
                }
                Err(RecordError::Storage(e)) => return Err(e),
            }
        }

        Ok(recorded)
    }

    fn push_responders(
        &self,
        pending: &mut Vec<Attempt>,
        item: &Item,
        bid: &Bid,
    ) -> anyhow::Result<()> {
        let mut responders = Vec::new();
        for candidate in self.registry.candidates_excluding(&item.id, &bid.bidder)? {
            if self.eligibility.is_eligible(&candidate, bid.price)? {
                responders.push(Attempt {
                    bidder: candidate,
                    price: bid.next_valid_bid(),
                });
            } else {
                debug!(item = %item.id, bidder = %candidate, price = bid.price, "auto bidder cannot follow");
            }
        }

        // first responder ends up on top of the stack
        pending.extend(responders.into_iter().rev());
        Ok(())
    }

    fn require_item(&self, item_id: ItemIdRef) -> Result<Item, BidError> {
        self.directory
            .item(item_id)?
            .ok_or_else(|| BidError::NotFound {
                kind: "Item",
                id: item_id.to_owned(),
            })
    }

    fn require_user(&self, user: UserIdRef) -> Result<(), BidError> {
        if !self.directory.user_exists(user)? {
            return Err(BidError::NotFound {
                kind: "User",
                id: user.to_owned(),
            });
        }
        Ok(())
    }
}
