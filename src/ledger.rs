//! Bid Ledger
//!
//! Append-only record of the bids accepted for each item. Prices recorded
//! for one item always form a strictly increasing sequence: checking the
//! current highest price and appending the new bid is a single atomic step
//! per item, so concurrent writers for the same item can never land bids
//! out of order. Writers for different items do not contend.
mod in_memory;
mod postgres;

pub use self::{in_memory::*, postgres::*};

use crate::auction::{Amount, Bid, ItemIdRef, UserIdRef};
use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("bid of {offered} does not exceed the highest bid of {highest}")]
    InvalidPrice { highest: Amount, offered: Amount },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub trait BidLedger {
    /// Append a bid, if `price` beats the highest one recorded for `item`
    ///
    /// With no bids recorded any positive price is accepted. The bid is
    /// visible to every subsequent read once this returns.
    fn record_bid(
        &self,
        item: ItemIdRef,
        bidder: UserIdRef,
        price: Amount,
    ) -> Result<Bid, RecordError>;

    /// The most recently recorded (and so the highest) bid
    fn highest_bid(&self, item: ItemIdRef) -> Result<Option<Bid>>;

    /// All bids for `item`, oldest first
    fn all_bids(&self, item: ItemIdRef) -> Result<Vec<Bid>>;
}

pub type SharedBidLedger = Arc<dyn BidLedger + Send + Sync + 'static>;

/// Reject `offered` unless it beats `highest` (zero when nothing was recorded yet)
fn ensure_outbids(highest: Amount, offered: Amount) -> Result<(), RecordError> {
    if offered <= highest {
        return Err(RecordError::InvalidPrice { highest, offered });
    }
    Ok(())
}
