use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ItemId = String;
pub type ItemIdRef<'s> = &'s str;
pub type UserId = String;
pub type UserIdRef<'s> = &'s str;
pub type Amount = u64;
pub type RecordId = u64;

/// An item put up for auction
///
/// Owned by the directory; the engine only ever reads it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub base_price: Amount,
    pub owner: UserId,
    pub closes_at: DateTime<Utc>,
}

/// A bid accepted by the ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: RecordId,
    pub uuid: Uuid,
    pub item: ItemId,
    pub bidder: UserId,
    pub price: Amount,
    /// Position of the bid in its item's history, starting at 1
    pub sequence: u64,
}

impl Bid {
    /// Smallest price that would outbid this one
    pub fn next_valid_bid(&self) -> Amount {
        self.price + 1
    }

    pub fn is_outbidded_by(&self, price: Amount) -> bool {
        self.next_valid_bid() <= price
    }
}

/// Standing instruction to bid on `item` on behalf of `bidder`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoBidRegistration {
    pub id: RecordId,
    pub uuid: Uuid,
    pub item: ItemId,
    pub bidder: UserId,
}

/// Spend ceiling shared by all auto-bid registrations of one bidder
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingProfile {
    pub max_total_commitment: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbid_requires_one_more_unit() {
        let bid = Bid {
            id: 1,
            uuid: Uuid::new_v4(),
            item: "item".to_owned(),
            bidder: "alice".to_owned(),
            price: 250,
            sequence: 1,
        };

        assert_eq!(bid.next_valid_bid(), 251);
        assert!(!bid.is_outbidded_by(250));
        assert!(bid.is_outbidded_by(251));
    }
}
