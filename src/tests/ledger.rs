use super::assert_strictly_increasing;
use crate::ledger::{BidLedger, InMemoryBidLedger, RecordError};
use anyhow::Result;

#[test]
fn empty_ledger_has_no_bids() -> Result<()> {
    let ledger = InMemoryBidLedger::new();

    assert_eq!(ledger.highest_bid("item")?, None);
    assert!(ledger.all_bids("item")?.is_empty());

    Ok(())
}

#[test]
fn first_bid_only_needs_to_be_positive() -> Result<()> {
    let ledger = InMemoryBidLedger::new();

    assert!(matches!(
        ledger.record_bid("item", "alice", 0),
        Err(RecordError::InvalidPrice {
            highest: 0,
            offered: 0
        })
    ));

    let bid = ledger.record_bid("item", "alice", 1)?;
    assert_eq!(bid.price, 1);
    assert_eq!(bid.sequence, 1);

    Ok(())
}

#[test]
fn rejects_bids_not_above_the_highest() -> Result<()> {
    let ledger = InMemoryBidLedger::new();
    ledger.record_bid("item", "alice", 250)?;

    for price in [100, 249, 250] {
        assert!(matches!(
            ledger.record_bid("item", "bob", price),
            Err(RecordError::InvalidPrice { highest: 250, .. })
        ));
    }
    assert_eq!(ledger.all_bids("item")?.len(), 1);

    Ok(())
}

#[test]
fn keeps_bids_in_creation_order() -> Result<()> {
    let ledger = InMemoryBidLedger::new();
    ledger.record_bid("item", "alice", 200)?;
    ledger.record_bid("item", "bob", 250)?;
    let last = ledger.record_bid("item", "alice", 251)?;

    let bids = ledger.all_bids("item")?;
    assert_eq!(
        bids.iter()
            .map(|bid| (bid.bidder.as_str(), bid.price, bid.sequence))
            .collect::<Vec<_>>(),
        vec![("alice", 200, 1), ("bob", 250, 2), ("alice", 251, 3)]
    );
    assert_eq!(ledger.highest_bid("item")?, Some(last));

    Ok(())
}

#[test]
fn items_are_independent() -> Result<()> {
    let ledger = InMemoryBidLedger::new();
    ledger.record_bid("first", "alice", 500)?;

    let bid = ledger.record_bid("second", "alice", 10)?;
    assert_eq!(bid.sequence, 1);
    assert_eq!(ledger.highest_bid("first")?.map(|bid| bid.price), Some(500));

    Ok(())
}

#[test]
fn record_ids_and_uuids_are_unique() -> Result<()> {
    let ledger = InMemoryBidLedger::new();
    let first = ledger.record_bid("first", "alice", 1)?;
    let second = ledger.record_bid("second", "alice", 1)?;

    assert_ne!(first.id, second.id);
    assert_ne!(first.uuid, second.uuid);

    Ok(())
}

#[test]
fn concurrent_writers_never_break_price_order() -> Result<()> {
    let ledger = InMemoryBidLedger::new();
    ledger.record_bid("item", "seed", 250)?;

    std::thread::scope(|scope| {
        for writer in 0..8 {
            let ledger = &ledger;
            scope.spawn(move || {
                let bidder = format!("bidder-{writer}");
                for _ in 0..100 {
                    let next = ledger
                        .highest_bid("item")
                        .expect("read works")
                        .map(|bid| bid.price + 1)
                        .unwrap_or(1);
                    // losing the race to another writer is expected
                    let _ = ledger.record_bid("item", &bidder, next);
                }
            });
        }
    });

    let bids = ledger.all_bids("item")?;
    assert!(bids.len() > 1);
    assert_strictly_increasing(&bids.iter().map(|bid| bid.price).collect::<Vec<_>>());
    assert!(bids
        .iter()
        .enumerate()
        .all(|(i, bid)| bid.sequence == i as u64 + 1));

    Ok(())
}
