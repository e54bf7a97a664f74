use super::*;
use crate::persistence::postgres::{from_amount, to_amount, PostgresPersistence};
use anyhow::Context;
use ::postgres::Row;
use tracing::debug;
use uuid::Uuid;

pub struct PostgresBidLedger {
    persistence: PostgresPersistence,
}

impl PostgresBidLedger {
    pub fn new(persistence: PostgresPersistence) -> Self {
        Self { persistence }
    }
}

fn bid_from_row(row: &Row) -> Result<Bid> {
    Ok(Bid {
        id: u64::try_from(row.get::<'_, _, i64>("bid_id"))?,
        uuid: Uuid::parse_str(row.get("bid_uuid"))?,
        item: row.get("item_id"),
        bidder: row.get("bidder_id"),
        price: to_amount(row.get("price"))?,
        sequence: u64::try_from(row.get::<'_, _, i64>("sequence"))?,
    })
}

const SELECT_BIDS: &str =
    "SELECT bid_id, bid_uuid, item_id, bidder_id, price, sequence FROM bids WHERE item_id = $1";

impl BidLedger for PostgresBidLedger {
    fn record_bid(
        &self,
        item: ItemIdRef,
        bidder: UserIdRef,
        price: Amount,
    ) -> Result<Bid, RecordError> {
        let mut connection = self.persistence.get_connection()?;
        let mut transaction = connection
            .transaction()
            .context("failed to start transaction")?;

        // serializes appends per item until commit/rollback
        transaction
            .execute("SELECT pg_advisory_xact_lock(hashtext($1))", &[&item])
            .context("failed to lock item")?;

        let (highest, last_sequence) = match transaction
            .query_opt(
                "SELECT price, sequence FROM bids WHERE item_id = $1 ORDER BY sequence DESC LIMIT 1",
                &[&item],
            )
            .context("failed to load highest bid")?
        {
            Some(row) => (to_amount(row.get("price"))?, row.get::<'_, _, i64>("sequence")),
            None => (0, 0),
        };

        // dropping the transaction rolls it back
        ensure_outbids(highest, price)?;

        let uuid = Uuid::new_v4();
        let sequence = last_sequence + 1;
        let row = transaction
            .query_one(
                "INSERT INTO bids (bid_uuid, item_id, bidder_id, price, sequence) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING bid_id",
                &[
                    &uuid.to_string(),
                    &item,
                    &bidder,
                    &from_amount(price)?,
                    &sequence,
                ],
            )
            .context("failed to insert bid")?;
        transaction.commit().context("failed to commit bid")?;

        debug!(item, bidder, price, sequence, "bid recorded");
        Ok(Bid {
            id: u64::try_from(row.get::<'_, _, i64>("bid_id")).context("invalid bid id")?,
            uuid,
            item: item.to_owned(),
            bidder: bidder.to_owned(),
            price,
            sequence: u64::try_from(sequence).context("invalid sequence")?,
        })
    }

    fn highest_bid(&self, item: ItemIdRef) -> Result<Option<Bid>> {
        self.persistence
            .get_connection()?
            .query_opt(
                format!("{SELECT_BIDS} ORDER BY sequence DESC LIMIT 1").as_str(),
                &[&item],
            )?
            .map(|row| bid_from_row(&row))
            .transpose()
    }

    fn all_bids(&self, item: ItemIdRef) -> Result<Vec<Bid>> {
        self.persistence
            .get_connection()?
            .query(format!("{SELECT_BIDS} ORDER BY sequence").as_str(), &[&item])?
            .iter()
            .map(bid_from_row)
            .collect()
    }
}
