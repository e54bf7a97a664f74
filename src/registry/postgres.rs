use super::*;
use crate::persistence::postgres::PostgresPersistence;
use anyhow::Context;
use tracing::debug;
use uuid::Uuid;

pub struct PostgresAutoBidRegistry {
    persistence: PostgresPersistence,
}

impl PostgresAutoBidRegistry {
    pub fn new(persistence: PostgresPersistence) -> Self {
        Self { persistence }
    }
}

impl AutoBidRegistry for PostgresAutoBidRegistry {
    fn register(
        &self,
        item: ItemIdRef,
        bidder: UserIdRef,
    ) -> Result<AutoBidRegistration, RegisterError> {
        let uuid = Uuid::new_v4();

        // the unique (item_id, bidder_id) constraint settles concurrent attempts
        let row = self
            .persistence
            .get_connection()?
            .query_opt(
                "INSERT INTO auto_bids (auto_bid_uuid, item_id, bidder_id) VALUES ($1, $2, $3) \
                 ON CONFLICT (item_id, bidder_id) DO NOTHING RETURNING auto_bid_id",
                &[&uuid.to_string(), &item, &bidder],
            )
            .context("failed to insert auto bid")?
            .ok_or_else(|| RegisterError::AlreadyRegistered {
                item: item.to_owned(),
                bidder: bidder.to_owned(),
            })?;

        debug!(item, bidder, "auto bid registered");
        Ok(AutoBidRegistration {
            id: u64::try_from(row.get::<'_, _, i64>("auto_bid_id"))
                .context("invalid auto bid id")?,
            uuid,
            item: item.to_owned(),
            bidder: bidder.to_owned(),
        })
    }

    fn candidates_excluding(&self, item: ItemIdRef, exclude: UserIdRef) -> Result<Vec<UserId>> {
        Ok(self
            .persistence
            .get_connection()?
            .query(
                "SELECT bidder_id FROM auto_bids WHERE item_id = $1 AND bidder_id <> $2 \
                 ORDER BY auto_bid_id",
                &[&item, &exclude],
            )?
            .iter()
            .map(|row| row.get("bidder_id"))
            .collect())
    }

    fn exists(&self, item: ItemIdRef, bidder: UserIdRef) -> Result<bool> {
        Ok(self
            .persistence
            .get_connection()?
            .query_opt(
                "SELECT 1 FROM auto_bids WHERE item_id = $1 AND bidder_id = $2",
                &[&item, &bidder],
            )?
            .is_some())
    }

    fn active_registrations(&self, bidder: UserIdRef) -> Result<u64> {
        let count: i64 = self
            .persistence
            .get_connection()?
            .query_one(
                "SELECT COUNT(*) FROM auto_bids WHERE bidder_id = $1",
                &[&bidder],
            )?
            .get(0);
        Ok(u64::try_from(count)?)
    }
}
