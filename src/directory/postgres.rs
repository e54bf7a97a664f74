use super::*;
use crate::persistence::postgres::{from_amount, to_amount, PostgresPersistence};
use anyhow::{ensure, Context};

pub struct PostgresDirectory {
    persistence: PostgresPersistence,
}

impl PostgresDirectory {
    pub fn new(persistence: PostgresPersistence) -> Self {
        Self { persistence }
    }
}

impl Directory for PostgresDirectory {
    fn user_exists(&self, user: UserIdRef) -> Result<bool> {
        Ok(self
            .persistence
            .get_connection()?
            .query_opt("SELECT 1 FROM users WHERE user_id = $1", &[&user])?
            .is_some())
    }

    fn item(&self, item: ItemIdRef) -> Result<Option<Item>> {
        self.persistence
            .get_connection()?
            .query_opt(
                "SELECT item_id, name, base_price, owner_id, closes_at FROM items WHERE item_id = $1",
                &[&item],
            )?
            .map(|row| {
                Ok(Item {
                    id: row.get("item_id"),
                    name: row.get("name"),
                    base_price: to_amount(row.get("base_price"))?,
                    owner: row.get("owner_id"),
                    closes_at: row.get("closes_at"),
                })
            })
            .transpose()
    }

    fn funding_profile(&self, user: UserIdRef) -> Result<Option<FundingProfile>> {
        self.persistence
            .get_connection()?
            .query_opt(
                "SELECT max_total_commitment FROM users WHERE user_id = $1",
                &[&user],
            )?
            .and_then(|row| row.get::<'_, _, Option<i64>>("max_total_commitment"))
            .map(|commitment| {
                Ok(FundingProfile {
                    max_total_commitment: to_amount(commitment)?,
                })
            })
            .transpose()
    }

    fn add_user(&self, user: UserIdRef) -> Result<()> {
        self.persistence
            .get_connection()?
            .execute(
                "INSERT INTO users (user_id) VALUES ($1) ON CONFLICT DO NOTHING",
                &[&user],
            )
            .context("failed to insert user")?;
        Ok(())
    }

    fn add_item(&self, item: Item) -> Result<()> {
        self.persistence
            .get_connection()?
            .execute(
                "INSERT INTO items (item_id, name, base_price, owner_id, closes_at) \
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &item.id,
                    &item.name,
                    &from_amount(item.base_price)?,
                    &item.owner,
                    &item.closes_at,
                ],
            )
            .with_context(|| format!("failed to insert item {}", item.id))?;
        Ok(())
    }

    fn set_funding_profile(&self, user: UserIdRef, profile: FundingProfile) -> Result<()> {
        let updated = self
            .persistence
            .get_connection()?
            .execute(
                "UPDATE users SET max_total_commitment = $2 WHERE user_id = $1",
                &[&user, &from_amount(profile.max_total_commitment)?],
            )
            .context("failed to update funding profile")?;
        ensure!(updated == 1, "unknown user: {user}");
        Ok(())
    }
}
