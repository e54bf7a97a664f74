use crate::{
    auction::Item,
    directory::SharedDirectory,
    engine::BiddingEngine,
};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

/// Seed a seller, a buyer, and two items open for 30 minutes with one bid each
pub fn seed(directory: &SharedDirectory, engine: &BiddingEngine, now: DateTime<Utc>) -> Result<()> {
    let seller = Uuid::new_v4().to_string();
    let buyer = Uuid::new_v4().to_string();
    directory.add_user(&seller)?;
    directory.add_user(&buyer)?;
    info!(%seller, %buyer, "demo users created");

    for (name, base_price) in [("Item 1", 200), ("Item 2", 250)] {
        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: name.to_owned(),
            base_price,
            owner: seller.clone(),
            closes_at: now + Duration::minutes(30),
        };
        let item_id = item.id.clone();
        directory.add_item(item)?;

        engine.place_bid(&item_id, &buyer, 250)?;
        info!(item = %item_id, name, base_price, "demo item created");
    }

    Ok(())
}
