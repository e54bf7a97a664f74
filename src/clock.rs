//! Auction Clock Guard
use crate::auction::Item;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub type SharedClock = Arc<dyn Clock + Send + Sync + 'static>;

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Bidding on `item` is open strictly before its close time
pub fn is_open(item: &Item, now: DateTime<Utc>) -> bool {
    now < item.closes_at
}

/// Checks items against a [`Clock`], reading the time anew on every check
#[derive(Clone)]
pub struct ClockGuard {
    clock: SharedClock,
}

impl ClockGuard {
    pub fn new(clock: SharedClock) -> Self {
        Self { clock }
    }

    pub fn is_open(&self, item: &Item) -> bool {
        let now = self.clock.now();
        let open = is_open(item, now);
        if !open {
            debug!(item = %item.id, %now, closes_at = %item.closes_at, "bidding closed");
        }
        open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn closes_exactly_at_close_time() {
        let closes_at = Utc::now();
        let item = Item {
            id: "item".to_owned(),
            name: "Item 1".to_owned(),
            base_price: 200,
            owner: "seller".to_owned(),
            closes_at,
        };

        assert!(is_open(&item, closes_at - Duration::seconds(1)));
        assert!(!is_open(&item, closes_at));
        assert!(!is_open(&item, closes_at + Duration::seconds(1)));
    }
}
