//! Funds Eligibility Evaluator
//!
//! Decides whether an auto-bidder can follow a price. A bidder's funding
//! profile is one ceiling shared by every item they auto-bid on, so the
//! ceiling is spread evenly over their active registrations and the share
//! must exceed the proposed price. Nothing is reserved per item: a bidder
//! can end up winning items whose combined price is above the ceiling.
use crate::{
    auction::{Amount, UserIdRef},
    directory::SharedDirectory,
    registry::SharedAutoBidRegistry,
};
use anyhow::Result;
use tracing::debug;

pub struct FundsEligibility {
    directory: SharedDirectory,
    registry: SharedAutoBidRegistry,
}

impl FundsEligibility {
    pub fn new(directory: SharedDirectory, registry: SharedAutoBidRegistry) -> Self {
        Self {
            directory,
            registry,
        }
    }

    pub fn is_eligible(&self, bidder: UserIdRef, proposed_next_price: Amount) -> Result<bool> {
        let commitment = self
            .directory
            .funding_profile(bidder)?
            .unwrap_or_default()
            .max_total_commitment;
        let active_registrations = self.registry.active_registrations(bidder)?;

        let eligible = share_exceeds(commitment, active_registrations, proposed_next_price);
        debug!(
            bidder,
            commitment, active_registrations, proposed_next_price, eligible, "funds check"
        );
        Ok(eligible)
    }
}

/// `commitment / registrations > price`, without rounding the share down
pub fn share_exceeds(commitment: Amount, registrations: u64, price: Amount) -> bool {
    registrations != 0 && u128::from(commitment) > u128::from(price) * u128::from(registrations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_is_commitment_spread_over_registrations() {
        // 600 over two items is 300 per item
        assert!(share_exceeds(600, 2, 250));
        assert!(share_exceeds(600, 2, 299));
        assert!(!share_exceeds(600, 2, 300));
        assert!(!share_exceeds(600, 2, 301));
    }

    #[test]
    fn share_is_not_rounded_down() {
        // 601 / 2 = 300.5
        assert!(share_exceeds(601, 2, 300));
    }

    #[test]
    fn no_registrations_means_nothing_to_spread() {
        assert!(!share_exceeds(1_000, 0, 1));
    }

    #[test]
    fn huge_amounts_do_not_overflow() {
        assert!(share_exceeds(u64::MAX, 3, u64::MAX / 4));
        assert!(!share_exceeds(u64::MAX, 3, u64::MAX / 2));
    }
}
