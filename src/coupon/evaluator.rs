//! Coupon redemption rules

use super::{Coupon, PartyId};
use chrono::Utc;

/// A single redemption rule
///
/// Rules are independent of each other; a coupon is redeemable if any rule
/// passes. Any `Fn(&Coupon, &PartyId) -> bool` is a rule as well.
pub trait CouponEvaluator: Send + Sync {
    /// Returns true if `party` may redeem `coupon` under this rule
    fn evaluate(&self, coupon: &Coupon, party: &PartyId) -> bool;
}

impl<F> CouponEvaluator for F
where
    F: Fn(&Coupon, &PartyId) -> bool + Send + Sync,
{
    fn evaluate(&self, coupon: &Coupon, party: &PartyId) -> bool {
        self(coupon, party)
    }
}

/// Passes coupons that have no expiry or whose expiry is still ahead
#[derive(Clone, Copy, Debug, Default)]
pub struct NotExpired;

impl CouponEvaluator for NotExpired {
    fn evaluate(&self, coupon: &Coupon, _party: &PartyId) -> bool {
        !coupon.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn closures_are_evaluators() {
        let only_vip = |_: &Coupon, party: &PartyId| party.0 == "vip";
        let coupon = Coupon::new("c1");

        assert!(only_vip.evaluate(&coupon, &PartyId::from("vip")));
        assert!(!only_vip.evaluate(&coupon, &PartyId::from("regular")));
    }

    #[test]
    fn not_expired_checks_expiry() {
        let party = PartyId::from("p1");
        let open = Coupon::new("open");
        let future = Coupon::new("future").with_expiry(Utc::now() + Duration::hours(1));
        let past = Coupon::new("past").with_expiry(Utc::now() - Duration::hours(1));

        assert!(NotExpired.evaluate(&open, &party));
        assert!(NotExpired.evaluate(&future, &party));
        assert!(!NotExpired.evaluate(&past, &party));
    }
}
