//! Redemption decisions

use super::{CouponEvaluator, CouponId, CouponProvider, PartyId};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Decides whether a party may redeem a coupon
///
/// Built with [`CouponManager::builder`]; building without a provider fails.
#[derive(Clone)]
pub struct CouponManager {
    provider: Arc<dyn CouponProvider>,
}

impl std::fmt::Debug for CouponManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouponManager").finish_non_exhaustive()
    }
}

impl CouponManager {
    /// Start building a manager
    pub fn builder() -> CouponManagerBuilder {
        CouponManagerBuilder::default()
    }

    /// Create a manager around a provider
    pub fn new(provider: Arc<dyn CouponProvider>) -> Self {
        Self { provider }
    }

    /// Returns true if `party` may redeem the coupon `coupon_id`
    ///
    /// - `evaluators` of `None` is a caller error and fails before any lookup.
    /// - An unknown coupon fails with [`Error::NotFound`].
    /// - An empty evaluator list allows redemption.
    /// - Otherwise redemption is allowed if any evaluator passes. Evaluation
    ///   stops at the first evaluator that passes.
    pub async fn can_redeem_coupon(
        &self,
        coupon_id: &CouponId,
        party: &PartyId,
        evaluators: Option<&[Box<dyn CouponEvaluator>]>,
    ) -> Result<bool> {
        let evaluators = evaluators.ok_or(Error::MissingArgument { name: "evaluators" })?;

        let coupon = self
            .provider
            .retrieve(coupon_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("coupon {coupon_id}")))?;

        if evaluators.is_empty() {
            tracing::debug!(
                coupon = %coupon_id,
                party = %party,
                "No evaluators, redemption allowed"
            );
            return Ok(true);
        }

        let allowed = evaluators
            .iter()
            .any(|evaluator| evaluator.evaluate(&coupon, party));

        tracing::debug!(
            coupon = %coupon_id,
            party = %party,
            evaluators = evaluators.len(),
            allowed,
            "Evaluated coupon redemption"
        );

        Ok(allowed)
    }
}

/// Builder for [`CouponManager`]
#[derive(Default)]
pub struct CouponManagerBuilder {
    provider: Option<Arc<dyn CouponProvider>>,
}

impl CouponManagerBuilder {
    /// Set the coupon provider (required)
    pub fn provider(mut self, provider: Arc<dyn CouponProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the manager, failing with [`Error::MissingArgument`] if no provider was set
    pub fn build(self) -> Result<CouponManager> {
        let provider = self
            .provider
            .ok_or(Error::MissingArgument { name: "provider" })?;
        Ok(CouponManager::new(provider))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::{Coupon, InMemoryCouponProvider, NotExpired};
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manager_with(coupons: impl IntoIterator<Item = Coupon>) -> CouponManager {
        CouponManager::builder()
            .provider(Arc::new(InMemoryCouponProvider::with_coupons(coupons)))
            .build()
            .unwrap()
    }

    /// Counts lookups so tests can assert none happened
    #[derive(Default)]
    struct CountingProvider {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl CouponProvider for CountingProvider {
        async fn retrieve(&self, id: &CouponId) -> Result<Option<Coupon>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Coupon::new(id.clone())))
        }
    }

    fn always(result: bool) -> Box<dyn CouponEvaluator> {
        Box::new(move |_: &Coupon, _: &PartyId| result)
    }

    #[test]
    fn build_without_provider_fails() {
        let err = CouponManager::builder().build().unwrap_err();

        assert!(matches!(err, Error::MissingArgument { name: "provider" }));
    }

    #[tokio::test]
    async fn missing_evaluators_fails_before_lookup() {
        let provider = Arc::new(CountingProvider::default());
        let manager = CouponManager::new(provider.clone());

        let err = manager
            .can_redeem_coupon(&CouponId::from("c1"), &PartyId::from("p1"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingArgument { name: "evaluators" }));
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_coupon_is_not_found() {
        let manager = manager_with(Vec::new());
        let evaluators = vec![always(true)];

        let err = manager
            .can_redeem_coupon(
                &CouponId::from("missing"),
                &PartyId::from("p1"),
                Some(evaluators.as_slice()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_evaluator_list_allows_redemption() {
        let manager = manager_with([Coupon::new("c1")]);
        let evaluators: Vec<Box<dyn CouponEvaluator>> = Vec::new();

        let allowed = manager
            .can_redeem_coupon(
                &CouponId::from("c1"),
                &PartyId::from("p1"),
                Some(evaluators.as_slice()),
            )
            .await
            .unwrap();

        assert!(allowed);
    }

    #[tokio::test]
    async fn any_passing_evaluator_allows_redemption() {
        let manager = manager_with([Coupon::new("c1")]);
        let evaluators = vec![always(false), always(true), always(false)];

        let allowed = manager
            .can_redeem_coupon(
                &CouponId::from("c1"),
                &PartyId::from("p1"),
                Some(evaluators.as_slice()),
            )
            .await
            .unwrap();

        assert!(allowed);
    }

    #[tokio::test]
    async fn all_failing_evaluators_deny_redemption() {
        let manager = manager_with([Coupon::new("c1")]);
        let evaluators = vec![always(false), always(false)];

        let allowed = manager
            .can_redeem_coupon(
                &CouponId::from("c1"),
                &PartyId::from("p1"),
                Some(evaluators.as_slice()),
            )
            .await
            .unwrap();

        assert!(!allowed);
    }

    #[tokio::test]
    async fn evaluators_see_the_party() {
        let manager = manager_with([Coupon::new("c1")]);
        let evaluators: Vec<Box<dyn CouponEvaluator>> =
            vec![Box::new(|_: &Coupon, party: &PartyId| party.0 == "vip")];

        let vip = manager
            .can_redeem_coupon(
                &CouponId::from("c1"),
                &PartyId::from("vip"),
                Some(evaluators.as_slice()),
            )
            .await
            .unwrap();
        let other = manager
            .can_redeem_coupon(
                &CouponId::from("c1"),
                &PartyId::from("p2"),
                Some(evaluators.as_slice()),
            )
            .await
            .unwrap();

        assert!(vip);
        assert!(!other);
    }

    #[tokio::test]
    async fn expired_coupon_fails_not_expired_rule() {
        let manager = manager_with([
            Coupon::new("old").with_expiry(Utc::now() - Duration::days(1)),
            Coupon::new("new").with_expiry(Utc::now() + Duration::days(1)),
        ]);
        let evaluators: Vec<Box<dyn CouponEvaluator>> = vec![Box::new(NotExpired)];
        let party = PartyId::from("p1");

        assert!(
            !manager
                .can_redeem_coupon(&CouponId::from("old"), &party, Some(evaluators.as_slice()))
                .await
                .unwrap()
        );
        assert!(
            manager
                .can_redeem_coupon(&CouponId::from("new"), &party, Some(evaluators.as_slice()))
                .await
                .unwrap()
        );
    }
}
