//! Coupon lookup

use super::{Coupon, CouponId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Looks coupons up by id
///
/// Implementations return `Ok(None)` for an unknown id; errors are reserved for
/// failures of the lookup itself.
#[async_trait]
pub trait CouponProvider: Send + Sync {
    /// Retrieve a coupon
    async fn retrieve(&self, id: &CouponId) -> Result<Option<Coupon>>;
}

/// Provider backed by an in-memory map
#[derive(Debug, Default)]
pub struct InMemoryCouponProvider {
    coupons: RwLock<HashMap<CouponId, Coupon>>,
}

impl InMemoryCouponProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding the given coupons
    pub fn with_coupons(coupons: impl IntoIterator<Item = Coupon>) -> Self {
        let coupons = coupons
            .into_iter()
            .map(|coupon| (coupon.id.clone(), coupon))
            .collect();
        Self {
            coupons: RwLock::new(coupons),
        }
    }

    /// Add or replace a coupon
    pub async fn insert(&self, coupon: Coupon) -> Option<Coupon> {
        self.coupons.write().await.insert(coupon.id.clone(), coupon)
    }

    /// Remove a coupon
    pub async fn remove(&self, id: &CouponId) -> Option<Coupon> {
        self.coupons.write().await.remove(id)
    }
}

#[async_trait]
impl CouponProvider for InMemoryCouponProvider {
    async fn retrieve(&self, id: &CouponId) -> Result<Option<Coupon>> {
        Ok(self.coupons.read().await.get(id).cloned())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn retrieve_returns_inserted_coupon() {
        let provider = InMemoryCouponProvider::new();
        provider.insert(Coupon::new("c1")).await;

        let coupon = provider.retrieve(&CouponId::from("c1")).await.unwrap();

        assert_eq!(coupon, Some(Coupon::new("c1")));
    }

    #[tokio::test]
    async fn unknown_id_is_none_not_error() {
        let provider = InMemoryCouponProvider::with_coupons([Coupon::new("c1")]);

        let coupon = provider.retrieve(&CouponId::from("nope")).await.unwrap();

        assert!(coupon.is_none());
    }

    #[tokio::test]
    async fn insert_replaces_and_remove_deletes() {
        let provider = InMemoryCouponProvider::new();
        provider.insert(Coupon::new("c1")).await;

        let previous = provider
            .insert(Coupon::new("c1").with_description("updated"))
            .await;
        assert_eq!(previous, Some(Coupon::new("c1")));

        provider.remove(&CouponId::from("c1")).await;
        assert!(
            provider
                .retrieve(&CouponId::from("c1"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
