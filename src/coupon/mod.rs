//! Coupon redemption checks
//!
//! This module is independent of the batch fetcher. It answers one question:
//! may this party redeem this coupon?
//!
//! ## Architecture
//!
//! - [`CouponProvider`]: looks a coupon up by id. Supplied by the embedding
//!   application; [`InMemoryCouponProvider`] is a ready-made implementation.
//! - [`CouponEvaluator`]: one redemption rule. Closures of the shape
//!   `Fn(&Coupon, &PartyId) -> bool` are evaluators too.
//! - [`CouponManager`]: looks the coupon up and passes it if any rule matches.
//!
//! ## Usage
//!
//! ```
//! use batch_fetch::coupon::{
//!     Coupon, CouponEvaluator, CouponId, CouponManager, InMemoryCouponProvider, NotExpired,
//!     PartyId,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> batch_fetch::Result<()> {
//! let provider = InMemoryCouponProvider::new();
//! provider.insert(Coupon::new("SPRING-10")).await;
//!
//! let manager = CouponManager::builder()
//!     .provider(Arc::new(provider))
//!     .build()?;
//!
//! let evaluators: Vec<Box<dyn CouponEvaluator>> = vec![Box::new(NotExpired)];
//! let allowed = manager
//!     .can_redeem_coupon(
//!         &CouponId::from("SPRING-10"),
//!         &PartyId::from("customer-1"),
//!         Some(evaluators.as_slice()),
//!     )
//!     .await?;
//! assert!(allowed);
//! # Ok(())
//! # }
//! ```

mod evaluator;
mod manager;
mod provider;

pub use evaluator::{CouponEvaluator, NotExpired};
pub use manager::{CouponManager, CouponManagerBuilder};
pub use provider::{CouponProvider, InMemoryCouponProvider};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a coupon
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponId(pub String);

impl From<&str> for CouponId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CouponId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CouponId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the party redeeming a coupon
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(pub String);

impl From<&str> for PartyId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PartyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A coupon record as returned by a [`CouponProvider`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Coupon id
    pub id: CouponId,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Moment after which the coupon can no longer be redeemed (None = never)
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Coupon {
    /// Create a coupon with no description and no expiry
    pub fn new(id: impl Into<CouponId>) -> Self {
        Self {
            id: id.into(),
            description: None,
            expires_at: None,
        }
    }

    /// Set the expiry
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if the coupon has an expiry at or before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}
