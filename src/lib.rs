//! # batch-fetch
//!
//! Concurrent HTTP resource fetching under a single shared batch deadline.
//!
//! ## Design Philosophy
//!
//! batch-fetch is designed to be:
//! - **All-or-nothing** - A batch returns every result or the first error, never a partial list
//! - **Deadline-bound** - One deadline covers the whole batch, and in-flight requests are aborted when it fires
//! - **Order-preserving** - Results come back in input order whatever order they arrive in
//! - **Event-driven** - Consumers subscribe to batch events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use batch_fetch::{BatchFetcher, Config};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         url_template: "http://localhost:8888/resource/{id}".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let fetcher = BatchFetcher::new(&config)?;
//!
//!     // Subscribe to events
//!     let mut events = fetcher.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let bodies = fetcher
//!         .fetch_bodies(["1", "2", "3"], Duration::from_millis(1000))
//!         .await?;
//!     for (n, body) in bodies.iter().enumerate() {
//!         println!("Resource {}:\n{}\n", n + 1, body);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Coupon redemption checks
pub mod coupon;
/// Error types
pub mod error;
/// Batch fetcher (decomposed into focused submodules)
pub mod fetch;
/// Resource identifiers and URL templates
pub mod resource;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, FetchMode};
pub use coupon::{
    Coupon, CouponEvaluator, CouponId, CouponManager, CouponProvider, InMemoryCouponProvider,
    NotExpired, PartyId,
};
pub use error::{Error, ErrorReport, FetchError, Result};
pub use fetch::{BatchFetcher, BodyText, ContentLength, Extract};
pub use resource::UrlTemplate;
pub use types::{BatchState, FetchEvent, FetchOutcome, ResourceRequest};
