//! Per-response payload extraction and aggregation.
//!
//! A batch runs the same concurrency skeleton for every mode; an [`Extract`]
//! implementation decides what each task pulls out of its response and how the
//! ordered payloads are folded into the batch result.

use async_trait::async_trait;
use reqwest::Response;
use reqwest::header::{CONTENT_LENGTH, HeaderMap};

/// What a batch extracts from each response
#[async_trait]
pub trait Extract: Send + Sync + 'static {
    /// Value produced by one successful request
    type Payload: Send + 'static;

    /// Aggregate produced by a completed batch
    type Output;

    /// Operation name used in logs, events and timeout errors
    fn operation(&self) -> &'static str;

    /// Pull the payload out of a response that already has a success status
    async fn extract(&self, response: Response) -> reqwest::Result<Self::Payload>;

    /// Combine payloads given in input order
    fn aggregate(&self, payloads: Vec<Self::Payload>) -> Self::Output;
}

/// Full body text of every resource, in input order
#[derive(Clone, Copy, Debug, Default)]
pub struct BodyText;

#[async_trait]
impl Extract for BodyText {
    type Payload = String;
    type Output = Vec<String>;

    fn operation(&self) -> &'static str {
        "fetch_bodies"
    }

    async fn extract(&self, response: Response) -> reqwest::Result<String> {
        response.text().await
    }

    fn aggregate(&self, payloads: Vec<String>) -> Vec<String> {
        payloads
    }
}

/// Sum of the declared `Content-Length` of every resource
///
/// The body is never read. A missing or unparsable header counts as zero, so
/// chunked responses are undercounted.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentLength;

#[async_trait]
impl Extract for ContentLength {
    type Payload = u64;
    type Output = u64;

    fn operation(&self) -> &'static str {
        "fetch_total_length"
    }

    async fn extract(&self, response: Response) -> reqwest::Result<u64> {
        Ok(declared_length(response.headers()))
    }

    fn aggregate(&self, payloads: Vec<u64>) -> u64 {
        payloads.into_iter().fold(0u64, u64::saturating_add)
    }
}

/// Value of the `Content-Length` header, or 0 when absent or malformed
pub fn declared_length(headers: &HeaderMap) -> u64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers_with_length(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn declared_length_reads_header() {
        assert_eq!(declared_length(&headers_with_length("250")), 250);
    }

    #[test]
    fn missing_length_counts_as_zero() {
        assert_eq!(declared_length(&HeaderMap::new()), 0);
    }

    #[test]
    fn malformed_length_counts_as_zero() {
        assert_eq!(declared_length(&headers_with_length("lots")), 0);
        assert_eq!(declared_length(&headers_with_length("-5")), 0);
    }

    #[test]
    fn content_length_sums_payloads() {
        assert_eq!(ContentLength.aggregate(vec![100, 0, 250]), 350);
        assert_eq!(ContentLength.aggregate(Vec::new()), 0);
    }

    #[test]
    fn content_length_sum_saturates() {
        assert_eq!(ContentLength.aggregate(vec![u64::MAX, 1]), u64::MAX);
    }

    #[test]
    fn body_text_keeps_given_order() {
        let bodies = vec!["A".to_string(), "B".to_string(), "C".to_string()];

        assert_eq!(BodyText.aggregate(bodies.clone()), bodies);
    }

    #[test]
    fn operations_are_named_after_the_batch_call() {
        assert_eq!(BodyText.operation(), "fetch_bodies");
        assert_eq!(ContentLength.operation(), "fetch_total_length");
    }
}
