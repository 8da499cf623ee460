//! A single resource fetch, raced against the batch cancellation signal.

use super::deadline::CancellationSignal;
use super::extract::Extract;
use crate::error::FetchError;
use crate::types::{FetchOutcome, ResourceRequest};
use std::sync::Arc;

/// Fetch one resource and extract its payload
///
/// Both the request and the extraction are abortable. A task that sees the
/// signal before it has a payload reports `Cancelled`, never a default value.
#[tracing::instrument(
    name = "fetch_resource",
    skip_all,
    fields(index = request.index, id = %request.id, url = %request.url)
)]
pub(crate) async fn fetch_resource<E: Extract>(
    client: reqwest::Client,
    request: ResourceRequest,
    extractor: Arc<E>,
    signal: CancellationSignal,
) -> FetchOutcome<E::Payload> {
    let ResourceRequest { index, url, .. } = request;
    let url_string = url.to_string();
    let cancelled = |url: String| FetchOutcome::Failed(FetchError::Cancelled { index, url });

    if signal.is_cancelled() {
        return cancelled(url_string);
    }

    let response = tokio::select! {
        biased;
        _ = signal.cancelled() => {
            tracing::debug!("Cancelled while waiting for response");
            return cancelled(url_string);
        }
        result = client.get(url).send() => match result {
            Ok(response) => response,
            Err(source) => {
                tracing::warn!(error = %source, "Request failed");
                return FetchOutcome::Failed(FetchError::Request {
                    index,
                    url: url_string,
                    source,
                });
            }
        },
    };

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "Non-success status");
        return FetchOutcome::Failed(FetchError::Status {
            index,
            url: url_string,
            status: status.as_u16(),
        });
    }

    let payload = tokio::select! {
        biased;
        _ = signal.cancelled() => {
            tracing::debug!("Cancelled while reading response");
            return cancelled(url_string);
        }
        result = extractor.extract(response) => match result {
            Ok(payload) => payload,
            Err(source) => {
                tracing::warn!(error = %source, "Failed to read response");
                return FetchOutcome::Failed(FetchError::Request {
                    index,
                    url: url_string,
                    source,
                });
            }
        },
    };

    // extraction may finish in the same poll the deadline fires
    if signal.is_cancelled() {
        return cancelled(url_string);
    }

    tracing::debug!(status = status.as_u16(), "Resource fetched");
    FetchOutcome::Succeeded { index, payload }
}
