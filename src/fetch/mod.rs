//! Batch fetcher: concurrent resource fetching under one shared deadline.
//!
//! The work is split into focused submodules:
//! - `deadline` - The shared deadline and the read-only cancellation signal
//! - [`extract`] - What each task pulls out of its response, and how payloads combine
//! - `slots` - Index-addressed, write-once result storage
//! - `task` - A single abortable resource fetch
//! - `batch` - Waiting for completion, first failure, or the deadline

mod batch;
pub(crate) mod deadline;
pub mod extract;
pub(crate) mod slots;
mod task;


pub use extract::{BodyText, ContentLength, Extract};

use crate::config::Config;
use deadline::BatchDeadline;
use crate::error::{Error, Result};
use crate::resource::UrlTemplate;
use crate::types::{BatchState, FetchEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinSet;

/// Fetches a batch of resources concurrently under a single deadline
///
/// Every batch is all-or-nothing: it either returns the aggregate of every
/// resource, or fails with the first error observed. A deadline that elapses
/// before the last resource arrives fails the whole call with
/// [`Error::Timeout`], even if most resources were already fetched.
///
/// The fetcher holds no per-batch state, so one instance can run several
/// batches concurrently.
#[derive(Clone)]
pub struct BatchFetcher {
    client: reqwest::Client,
    template: UrlTemplate,
    event_tx: broadcast::Sender<FetchEvent>,
}

impl BatchFetcher {
    /// Create a fetcher from configuration
    ///
    /// The HTTP client gets no request timeout of its own; the batch deadline is
    /// the only timeout.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self::with_client(
            client,
            config.template()?,
            config.event_channel_capacity,
        ))
    }

    /// Create a fetcher around an existing HTTP client
    pub fn with_client(
        client: reqwest::Client,
        template: UrlTemplate,
        event_channel_capacity: usize,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(event_channel_capacity.max(1));
        Self {
            client,
            template,
            event_tx,
        }
    }

    /// The template identifiers are resolved through
    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }

    /// Subscribe to batch events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events
    /// independently. A subscriber that falls behind by more than the channel
    /// capacity receives `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use batch_fetch::{BatchFetcher, Config};
    ///
    /// # async fn example() -> batch_fetch::Result<()> {
    /// let fetcher = BatchFetcher::new(&Config::default())?;
    ///
    /// let mut events = fetcher.subscribe();
    /// tokio::spawn(async move {
    ///     while let Ok(event) = events.recv().await {
    ///         tracing::info!(?event, "fetch event");
    ///     }
    /// });
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<FetchEvent> {
        self.event_tx.subscribe()
    }

    /// Download the body of every resource, returned in input order
    ///
    /// # Example
    ///
    /// ```no_run
    /// use batch_fetch::{BatchFetcher, Config};
    /// use std::time::Duration;
    ///
    /// # async fn example() -> batch_fetch::Result<()> {
    /// let fetcher = BatchFetcher::new(&Config::default())?;
    /// match fetcher.fetch_bodies(["1", "2", "3"], Duration::from_millis(1000)).await {
    ///     Ok(bodies) => println!("{bodies:?}"),
    ///     Err(e) if e.is_timeout() => println!("{e}"),
    ///     Err(e) => return Err(e),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_bodies<I, S>(&self, ids: I, deadline: Duration) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fetch_with(ids, deadline, BodyText).await
    }

    /// Sum the declared content length of every resource
    ///
    /// A response without a usable `Content-Length` header counts as zero.
    pub async fn fetch_total_length<I, S>(&self, ids: I, deadline: Duration) -> Result<u64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fetch_with(ids, deadline, ContentLength).await
    }

    /// Run a batch with a custom extractor
    ///
    /// This is the skeleton shared by [`fetch_bodies`](Self::fetch_bodies) and
    /// [`fetch_total_length`](Self::fetch_total_length). An empty identifier
    /// sequence performs no I/O and aggregates an empty payload list.
    pub async fn fetch_with<I, S, E>(
        &self,
        ids: I,
        deadline: Duration,
        extractor: E,
    ) -> Result<E::Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        E: Extract,
    {
        let operation = extractor.operation();

        if deadline.is_zero() {
            return Err(Error::InvalidArgument {
                name: "deadline",
                reason: "must be greater than zero".to_string(),
            });
        }

        let requests = self.template.requests(ids)?;
        let total = requests.len();

        tracing::info!(
            operation,
            total,
            deadline_ms = deadline.as_millis() as u64,
            "Starting batch"
        );
        self.emit_event(FetchEvent::BatchStarted {
            operation: operation.to_string(),
            total,
            deadline,
        });

        if requests.is_empty() {
            self.emit_event(FetchEvent::BatchCompleted {
                operation: operation.to_string(),
                total: 0,
                elapsed: Duration::ZERO,
            });
            return Ok(extractor.aggregate(Vec::new()));
        }

        let ids: Vec<String> = requests.iter().map(|r| r.id.clone()).collect();
        let deadline = BatchDeadline::arm(deadline);
        let extractor = Arc::new(extractor);

        let mut tasks = JoinSet::new();
        for request in requests {
            tasks.spawn(task::fetch_resource(
                self.client.clone(),
                request,
                Arc::clone(&extractor),
                deadline.signal(),
            ));
        }

        let (state, result) = batch::collect(operation, &mut tasks, &deadline, total, |index| {
            self.emit_event(FetchEvent::ResourceFetched {
                index,
                id: ids[index].clone(),
            });
        })
        .await;

        match (state, result) {
            (BatchState::Completed, Ok(payloads)) => {
                let elapsed = deadline.elapsed();
                tracing::info!(
                    operation,
                    total,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Batch completed"
                );
                self.emit_event(FetchEvent::BatchCompleted {
                    operation: operation.to_string(),
                    total,
                    elapsed,
                });
                Ok(extractor.aggregate(payloads))
            }
            (_, Err(e @ Error::Timeout { completed, .. })) => {
                tracing::warn!(
                    operation,
                    completed,
                    total,
                    deadline_ms = deadline.duration().as_millis() as u64,
                    "Batch timed out"
                );
                self.emit_event(FetchEvent::BatchTimedOut {
                    operation: operation.to_string(),
                    completed,
                    total,
                });
                Err(e)
            }
            (_, Err(e)) => {
                tracing::error!(operation, error = %e, "Batch failed");
                self.emit_event(FetchEvent::BatchFailed {
                    operation: operation.to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
            (state, Ok(_)) => Err(Error::TaskFailed(format!(
                "batch ended in state {state:?} without an error"
            ))),
        }
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    fn emit_event(&self, event: FetchEvent) {
        self.event_tx.send(event).ok();
    }
}
