//! Batch collection: wait for every task or the deadline, whichever comes first.

use super::deadline::BatchDeadline;
use super::slots::ResultSlots;
use crate::error::{Error, Result};
use crate::types::{BatchState, FetchOutcome};
use tokio::task::JoinSet;

/// Wait until every slot is filled, one task fails, or the deadline fires
///
/// Returns the payloads in input order on completion. On any other terminal
/// state the remaining tasks are aborted before returning, and payloads that
/// already arrived are dropped.
pub(crate) async fn collect<T: Send + 'static>(
    operation: &'static str,
    tasks: &mut JoinSet<FetchOutcome<T>>,
    deadline: &BatchDeadline,
    total: usize,
    mut on_fetched: impl FnMut(usize),
) -> (BatchState, Result<Vec<T>>) {
    let mut slots = ResultSlots::new(total);
    let timed_out = |completed: usize| Error::Timeout {
        operation,
        deadline: deadline.duration(),
        completed,
        total,
    };

    let (state, result) = loop {
        tokio::select! {
            // a deadline that is already due wins over a finished task
            biased;
            _ = deadline.expired() => {
                break (BatchState::TimedOut, Err(timed_out(slots.filled())));
            }
            joined = tasks.join_next() => match joined {
                None if slots.is_complete() => break (BatchState::Completed, Ok(())),
                None => {
                    let missing = total - slots.filled();
                    break (
                        BatchState::Failed,
                        Err(Error::TaskFailed(format!(
                            "all tasks finished with {missing} results missing"
                        ))),
                    );
                }
                Some(Ok(FetchOutcome::Succeeded { index, payload })) => {
                    if let Err(e) = slots.fill(index, payload) {
                        break (BatchState::Failed, Err(e));
                    }
                    on_fetched(index);
                    if slots.is_complete() {
                        break (BatchState::Completed, Ok(()));
                    }
                }
                Some(Ok(FetchOutcome::Failed(e))) if e.is_cancelled() => {
                    break (BatchState::TimedOut, Err(timed_out(slots.filled())));
                }
                Some(Ok(FetchOutcome::Failed(e))) => {
                    break (BatchState::Failed, Err(Error::Fetch(e)));
                }
                Some(Err(join_error)) => {
                    break (BatchState::Failed, Err(Error::TaskFailed(join_error.to_string())));
                }
            },
        }
    };

    match result {
        Ok(()) => {
            tracing::debug!(operation, total, "All resources fetched");
            (state, slots.into_ordered())
        }
        Err(e) => {
            let outstanding = tasks.len();
            tasks.abort_all();
            tracing::debug!(
                operation,
                ?state,
                completed = slots.filled(),
                outstanding,
                "Batch abandoned, aborting outstanding requests"
            );
            (state, Err(e))
        }
    }
}
