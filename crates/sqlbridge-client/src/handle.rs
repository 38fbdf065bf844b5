//! Completion handles for queued batches.
//!
//! A [`QueryHandle`] and its [`Completer`] share one slot. The worker fills
//! the slot, then wakes both a blocked thread (condvar) and a pending task
//! (waker), so the same handle serves blocking callers and any executor.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{ClientError, ClientResult};
use crate::result::QueryResult;

/// Outcome of a batch.
pub type BatchOutcome = ClientResult<Vec<QueryResult>>;

#[derive(Default)]
struct SlotState {
    done: bool,
    outcome: Option<BatchOutcome>,
    waker: Option<Waker>,
}

impl SlotState {
    fn take(&mut self) -> BatchOutcome {
        self.outcome.take().unwrap_or(Err(ClientError::ResultTaken))
    }
}

#[derive(Default)]
struct Slot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

/// Creates a connected handle and completer.
pub(crate) fn channel() -> (QueryHandle, Completer) {
    let slot = Arc::new(Slot::default());
    (
        QueryHandle { slot: slot.clone() },
        Completer {
            slot: Some(slot),
        },
    )
}

/// Write side of a handle. Dropping it unfilled resolves the handle to
/// [`ClientError::WorkerStopped`].
pub(crate) struct Completer {
    slot: Option<Arc<Slot>>,
}

impl Completer {
    /// Stores the outcome and wakes any waiter.
    pub(crate) fn complete(mut self, outcome: BatchOutcome) {
        if let Some(slot) = self.slot.take() {
            fill(&slot, outcome);
        }
    }
}

impl Drop for Completer {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            fill(&slot, Err(ClientError::WorkerStopped));
        }
    }
}

fn fill(slot: &Slot, outcome: BatchOutcome) {
    let waker = {
        let mut state = slot.state.lock();
        state.done = true;
        state.outcome = Some(outcome);
        state.waker.take()
    };
    slot.ready.notify_all();
    if let Some(waker) = waker {
        waker.wake();
    }
}

/// Handle to a batch queued with [`Glue::query_async`](crate::Glue::query_async).
///
/// Awaiting the handle yields the batch outcome. Bounded waits return
/// [`ClientError::Timeout`] without consuming the result, so the handle can
/// be waited on again afterwards. Dropping the handle does not cancel the
/// batch.
pub struct QueryHandle {
    slot: Arc<Slot>,
}

impl QueryHandle {
    /// Returns true once the batch has finished.
    pub fn is_finished(&self) -> bool {
        self.slot.state.lock().done
    }

    /// Blocks the current thread until the batch finishes.
    pub fn wait(self) -> BatchOutcome {
        let mut state = self.slot.state.lock();
        while !state.done {
            self.slot.ready.wait(&mut state);
        }
        state.take()
    }

    /// Blocks for at most `timeout`. A timeout too large to form a deadline
    /// waits without bound.
    pub fn wait_timeout(&mut self, timeout: Duration) -> BatchOutcome {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.slot.state.lock();
        while !state.done {
            match deadline {
                Some(deadline) => {
                    if self.slot.ready.wait_until(&mut state, deadline).timed_out()
                        && !state.done
                    {
                        return Err(ClientError::Timeout(timeout));
                    }
                }
                None => self.slot.ready.wait(&mut state),
            }
        }
        state.take()
    }

    /// Waits asynchronously for at most `timeout`.
    pub async fn timeout(&mut self, timeout: Duration) -> BatchOutcome {
        match tokio::time::timeout(timeout, &mut *self).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ClientError::Timeout(timeout)),
        }
    }
}

impl Future for QueryHandle {
    type Output = BatchOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.slot.state.lock();
        if state.done {
            return Poll::Ready(state.take());
        }
        match &state.waker {
            Some(waker) if waker.will_wake(cx.waker()) => {}
            _ => state.waker = Some(cx.waker().clone()),
        }
        Poll::Pending
    }
}

impl std::fmt::Debug for QueryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHandle")
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_receives_outcome() {
        let (handle, completer) = channel();
        assert!(!handle.is_finished());
        std::thread::spawn(move || completer.complete(Ok(vec![QueryResult::Commit])));
        assert_eq!(handle.wait().unwrap(), vec![QueryResult::Commit]);
    }

    #[test]
    fn test_wait_timeout_keeps_handle_usable() {
        let (mut handle, completer) = channel();
        let err = handle.wait_timeout(Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));

        completer.complete(Ok(vec![]));
        assert!(handle.is_finished());
        assert_eq!(handle.wait_timeout(Duration::from_millis(10)).unwrap(), vec![]);
        assert!(matches!(
            handle.wait_timeout(Duration::ZERO),
            Err(ClientError::ResultTaken)
        ));
    }

    #[test]
    fn test_wait_timeout_with_unrepresentable_deadline() {
        let (mut handle, completer) = channel();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            completer.complete(Ok(vec![QueryResult::Commit]));
        });
        assert_eq!(
            handle.wait_timeout(Duration::MAX).unwrap(),
            vec![QueryResult::Commit]
        );
    }

    #[test]
    fn test_dropped_completer_reports_worker_stopped() {
        let (handle, completer) = channel();
        drop(completer);
        assert!(matches!(handle.wait(), Err(ClientError::WorkerStopped)));
    }

    #[tokio::test]
    async fn test_await_and_async_timeout() {
        let (mut handle, completer) = channel();
        assert!(handle.timeout(Duration::from_millis(10)).await.unwrap_err().is_timeout());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            completer.complete(Ok(vec![QueryResult::Rollback]));
        });
        assert_eq!(handle.await.unwrap(), vec![QueryResult::Rollback]);
    }
}
