use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::SwitchError;

#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

/// Bounds blocking steps of a run by a shared deadline and an external
/// cancellation signal (Ctrl-C in the CLI).
#[derive(Debug, Clone)]
pub struct OperationGuard {
    cancel: CancellationToken,
    deadline: Option<Deadline>,
}

impl OperationGuard {
    /// The deadline starts counting now.
    #[must_use]
    pub fn new(cancel: CancellationToken, budget: Option<Duration>) -> Self {
        Self {
            cancel,
            deadline: budget.map(|budget| Deadline {
                at: Instant::now() + budget,
                budget,
            }),
        }
    }

    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(CancellationToken::new(), None)
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run `future` until it finishes, the deadline passes, or the run is
    /// cancelled. The future is dropped in the latter two cases.
    ///
    /// # Errors
    /// Returns the future's own error, [`SwitchError::TimedOut`], or
    /// [`SwitchError::Interrupted`].
    pub async fn run<T, F>(&self, operation: &'static str, future: F) -> Result<T, SwitchError>
    where
        F: Future<Output = Result<T, SwitchError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(SwitchError::Interrupted { operation });
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline.at, future).await {
                    Ok(result) => result,
                    Err(_) => Err(SwitchError::TimedOut {
                        operation,
                        seconds: deadline.budget.as_secs(),
                    }),
                },
                None => future.await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!("{operation} cancelled");
                Err(SwitchError::Interrupted { operation })
            }
            result = bounded => result,
        }
    }
}

impl OperationGuard {
    /// Like [`OperationGuard::run`], for steps that hand work to other
    /// threads. The step gets its own token; on cancellation or deadline the
    /// token fires and the step is awaited until it returns, so nothing it
    /// started outlives this call.
    ///
    /// # Errors
    /// Returns the step's own error, [`SwitchError::TimedOut`], or
    /// [`SwitchError::Interrupted`].
    pub async fn run_cooperative<T, S, F>(
        &self,
        operation: &'static str,
        start: S,
    ) -> Result<T, SwitchError>
    where
        S: FnOnce(CancellationToken) -> F,
        F: Future<Output = Result<T, SwitchError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(SwitchError::Interrupted { operation });
        }

        let step_token = self.cancel.child_token();
        let step = start(step_token.clone());
        tokio::pin!(step);

        let expired = async {
            match self.deadline {
                Some(deadline) => {
                    tokio::time::sleep_until(deadline.at).await;
                    SwitchError::TimedOut {
                        operation,
                        seconds: deadline.budget.as_secs(),
                    }
                }
                None => std::future::pending().await,
            }
        };

        let stopped = tokio::select! {
            biased;
            () = self.cancel.cancelled() => SwitchError::Interrupted { operation },
            error = expired => error,
            result = &mut step => return result,
        };

        debug!("{operation} stopping: {stopped}");
        step_token.cancel();
        if let Err(error) = step.await {
            debug!("{operation} wound down with: {error}");
        }
        Err(stopped)
    }
}
