//! services/app/src/stores/pipeline.rs
//!
//! The generic sequential-stage controller shared by the notes, quiz and
//! flashcard flows. Each pipeline instance owns one payload, one busy flag
//! and one error slot; a stage invocation is precondition check, gateway
//! call, apply. At most one gateway call is ever outstanding per instance.

use std::future::Future;
use std::sync::Arc;

use polaris_core::ports::{GatewayError, Notifier};
use tokio::sync::Mutex;

use crate::error::AppError;

/// The user-facing notification texts for one stage.
pub struct Stage {
    /// Announced when the gateway call is issued.
    pub working: &'static str,
    /// Announced when the call resolves successfully.
    pub done: &'static str,
    /// Announced (and stored in the error slot) when the call fails.
    pub failed: &'static str,
}

struct StageState<P> {
    busy: bool,
    error: Option<String>,
    payload: P,
}

/// One running pipeline instance, generic over its payload.
///
/// The lock is never held across a gateway await: `run_stage` captures the
/// call arguments under the lock, releases it for the call, and re-acquires
/// it to apply the result.
pub struct Pipeline<P> {
    notifier: Arc<dyn Notifier>,
    inner: Mutex<StageState<P>>,
}

impl<P> Pipeline<P> {
    pub fn new(notifier: Arc<dyn Notifier>, payload: P) -> Self {
        Self {
            notifier,
            inner: Mutex::new(StageState {
                busy: false,
                error: None,
                payload,
            }),
        }
    }

    pub async fn is_busy(&self) -> bool {
        self.inner.lock().await.busy
    }

    pub async fn last_error(&self) -> Option<String> {
        self.inner.lock().await.error.clone()
    }

    /// Read access to the payload.
    pub async fn read<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.inner.lock().await.payload)
    }

    /// Applies a purely local mutation (no gateway call, no busy flag).
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut self.inner.lock().await.payload)
    }

    /// Applies a local mutation only while no gateway call is outstanding.
    /// While busy the instance must not be re-entered, so the mutation is
    /// dropped and `false` is returned; otherwise the payload would change
    /// under the in-flight call and its `apply` would stamp output derived
    /// from the old payload onto the new one.
    pub async fn mutate_idle(&self, f: impl FnOnce(&mut P)) -> bool {
        let mut state = self.inner.lock().await;
        if state.busy {
            return false;
        }
        f(&mut state.payload);
        true
    }

    /// Runs one stage of the pipeline.
    ///
    /// `prepare` checks the stage precondition against the payload and
    /// extracts the owned arguments for the gateway call; it is also the
    /// place where re-invoking an earlier stage resets downstream-derived
    /// fields, so stale output is gone before the call resolves. A failed
    /// precondition performs no gateway call.
    ///
    /// While a call is outstanding the instance is busy and any further
    /// invocation is a no-op. On failure the error slot receives the
    /// stage's message and earlier-stage payload is left untouched.
    pub async fn run_stage<A, T, Fut>(
        &self,
        stage: &Stage,
        prepare: impl FnOnce(&mut P) -> Result<A, AppError>,
        call: impl FnOnce(A) -> Fut,
        apply: impl FnOnce(&mut P, T),
    ) -> Result<(), AppError>
    where
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let args = {
            let mut state = self.inner.lock().await;
            if state.busy {
                return Ok(());
            }
            match prepare(&mut state.payload) {
                Ok(args) => {
                    state.busy = true;
                    state.error = None;
                    args
                }
                Err(e) => {
                    self.notifier.error(&user_message(&e));
                    return Err(e);
                }
            }
        };

        self.notifier.success(stage.working);
        let result = call(args).await;

        let mut state = self.inner.lock().await;
        state.busy = false;
        match result {
            Ok(value) => {
                apply(&mut state.payload, value);
                drop(state);
                self.notifier.success(stage.done);
                Ok(())
            }
            Err(e) => {
                state.error = Some(stage.failed.to_string());
                drop(state);
                self.notifier.error(stage.failed);
                Err(AppError::Gateway(e))
            }
        }
    }
}

/// The notification text for a rejected invocation. Precondition and
/// validation failures carry their own user-facing message.
fn user_message(error: &AppError) -> String {
    match error {
        AppError::Precondition(msg) | AppError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}
