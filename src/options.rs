use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use crate::call::{Call, CallOption};
use crate::error::{CallError, ExecError};

/// Bounds every invocation of the wrapped call by a fixed time budget.
///
/// Each invocation runs under a context derived at invocation time with
/// [`Context::with_timeout`](crate::Context::with_timeout); the derived
/// context is released on every exit path once the inner call returns. The
/// wrapper never aborts the inner call and never alters its error: a call
/// that ignores its context simply runs to completion.
pub struct TimeoutOption {
  timeout: Duration,
}

impl TimeoutOption {
  pub fn new(timeout: Duration) -> Self {
    Self { timeout }
  }
}

impl<In, Out> CallOption<In, Out> for TimeoutOption
where
  In: Send + 'static,
  Out: Send + 'static,
{
  fn wrap(&self, next: Call<In, Out>) -> Call<In, Out> {
    let timeout = self.timeout;

    Arc::new(move |ctx, input: In| {
      let next = next.clone();
      async move {
        let bounded = ctx.with_timeout(timeout);
        let _release = bounded.release_guard();

        next(bounded.clone(), input).await
      }
      .boxed()
    })
  }
}

/// Escalates any error from the wrapped call into a must-stop signal.
///
/// On failure the cause is rewrapped in [`ExecError::MustStop`], instructing
/// the enclosing runner to halt further input consumption. Successes pass
/// through untouched.
pub struct FailFastOption {
  mistakes_limit: usize,
}

impl FailFastOption {
  pub fn new(mistakes_limit: usize) -> Self {
    Self { mistakes_limit }
  }

  /// The configured mistakes budget.
  ///
  /// Accepted for forward compatibility but not yet consulted: escalation
  /// currently happens on the first error regardless of the limit.
  pub fn mistakes_limit(&self) -> usize {
    self.mistakes_limit
  }
}

impl<In, Out> CallOption<In, Out> for FailFastOption
where
  In: Send + 'static,
  Out: Send + 'static,
{
  fn wrap(&self, next: Call<In, Out>) -> Call<In, Out> {
    Arc::new(move |ctx, input: In| {
      let next = next.clone();
      async move {
        match next(ctx, input).await {
          Ok(out) => Ok(out),
          Err(cause) => Err(Box::new(ExecError::MustStop(cause)) as CallError),
        }
      }
      .boxed()
    })
  }
}
