use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::trace;

use crate::error::ExecError;

/// A cancellable execution context with an optional deadline.
///
/// Thin wrapper over a [`CancellationToken`] that additionally remembers the
/// earliest deadline imposed on it, so [`Context::check`] can tell a time
/// budget expiry apart from an explicit cancellation. Cloning is cheap and
/// every clone observes the same cancellation state.
///
/// Cancellation is cooperative: a [`Call`](crate::Call) body is expected to
/// poll [`Context::check`] or select on [`Context::cancelled`]; nothing is
/// aborted externally.
#[derive(Debug, Clone)]
pub struct Context {
  token: CancellationToken,
  deadline: Option<Instant>,
  // Set by the deadline timer right before it cancels the token, so check()
  // reports the actual cause: a cancel that beats the deadline stays a
  // cancel forever.
  expired: Arc<AtomicBool>,
}

impl Context {
  /// Creates a root context that is never cancelled until asked to.
  pub fn new() -> Self {
    Self {
      token: CancellationToken::new(),
      deadline: None,
      expired: Arc::new(AtomicBool::new(false)),
    }
  }

  /// Derives a child context that can be cancelled independently of `self`
  /// but still observes the parent's cancellation and inherits its expiry.
  pub fn child(&self) -> Self {
    Self {
      token: self.token.child_token(),
      deadline: self.deadline,
      expired: self.expired.clone(),
    }
  }

  /// Derives a child context whose time budget is `timeout` from now, capped
  /// by any deadline already inherited from the parent.
  ///
  /// A timer task cancels the derived context once the deadline passes; the
  /// timer winds down on its own as soon as the context is cancelled or
  /// released, whichever comes first.
  ///
  /// Must be called from within a Tokio runtime.
  pub fn with_timeout(&self, timeout: Duration) -> Self {
    let requested = Instant::now() + timeout;
    let deadline = match self.deadline {
      Some(inherited) => inherited.min(requested),
      None => requested,
    };

    let child = Self {
      token: self.token.child_token(),
      deadline: Some(deadline),
      expired: Arc::new(AtomicBool::new(false)),
    };

    let token = child.token.clone();
    let expired = child.expired.clone();
    tokio::spawn(async move {
      tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep_until(deadline) => {
          trace!("context deadline passed, cancelling");
          expired.store(true, Ordering::SeqCst);
          token.cancel();
        }
      }
    });

    child
  }

  /// Cancels this context and every context derived from it.
  pub fn cancel(&self) {
    self.token.cancel();
  }

  pub fn is_cancelled(&self) -> bool {
    self.token.is_cancelled()
  }

  /// Completes once the context is cancelled or its deadline passes.
  pub async fn cancelled(&self) {
    self.token.cancelled().await;
  }

  /// Non-blocking probe of the context's done state.
  ///
  /// Returns `Ok(())` while the context is live. Once it is done, returns
  /// [`ExecError::DeadlineExceeded`] when the cause was a time budget
  /// expiry, otherwise [`ExecError::Canceled`]. The first cause sticks: an
  /// explicit cancel stays a cancel even after the deadline later passes.
  pub fn check(&self) -> Result<(), ExecError> {
    if !self.token.is_cancelled() {
      return Ok(());
    }

    if self.expired.load(Ordering::SeqCst) {
      return Err(ExecError::DeadlineExceeded);
    }

    Err(ExecError::Canceled)
  }

  /// Guard that cancels this context when dropped, releasing its timer and
  /// unblocking anything still waiting on it.
  pub(crate) fn release_guard(&self) -> DropGuard {
    self.token.clone().drop_guard()
  }
}

impl Default for Context {
  fn default() -> Self {
    Self::new()
  }
}
