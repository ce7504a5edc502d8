use std::error::Error as StdError;

use thiserror::Error;

/// The boxed error type produced by a [`Call`](crate::Call) body.
///
/// Anything a call returns travels through the runners as an opaque cause;
/// the runners only ever inspect it by walking the `source()` chain.
pub type CallError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors produced by the `futures_relay` runners and decorators.
#[derive(Error, Debug)]
pub enum ExecError {
  /// The universal envelope around any error the unit of work produced.
  /// Every error `CallResult` placed on a runner's output stream carries
  /// this variant at the top of its cause chain.
  #[error("business logic execution failed: {0}")]
  BusinessLogic(#[source] CallError),

  /// Escalation marker produced by [`FailFastOption`](crate::FailFastOption).
  /// Runners that find this in a cause chain halt further input consumption.
  #[error("the processing must be interrupted: {0}")]
  MustStop(#[source] CallError),

  /// The context was cancelled before or during the call.
  #[error("root context was canceled")]
  Canceled,

  /// The context's deadline passed before or during the call.
  #[error("root context's deadline passed")]
  DeadlineExceeded,

  /// Pre-flight validation failure of [`run_worker_pool`](crate::run_worker_pool):
  /// a pool without workers could never drain its input.
  #[error("worker pool size must be greater than zero")]
  ZeroPoolSize,
}

impl ExecError {
  /// Walks the cause chain of `err` looking for a [`ExecError::MustStop`]
  /// escalation, at any depth.
  ///
  /// The fail-fast decorator may sit anywhere in a decorator stack, so the
  /// escalation can be buried under other wrappers; runners use this probe
  /// rather than matching the outermost error alone.
  pub fn is_must_stop(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);

    while let Some(e) = current {
      if matches!(e.downcast_ref::<ExecError>(), Some(ExecError::MustStop(_))) {
        return true;
      }
      current = e.source();
    }

    false
  }
}
