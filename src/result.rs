use std::fmt;

use crate::error::ExecError;

/// The outcome of exactly one [`Call`](crate::Call) invocation.
///
/// Holds either the produced value or the failure, never both. Runners build
/// one `CallResult` per processed input and place it on the output stream
/// exactly once; the type itself is an immutable data holder.
#[derive(Debug)]
pub enum CallResult<Out> {
  /// The call completed and produced a value.
  Value(Out),
  /// The call failed; the error always carries the
  /// [`ExecError::BusinessLogic`] envelope when produced by a runner.
  Failed(ExecError),
}

impl<Out> CallResult<Out> {
  /// Creates a success result holding `value`.
  pub fn value(value: Out) -> Self {
    CallResult::Value(value)
  }

  /// Creates a failure result holding `err`.
  pub fn failure(err: ExecError) -> Self {
    CallResult::Failed(err)
  }

  /// Returns the produced value, if any. Check [`err`](Self::err) first when
  /// the distinction matters.
  pub fn ok(&self) -> Option<&Out> {
    match self {
      CallResult::Value(v) => Some(v),
      CallResult::Failed(_) => None,
    }
  }

  /// Returns the execution error, if any.
  pub fn err(&self) -> Option<&ExecError> {
    match self {
      CallResult::Value(_) => None,
      CallResult::Failed(e) => Some(e),
    }
  }

  pub fn is_value(&self) -> bool {
    matches!(self, CallResult::Value(_))
  }

  pub fn is_failure(&self) -> bool {
    matches!(self, CallResult::Failed(_))
  }

  /// Unwraps into a plain `Result`, consuming the container.
  pub fn into_result(self) -> Result<Out, ExecError> {
    match self {
      CallResult::Value(v) => Ok(v),
      CallResult::Failed(e) => Err(e),
    }
  }
}

impl<Out: fmt::Debug> fmt::Display for CallResult<Out> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CallResult::Value(v) => write!(f, "value: {:?}, err: none", v),
      CallResult::Failed(e) => write!(f, "value: none, err: {}", e),
    }
  }
}
