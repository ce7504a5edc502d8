use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::context::Context;
use crate::error::CallError;

/// The unit of work executed by the runners.
///
/// A `Call` receives a [`Context`] it is expected to observe cooperatively
/// and one input, and resolves to the output or an error. The closure is
/// shared (`Arc`) so a worker pool can execute it concurrently; any state a
/// decorator needs lives in the decorator, not in the call.
pub type Call<In, Out> =
  Arc<dyn Fn(Context, In) -> BoxFuture<'static, Result<Out, CallError>> + Send + Sync + 'static>;

/// Adapts an async closure into a [`Call`].
pub fn call_fn<In, Out, F, Fut>(f: F) -> Call<In, Out>
where
  F: Fn(Context, In) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Out, CallError>> + Send + 'static,
{
  Arc::new(move |ctx, input| f(ctx, input).boxed())
}

/// A decorator adding cross-cutting behavior around a [`Call`].
///
/// Options compose by wrapping: each one receives the call built so far and
/// returns the wrapped call.
pub trait CallOption<In, Out>: Send + Sync {
  fn wrap(&self, next: Call<In, Out>) -> Call<In, Out>;
}

/// Applies `options` left to right over `call`, so the **last** option
/// supplied becomes the outermost wrapper: first to see the input, last to
/// see the output or error. Reordering options changes observable behavior
/// (a timeout wrapped inside fail-fast scopes differently than outside it).
pub(crate) fn apply_options<In, Out>(
  call: Call<In, Out>,
  options: &[Box<dyn CallOption<In, Out>>],
) -> Call<In, Out> {
  options.iter().fold(call, |next, option| option.wrap(next))
}
