use kanal::AsyncReceiver;
use tracing::{debug, info_span, Instrument};

use crate::call::{apply_options, Call, CallOption};
use crate::context::Context;
use crate::error::ExecError;
use crate::result::CallResult;

/// Executes the decorated call once, in a background task, with the given
/// input.
///
/// Returns immediately with a one-slot stream that yields exactly one
/// [`CallResult`] and then closes. Call errors are always wrapped in
/// [`ExecError::BusinessLogic`], even must-stop escalations: a single shot
/// has nothing further to stop.
///
/// Must be called from within a Tokio runtime.
pub fn run_from_input<In, Out>(
  ctx: Context,
  input: In,
  call: Call<In, Out>,
  options: Vec<Box<dyn CallOption<In, Out>>>,
) -> AsyncReceiver<CallResult<Out>>
where
  In: Send + 'static,
  Out: Send + 'static,
{
  let call = apply_options(call, &options);
  let (tx, rx) = kanal::bounded_async(1);

  tokio::spawn(
    async move {
      let result = match call(ctx, input).await {
        Ok(value) => CallResult::value(value),
        Err(cause) => CallResult::failure(ExecError::BusinessLogic(cause)),
      };

      if tx.send(result).await.is_err() {
        debug!("result receiver dropped before the single-shot result was delivered");
      }
    }
    .instrument(info_span!("relay_single_shot")),
  );

  rx
}
