use kanal::AsyncReceiver;
use tracing::{debug, info_span, trace, Instrument};

use crate::call::{apply_options, Call, CallOption};
use crate::context::Context;
use crate::error::ExecError;
use crate::result::CallResult;

/// Consumes the input stream sequentially on one background worker and
/// executes the decorated call per item.
///
/// Returns immediately with a stream carrying one [`CallResult`] per
/// consumed input, in consumption order. Plain call errors are emitted as
/// error results and processing continues; a must-stop escalation emits its
/// error result and terminates the worker at once, leaving the rest of the
/// input unread. The output stream is closed on worker exit, success or not.
///
/// Must be called from within a Tokio runtime.
pub fn run_from_channel<In, Out>(
  ctx: Context,
  input: AsyncReceiver<In>,
  call: Call<In, Out>,
  options: Vec<Box<dyn CallOption<In, Out>>>,
) -> AsyncReceiver<CallResult<Out>>
where
  In: Send + 'static,
  Out: Send + 'static,
{
  let call = apply_options(call, &options);
  // The output stream carries the input stream's buffering capacity, so
  // backpressure couples producer and consumer symmetrically.
  let (tx, rx) = kanal::bounded_async(input.capacity());

  tokio::spawn(
    async move {
      while let Ok(item) = input.recv().await {
        match call(ctx.clone(), item).await {
          Ok(value) => {
            if tx.send(CallResult::value(value)).await.is_err() {
              debug!("result receiver dropped, stream worker exiting");
              return;
            }
          }
          Err(cause) => {
            let must_stop = ExecError::is_must_stop(cause.as_ref());
            if tx
              .send(CallResult::failure(ExecError::BusinessLogic(cause)))
              .await
              .is_err()
            {
              debug!("result receiver dropped, stream worker exiting");
              return;
            }

            if must_stop {
              debug!("must-stop escalation received, stream worker halting");
              return;
            }
          }
        }
      }

      trace!("input stream exhausted, stream worker exiting");
    }
    .instrument(info_span!("relay_stream_worker")),
  );

  rx
}
