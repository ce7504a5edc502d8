use kanal::AsyncReceiver;
use tracing::{debug, info_span, trace, warn, Instrument};

use crate::call::{apply_options, Call, CallOption};
use crate::context::Context;
use crate::error::ExecError;
use crate::fanin::{merge_pool, spawn_pool};
use crate::result::CallResult;

/// Fans the input stream out across `pool_size` independent workers and fans
/// their outputs back into one merged stream.
///
/// All workers drain the same shared input on a first-available basis, so no
/// result ordering is guaranteed across workers; a single worker emits its
/// own results in consumption order. The workers share one child [`Context`]
/// derived from `ctx`: a worker hitting a must-stop escalation emits the
/// error result, cancels that shared context so sibling calls unblock, and
/// exits without draining further input. The merged stream closes only after
/// every worker's conduit has closed.
///
/// Fails with [`ExecError::ZeroPoolSize`] before any task is spawned when
/// `pool_size` is zero. Must be called from within a Tokio runtime.
pub fn run_worker_pool<In, Out>(
  ctx: Context,
  input: AsyncReceiver<In>,
  call: Call<In, Out>,
  pool_size: usize,
  options: Vec<Box<dyn CallOption<In, Out>>>,
) -> Result<AsyncReceiver<CallResult<Out>>, ExecError>
where
  In: Send + 'static,
  Out: Send + 'static,
{
  if pool_size == 0 {
    return Err(ExecError::ZeroPoolSize);
  }

  let call = apply_options(call, &options);
  let shared_ctx = ctx.child();

  // Rendezvous conduits: a worker hands each result straight to its
  // forwarder, backpressure flows all the way to the input.
  let conduits = spawn_pool::<CallResult<Out>>(pool_size, 0);
  let mut worker_outputs = Vec::with_capacity(pool_size);

  for (worker_id, (tx, output)) in conduits.into_iter().enumerate() {
    worker_outputs.push(output);

    let input = input.clone();
    let call = call.clone();
    let worker_ctx = shared_ctx.clone();

    tokio::spawn(
      async move {
        debug!("pool worker started");

        while let Ok(item) = input.recv().await {
          match call(worker_ctx.clone(), item).await {
            Ok(value) => {
              if tx.send(CallResult::value(value)).await.is_err() {
                debug!("merged stream dropped, pool worker exiting");
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
                debug!("merged stream dropped, pool worker exiting");
                return;
              }

              if must_stop {
                warn!("must-stop escalation received, cancelling sibling workers");
                worker_ctx.cancel();
                return;
              }
            }
          }
        }

        trace!("input stream exhausted, pool worker exiting");
      }
      .instrument(info_span!("relay_pool_worker", worker_id)),
    );
  }

  Ok(merge_pool(worker_outputs))
}
