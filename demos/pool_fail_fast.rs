use futures_relay::{
  call_fn, run_worker_pool, Call, CallError, CallOption, Context, ExecError, FailFastOption,
  TimeoutOption,
};

use std::time::Duration;

use tracing::info;

/// A cancellation-aware worker body: waits out a pretend latency unless the
/// shared pool context is cancelled first.
fn parse_call() -> Call<String, i64> {
  call_fn(|ctx: Context, input: String| async move {
    tokio::select! {
      _ = ctx.cancelled() => Err(Box::new(ctx.check().unwrap_err()) as CallError),
      _ = tokio::time::sleep(Duration::from_millis(200)) => {
        input.parse::<i64>().map_err(Into::into)
      }
    }
  })
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .init();

  info!("--- Worker Pool Fail-Fast Example ---");

  let (tx, input) = kanal::bounded_async(16);
  for i in 0..12 {
    let item = if i == 2 { "oops".to_string() } else { i.to_string() };
    tx.send(item).await.expect("input channel closed");
  }
  drop(tx);

  let options: Vec<Box<dyn CallOption<String, i64>>> = vec![
    Box::new(TimeoutOption::new(Duration::from_secs(2))),
    Box::new(FailFastOption::new(1)),
  ];

  let results = run_worker_pool(Context::new(), input, parse_call(), 4, options)
    .expect("pool size is non-zero");

  let mut delivered = 0usize;
  while let Ok(result) = results.recv().await {
    delivered += 1;
    match result.err() {
      None => info!("parsed: {}", result.ok().unwrap()),
      Some(err) if ExecError::is_must_stop(err) => info!("escalated: {}", err),
      Some(err) => info!("failed: {}", err),
    }
  }

  info!(
    "merged stream closed after {} results; the rest of the input was abandoned",
    delivered
  );
  info!("--- Worker Pool Fail-Fast Example End ---");
}
