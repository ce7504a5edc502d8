use futures_relay::{call_fn, run_from_channel, Call, Context};

use std::time::Duration;

use tracing::info;

fn parse_call() -> Call<String, i64> {
  call_fn(|_ctx: Context, input: String| async move {
    // Pretend the parse costs something.
    tokio::time::sleep(Duration::from_millis(50)).await;
    input.parse::<i64>().map_err(Into::into)
  })
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .init();

  info!("--- Basic Streaming Example ---");

  let (tx, input) = kanal::bounded_async(8);
  for item in ["1", "2", "three", "4", "5"] {
    tx.send(item.to_string()).await.expect("input channel closed");
  }
  drop(tx);

  let results = run_from_channel(Context::new(), input, parse_call(), Vec::new());

  while let Ok(result) = results.recv().await {
    match result.err() {
      None => info!("parsed: {}", result.ok().unwrap()),
      Some(err) => info!("failed: {}", err),
    }
  }

  info!("--- Basic Streaming Example End ---");
}
