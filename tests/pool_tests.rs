use futures_relay::{
  call_fn, run_worker_pool, Call, CallError, CallOption, CallResult, Context, ExecError,
  FailFastOption, TimeoutOption,
};

use std::time::Duration;

use kanal::AsyncReceiver;
use tokio::time::sleep;

fn setup_tracing_for_test() {
  use std::sync::Once;
  use tracing_subscriber::{fmt, EnvFilter};
  static TRACING_INIT: Once = Once::new();

  TRACING_INIT.call_once(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,futures_relay=trace"));

    fmt::Subscriber::builder()
      .with_env_filter(filter)
      .with_test_writer()
      .try_init()
      .ok();
  });
}

/// Cancellation-aware parse call; "boom" fails immediately instead of waiting
/// out the latency, so escalation tests are not timing-sensitive.
fn flaky_call(latency: Duration) -> Call<String, i64> {
  call_fn(move |ctx: Context, input: String| async move {
    if input == "boom" {
      return Err("boom".into());
    }

    tokio::select! {
      _ = ctx.cancelled() => {
        let done = ctx.check().expect_err("context reported done");
        Err(Box::new(done) as CallError)
      }
      _ = sleep(latency) => input.parse::<i64>().map_err(|e| Box::new(e) as CallError),
    }
  })
}

fn chain_has(err: &ExecError, pred: fn(&ExecError) -> bool) -> bool {
  let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);

  while let Some(e) = current {
    if let Some(exec) = e.downcast_ref::<ExecError>() {
      if pred(exec) {
        return true;
      }
    }
    current = e.source();
  }

  false
}

fn is_must_stop_link(e: &ExecError) -> bool {
  matches!(e, ExecError::MustStop(_))
}

async fn collect(rx: AsyncReceiver<CallResult<i64>>) -> Vec<CallResult<i64>> {
  let mut results = Vec::new();
  while let Ok(res) = rx.recv().await {
    results.push(res);
  }
  results
}

async fn numbered_channel(count: usize) -> AsyncReceiver<String> {
  let (tx, rx) = kanal::bounded_async(count.max(1));
  for i in 0..count {
    tx.send(i.to_string()).await.unwrap();
  }
  rx
}

#[tokio::test]
async fn pool_emits_one_result_per_input_without_drops_or_duplicates() {
  setup_tracing_for_test();

  for pool_size in [1usize, 3, 8] {
    let ctx = Context::new();
    let input = numbered_channel(20).await;

    let rx = run_worker_pool(ctx, input, flaky_call(Duration::from_millis(5)), pool_size, Vec::new())
      .unwrap();
    let results = collect(rx).await;

    assert_eq!(results.len(), 20, "pool_size {}", pool_size);
    let mut values: Vec<i64> = results.iter().map(|r| *r.ok().unwrap()).collect();
    values.sort_unstable();
    let expected: Vec<i64> = (0..20).collect();
    assert_eq!(values, expected, "pool_size {}", pool_size);
  }
}

#[tokio::test]
async fn pool_single_worker_preserves_consumption_order() {
  setup_tracing_for_test();
  let ctx = Context::new();
  let input = numbered_channel(10).await;

  let rx = run_worker_pool(ctx, input, flaky_call(Duration::from_millis(2)), 1, Vec::new()).unwrap();
  let results = collect(rx).await;

  let values: Vec<i64> = results.iter().map(|r| *r.ok().unwrap()).collect();
  let expected: Vec<i64> = (0..10).collect();
  assert_eq!(values, expected);
}

#[tokio::test]
async fn pool_continues_past_plain_business_errors() {
  setup_tracing_for_test();
  let ctx = Context::new();

  let (tx, input) = kanal::bounded_async(8);
  for item in ["0", "1", "2", "qwerty", "4"] {
    tx.send(item.to_string()).await.unwrap();
  }
  drop(tx);

  let rx = run_worker_pool(ctx, input, flaky_call(Duration::from_millis(5)), 3, Vec::new()).unwrap();
  let results = collect(rx).await;

  assert_eq!(results.len(), 5);

  let mut values: Vec<i64> = results.iter().filter_map(|r| r.ok().copied()).collect();
  values.sort_unstable();
  assert_eq!(values, vec![0, 1, 2, 4]);

  let failures: Vec<_> = results.iter().filter(|r| r.is_failure()).collect();
  assert_eq!(failures.len(), 1);
  assert!(!chain_has(failures[0].err().unwrap(), is_must_stop_link));
}

#[tokio::test]
async fn pool_must_stop_cancels_sibling_workers() {
  setup_tracing_for_test();
  let ctx = Context::new();

  let total = 20usize;
  let (tx, input) = kanal::bounded_async(total);
  tx.send("boom".to_string()).await.unwrap();
  for i in 1..total {
    tx.send(i.to_string()).await.unwrap();
  }
  drop(tx);
  let probe = input.clone();

  let pool_size = 3usize;
  let options: Vec<Box<dyn CallOption<String, i64>>> = vec![Box::new(FailFastOption::new(1))];

  let rx = run_worker_pool(ctx, input, flaky_call(Duration::from_millis(200)), pool_size, options)
    .unwrap();
  let results = collect(rx).await;

  // Every worker stops after its first escalation: the one that drew "boom"
  // immediately, the siblings once the shared context cancellation fails
  // their in-flight call.
  assert_eq!(results.len(), pool_size);
  for res in &results {
    assert!(chain_has(res.err().expect("all results must be failures"), is_must_stop_link));
  }
  assert_eq!(probe.len(), total - pool_size, "remaining inputs must stay unconsumed");
}

#[tokio::test]
async fn pool_rejects_zero_pool_size_before_spawning_anything() {
  setup_tracing_for_test();
  let ctx = Context::new();
  let input = numbered_channel(3).await;
  let probe = input.clone();

  let err = run_worker_pool(ctx, input, flaky_call(Duration::from_millis(5)), 0, Vec::new())
    .err()
    .expect("zero workers must be rejected");

  assert!(matches!(err, ExecError::ZeroPoolSize));
  sleep(Duration::from_millis(20)).await;
  assert_eq!(probe.len(), 3, "no execution may start on validation failure");
}

#[tokio::test]
async fn pool_applies_decorators_to_every_worker() {
  setup_tracing_for_test();
  let ctx = Context::new();
  let input = numbered_channel(6).await;
  let options: Vec<Box<dyn CallOption<String, i64>>> =
    vec![Box::new(TimeoutOption::new(Duration::from_secs(10)))];

  let rx = run_worker_pool(ctx, input, flaky_call(Duration::from_millis(5)), 2, options).unwrap();
  let results = collect(rx).await;

  assert_eq!(results.len(), 6);
  assert!(results.iter().all(CallResult::is_value));
}

#[tokio::test]
async fn pool_parent_cancellation_reaches_the_workers() {
  setup_tracing_for_test();
  let ctx = Context::new();
  let input = numbered_channel(4).await;

  let rx = run_worker_pool(ctx.clone(), input, flaky_call(Duration::from_secs(5)), 2, Vec::new())
    .unwrap();

  sleep(Duration::from_millis(30)).await;
  ctx.cancel();

  let results = collect(rx).await;
  assert!(!results.is_empty());
  assert!(results.iter().all(CallResult::is_failure));
}
