use kanal::{AsyncReceiver, AsyncSender};
use tracing::trace;

/// Allocates `size` independent conduits of the given buffer capacity.
///
/// Fan-out building block: each worker of a pool gets one conduit pair as its
/// exclusive output path. A capacity of zero yields rendezvous conduits.
pub fn spawn_pool<T>(size: usize, buffer: usize) -> Vec<(AsyncSender<T>, AsyncReceiver<T>)> {
  (0..size).map(|_| kanal::bounded_async(buffer)).collect()
}

/// Merges a pool of conduits into a single one (fan-in).
///
/// One forwarding task per source drains it into the shared merged conduit.
/// The merged conduit closes only once every source has been drained and
/// closed: each forwarder owns a clone of the merged sender, and the channel
/// closes when the last clone is dropped. The payload type is never
/// interpreted.
pub fn merge_pool<T: Send + 'static>(pool: Vec<AsyncReceiver<T>>) -> AsyncReceiver<T> {
  let (merged_tx, merged_rx) = kanal::bounded_async(pool.len().max(1));

  for source in pool {
    let tx = merged_tx.clone();
    tokio::spawn(async move {
      while let Ok(value) = source.recv().await {
        if tx.send(value).await.is_err() {
          trace!("merged conduit dropped by consumer, forwarder exiting");
          break;
        }
      }
    });
  }

  merged_rx
}

/// Merges a pool of conduits, releasing each value only when its paired
/// signal conduit yields a token first.
///
/// Pair `i` transfers a value out of its source only after one receive on its
/// signal conduit, letting an external scheduler gate when a given slot's
/// output may surface. A closed signal conduit stops gating its pair.
///
/// Returns the merged conduit and a done conduit that fires exactly once
/// after all pairs have been drained and the merged conduit has closed, for
/// callers that need the aggregation boundary without reading the merged
/// side's close state.
pub fn merge_signal_pool<T: Send + 'static>(
  pairs: Vec<(AsyncReceiver<T>, AsyncReceiver<()>)>,
) -> (AsyncReceiver<T>, AsyncReceiver<()>) {
  let (merged_tx, merged_rx) = kanal::bounded_async(pairs.len().max(1));
  let (done_tx, done_rx) = kanal::bounded_async(1);

  let mut forwarders = Vec::with_capacity(pairs.len());
  for (source, signal) in pairs {
    let tx = merged_tx.clone();
    forwarders.push(tokio::spawn(async move {
      while let Ok(value) = source.recv().await {
        let _ = signal.recv().await;
        if tx.send(value).await.is_err() {
          break;
        }
      }
    }));
  }

  tokio::spawn(async move {
    futures::future::join_all(forwarders).await;
    // Close the merged conduit before signalling completion.
    drop(merged_tx);
    let _ = done_tx.send(()).await;
  });

  (merged_rx, done_rx)
}

/// Best-effort send: pushes `value` if the conduit has room, otherwise drops
/// it and reports `false`. Never blocks; a closed conduit also reports
/// `false`.
pub fn try_send<T>(tx: &AsyncSender<T>, value: T) -> bool {
  tx.try_send(value).unwrap_or(false)
}

/// Best-effort signal probe: consumes one token if immediately available.
/// Never blocks.
pub fn try_recv_signal(rx: &AsyncReceiver<()>) -> bool {
  matches!(rx.try_recv(), Ok(Some(())))
}
