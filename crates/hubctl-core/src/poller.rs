// ── Poller ──
//
// Generic repeating fetch. Fires once immediately, then every `period`.
// Each tick's fetch runs as its own task so a stalled request never
// delays the next tick; results go to the owner task as `Update`s.
// Failures are logged and dropped: the owner keeps the previous value.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::engine::{Message, Update};

/// Spawn a poller task. Cancelling `cancel` stops the schedule and
/// aborts any fetch still in flight.
pub(crate) fn spawn<T, F, Fut>(
    name: &'static str,
    period: Duration,
    fetch: F,
    into_update: fn(T) -> Update,
    tx: mpsc::Sender<Message>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, hubctl_api::Error>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                _ = interval.tick() => {
                    debug!(poller = name, "tick");
                    let fut = fetch();
                    let tx = tx.clone();
                    in_flight.spawn(async move {
                        match fut.await {
                            Ok(value) => {
                                let _ = tx.send(Message::Update(into_update(value))).await;
                            }
                            Err(e) => {
                                debug!(poller = name, error = %e, "poll failed");
                            }
                        }
                    });
                }
            }
        }

        in_flight.shutdown().await;
        debug!(poller = name, "stopped");
    })
}
