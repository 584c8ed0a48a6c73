//! Heartbeat (component F): a single periodic timer broadcasting a liveness
//! `info` envelope to every connected session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::registry::Broker;

/// Spawn the heartbeat task. Ticks every `interval`, broadcasting `{msg:
/// "ping"}` to every live connection. A `tokio::time::interval` never
/// queues up missed ticks — at most one tick is ever in flight, which is
/// exactly the semantics `MissedTickBehavior::Delay` gives when a tick is
/// late. The task exits as soon as `shutdown` fires, and never ticks again
/// after that.
pub fn spawn(broker: Arc<Broker>, interval: Duration, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so the first heartbeat
        // lands one full interval after startup, not at t=0.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    broker.broadcast_heartbeat();
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::debug!("heartbeat task stopping");
                        break;
                    }
                }
            }
        }
    })
}
