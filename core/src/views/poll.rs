// core/src/views/poll.rs

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, Instrument};

/// Owns a view's refresh timer. Dropping the guard stops the timer.
#[derive(Debug)]
pub struct PollGuard {
  handle: JoinHandle<()>,
}

impl PollGuard {
  pub fn is_running(&self) -> bool {
    !self.handle.is_finished()
  }
}

impl Drop for PollGuard {
  fn drop(&mut self) {
    self.handle.abort();
  }
}

/// Runs `tick` every `period`, first firing one period from now (the view
/// already fetched when it mounted). Must be called inside a tokio runtime.
///
/// Ticks never overlap: a slow fetch delays the next tick instead of
/// stacking requests.
pub fn spawn_polling<F, Fut>(view: &'static str, period: Duration, mut tick: F) -> PollGuard
where
  F: FnMut() -> Fut + Send + 'static,
  Fut: Future<Output = ()> + Send + 'static,
{
  let span = tracing::debug_span!("view_poll", view, period_ms = period.as_millis() as u64);
  let handle = tokio::spawn(
    async move {
      let mut ticker = interval_at(Instant::now() + period, period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        ticker.tick().await;
        debug!("Polling tick.");
        tick().await;
      }
    }
    .instrument(span),
  );
  PollGuard { handle }
}
