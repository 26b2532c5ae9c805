use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{AbortHandle, Abortable, Either, LocalBoxFuture, select};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tracing::{info, warn};

use super::{Feed, refresh_feed};
use crate::api::{HttpTransport, PlantApi};
use crate::error::ClientResult;

/// Timer source for the poll loop.
#[async_trait(?Send)]
pub trait Clock {
    async fn sleep(&self, duration: Duration);
}

/// Owns a running poll task. Dropping the handle cancels the task.
pub struct PollHandle {
    abort: AbortHandle,
    cancelled: Arc<AtomicBool>,
}

impl PollHandle {
    /// Stops polling. Returns `true` only for the call that actually cancelled.
    ///
    /// Once cancelled no further tick fires and no in-flight response is
    /// applied to the feed.
    pub fn cancel(&self) -> bool {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.abort.abort();
        info!("feed polling stopped");
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Fixed-rate feed refresher: fetch now, then once per `period`.
///
/// A tick does not wait for earlier fetches; overlapping responses are
/// ordered by [`Feed::apply`].
pub struct FeedPoller<T, C> {
    api: PlantApi<T>,
    feed: Feed,
    clock: C,
    period: Duration,
}

impl<T, C> FeedPoller<T, C>
where
    T: HttpTransport + 'static,
    C: Clock + 'static,
{
    pub fn new(api: PlantApi<T>, feed: Feed, clock: C, period: Duration) -> Self {
        Self {
            api,
            feed,
            clock,
            period,
        }
    }

    /// Returns the cancel handle and the task to hand to the executor.
    pub fn start(self) -> (PollHandle, impl Future<Output = ()>) {
        let (abort, registration) = AbortHandle::new_pair();
        let task = Abortable::new(self.run(), registration).map(|_| ());
        let handle = PollHandle {
            abort,
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        (handle, task)
    }

    fn cycle(&self) -> LocalBoxFuture<'static, ClientResult<bool>> {
        let api = self.api.clone();
        let feed = self.feed.clone();
        async move { refresh_feed(&api, &feed).await }.boxed_local()
    }

    async fn run(self) {
        info!(period_ms = self.period.as_millis() as u64, "feed polling started");

        let mut in_flight = FuturesUnordered::new();
        in_flight.push(self.cycle());
        let mut tick = self.clock.sleep(self.period);

        loop {
            if in_flight.is_empty() {
                tick.await;
                in_flight.push(self.cycle());
                tick = self.clock.sleep(self.period);
                continue;
            }

            let finished = match select(tick.as_mut(), in_flight.next()).await {
                Either::Left(_) => None,
                Either::Right((finished, _)) => Some(finished),
            };

            match finished {
                None => {
                    in_flight.push(self.cycle());
                    tick = self.clock.sleep(self.period);
                }
                Some(Some(Err(e))) => warn!(error = %e, "feed refresh failed"),
                Some(_) => {}
            }
        }
    }
}
