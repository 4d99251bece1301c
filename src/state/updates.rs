use std::future::Future;

use tokio::sync::watch;

use super::dt;

/// Change stamp for a room. Every state change moves it forward; long-poll
/// readers wait for it to pass the stamp they last saw.
pub struct LastUpdate {
    tx: watch::Sender<u64>,
}

impl Default for LastUpdate {
    fn default() -> Self {
        let (tx, _) = watch::channel(dt::Instant::now().as_u64());
        Self { tx }
    }
}

impl LastUpdate {
    /// Stamps are strictly increasing even when two changes land in the same
    /// millisecond.
    pub fn set_now(&self) {
        let now = dt::Instant::now().as_u64();
        self.tx.send_modify(|last| *last = now.max(*last + 1));
    }

    pub fn as_u64(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn wait_for(&self, since: u64) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            _ = rx.wait_for(|last| *last > since).await;
        }
    }
}
