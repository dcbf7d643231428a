use log::debug;
use tokio::{
    sync::oneshot,
    time::{sleep, Duration},
};

/// A one-shot task that runs after `wait` unless cancelled first.
///
/// Dropping the handle cancels the task as well, since the cancel channel
/// closes with it.
pub struct Delayed {
    cancel_tx: Option<oneshot::Sender<()>>,
    #[cfg(test)]
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Delayed {
    pub fn new<F, Fut, R>(wait: Duration, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = R> + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            tokio::select! {
               _ = sleep(wait) => {
                   f().await;
               }
               _ = cancel_rx => {
                   debug!("delayed task cancelled before running");
               }
            }
        });
        #[cfg(not(test))]
        drop(handle);
        Self {
            cancel_tx: Some(cancel_tx),
            #[cfg(test)]
            handle: Some(handle),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(canceller) = self.cancel_tx.take() {
            // Err means the task already finished.
            let _ = canceller.send(());
        }
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    #[cfg(test)]
    async fn wait(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.await.expect("delayed task panicked");
        }
    }
}
