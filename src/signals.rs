use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::Mutex;

/// Transition of the derived "suspend is inhibited" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalHandlerId(u64);

type Handler = Arc<dyn Fn() + Send + Sync>;

/// Subscriber lists for the enable/disable notifications.
#[derive(Default)]
pub struct Signals {
    next_id: AtomicU64,
    enable: Mutex<Vec<(SignalHandlerId, Handler)>>,
    disable: Mutex<Vec<(SignalHandlerId, Handler)>>,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connect<F>(&self, event: StateEvent, f: F) -> SignalHandlerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SignalHandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers(event).lock().await.push((id, Arc::new(f)));
        id
    }

    pub async fn disconnect(&self, id: SignalHandlerId) -> bool {
        for event in [StateEvent::Enabled, StateEvent::Disabled] {
            let mut handlers = self.handlers(event).lock().await;
            if let Some(idx) = handlers.iter().position(|(h, _)| *h == id) {
                handlers.remove(idx);
                return true;
            }
        }
        false
    }

    pub async fn disconnect_all(&self) {
        self.enable.lock().await.clear();
        self.disable.lock().await.clear();
    }

    /// Handlers run after the list lock is released, so they may connect or
    /// disconnect freely.
    pub async fn emit(&self, event: StateEvent) {
        let handlers: Vec<Handler> = self
            .handlers(event)
            .lock()
            .await
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler();
        }
    }

    fn handlers(&self, event: StateEvent) -> &Mutex<Vec<(SignalHandlerId, Handler)>> {
        match event {
            StateEvent::Enabled => &self.enable,
            StateEvent::Disabled => &self.disable,
        }
    }
}
