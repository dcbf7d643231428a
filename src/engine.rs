use std::sync::Arc;

use futures::future::join_all;
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::{
    cause::CauseId,
    pending::{PendingRequest, PendingTracker},
    registry::{Cookie, ObjectRef, Registry},
    session::SessionBus,
    signals::{SignalHandlerId, Signals, StateEvent},
};

struct State {
    registry: Registry,
    pending: PendingTracker,
    active: bool,
    checked: bool,
    torn_down: bool,
}

impl State {
    /// Records `object` if `app_id` confirms the pending request.
    fn confirm(&mut self, app_id: &str, object: &ObjectRef) -> Option<StateEvent> {
        if !self.pending.matches(app_id) {
            return None;
        }
        let PendingRequest { cause, cookie } = self.pending.take()?;
        if !self.registry.add(cause.clone(), cookie, object.clone()) {
            warn!(
                "{} already recorded, dropping confirmation for {cause}",
                object.as_str()
            );
            return None;
        }
        debug!("{cause} confirmed as {} (cookie {cookie})", object.as_str());
        if self.active {
            return None;
        }
        self.active = true;
        self.checked = true;
        Some(StateEvent::Enabled)
    }

    fn forget(&mut self, object: &ObjectRef) -> Option<StateEvent> {
        if !self.registry.remove(object) {
            return None;
        }
        debug!("{} removed", object.as_str());
        if !self.registry.is_empty() || !self.active {
            return None;
        }
        self.active = false;
        self.checked = false;
        Some(StateEvent::Disabled)
    }
}

/// Point-in-time view of the engine, used by the control surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub active: bool,
    pub checked: bool,
    pub records: usize,
    pub pending: Option<CauseId>,
}

/// Keeps the set of inhibitors we own in line with what the session manager
/// reports, and derives the single on/off state from it.
///
/// The registry only ever reflects bus-confirmed inhibitors: requests go out
/// through [`SessionBus`], and records appear or disappear only when the
/// matching `InhibitorAdded` / `InhibitorRemoved` signal is handled.
#[derive(Clone)]
pub struct Engine {
    bus: Arc<dyn SessionBus>,
    state: Arc<Mutex<State>>,
    signals: Arc<Signals>,
}

impl Engine {
    pub fn new(bus: Arc<dyn SessionBus>) -> Self {
        Self {
            bus,
            state: Arc::new(Mutex::new(State {
                registry: Registry::new(),
                pending: PendingTracker::new(),
                active: false,
                checked: false,
                torn_down: false,
            })),
            signals: Arc::new(Signals::new()),
        }
    }

    pub async fn connect_enable<F>(&self, f: F) -> SignalHandlerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.signals.connect(StateEvent::Enabled, f).await
    }

    pub async fn connect_disable<F>(&self, f: F) -> SignalHandlerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.signals.connect(StateEvent::Disabled, f).await
    }

    // The daemon keeps its handlers until shutdown; embedders detach with this.
    #[allow(dead_code)]
    pub async fn disconnect(&self, id: SignalHandlerId) -> bool {
        self.signals.disconnect(id).await
    }

    pub async fn is_active(&self) -> bool {
        self.state.lock().await.active
    }

    pub async fn has_cause(&self, cause: &CauseId) -> bool {
        self.state.lock().await.registry.contains_cause(cause)
    }

    pub async fn pending(&self) -> Option<PendingRequest> {
        self.state.lock().await.pending.peek().cloned()
    }

    pub async fn status(&self) -> Status {
        let state = self.state.lock().await;
        Status {
            active: state.active,
            checked: state.checked,
            records: state.registry.len(),
            pending: state.pending.peek().map(|p| p.cause.clone()),
        }
    }

    pub async fn request_inhibit(&self, cause: CauseId) {
        if self.state.lock().await.torn_down {
            return;
        }
        debug!("requesting inhibit for {cause}");
        let cookie = match self.bus.inhibit(cause.app_id()).await {
            Ok(cookie) => cookie,
            Err(err) => {
                warn!("Inhibit for {cause} failed: {err}");
                return;
            }
        };

        let mut state = self.state.lock().await;
        if state.torn_down {
            return;
        }
        if let Some(lost) = state.pending.set(cause, cookie) {
            warn!(
                "inhibit for {} (cookie {}) still unresolved, it will not be tracked",
                lost.cause, lost.cookie
            );
        }
    }

    /// No-op when nothing is recorded for `cause`. The record itself stays until
    /// the session manager reports the inhibitor gone.
    pub async fn request_uninhibit(&self, cause: CauseId) {
        let cookie: Cookie = {
            let state = self.state.lock().await;
            if state.torn_down {
                return;
            }
            let Some(record) = state
                .registry
                .find_by_cause(&cause)
                .and_then(|idx| state.registry.get(idx))
            else {
                debug!("nothing recorded for {cause}");
                return;
            };
            record.cookie
        };

        self.uninhibit(&cause, cookie).await;
    }

    /// Uninhibits every recorded inhibitor, including several sharing a cause.
    pub async fn release_all(&self) {
        let held = {
            let state = self.state.lock().await;
            if state.torn_down {
                return;
            }
            state.registry.snapshot()
        };
        for (cause, cookie) in held {
            self.uninhibit(&cause, cookie).await;
        }
    }

    async fn uninhibit(&self, cause: &CauseId, cookie: Cookie) {
        debug!("requesting uninhibit for {cause} (cookie {cookie})");
        if let Err(err) = self.bus.uninhibit(cookie).await {
            warn!("Uninhibit for {cause} failed: {err}");
        }
    }

    pub async fn toggle_clicked(&self) {
        let active = {
            let mut state = self.state.lock().await;
            if state.torn_down {
                return;
            }
            state.checked = false;
            state.active
        };

        if active {
            self.release_all().await;
        } else {
            self.request_inhibit(CauseId::ForcedByUser).await;
        }
    }

    /// Handles `InhibitorAdded`.
    ///
    /// The signal does not say who created `object`, so every known inhibitor's
    /// app id is looked up and compared against the pending request.
    pub async fn on_inhibitor_added(&self, object: ObjectRef) {
        if self.state.lock().await.torn_down {
            return;
        }
        let inhibitors = match self.bus.inhibitors().await {
            Ok(inhibitors) => inhibitors,
            Err(err) => {
                warn!("GetInhibitors failed: {err}");
                return;
            }
        };

        let app_ids = join_all(inhibitors.iter().map(|i| self.bus.app_id_of(i))).await;

        let mut events = Vec::new();
        let confirmed = {
            let mut state = self.state.lock().await;
            if state.torn_down {
                return;
            }
            let before = state.registry.len();
            for (inhibitor, app_id) in inhibitors.iter().zip(app_ids) {
                let app_id = match app_id {
                    Ok(app_id) => app_id,
                    Err(err) => {
                        debug!("GetAppId for {} failed: {err}", inhibitor.as_str());
                        continue;
                    }
                };
                events.extend(state.confirm(&app_id, &object));
            }
            state.registry.len() > before
        };

        if !confirmed {
            debug!("{} is not ours", object.as_str());
        }
        self.emit(events).await;
    }

    /// Handles `InhibitorRemoved`. Objects we never recorded are ignored.
    pub async fn on_inhibitor_removed(&self, object: ObjectRef) {
        let event = {
            let mut state = self.state.lock().await;
            if state.torn_down {
                return;
            }
            state.forget(&object)
        };
        self.emit(event).await;
    }

    /// Drops all state and subscribers. Calls still in flight finish as no-ops.
    pub async fn shutdown(&self) {
        {
            let mut state = self.state.lock().await;
            state.torn_down = true;
            state.registry.clear();
            state.pending.clear();
            state.active = false;
            state.checked = false;
        }
        self.signals.disconnect_all().await;
    }

    async fn emit(&self, events: impl IntoIterator<Item = StateEvent>) {
        for event in events {
            match event {
                StateEvent::Enabled => info!("suspend inhibited"),
                StateEvent::Disabled => info!("suspend allowed"),
            }
            self.signals.emit(event).await;
        }
    }
}
