use std::sync::{Arc, RwLock};

use log::{debug, warn};
use tokio::time::Duration;

use crate::{cause::CauseId, delayed::Delayed, engine::Engine};

/// Source of truth for whether any monitor shows a fullscreen window.
pub trait Displays: Send + Sync {
    fn n_monitors(&self) -> usize;

    fn in_fullscreen(&self, monitor: usize) -> bool;

    fn any_fullscreen(&self) -> bool {
        (0..self.n_monitors()).any(|m| self.in_fullscreen(m))
    }
}

/// Highest monitor count `Monitors` will grow to.
pub const MAX_MONITORS: usize = 16;

/// Monitor fullscreen flags set from outside, e.g. by the control surface.
#[derive(Debug, Default)]
pub struct Monitors {
    fullscreen: RwLock<Vec<bool>>,
}

impl Monitors {
    pub fn new(count: usize) -> Self {
        Self {
            fullscreen: RwLock::new(vec![false; count]),
        }
    }

    /// Grows the monitor list when `monitor` is beyond it, up to
    /// [`MAX_MONITORS`]. Returns false for an index past that limit.
    pub fn set_fullscreen(&self, monitor: usize, fullscreen: bool) -> bool {
        if monitor >= MAX_MONITORS {
            warn!("ignoring monitor {monitor}, at most {MAX_MONITORS} are tracked");
            return false;
        }
        let mut monitors = self
            .fullscreen
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if monitor >= monitors.len() {
            monitors.resize(monitor + 1, false);
        }
        monitors[monitor] = fullscreen;
        true
    }
}

impl Displays for Monitors {
    fn n_monitors(&self) -> usize {
        self.fullscreen
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn in_fullscreen(&self, monitor: usize) -> bool {
        self.fullscreen
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(monitor)
            .copied()
            .unwrap_or(false)
    }
}

/// Adds the fullscreen cause once a fullscreen window has stayed up for
/// `delay`, and drops it as soon as nothing is fullscreen anymore.
pub struct FullscreenWatch {
    engine: Engine,
    displays: Arc<dyn Displays>,
    delay: Duration,
    check: Option<Delayed>,
}

impl FullscreenWatch {
    pub fn new(engine: Engine, displays: Arc<dyn Displays>, delay: Duration) -> Self {
        Self {
            engine,
            displays,
            delay,
            check: None,
        }
    }

    #[cfg(test)]
    fn has_scheduled_check(&self) -> bool {
        self.check.as_ref().is_some_and(|c| !c.is_finished())
    }

    pub async fn on_fullscreen_changed(&mut self) {
        if let Some(mut previous) = self.check.take() {
            previous.cancel();
        }

        let engine = self.engine.clone();
        let displays = self.displays.clone();
        self.check = Some(Delayed::new(self.delay, move || async move {
            // Displays may have changed again while we waited.
            if !displays.any_fullscreen() {
                return;
            }
            if engine.has_cause(&CauseId::FullscreenApp).await {
                return;
            }
            if engine
                .pending()
                .await
                .is_some_and(|p| p.cause == CauseId::FullscreenApp)
            {
                debug!("fullscreen inhibit already requested");
                return;
            }
            engine.request_inhibit(CauseId::FullscreenApp).await;
        }));

        if !self.displays.any_fullscreen() && self.engine.has_cause(&CauseId::FullscreenApp).await
        {
            self.engine.request_uninhibit(CauseId::FullscreenApp).await;
        }
    }
}
