use crate::{cause::CauseId, registry::Cookie};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub cause: CauseId,
    pub cookie: Cookie,
}

/// The single in-flight inhibit request, acknowledged with a cookie but not yet
/// matched to an inhibitor object.
///
/// `InhibitorAdded` only carries an object path, so the only way to tie it to
/// a request is to compare app ids against the one request we are waiting on.
/// Keeping a single slot keeps that comparison unambiguous.
#[derive(Debug, Default)]
pub struct PendingTracker {
    slot: Option<PendingRequest>,
}

impl PendingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the slot and hands back whatever was discarded.
    pub fn set(&mut self, cause: CauseId, cookie: Cookie) -> Option<PendingRequest> {
        self.slot.replace(PendingRequest { cause, cookie })
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn take(&mut self) -> Option<PendingRequest> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<&PendingRequest> {
        self.slot.as_ref()
    }

    pub fn matches(&self, app_id: &str) -> bool {
        !app_id.is_empty()
            && self
                .slot
                .as_ref()
                .is_some_and(|pending| pending.cause.app_id() == app_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cause::FORCE_APP_ID;

    #[test]
    fn last_write_wins() {
        let mut tracker = PendingTracker::new();
        assert_eq!(tracker.set(CauseId::ForcedByUser, 1), None);

        let discarded = tracker.set(CauseId::FullscreenApp, 2);
        assert_eq!(
            discarded,
            Some(PendingRequest {
                cause: CauseId::ForcedByUser,
                cookie: 1
            })
        );
        assert_eq!(tracker.peek().map(|p| p.cookie), Some(2));
    }

    #[test]
    fn matches_only_current_non_empty_app_id() {
        let mut tracker = PendingTracker::new();
        assert!(!tracker.matches(FORCE_APP_ID));

        tracker.set(CauseId::ForcedByUser, 5);
        assert!(tracker.matches(FORCE_APP_ID));
        assert!(!tracker.matches("org.gnome.Totem"));
        assert!(!tracker.matches(""));

        tracker.clear();
        assert!(tracker.peek().is_none());
    }

    #[test]
    fn empty_other_cause_never_matches() {
        let mut tracker = PendingTracker::new();
        tracker.set(CauseId::Other(String::new()), 3);
        assert!(!tracker.matches(""));
    }
}
