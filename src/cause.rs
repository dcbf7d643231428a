use std::fmt;

/// App id submitted when the user forces inhibition from the toggle.
pub const FORCE_APP_ID: &str = "inhibit-suspend-force";
/// App id submitted when a fullscreen window triggers inhibition.
pub const FULLSCREEN_APP_ID: &str = "inhibit-suspend-fullscreen";

/// Why an inhibitor was requested.
///
/// The cause doubles as the "app id" handed to the session manager, which is
/// how an `InhibitorAdded` signal is later traced back to its request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CauseId {
    ForcedByUser,
    FullscreenApp,
    // Caller-chosen app id; the daemon itself only issues the two above.
    #[allow(dead_code)]
    Other(String),
}

impl CauseId {
    pub fn app_id(&self) -> &str {
        match self {
            CauseId::ForcedByUser => FORCE_APP_ID,
            CauseId::FullscreenApp => FULLSCREEN_APP_ID,
            CauseId::Other(id) => id,
        }
    }
}

impl fmt::Display for CauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.app_id())
    }
}
