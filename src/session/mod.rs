use async_trait::async_trait;

use crate::registry::{Cookie, ObjectRef};

mod gnome;
#[cfg(test)]
pub mod mock;

pub use gnome::GnomeSession;

/// The slice of `org.gnome.SessionManager` the engine talks to.
///
/// Every call is a full bus round-trip. `InhibitorAdded` / `InhibitorRemoved`
/// signals are delivered separately and fed to the engine by the caller.
#[async_trait]
pub trait SessionBus: Send + Sync {
    async fn inhibit(&self, app_id: &str) -> zbus::Result<Cookie>;

    async fn uninhibit(&self, cookie: Cookie) -> zbus::Result<()>;

    async fn inhibitors(&self) -> zbus::Result<Vec<ObjectRef>>;

    async fn app_id_of(&self, object: &ObjectRef) -> zbus::Result<String>;
}
