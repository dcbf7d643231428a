use async_trait::async_trait;
use zbus::{proxy, zvariant::OwnedObjectPath, Connection};

use super::SessionBus;
use crate::registry::{Cookie, ObjectRef};

#[proxy(
    interface = "org.gnome.SessionManager",
    default_service = "org.gnome.SessionManager",
    default_path = "/org/gnome/SessionManager"
)]
pub trait SessionManager {
    fn inhibit(
        &self,
        app_id: &str,
        toplevel_xid: u32,
        reason: &str,
        flags: u32,
    ) -> zbus::Result<u32>;

    fn uninhibit(&self, inhibit_cookie: u32) -> zbus::Result<()>;

    fn get_inhibitors(&self) -> zbus::Result<Vec<OwnedObjectPath>>;

    #[zbus(signal)]
    fn inhibitor_added(&self, id: zbus::zvariant::ObjectPath<'_>) -> zbus::Result<()>;

    #[zbus(signal)]
    fn inhibitor_removed(&self, id: zbus::zvariant::ObjectPath<'_>) -> zbus::Result<()>;
}

#[proxy(
    interface = "org.gnome.SessionManager.Inhibitor",
    default_service = "org.gnome.SessionManager"
)]
pub trait Inhibitor {
    fn get_app_id(&self) -> zbus::Result<String>;
}

/// `SessionBus` backed by the real session manager.
pub struct GnomeSession {
    connection: Connection,
    manager: SessionManagerProxy<'static>,
    reason: String,
    flags: u32,
}

impl GnomeSession {
    pub async fn new(connection: &Connection, reason: &str, flags: u32) -> zbus::Result<Self> {
        let manager = SessionManagerProxy::new(connection).await?;
        Ok(Self {
            connection: connection.clone(),
            manager,
            reason: reason.to_string(),
            flags,
        })
    }

    /// Proxy used to subscribe to `InhibitorAdded` / `InhibitorRemoved`.
    pub fn manager(&self) -> &SessionManagerProxy<'static> {
        &self.manager
    }
}

#[async_trait]
impl SessionBus for GnomeSession {
    async fn inhibit(&self, app_id: &str) -> zbus::Result<Cookie> {
        // No toplevel window backs these requests, hence xid 0.
        self.manager
            .inhibit(app_id, 0, &self.reason, self.flags)
            .await
    }

    async fn uninhibit(&self, cookie: Cookie) -> zbus::Result<()> {
        self.manager.uninhibit(cookie).await
    }

    async fn inhibitors(&self) -> zbus::Result<Vec<ObjectRef>> {
        self.manager.get_inhibitors().await
    }

    async fn app_id_of(&self, object: &ObjectRef) -> zbus::Result<String> {
        let inhibitor = InhibitorProxy::builder(&self.connection)
            .path(object.as_str())?
            .build()
            .await?;
        inhibitor.get_app_id().await
    }
}
