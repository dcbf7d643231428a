use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use tokio::sync::Notify;
use zbus::zvariant::OwnedObjectPath;

use super::SessionBus;
use crate::registry::{Cookie, ObjectRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusCall {
    Inhibit(String),
    Uninhibit(Cookie),
}

#[derive(Default)]
struct Inner {
    calls: Vec<BusCall>,
    next_cookie: Cookie,
    objects: Vec<(ObjectRef, String)>,
    failing: bool,
}

/// Scripted session manager: hands out sequential cookies and answers
/// `GetInhibitors` / `GetAppId` from a list the test controls.
///
/// With [`MockBus::hold_replies`], `Inhibit` and `GetInhibitors` park until
/// [`MockBus::release_one`] is called.
#[derive(Default)]
pub struct MockBus {
    inner: Mutex<Inner>,
    gated: AtomicBool,
    gate: Notify,
    held: AtomicUsize,
}

pub fn path(p: &str) -> ObjectRef {
    OwnedObjectPath::try_from(p).unwrap()
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<BusCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn inhibit_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BusCall::Inhibit(app_id) => Some(app_id),
                BusCall::Uninhibit(_) => None,
            })
            .collect()
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().unwrap().failing = failing;
    }

    pub fn last_cookie(&self) -> Cookie {
        self.inner.lock().unwrap().next_cookie
    }

    /// Registers an inhibitor object as the session manager would.
    pub fn add_object(&self, object: &ObjectRef, app_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .objects
            .push((object.clone(), app_id.to_string()));
    }

    pub fn remove_object(&self, object: &ObjectRef) {
        self.inner
            .lock()
            .unwrap()
            .objects
            .retain(|(o, _)| o != object);
    }

    pub fn hold_replies(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub fn release_one(&self) {
        self.gate.notify_one();
    }

    /// Waits until some call is parked on the gate.
    pub async fn wait_held(&self) {
        while self.held.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    }

    async fn pass_gate(&self) {
        if !self.gated.load(Ordering::SeqCst) {
            return;
        }
        self.held.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        self.held.fetch_sub(1, Ordering::SeqCst);
    }

    fn check(&self) -> zbus::Result<()> {
        if self.inner.lock().unwrap().failing {
            return Err(zbus::Error::Failure("session manager unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionBus for MockBus {
    async fn inhibit(&self, app_id: &str) -> zbus::Result<Cookie> {
        self.pass_gate().await;
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(BusCall::Inhibit(app_id.to_string()));
        inner.next_cookie += 1;
        Ok(inner.next_cookie)
    }

    async fn uninhibit(&self, cookie: Cookie) -> zbus::Result<()> {
        self.check()?;
        self.inner
            .lock()
            .unwrap()
            .calls
            .push(BusCall::Uninhibit(cookie));
        Ok(())
    }

    async fn inhibitors(&self) -> zbus::Result<Vec<ObjectRef>> {
        self.pass_gate().await;
        self.check()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.objects.iter().map(|(o, _)| o.clone()).collect())
    }

    async fn app_id_of(&self, object: &ObjectRef) -> zbus::Result<String> {
        self.check()?;
        let inner = self.inner.lock().unwrap();
        inner
            .objects
            .iter()
            .find(|(o, _)| o == object)
            .map(|(_, app_id)| app_id.clone())
            .ok_or_else(|| zbus::Error::Failure(format!("no such inhibitor {}", object.as_str())))
    }
}
