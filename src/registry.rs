use zbus::zvariant::OwnedObjectPath;

use crate::cause::CauseId;

/// Cookie handed out by `org.gnome.SessionManager.Inhibit`.
pub type Cookie = u32;

/// Path of an `org.gnome.SessionManager.Inhibitor` object.
pub type ObjectRef = OwnedObjectPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InhibitorRecord {
    pub cause: CauseId,
    pub cookie: Cookie,
    pub object: ObjectRef,
}

/// Inhibitors the session manager has confirmed for us.
#[derive(Debug, Default)]
pub struct Registry {
    records: Vec<InhibitorRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `object` is already recorded; object paths stay unique.
    pub fn add(&mut self, cause: CauseId, cookie: Cookie, object: ObjectRef) -> bool {
        if self.records.iter().any(|r| r.object == object) {
            return false;
        }
        self.records.push(InhibitorRecord {
            cause,
            cookie,
            object,
        });
        true
    }

    pub fn remove(&mut self, object: &ObjectRef) -> bool {
        match self.records.iter().position(|r| &r.object == object) {
            Some(idx) => {
                self.records.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn find_by_cause(&self, cause: &CauseId) -> Option<usize> {
        self.records.iter().position(|r| &r.cause == cause)
    }

    pub fn get(&self, index: usize) -> Option<&InhibitorRecord> {
        self.records.get(index)
    }

    pub fn contains_cause(&self, cause: &CauseId) -> bool {
        self.find_by_cause(cause).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Visits every record's cause and cookie in insertion order.
    pub fn for_each_cause<F>(&self, mut f: F)
    where
        F: FnMut(&CauseId, Cookie),
    {
        for record in &self.records {
            f(&record.cause, record.cookie);
        }
    }

    /// Causes and cookies in insertion order, detached from the registry so
    /// callers can issue bus calls while notifications keep mutating it.
    pub fn snapshot(&self) -> Vec<(CauseId, Cookie)> {
        let mut held = Vec::with_capacity(self.records.len());
        self.for_each_cause(|cause, cookie| held.push((cause.clone(), cookie)));
        held
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
