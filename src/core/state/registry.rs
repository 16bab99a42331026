// src/core/state/registry.rs

//! The session registry: connected sessions, username bindings, managers and muted users.
//!
//! All of it sits behind one mutex. A caller that needs a compound operation (check
//! existence, check authority, mutate, enqueue notices) takes the guard once with
//! [`Registry::lock`] and performs every step on the same [`RegistryState`], so no
//! two compound operations ever interleave.

use super::client::{SessionEntry, SessionId};
use crate::config::IdentityPolicy;
use indexmap::IndexSet;
use parking_lot::{Mutex, MutexGuard};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use tracing::debug;

/// The outcome of binding a username to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// The session now carries the name.
    Bound {
        /// The name this session held before, if any.
        previous: Option<String>,
        /// Another session that held the name and lost it.
        displaced: Option<SessionId>,
    },
    /// The session already carried this name.
    Unchanged,
    Rejected(BindRejection),
    /// The session is not (or no longer) registered.
    UnknownSession,
}

/// Why a bind was refused under [`IdentityPolicy::Fixed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindRejection {
    IdentityFixed { current: String },
    NameTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoteOutcome {
    Promoted,
    AlreadyManager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteOutcome {
    Muted,
    AlreadyMuted,
}

/// What is left of a session after its removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedSession {
    pub id: SessionId,
    pub addr: SocketAddr,
    pub username: Option<String>,
}

/// The guarded registry.
#[derive(Debug)]
pub struct Registry {
    inner: Mutex<RegistryState>,
}

impl Registry {
    pub fn new<I, S>(bootstrap_managers: I, identity: IdentityPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Mutex::new(RegistryState {
                sessions: HashMap::new(),
                username_index: HashMap::new(),
                managers: bootstrap_managers.into_iter().map(Into::into).collect(),
                muted: HashSet::new(),
                identity,
            }),
        }
    }

    /// Takes the registry lock for a compound operation.
    pub fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.inner.lock()
    }

    pub fn register(&self, entry: SessionEntry) {
        self.lock().register(entry);
    }

    pub fn bind_username(&self, id: SessionId, name: &str) -> BindOutcome {
        self.lock().bind_username(id, name)
    }

    /// Removes a session. Only the first call for a given id has any effect.
    pub fn remove(&self, id: SessionId) -> Option<RemovedSession> {
        self.lock().remove(id)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.lock().exists(name)
    }

    pub fn lookup_by_username(&self, name: &str) -> Option<SessionId> {
        self.lock().lookup_by_username(name).map(|entry| entry.id)
    }

    pub fn is_manager(&self, name: &str) -> bool {
        self.lock().is_manager(name)
    }

    pub fn promote(&self, name: &str) -> PromoteOutcome {
        self.lock().promote(name)
    }

    pub fn is_muted(&self, name: &str) -> bool {
        self.lock().is_muted(name)
    }

    pub fn mute(&self, name: &str) -> MuteOutcome {
        self.lock().mute(name)
    }

    pub fn managers(&self) -> Vec<String> {
        self.lock().managers().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The registry contents, reachable only through the registry lock.
#[derive(Debug)]
pub struct RegistryState {
    sessions: HashMap<SessionId, SessionEntry>,
    /// Derived from `sessions`: every entry points at a session carrying that name.
    username_index: HashMap<String, SessionId>,
    /// Only grows. Insertion order is the order shown by `view-managers`.
    managers: IndexSet<String>,
    muted: HashSet<String>,
    identity: IdentityPolicy,
}

impl RegistryState {
    pub fn register(&mut self, entry: SessionEntry) {
        debug!("Registering session {} from {}", entry.id, entry.addr);
        self.sessions.insert(entry.id, entry);
    }

    /// Binds `name` to session `id`.
    ///
    /// Under [`IdentityPolicy::Rebind`] the last writer wins: a session may change its
    /// name on any frame, and a name held by another session moves to this one (the
    /// other session becomes unbound). Under [`IdentityPolicy::Fixed`] the first bind
    /// sticks and names held by other sessions are refused.
    pub fn bind_username(&mut self, id: SessionId, name: &str) -> BindOutcome {
        let Some(entry) = self.sessions.get(&id) else {
            return BindOutcome::UnknownSession;
        };
        if entry.username.as_deref() == Some(name) {
            return BindOutcome::Unchanged;
        }

        let holder = self.username_index.get(name).copied();
        if self.identity == IdentityPolicy::Fixed {
            if let Some(current) = &entry.username {
                return BindOutcome::Rejected(BindRejection::IdentityFixed {
                    current: current.clone(),
                });
            }
            if holder.is_some_and(|h| h != id) {
                return BindOutcome::Rejected(BindRejection::NameTaken);
            }
        }

        let previous = self
            .sessions
            .get_mut(&id)
            .and_then(|entry| entry.username.take());
        if let Some(prev) = &previous
            && self.username_index.get(prev) == Some(&id)
        {
            self.username_index.remove(prev);
        }

        let displaced = holder.filter(|h| *h != id);
        if let Some(other) = displaced
            && let Some(other_entry) = self.sessions.get_mut(&other)
        {
            debug!(
                "Session {} takes username '{}' from session {}",
                id, name, other
            );
            other_entry.username = None;
        }

        self.username_index.insert(name.to_string(), id);
        if let Some(entry) = self.sessions.get_mut(&id) {
            entry.username = Some(name.to_string());
        }
        BindOutcome::Bound {
            previous,
            displaced,
        }
    }

    pub fn session(&self, id: SessionId) -> Option<&SessionEntry> {
        self.sessions.get(&id)
    }

    pub fn username_of(&self, id: SessionId) -> Option<&str> {
        self.sessions.get(&id).and_then(|e| e.username.as_deref())
    }

    pub fn lookup_by_username(&self, name: &str) -> Option<&SessionEntry> {
        self.username_index
            .get(name)
            .and_then(|id| self.sessions.get(id))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.lookup_by_username(name).is_some()
    }

    /// Removes the session, its username binding and the username's mute, kills the
    /// session's loops and drops the only sender of its delivery queue. Messages
    /// already queued are still drained by the session's send loop.
    pub fn remove(&mut self, id: SessionId) -> Option<RemovedSession> {
        let entry = self.sessions.remove(&id)?;
        if let Some(name) = &entry.username {
            if self.username_index.get(name) == Some(&id) {
                self.username_index.remove(name);
            }
            self.muted.remove(name);
        }
        entry.liveness().kill();
        debug!("Removed session {} ({})", id, entry.addr);
        Some(RemovedSession {
            id,
            addr: entry.addr,
            username: entry.username,
        })
    }

    pub fn is_manager(&self, name: &str) -> bool {
        self.managers.contains(name)
    }

    pub fn promote(&mut self, name: &str) -> PromoteOutcome {
        if self.managers.insert(name.to_string()) {
            PromoteOutcome::Promoted
        } else {
            PromoteOutcome::AlreadyManager
        }
    }

    pub fn managers(&self) -> impl Iterator<Item = &str> {
        self.managers.iter().map(String::as_str)
    }

    pub fn is_muted(&self, name: &str) -> bool {
        self.muted.contains(name)
    }

    pub fn muted(&self) -> impl Iterator<Item = &str> {
        self.muted.iter().map(String::as_str)
    }

    pub fn mute(&mut self, name: &str) -> MuteOutcome {
        if self.muted.insert(name.to_string()) {
            MuteOutcome::Muted
        } else {
            MuteOutcome::AlreadyMuted
        }
    }

    /// Queues `message` for one session. Returns false if it is gone.
    pub fn deliver(&self, id: SessionId, message: impl Into<String>) -> bool {
        self.sessions
            .get(&id)
            .is_some_and(|entry| entry.deliver(message.into()))
    }

    /// Queues `message` for every session except `exclude`. Returns the recipient count.
    pub fn broadcast(&self, message: &str, exclude: Option<SessionId>) -> usize {
        self.sessions
            .values()
            .filter(|entry| Some(entry.id) != exclude)
            .filter(|entry| entry.deliver(message.to_string()))
            .count()
    }

    /// Every (username, session) binding as recorded on the sessions themselves.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, SessionId)> {
        self.sessions
            .values()
            .filter_map(|entry| entry.username.as_deref().map(|name| (name, entry.id)))
    }

    /// Checks that the username index and the sessions agree in both directions.
    pub fn is_consistent(&self) -> bool {
        let index_ok = self.username_index.iter().all(|(name, id)| {
            self.sessions
                .get(id)
                .is_some_and(|entry| entry.username.as_deref() == Some(name.as_str()))
        });
        let sessions_ok = self
            .bindings()
            .all(|(name, id)| self.username_index.get(name) == Some(&id));
        index_ok && sessions_ok
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
