//! In-memory route sessions for the worker
//!
//! One `RouteSession` per salesman session. Every operation holds the store
//! lock for a single synchronous call, so visits and resets on one session
//! are applied one at a time. Sessions idle for longer than the configured
//! window are dropped by `cleanup`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::services::batch::RouteSession;
use crate::types::{Lead, SalesmanLocation};

/// Session plus the starting location it was searched for
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub origin: SalesmanLocation,
    pub route: RouteSession,
    /// Batch number and share timestamp of the last planned route
    planned: Option<(u32, DateTime<Utc>)>,
    last_used: Instant,
}

impl SessionEntry {
    pub fn new(origin: SalesmanLocation, route: RouteSession) -> Self {
        Self {
            origin,
            route,
            planned: None,
            last_used: Instant::now(),
        }
    }

    /// Pin the share timestamp of `batch_number`
    pub fn with_batch_timestamp(mut self, batch_number: u32, timestamp: DateTime<Utc>) -> Self {
        self.planned = Some((batch_number, timestamp));
        self
    }

    /// Share timestamp for planning `batch_number`
    ///
    /// Re-planning the same batch reuses its timestamp so the share link
    /// stays the same; a new batch is stamped now.
    pub fn batch_timestamp(&mut self, batch_number: u32) -> DateTime<Utc> {
        match self.planned {
            Some((number, timestamp)) if number == batch_number => timestamp,
            _ => {
                let timestamp = Utc::now();
                self.planned = Some((batch_number, timestamp));
                timestamp
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session and return its id
    pub fn create(&self, origin: SalesmanLocation, leads: Vec<Lead>) -> Uuid {
        self.insert(SessionEntry::new(origin, RouteSession::new(leads)))
    }

    /// Store a prepared session under a new id
    pub fn insert(&self, entry: SessionEntry) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.lock().insert(id, entry);
        debug!("Created route session {}", id);
        id
    }

    /// Replace an existing session's leads, or create it under `id`
    pub fn reset(&self, id: Uuid, origin: SalesmanLocation, leads: Vec<Lead>) {
        let mut sessions = self.sessions.lock();
        match sessions.get_mut(&id) {
            Some(entry) => {
                entry.origin = origin;
                entry.route.reset(leads);
                entry.planned = None;
                entry.last_used = Instant::now();
            }
            None => {
                sessions.insert(id, SessionEntry::new(origin, RouteSession::new(leads)));
            }
        }
    }

    /// Run `f` against a session; `None` if the session does not exist
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionEntry) -> R) -> Option<R> {
        let mut sessions = self.sessions.lock();
        sessions.get_mut(&id).map(|entry| {
            entry.last_used = Instant::now();
            f(entry)
        })
    }

    /// Drop sessions not used within `max_idle`, returns how many were dropped
    pub fn cleanup(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.lock();
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_used) < max_idle);

        let removed = before - sessions.len();
        if removed > 0 {
            info!("Dropped {} idle route session(s), {} left", removed, sessions.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
