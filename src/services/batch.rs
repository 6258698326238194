//! Batch manager for a single route session
//!
//! Leads are handed out in batches of `BATCH_SIZE`, first unvisited first,
//! in the order the search returned them. Marking leads visited drives the
//! session forward until every lead is visited.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::defaults::BATCH_SIZE;
use crate::error::PlannerError;
use crate::types::{Batch, Lead, SessionSnapshot, SessionState, VisitOutcome};

/// Route session state owned by one salesman
#[derive(Debug, Clone, Default)]
pub struct RouteSession {
    all_leads: Vec<Lead>,
    visited: HashSet<String>,
    current_batch: Option<Batch>,
    batches_issued: u32,
}

impl RouteSession {
    pub fn new(leads: Vec<Lead>) -> Self {
        let mut session = Self::default();
        session.reset(leads);
        session
    }

    /// Session picking up a shared batch: `leads` become batch
    /// `batch_number`, which is the current batch, and numbering continues
    /// from there
    pub fn resume(leads: Vec<Lead>, batch_number: u32) -> Self {
        let mut session = Self::new(leads);
        if batch_number == 0 || session.all_leads.is_empty() {
            return session;
        }

        let batch = Batch {
            batch_number,
            leads: session.all_leads.iter().take(BATCH_SIZE).cloned().collect(),
        };
        debug!("Resumed batch {} with {} leads", batch_number, batch.len());
        session.current_batch = Some(batch);
        session.batches_issued = batch_number;
        session
    }

    /// Replace the lead list and forget all progress
    pub fn reset(&mut self, leads: Vec<Lead>) {
        info!("Resetting route session with {} leads", leads.len());
        self.all_leads = leads;
        self.visited.clear();
        self.current_batch = None;
        self.batches_issued = 0;
    }

    pub fn leads(&self) -> &[Lead] {
        &self.all_leads
    }

    pub fn current_batch(&self) -> Option<&Batch> {
        self.current_batch.as_ref()
    }

    pub fn is_visited(&self, lead_id: &str) -> bool {
        self.visited.contains(lead_id)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn unvisited(&self) -> impl Iterator<Item = &Lead> {
        self.all_leads.iter().filter(|l| !self.visited.contains(&l.id))
    }

    pub fn state(&self) -> SessionState {
        if self.all_leads.is_empty() {
            SessionState::Idle
        } else if self.unvisited().next().is_none() {
            SessionState::Complete
        } else if self.batches_issued == 0 {
            SessionState::Idle
        } else {
            SessionState::Active
        }
    }

    /// Hand out the first `BATCH_SIZE` unvisited leads
    ///
    /// Asking again before anything changed returns the same batch under the
    /// same number. Once every lead is visited the result is empty
    /// (`Batch::complete()`).
    pub fn next_batch(&mut self) -> Batch {
        let leads: Vec<Lead> = self.unvisited().take(BATCH_SIZE).cloned().collect();

        if leads.is_empty() {
            debug!("No unvisited leads left, route complete");
            self.current_batch = None;
            return Batch::complete();
        }

        if let Some(current) = &self.current_batch {
            let unchanged = current.leads.len() == leads.len()
                && current.leads.iter().zip(&leads).all(|(a, b)| a.id == b.id);
            if unchanged {
                return current.clone();
            }
        }

        self.batches_issued += 1;
        let batch = Batch {
            batch_number: self.batches_issued,
            leads,
        };
        debug!("Issued batch {} with {} leads", batch.batch_number, batch.len());

        self.current_batch = Some(batch.clone());
        batch
    }

    /// Mark a lead visited
    ///
    /// Idempotent. The batch is reported complete whenever the visited count
    /// reaches a multiple of `BATCH_SIZE`, regardless of which batch the
    /// visited leads came from.
    pub fn mark_visited(&mut self, lead_id: &str) -> Result<VisitOutcome, PlannerError> {
        if !self.all_leads.iter().any(|l| l.id == lead_id) {
            return Err(PlannerError::UnknownLead(lead_id.to_string()));
        }

        let in_batch = self
            .current_batch
            .as_ref()
            .is_some_and(|batch| batch.contains(lead_id));
        if !in_batch {
            debug!("Lead {} visited outside the current batch", lead_id);
        }

        let newly_visited = self.visited.insert(lead_id.to_string());
        let visited_count = self.visited.len();
        let batch_complete = newly_visited && visited_count % BATCH_SIZE == 0;

        if batch_complete {
            info!("Batch complete after {} visited leads", visited_count);
        }

        Ok(VisitOutcome {
            newly_visited,
            batch_complete,
            visited_count,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            all_leads: self.all_leads.clone(),
            visited: self
                .all_leads
                .iter()
                .filter(|l| self.visited.contains(&l.id))
                .map(|l| l.id.clone())
                .collect(),
            current_batch: self.current_batch.clone(),
        }
    }

    /// Rebuild a session from a snapshot, dropping visited ids that are not
    /// part of its lead list
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        let known: HashSet<&str> = snapshot.all_leads.iter().map(|l| l.id.as_str()).collect();
        let visited: HashSet<String> = snapshot
            .visited
            .into_iter()
            .filter(|id| known.contains(id.as_str()))
            .collect();

        let batches_issued = snapshot
            .current_batch
            .as_ref()
            .map(|b| b.batch_number)
            .unwrap_or(0);

        Self {
            all_leads: snapshot.all_leads,
            visited,
            current_batch: snapshot.current_batch.filter(|b| !b.is_empty()),
            batches_issued,
        }
    }
}
