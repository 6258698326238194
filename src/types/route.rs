//! Route types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Coordinates, Lead};

/// Fixed starting point of a salesman's trips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesmanLocation {
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
}

/// A group of at most `BATCH_SIZE` leads visited in one trip
///
/// Batch numbers start at 1 and have no gaps. The terminal empty batch
/// returned once every lead is visited carries number 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub batch_number: u32,
    pub leads: Vec<Lead>,
}

impl Batch {
    pub fn complete() -> Self {
        Self {
            batch_number: 0,
            leads: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn contains(&self, lead_id: &str) -> bool {
        self.leads.iter().any(|l| l.id == lead_id)
    }
}

/// Planned visiting order for one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub batch_number: u32,
    pub origin: SalesmanLocation,
    /// Batch leads in nearest-neighbor order
    pub stops: Vec<Lead>,
    /// Batch leads left out because their location is unknown
    pub excluded: Vec<Lead>,
    pub total_distance_km: f64,
    pub directions_link: String,
    pub shareable_link: String,
}

/// State handed over through a shareable link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    pub batch_number: u32,
    pub stops: Vec<Lead>,
    pub origin: SalesmanLocation,
    pub timestamp: DateTime<Utc>,
}

/// Result of marking a lead visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitOutcome {
    /// False when the lead was already visited
    pub newly_visited: bool,
    /// Visited count reached a multiple of the batch size
    pub batch_complete: bool,
    pub visited_count: usize,
}

/// Route session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Active,
    Complete,
}

/// Serialized session, suitable for local storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub all_leads: Vec<Lead>,
    pub visited: Vec<String>,
    pub current_batch: Option<Batch>,
}
