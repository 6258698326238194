//! Planner error taxonomy
//!
//! Every variant is a local, recoverable condition. Callers decide whether to
//! retry, fall back to a fresh session or report the problem upstream.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// Places search or geocoding backend failed
    #[error("{service} request failed: {message}")]
    Collaborator { service: &'static str, message: String },

    /// Share link is missing its payload or the payload cannot be decoded
    #[error("malformed share link: {0}")]
    MalformedShareLink(String),

    #[error("invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },

    /// Lead id does not belong to the session
    #[error("unknown lead: {0}")]
    UnknownLead(String),

    #[error("invalid search: {0}")]
    InvalidSearch(String),

    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlannerError {
    pub fn collaborator(service: &'static str, err: impl std::fmt::Display) -> Self {
        PlannerError::Collaborator {
            service,
            message: err.to_string(),
        }
    }

    /// Stable error code used in worker responses
    pub const fn code(&self) -> &'static str {
        match self {
            PlannerError::Collaborator { .. } => "SEARCH_ERROR",
            PlannerError::MalformedShareLink(_) => "MALFORMED_SHARE_LINK",
            PlannerError::InvalidCoordinates { .. } => "INVALID_COORDINATES",
            PlannerError::UnknownLead(_) => "UNKNOWN_LEAD",
            PlannerError::InvalidSearch(_) => "INVALID_REQUEST",
            PlannerError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
