//! Session snapshot handlers
//!
//! A snapshot is the `{allLeads, visited, currentBatch}` document a client
//! keeps locally; restoring it starts a new session with the same progress.

use tracing::info;

use super::{HandlerError, WorkerState};
use crate::services::batch::RouteSession;
use crate::services::locations::default_location;
use crate::services::session_store::SessionEntry;
use crate::types::{RestoreRequest, RestoreResponse, SessionRequest, SnapshotResponse};

/// leads.session.snapshot
pub fn process_snapshot(
    state: &WorkerState,
    request: SessionRequest,
) -> Result<SnapshotResponse, HandlerError> {
    state
        .sessions
        .with_session(request.session_id, |entry| SnapshotResponse {
            origin: entry.origin.clone(),
            snapshot: entry.route.snapshot(),
        })
        .ok_or_else(|| HandlerError::session_not_found(request.session_id))
}

/// leads.session.restore
pub fn process_restore(
    state: &WorkerState,
    request: RestoreRequest,
) -> Result<RestoreResponse, HandlerError> {
    let origin = request.origin.unwrap_or_else(default_location);
    origin.coordinates.validate()?;

    let route = RouteSession::from_snapshot(request.snapshot);
    let session_state = route.state();
    let visited_count = route.visited_count();

    let session_id = state.sessions.insert(SessionEntry::new(origin, route));
    info!("Restored session {} ({} visited)", session_id, visited_count);

    Ok(RestoreResponse {
        session_id,
        state: session_state,
        visited_count,
    })
}
