//! Route batch message handlers

use tracing::info;

use super::{HandlerError, WorkerState};
use crate::error::PlannerError;
use crate::services::batch::RouteSession;
use crate::services::links::decode_shareable_link;
use crate::services::planner::{plan_route, plan_shared_route};
use crate::services::session_store::SessionEntry;
use crate::types::{
    NextBatchResponse, ResumeRequest, ResumeResponse, RouteStateResponse, SessionRequest,
    VisitRequest, VisitResponse,
};

/// leads.route.next: plan the next batch of the session
pub fn process_next(
    state: &WorkerState,
    request: SessionRequest,
) -> Result<NextBatchResponse, HandlerError> {
    let share_base_url = &state.config.share_base_url;

    let result = state
        .sessions
        .with_session(request.session_id, |entry| -> Result<_, PlannerError> {
            let batch = entry.route.next_batch();
            if batch.is_empty() {
                return Ok(NextBatchResponse {
                    complete: true,
                    route: None,
                });
            }

            let timestamp = entry.batch_timestamp(batch.batch_number);
            let route = plan_route(&entry.origin, &batch, share_base_url, timestamp)?;
            Ok(NextBatchResponse {
                complete: false,
                route: Some(route),
            })
        })
        .ok_or_else(|| HandlerError::session_not_found(request.session_id))?;

    result.map_err(HandlerError::from)
}

/// leads.route.visit: mark one lead visited
pub fn process_visit(
    state: &WorkerState,
    request: VisitRequest,
) -> Result<VisitResponse, HandlerError> {
    let result = state
        .sessions
        .with_session(request.session_id, |entry| -> Result<_, PlannerError> {
            let outcome = entry.route.mark_visited(&request.lead_id)?;
            Ok(VisitResponse {
                outcome,
                state: entry.route.state(),
            })
        })
        .ok_or_else(|| HandlerError::session_not_found(request.session_id))?;

    result.map_err(HandlerError::from)
}

/// leads.route.state: visited progress of the session
pub fn process_state(
    state: &WorkerState,
    request: SessionRequest,
) -> Result<RouteStateResponse, HandlerError> {
    state
        .sessions
        .with_session(request.session_id, |entry| {
            let route = &entry.route;
            let visited: Vec<String> = route
                .leads()
                .iter()
                .filter(|lead| route.is_visited(&lead.id))
                .map(|lead| lead.id.clone())
                .collect();

            RouteStateResponse {
                state: route.state(),
                visited_count: visited.len(),
                visited,
                current_batch: route.current_batch().cloned(),
            }
        })
        .ok_or_else(|| HandlerError::session_not_found(request.session_id))
}

/// leads.route.resume: continue a shared batch in a fresh session
///
/// The session starts on the shared batch under its own number and share
/// timestamp, so `leads.route.next` on it returns the same route.
pub fn process_resume(
    state: &WorkerState,
    request: ResumeRequest,
) -> Result<ResumeResponse, HandlerError> {
    let payload = decode_shareable_link(&request.link)?;
    let route = plan_shared_route(&payload, &state.config.share_base_url)?;

    let session = RouteSession::resume(payload.stops, payload.batch_number);
    let entry = SessionEntry::new(payload.origin, session)
        .with_batch_timestamp(payload.batch_number, payload.timestamp);
    let session_id = state.sessions.insert(entry);
    info!("Resumed batch {} into session {}", route.batch_number, session_id);

    Ok(ResumeResponse { session_id, route })
}
