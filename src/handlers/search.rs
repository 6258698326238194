//! Lead search message handlers

use tracing::info;

use super::{HandlerError, WorkerState};
use crate::defaults::RESULTS_PER_PAGE;
use crate::services::search::search_leads;
use crate::types::{paginate, Lead, Page, ResultsPageRequest, SearchLeadsRequest, SearchLeadsResponse};

/// leads.search: run a search and start (or reset) a route session with the
/// results
pub async fn process_search(
    state: &WorkerState,
    request: SearchLeadsRequest,
) -> Result<SearchLeadsResponse, HandlerError> {
    let found = search_leads(
        state.places.as_ref(),
        state.geocoder.as_ref(),
        &request.search,
        &state.config.search_region,
    )
    .await?;

    let session_id = match request.session_id {
        Some(id) => {
            state.sessions.reset(id, found.origin.clone(), found.leads.clone());
            info!("Reset session {} with {} leads", id, found.leads.len());
            id
        }
        None => {
            let id = state.sessions.create(found.origin.clone(), found.leads.clone());
            info!("Started session {} with {} leads", id, found.leads.len());
            id
        }
    };

    Ok(SearchLeadsResponse {
        session_id,
        origin: found.origin,
        leads: found.leads,
    })
}

/// leads.results: one page of the session's leads
pub fn process_results(
    state: &WorkerState,
    request: ResultsPageRequest,
) -> Result<Page<Lead>, HandlerError> {
    state
        .sessions
        .with_session(request.session_id, |entry| {
            paginate(entry.route.leads(), request.page, RESULTS_PER_PAGE)
        })
        .ok_or_else(|| HandlerError::session_not_found(request.session_id))
}
