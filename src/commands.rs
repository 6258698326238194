//! One-shot CLI commands.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::handlers::WorkerState;
use crate::services::batch::RouteSession;
use crate::services::links::decode_shareable_link;
use crate::services::planner::plan_route;
use crate::services::search::search_leads;
use crate::types::{Route, SearchRequest, SharePayload};

/// Search leads and plan their routes without a NATS connection.
///
/// Plans only the first batch unless `all` is set, in which case every
/// batch is planned and its leads (routed or excluded) are marked visited
/// before asking for the next one.
pub async fn plan_routes(state: &WorkerState, request: &SearchRequest, all: bool) -> Result<Vec<Route>> {
    let found = search_leads(
        state.places.as_ref(),
        state.geocoder.as_ref(),
        request,
        &state.config.search_region,
    )
    .await
    .context("Lead search failed")?;

    let mut session = RouteSession::new(found.leads);
    let timestamp = Utc::now();
    let mut routes = Vec::new();

    loop {
        let batch = session.next_batch();
        if batch.is_empty() {
            break;
        }

        let route = plan_route(&found.origin, &batch, &state.config.share_base_url, timestamp)?;
        routes.push(route);

        if !all {
            break;
        }
        for lead in &batch.leads {
            session.mark_visited(&lead.id)?;
        }
    }

    info!("Planned {} route(s) for {} in {}", routes.len(), found.search.category, found.search.area);
    Ok(routes)
}

/// Decode a share link into its payload
pub fn decode_link(link: &str) -> Result<SharePayload> {
    decode_shareable_link(link).context("Could not decode share link")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::mock_state;

    fn request() -> SearchRequest {
        SearchRequest {
            city: "Surat".into(),
            category: "school".into(),
            area: "Adajan".into(),
        }
    }

    #[tokio::test]
    async fn test_plan_first_batch_only() {
        let state = mock_state();

        let routes = plan_routes(&state, &request(), false).await.unwrap();

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].batch_number, 1);
        assert_eq!(routes[0].stops.len() + routes[0].excluded.len(), 5);
    }

    #[tokio::test]
    async fn test_plan_all_batches() {
        let state = mock_state();

        let routes = plan_routes(&state, &request(), true).await.unwrap();

        let numbers: Vec<u32> = routes.iter().map(|r| r.batch_number).collect();
        let sizes: Vec<usize> = routes.iter().map(|r| r.stops.len() + r.excluded.len()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(sizes, vec![5, 5, 2]);
    }

    #[tokio::test]
    async fn test_plan_rejects_unknown_city() {
        let state = mock_state();
        let mut bad = request();
        bad.city = "Mumbai".into();

        assert!(plan_routes(&state, &bad, false).await.is_err());
    }

    #[tokio::test]
    async fn test_decode_planned_link() {
        let state = mock_state();
        let routes = plan_routes(&state, &request(), false).await.unwrap();

        let payload = decode_link(&routes[0].shareable_link).unwrap();

        assert_eq!(payload.batch_number, 1);
        assert_eq!(payload.stops, routes[0].stops);
    }

    #[test]
    fn test_decode_rejects_plain_url() {
        assert!(decode_link("http://localhost:3000/").is_err());
    }
}
