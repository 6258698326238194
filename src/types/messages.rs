//! NATS message types

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::{
    Batch, Lead, Route, SalesmanLocation, SearchRequest, SessionSnapshot, SessionState, VisitOutcome,
};
use crate::defaults::RESULTS_PER_PAGE;

/// Generic request wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<T> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

impl<T> Request<T> {
    pub fn new(payload: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Generic success response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse<T> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(request_id: Uuid, payload: T) -> Self {
        Self {
            id: request_id,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(request_id: Uuid, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: request_id,
            timestamp: Utc::now(),
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

// ============================================================================
// Lead search / route session payloads
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLeadsRequest {
    #[serde(flatten)]
    pub search: SearchRequest,
    /// Existing session to reset instead of starting a new one
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLeadsResponse {
    pub session_id: Uuid,
    pub origin: SalesmanLocation,
    pub leads: Vec<Lead>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPageRequest {
    pub session_id: Uuid,
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextBatchResponse {
    /// True once every lead in the session is visited
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRequest {
    pub session_id: Uuid,
    pub lead_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitResponse {
    #[serde(flatten)]
    pub outcome: VisitOutcome,
    pub state: SessionState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRequest {
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    pub session_id: Uuid,
    pub route: Route,
}

/// Visited progress of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStateResponse {
    pub state: SessionState,
    pub visited_count: usize,
    /// Visited lead ids in search order
    pub visited: Vec<String>,
    pub current_batch: Option<Batch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    pub origin: SalesmanLocation,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    /// Starting location, the default area's when absent
    #[serde(default)]
    pub origin: Option<SalesmanLocation>,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    pub visited_count: usize,
}

// ============================================================================
// Pagination
// ============================================================================

/// One page of a result list (pages are 1-based)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Slice `items` into the requested page. Page 0 is treated as page 1, a
/// page past the end is empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = if per_page == 0 { RESULTS_PER_PAGE } else { per_page };
    let page = page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);

    Page {
        items: items[start..end].to_vec(),
        page,
        per_page,
        total,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_splits_into_pages_of_nine() {
        let items: Vec<u32> = (1..=20).collect();

        let first = paginate(&items, 1, RESULTS_PER_PAGE);
        assert_eq!(first.items, (1..=9).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);

        let last = paginate(&items, 3, RESULTS_PER_PAGE);
        assert_eq!(last.items, vec![19, 20]);
    }

    #[test]
    fn test_paginate_clamps_page_zero_and_past_end() {
        let items: Vec<u32> = (1..=5).collect();

        let zero = paginate(&items, 0, 9);
        assert_eq!(zero.page, 1);
        assert_eq!(zero.items.len(), 5);

        let past = paginate(&items, 4, 9);
        assert!(past.items.is_empty());
        assert_eq!(past.total_pages, 1);
    }

    #[test]
    fn test_paginate_empty_list() {
        let page = paginate::<u32>(&[], 1, 9);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let error = ErrorResponse::new(Uuid::nil(), "SESSION_NOT_FOUND", "no such session");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["error"]["code"], "SESSION_NOT_FOUND");
        assert!(json["error"].get("details").is_none());
    }

    #[test]
    fn test_request_parses_camel_case_payload() {
        let raw = r#"{
            "id": "00000000-0000-0000-0000-000000000000",
            "timestamp": "2026-01-01T00:00:00Z",
            "payload": {"sessionId": "00000000-0000-0000-0000-000000000001", "leadId": "p1"}
        }"#;
        let request: Request<VisitRequest> = serde_json::from_str(raw).unwrap();
        assert_eq!(request.payload.lead_id, "p1");
    }

    #[test]
    fn test_search_request_flattens_form_fields() {
        let raw = r#"{"city": "Surat", "category": "cafe", "area": "Adajan"}"#;
        let request: SearchLeadsRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.search.area, "Adajan");
        assert!(request.session_id.is_none());
    }
}
