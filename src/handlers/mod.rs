//! NATS message handlers

pub mod ping;
pub mod route;
pub mod search;
pub mod session;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::select;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::PlannerError;
use crate::services::geocoding::{create_geocoder, Geocoder};
use crate::services::places::{create_places_search, PlacesSearch};
use crate::services::session_store::SessionStore;
use crate::types::{ErrorResponse, Request, SuccessResponse};

pub const SUBJECT_PING: &str = "leads.ping";
pub const SUBJECT_SEARCH: &str = "leads.search";
pub const SUBJECT_RESULTS: &str = "leads.results";
pub const SUBJECT_ROUTE_NEXT: &str = "leads.route.next";
pub const SUBJECT_ROUTE_VISIT: &str = "leads.route.visit";
pub const SUBJECT_ROUTE_STATE: &str = "leads.route.state";
pub const SUBJECT_ROUTE_RESUME: &str = "leads.route.resume";
pub const SUBJECT_SESSION_SNAPSHOT: &str = "leads.session.snapshot";
pub const SUBJECT_SESSION_RESTORE: &str = "leads.session.restore";

/// How often idle sessions are looked for
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared state handed to every handler
#[derive(Clone)]
pub struct WorkerState {
    pub config: Arc<Config>,
    pub places: Arc<dyn PlacesSearch>,
    pub geocoder: Arc<dyn Geocoder>,
    pub sessions: Arc<SessionStore>,
}

impl WorkerState {
    pub fn new(config: Config) -> Result<Self> {
        let api_key = config.google_api_key.as_deref();
        let places: Arc<dyn PlacesSearch> =
            Arc::from(create_places_search(&config.places_url, api_key)?);
        let geocoder: Arc<dyn Geocoder> = Arc::from(create_geocoder(
            config.geocoder_backend,
            &config.geocoding_url,
            api_key,
        )?);

        Ok(Self::with_services(config, places, geocoder))
    }

    pub fn with_services(
        config: Config,
        places: Arc<dyn PlacesSearch>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            places,
            geocoder,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}

/// Error reported back to the requester
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerError {
    pub code: &'static str,
    pub message: String,
}

impl HandlerError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn session_not_found(id: Uuid) -> Self {
        Self::new("SESSION_NOT_FOUND", format!("Session {} not found", id))
    }
}

impl From<PlannerError> for HandlerError {
    fn from(err: PlannerError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// Request/reply loop for one subject
///
/// Parses `Request<T>`, runs `handler` on the payload and replies with a
/// `SuccessResponse<R>` or an `ErrorResponse`. Failures to encode or publish
/// a reply are logged and the loop keeps serving.
async fn serve_subject<T, R, F, Fut>(
    client: Client,
    mut subscriber: Subscriber,
    subject: &'static str,
    handler: F,
) -> Result<()>
where
    T: DeserializeOwned,
    R: Serialize,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, HandlerError>>,
{
    while let Some(msg) = subscriber.next().await {
        debug!("Received {} message", subject);

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("{} message without reply subject", subject);
                continue;
            }
        };

        let (request_id, encoded) = match serde_json::from_slice::<Request<T>>(&msg.payload) {
            Ok(request) => {
                let result = handler(request.payload).await;
                if let Err(e) = &result {
                    warn!("{} failed: {} ({})", subject, e.message, e.code);
                }
                (request.id, encode_reply(request.id, result))
            }
            Err(e) => {
                error!("Failed to parse {} request: {}", subject, e);
                let invalid = HandlerError::new("INVALID_REQUEST", e.to_string());
                (Uuid::nil(), encode_reply::<()>(Uuid::nil(), Err(invalid)))
            }
        };

        let response = match encoded {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to encode {} reply for request {}: {}", subject, request_id, e);
                continue;
            }
        };

        if let Err(e) = client.publish(reply, response.into()).await {
            error!("Failed to publish {} reply: {}", subject, e);
        }
    }

    Ok(())
}

/// Wrap a handler result in the response envelope
fn encode_reply<R: Serialize>(
    request_id: Uuid,
    result: Result<R, HandlerError>,
) -> serde_json::Result<Vec<u8>> {
    match result {
        Ok(payload) => serde_json::to_vec(&SuccessResponse::new(request_id, payload)),
        Err(e) => serde_json::to_vec(&ErrorResponse::new(request_id, e.code, e.message)),
    }
}

/// Serve `subject` with a synchronous handler
fn spawn_subject<T, R>(
    client: &Client,
    subscriber: Subscriber,
    subject: &'static str,
    state: &WorkerState,
    handler: fn(&WorkerState, T) -> Result<R, HandlerError>,
) -> JoinHandle<Result<()>>
where
    T: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
{
    let client = client.clone();
    let state = state.clone();
    tokio::spawn(async move {
        serve_subject(client, subscriber, subject, move |payload| {
            let result = handler(&state, payload);
            async move { result }
        })
        .await
    })
}

/// Periodically drop idle route sessions
async fn sweep_sessions(sessions: Arc<SessionStore>, max_idle: Duration) -> Result<()> {
    let period = SESSION_SWEEP_INTERVAL.min(max_idle).max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        sessions.cleanup(max_idle);
    }
}

/// Start all message handlers
pub async fn start_handlers(client: Client, config: Config) -> Result<()> {
    info!("Starting message handlers...");

    let state = WorkerState::new(config)?;
    info!(
        "Collaborators initialized: places={}, geocoder={}",
        state.places.name(),
        state.geocoder.name()
    );

    // Subscribe to all subjects
    let ping_sub = client.subscribe(SUBJECT_PING).await?;
    let search_sub = client.subscribe(SUBJECT_SEARCH).await?;
    let results_sub = client.subscribe(SUBJECT_RESULTS).await?;
    let next_sub = client.subscribe(SUBJECT_ROUTE_NEXT).await?;
    let visit_sub = client.subscribe(SUBJECT_ROUTE_VISIT).await?;
    let state_sub = client.subscribe(SUBJECT_ROUTE_STATE).await?;
    let resume_sub = client.subscribe(SUBJECT_ROUTE_RESUME).await?;
    let snapshot_sub = client.subscribe(SUBJECT_SESSION_SNAPSHOT).await?;
    let restore_sub = client.subscribe(SUBJECT_SESSION_RESTORE).await?;

    info!("Subscribed to NATS subjects");

    let client_ping = client.clone();
    let sessions_ping = Arc::clone(&state.sessions);
    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub, sessions_ping).await
    });

    let client_search = client.clone();
    let state_search = state.clone();
    let search_handle = tokio::spawn(async move {
        serve_subject(client_search, search_sub, SUBJECT_SEARCH, move |payload| {
            let state = state_search.clone();
            async move { search::process_search(&state, payload).await }
        })
        .await
    });

    let results_handle = spawn_subject(&client, results_sub, SUBJECT_RESULTS, &state, search::process_results);
    let next_handle = spawn_subject(&client, next_sub, SUBJECT_ROUTE_NEXT, &state, route::process_next);
    let visit_handle = spawn_subject(&client, visit_sub, SUBJECT_ROUTE_VISIT, &state, route::process_visit);
    let state_handle = spawn_subject(&client, state_sub, SUBJECT_ROUTE_STATE, &state, route::process_state);
    let resume_handle = spawn_subject(&client, resume_sub, SUBJECT_ROUTE_RESUME, &state, route::process_resume);
    let snapshot_handle =
        spawn_subject(&client, snapshot_sub, SUBJECT_SESSION_SNAPSHOT, &state, session::process_snapshot);
    let restore_handle =
        spawn_subject(&client, restore_sub, SUBJECT_SESSION_RESTORE, &state, session::process_restore);

    let sweep_handle = tokio::spawn(sweep_sessions(
        Arc::clone(&state.sessions),
        state.config.session_idle,
    ));

    info!("All handlers started");

    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = search_handle => {
            error!("Search handler finished: {:?}", result);
        }
        result = results_handle => {
            error!("Results handler finished: {:?}", result);
        }
        result = next_handle => {
            error!("Route next handler finished: {:?}", result);
        }
        result = visit_handle => {
            error!("Route visit handler finished: {:?}", result);
        }
        result = state_handle => {
            error!("Route state handler finished: {:?}", result);
        }
        result = resume_handle => {
            error!("Route resume handler finished: {:?}", result);
        }
        result = snapshot_handle => {
            error!("Session snapshot handler finished: {:?}", result);
        }
        result = restore_handle => {
            error!("Session restore handler finished: {:?}", result);
        }
        result = sweep_handle => {
            error!("Session sweep finished: {:?}", result);
        }
    }

    Ok(())
}
