use axum::{
    Router,
    http::{HeaderValue, Request, header::HeaderName},
    middleware,
    routing::get,
};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, field};
use ts_rs::TS;

use crate::{AppState, auth::require_session};

pub mod boards;
pub mod checklists;
pub mod comments;
pub mod health;
pub mod labels;
pub mod notifications;
pub mod organizations;
pub mod projects;
pub mod tasks;
pub mod time_entries;
pub mod users;

/// skip/limit pagination query params shared by list endpoints.
#[derive(Debug, Default, Deserialize, TS)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub fn router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .extensions()
                .get::<RequestId>()
                .and_then(|id| id.header_value().to_str().ok());
            let span = tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = field::Empty
            );
            if let Some(request_id) = request_id {
                span.record("request_id", field::display(request_id));
            }
            span
        })
        .on_response(DefaultOnResponse::new().level(Level::INFO))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR));

    let cors_layer = cors_layer(&state);

    let v1_public = Router::<AppState>::new().route("/health", get(health::health_check));

    let v1_protected = Router::<AppState>::new()
        .merge(users::router())
        .merge(organizations::router())
        .merge(projects::router())
        .merge(boards::router())
        .merge(tasks::router())
        .merge(labels::router())
        .merge(comments::router())
        .merge(checklists::router())
        .merge(time_entries::router())
        .merge(notifications::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::<AppState>::new()
        .nest("/api/v1", v1_public)
        .nest("/api/v1", v1_protected)
        .layer(cors_layer)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            MakeRequestUuid {},
        ))
        .with_state(state)
}

/// Restrict CORS to the configured origin list; an empty list means a
/// permissive development setup.
fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config()
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
