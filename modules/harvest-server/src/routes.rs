use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use harvest_archive::Harvester;
use harvest_common::{ErrorKind, SearchEngine, SerpRequest, SiteRequest};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::check_bearer;
use crate::response::{failure, ApiResponse};

#[derive(Clone)]
pub struct AppState {
    harvester: Harvester,
    api_token: Arc<str>,
}

impl AppState {
    pub fn new(harvester: Harvester, api_token: &str) -> Self {
        Self {
            harvester,
            api_token: Arc::from(api_token),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/serp/{engine}", post(serp))
        .route("/fetch-site", post(fetch_site))
        .route("/page/html", post(page_html))
        .route("/page/seo", post(page_seo))
        .route("/page/content", post(page_content))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        // Method + path only; request bodies carry queries and URLs.
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn require_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if !check_bearer(&headers, &state.api_token) {
        return failure(ErrorKind::Unauthorized);
    }
    next.run(request).await
}

// --- Request bodies ---

#[derive(Debug, Deserialize)]
struct PageRequest {
    url: String,
    #[serde(default)]
    include_html: bool,
}

/// Unwrap a JSON body or answer with a `bad_request` envelope.
macro_rules! body_or_reject {
    ($body:expr) => {
        match $body {
            Ok(Json(body)) => body,
            Err(rejection) => {
                tracing::warn!(error = %rejection, "rejected request body");
                return failure(ErrorKind::BadRequest);
            }
        }
    };
}

// --- Handlers ---

async fn serp(
    State(state): State<AppState>,
    Path(engine): Path<String>,
    body: Result<Json<SerpRequest>, JsonRejection>,
) -> Response {
    let Ok(engine) = engine.parse::<SearchEngine>() else {
        tracing::warn!(engine, "unknown search engine");
        return failure(ErrorKind::BadRequest);
    };
    let request = body_or_reject!(body);
    ApiResponse(state.harvester.collect_serp(engine, request).await).into_response()
}

async fn fetch_site(
    State(state): State<AppState>,
    body: Result<Json<SiteRequest>, JsonRejection>,
) -> Response {
    let request = body_or_reject!(body);
    ApiResponse(state.harvester.crawl_site(request).await).into_response()
}

async fn page_html(
    State(state): State<AppState>,
    body: Result<Json<PageRequest>, JsonRejection>,
) -> Response {
    let request = body_or_reject!(body);
    ApiResponse(state.harvester.fetch_page(&request.url).await).into_response()
}

async fn page_seo(
    State(state): State<AppState>,
    body: Result<Json<PageRequest>, JsonRejection>,
) -> Response {
    let request = body_or_reject!(body);
    ApiResponse(
        state
            .harvester
            .page_seo(&request.url, request.include_html)
            .await,
    )
    .into_response()
}

async fn page_content(
    State(state): State<AppState>,
    body: Result<Json<PageRequest>, JsonRejection>,
) -> Response {
    let request = body_or_reject!(body);
    ApiResponse(state.harvester.page_content(&request.url).await).into_response()
}
