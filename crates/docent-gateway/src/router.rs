use axum::Router;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use docent_llm::LlmProvider;
use subtle::ConstantTimeEq;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    ask_handler, clear_history_handler, create_session_handler, health_handler,
    history_handler, list_documents_handler, rebuild_index_handler, reset_handler,
    upload_handler,
};
use crate::server::AppState;

#[derive(Clone)]
struct AuthConfig {
    token: Option<String>,
}

/// Build the `/api` router. Every route except `/api/health` sits behind the bearer token
/// when one is configured.
pub fn build_router<P: LlmProvider + 'static>(
    state: AppState<P>,
    auth_token: Option<String>,
    max_body_size: usize,
) -> Router {
    let auth_cfg = AuthConfig { token: auth_token };

    let protected = Router::new()
        .route("/api/documents", get(list_documents_handler::<P>))
        .route("/api/documents/{name}", put(upload_handler::<P>))
        .route("/api/index", post(rebuild_index_handler::<P>))
        .route("/api/reset", post(reset_handler::<P>))
        .route("/api/sessions", post(create_session_handler::<P>))
        .route("/api/ask", post(ask_handler::<P>))
        .route(
            "/api/history",
            get(history_handler::<P>).delete(clear_history_handler::<P>),
        )
        .layer(middleware::from_fn_with_state(auth_cfg, auth_middleware))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size));

    Router::new()
        .route("/api/health", get(health_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn auth_middleware(
    State(cfg): State<AuthConfig>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(ref expected) = cfg.token {
        let token = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or("");

        // fixed-length digests so the comparison does not leak the token length
        let token_hash = blake3::hash(token.as_bytes());
        let expected_hash = blake3::hash(expected.as_bytes());
        if !bool::from(token_hash.as_bytes().ct_eq(expected_hash.as_bytes())) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    next.run(req).await
}
