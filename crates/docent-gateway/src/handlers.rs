use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use docent_core::session::ChatEntry;
use docent_llm::LlmProvider;
use serde::{Deserialize, Serialize};

use crate::SESSION_HEADER;
use crate::error::ApiError;
use crate::server::AppState;

const MAX_SESSION_ID_LEN: usize = 128;

#[derive(Debug, Deserialize)]
pub(crate) struct AskRequest {
    pub question: String,
}

#[derive(Serialize)]
struct HealthResponse {
    message: &'static str,
    status: u16,
}

#[derive(Serialize)]
struct HistoryResponse {
    session_id: String,
    history: Vec<ChatEntry>,
    queries_remaining: Option<u32>,
}

pub(crate) async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        message: "HEALTHY",
        status: 200,
    })
}

pub(crate) async fn list_documents_handler<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
) -> Result<Response, ApiError> {
    let files = state.service.list_files().await?;
    Ok(Json(serde_json::json!({ "files": files })).into_response())
}

pub(crate) async fn upload_handler<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("upload body is empty".into()));
    }
    state.service.upload(&name, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "uploaded": name })),
    )
        .into_response())
}

pub(crate) async fn rebuild_index_handler<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
) -> Result<Response, ApiError> {
    let stats = state.service.rebuild_index().await?;
    Ok(Json(serde_json::json!({
        "documents": stats.documents,
        "chunks": stats.chunks,
        "dimension": stats.dimension,
    }))
    .into_response())
}

pub(crate) async fn reset_handler<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
) -> Result<Response, ApiError> {
    let report = state.service.reset().await?;
    Ok(Json(report).into_response())
}

pub(crate) async fn create_session_handler<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
) -> impl IntoResponse {
    let id = state.service.create_session().await;
    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "session_id": id })),
    )
}

pub(crate) async fn ask_handler<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
    headers: HeaderMap,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let session_id = match session_id(&headers)? {
        Some(id) => id,
        None => state.service.create_session().await,
    };

    let answer = state.service.ask(&session_id, &req.question).await?;
    Ok(Json(serde_json::json!({
        "answer": answer.text,
        "sources": answer.sources,
        "queries_remaining": answer.queries_remaining,
        "session_id": session_id,
    }))
    .into_response())
}

pub(crate) async fn history_handler<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session_id = required_session_id(&headers)?;
    let history = state.service.history(&session_id).await;
    let queries_remaining = state.service.queries_remaining(&session_id).await;
    Ok(Json(HistoryResponse {
        session_id,
        history,
        queries_remaining,
    })
    .into_response())
}

pub(crate) async fn clear_history_handler<P: LlmProvider + 'static>(
    State(state): State<AppState<P>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session_id = required_session_id(&headers)?;
    state.service.clear_history(&session_id).await;
    Ok(StatusCode::NO_CONTENT.into_response())
}

fn session_id(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(SESSION_HEADER) else {
        return Ok(None);
    };
    let id = value
        .to_str()
        .map_err(|_| ApiError::BadRequest(format!("{SESSION_HEADER} must be ASCII")))?
        .trim();
    if id.is_empty() {
        return Ok(None);
    }
    if id.len() > MAX_SESSION_ID_LEN {
        return Err(ApiError::BadRequest(format!(
            "{SESSION_HEADER} longer than {MAX_SESSION_ID_LEN} characters"
        )));
    }
    Ok(Some(id.to_owned()))
}

fn required_session_id(headers: &HeaderMap) -> Result<String, ApiError> {
    session_id(headers)?
        .ok_or_else(|| ApiError::BadRequest(format!("missing {SESSION_HEADER} header")))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            message: "HEALTHY",
            status: 200,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"message":"HEALTHY","status":200}"#);
    }

    #[test]
    fn ask_request_deserializes() {
        let req: AskRequest = serde_json::from_str(r#"{"question":"why?"}"#).unwrap();
        assert_eq!(req.question, "why?");
    }

    #[test]
    fn session_header_parsing() {
        let mut headers = HeaderMap::new();
        assert!(session_id(&headers).unwrap().is_none());
        assert!(required_session_id(&headers).is_err());

        headers.insert(SESSION_HEADER, HeaderValue::from_static("  abc  "));
        assert_eq!(session_id(&headers).unwrap().as_deref(), Some("abc"));

        headers.insert(SESSION_HEADER, HeaderValue::from_static(" "));
        assert!(session_id(&headers).unwrap().is_none());

        let long = "x".repeat(MAX_SESSION_ID_LEN + 1);
        headers.insert(SESSION_HEADER, HeaderValue::from_str(&long).unwrap());
        assert!(session_id(&headers).is_err());
    }
}
