use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use cedict_types::{DictionaryEntry, KeyKind, MetapinyinKeys};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::index::{KeyIndex, LookupParams, parse_letters};

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<KeyIndex>,
    pub max_page_size: usize,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub key: String,
    pub q: String,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub must_include: Option<String>,
    pub cannot_include: Option<String>,
}

#[derive(Deserialize)]
pub struct MetapinyinQuery {
    pub pinyin: String,
}

#[derive(Deserialize)]
pub struct ClassifyQuery {
    pub line: String,
}

#[derive(Serialize)]
pub struct LookupResponse {
    key: &'static str,
    query: String,
    normalized: String,
    page: usize,
    page_size: usize,
    total: usize,
    has_more: bool,
    items: Vec<DictionaryEntry>,
}

#[derive(Serialize)]
pub struct MetapinyinResponse {
    pinyin: String,
    #[serde(flatten)]
    keys: MetapinyinKeys,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/lookup", get(lookup))
        .route("/v1/metapinyin", get(metapinyin_keys))
        .route("/v1/classify", get(classify_line))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn lookup(
    State(state): State<AppState>,
    query: Result<Query<LookupQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let kind: KeyKind = params
        .key
        .parse()
        .map_err(|e: cedict_types::UnknownKeyKind| ApiError::bad_request(e.to_string()))?;
    if params.q.trim().is_empty() {
        return Err(ApiError::bad_request("q is required"));
    }

    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::bad_request("page must be >= 1"));
    }
    let mut page_size = params.page_size.unwrap_or(50);
    if page_size == 0 {
        return Err(ApiError::bad_request("page_size must be >= 1"));
    }
    if page_size > state.max_page_size {
        page_size = state.max_page_size;
    }

    let must_include = params
        .must_include
        .map_or(Ok(Vec::new()), |s| parse_letters(&s))
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let cannot_include = params
        .cannot_include
        .map_or(Ok(Vec::new()), |s| parse_letters(&s))
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let result = state.index.lookup(LookupParams {
        kind,
        query: &params.q,
        must_include: &must_include,
        cannot_include: &cannot_include,
        page,
        page_size,
    });

    let response = LookupResponse {
        key: kind.as_str(),
        query: params.q,
        normalized: result.normalized,
        page,
        page_size,
        total: result.total,
        has_more: result.has_more,
        items: result.items,
    };
    Ok(cacheable(&state, Json(response)))
}

async fn metapinyin_keys(
    State(state): State<AppState>,
    query: Result<Query<MetapinyinQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let keys = metapinyin::derive(&params.pinyin);
    Ok(cacheable(
        &state,
        Json(MetapinyinResponse {
            pinyin: params.pinyin,
            keys,
        }),
    ))
}

async fn classify_line(
    State(state): State<AppState>,
    query: Result<Query<ClassifyQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let entry = cedict_db::parse_line(&params.line)
        .map_err(|e| ApiError::Unprocessable(e.to_string()))?;
    Ok(cacheable(&state, Json(entry)))
}

fn cacheable(state: &AppState, body: impl IntoResponse) -> Response {
    if state.disable_cache {
        return body.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        )],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unprocessable(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
