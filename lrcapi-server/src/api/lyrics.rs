//! Lyric lookup endpoints
//!
//! Both endpoints check credentials before touching the cache, so a cached
//! answer is never served to an unauthorized caller.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use lrcapi_common::api::{LyricCandidate, Permission};
use lrcapi_common::{cache_key, LookupRequest};
use std::sync::Arc;

use crate::cache::CachedResponse;
use crate::error::{ApiError, ApiResult};
use crate::resolver::Resolver;
use crate::AppState;

type QueryPairs = Vec<(String, String)>;

/// Auth, parameter presence and request validation shared by both endpoints
fn prepare(state: &AppState, headers: &HeaderMap, params: &QueryPairs) -> ApiResult<LookupRequest> {
    state.auth.check(headers, Permission::Read)?;

    if params.is_empty() {
        return Err(ApiError::MissingParameters);
    }

    let request = LookupRequest::from_query(params);
    request
        .validate()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    Ok(request)
}

/// GET /lyrics
///
/// Canonical LRC text of the best available source.
pub async fn get_lyrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<QueryPairs>,
) -> Response {
    let request = match prepare(&state, &headers, &params) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let key = cache_key("/lyrics", &params);
    let resolver = Arc::clone(&state.resolver);
    state
        .cache
        .get_or_resolve(&key, state.options.cache_ttl, move || {
            resolve_text(resolver, request)
        })
        .await
        .into_response()
}

async fn resolve_text(resolver: Arc<Resolver>, request: LookupRequest) -> CachedResponse {
    match resolver.resolve_single(&request).await {
        Ok(result) => {
            tracing::info!(
                title = ?request.title,
                source = ?result.source,
                "Served lyrics"
            );
            CachedResponse::text(200, result.document.into_text())
        }
        Err(e) => ApiError::from(e).to_cached(),
    }
}

/// GET /jsonapi
///
/// Every candidate as `{id, title, artist, lyrics}`; `title` and `artist`
/// echo the request.
pub async fn get_lyrics_json(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<QueryPairs>,
) -> Response {
    let request = match prepare(&state, &headers, &params) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let key = cache_key("/jsonapi", &params);
    let resolver = Arc::clone(&state.resolver);
    state
        .cache
        .get_or_resolve(&key, state.options.cache_ttl, move || {
            resolve_candidates(resolver, request)
        })
        .await
        .into_response()
}

async fn resolve_candidates(resolver: Arc<Resolver>, request: LookupRequest) -> CachedResponse {
    match resolver.resolve_all(&request).await {
        Ok(results) => {
            let candidates: Vec<LyricCandidate> = results
                .into_iter()
                .map(|result| LyricCandidate {
                    id: result.document.fingerprint().to_string(),
                    title: request.title_str().to_string(),
                    artist: request.artist_str().to_string(),
                    lyrics: result.document.into_text(),
                })
                .collect();
            tracing::info!(title = ?request.title, candidates = candidates.len(), "Served candidates");
            CachedResponse::json(200, &candidates)
        }
        Err(e) => ApiError::from(e).to_cached(),
    }
}
