//! Cover-art proxy endpoint

use axum::{
    body::Bytes,
    extract::{Query, RawQuery, State},
    response::{IntoResponse, Response},
};
use lrcapi_common::cache_key;
use std::sync::Arc;

use crate::cache::CachedResponse;
use crate::error::ApiError;
use crate::AppState;

/// GET /cover
///
/// Public. The query string is forwarded unchanged to the cover upstream.
pub async fn get_cover(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let key = cache_key("/cover", &params);
    let client = Arc::clone(&state.cover);

    state
        .cache
        .get_or_resolve(&key, state.options.cache_ttl, move || async move {
            match client.fetch(raw_query.as_deref()).await {
                Ok(image) => CachedResponse {
                    status: 200,
                    content_type: image.content_type,
                    body: Bytes::from(image.bytes),
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Cover fetch failed");
                    ApiError::CoverNotFound.to_cached()
                }
            }
        })
        .await
        .into_response()
}
