//! Embedded tag write endpoint

use axum::{body::Bytes, extract::State, http::HeaderMap};
use lrcapi_common::api::{Permission, TagFields};
use serde_json::Value;
use std::path::Path;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

const INVALID_STRUCTURE: &str = "Invalid JSON structure.";
const MISSING_PATH: &str = "Missing 'path' key in JSON.";

/// POST /tag
///
/// Body: `{path, title?, artist?, album?, lyrics?}`. Only the fields present
/// are written.
pub async fn set_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<&'static str> {
    state.auth.check(&headers, Permission::Write)?;

    let (path, fields) = parse_body(&body)?;
    if !Path::new(&path).exists() {
        return Err(ApiError::FileNotFound);
    }

    tracing::info!(file = %path, "Writing tags");
    state.tags.write(Path::new(&path), &fields).await?;
    Ok("OK")
}

fn parse_body(body: &[u8]) -> ApiResult<(String, TagFields)> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::InvalidJson(INVALID_STRUCTURE.to_string()))?;

    let Value::Object(map) = &value else {
        return Err(ApiError::InvalidJson(INVALID_STRUCTURE.to_string()));
    };
    let Some(path) = map.get("path") else {
        return Err(ApiError::InvalidJson(INVALID_STRUCTURE.to_string()));
    };
    let path = match path.as_str() {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => return Err(ApiError::InvalidJson(MISSING_PATH.to_string())),
    };

    let fields: TagFields = serde_json::from_value(value)
        .map_err(|_| ApiError::InvalidJson(INVALID_STRUCTURE.to_string()))?;
    Ok((path, fields))
}
