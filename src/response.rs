use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::pagination::PageMeta;

/// Uniform success envelope. Errors use the mirrored shape in `error.rs`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMeta>,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
        metadata: None,
    })
}

pub fn page<T: Serialize>(data: Vec<T>, meta: PageMeta) -> Json<ApiResponse<Vec<T>>> {
    Json(ApiResponse {
        success: true,
        data,
        metadata: Some(meta),
    })
}

pub fn message(text: &str) -> Json<ApiResponse<serde_json::Value>> {
    ok(json!({ "message": text }))
}
