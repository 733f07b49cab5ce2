use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "success",
        "message": "Welcome to the car rental API",
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "status": "error",
            "message": "Route not found",
        })),
    )
}
