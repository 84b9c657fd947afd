//! Axum HTTP server: stateless endpoints for the damage calculator.
//!
//! The engine holds no shared state, so the router carries none either; each
//! request is one synchronous computation inside its handler, safe to run
//! concurrently with any other.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/damage/calculate` | Full attack-sequence outcome distributions |

use axum::{
    extract::rejection::JsonRejection,
    extract::Extension,
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::attack_sequence::calculate;
use crate::middleware::{request_id_layer, RequestId};
use crate::types::{DamageRequest, DamageResponse};

pub fn create_router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/api/damage/calculate", post(handle_calculate_damage))
        .layer(from_fn(request_id_layer))
        .layer(cors)
}

fn error_response(
    request_id: &str,
    status: StatusCode,
    msg: &str,
) -> (StatusCode, Json<serde_json::Value>) {
    (
        status,
        Json(serde_json::json!({ "message": msg, "request_uuid": request_id })),
    )
}

// ── Handlers ────────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_calculate_damage(
    Extension(RequestId(request_id)): Extension<RequestId>,
    body: Result<Json<DamageRequest>, JsonRejection>,
) -> Result<Json<DamageResponse>, (StatusCode, Json<serde_json::Value>)> {
    // Decode failures go through the same error shape as validation
    // failures, request ID included.
    let Json(req) = match body {
        Ok(json) => json,
        Err(rejection) => {
            println!("[{}] JSON decode error: {}", request_id, rejection.body_text());
            return Err(error_response(
                &request_id,
                StatusCode::BAD_REQUEST,
                &rejection.body_text(),
            ));
        }
    };

    match calculate(&req) {
        Ok(mut resp) => {
            resp.request_uuid = request_id;
            Ok(Json(resp))
        }
        Err(err) => {
            println!("[{}] calculation rejected: {}", request_id, err);
            Err(error_response(
                &request_id,
                StatusCode::BAD_REQUEST,
                &err.to_string(),
            ))
        }
    }
}
