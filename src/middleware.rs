//! Request-ID and request logging middleware.
//!
//! Every request carries a UUID: the inbound `X-Request-ID` header when the
//! client sent one, a fresh v4 otherwise. The ID is stashed in request
//! extensions for handlers to echo into response bodies, set on the response
//! header, and printed in the START/END log lines around the inner service.

use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID carried in request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

pub async fn request_id_layer(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(RequestId(request_id.clone()));

    println!("[{}] START {} {}", request_id, method, path);
    let start = Instant::now();

    let mut resp = next.run(req).await;

    println!(
        "[{}] END {} {} {} {:.1}ms",
        request_id,
        method,
        path,
        resp.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    // A client-supplied ID could contain bytes a header refuses; skip it then.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    resp
}
