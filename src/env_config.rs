//! Environment configuration for the server binary.

/// Read `PORT` (default 8080).
pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080)
}
