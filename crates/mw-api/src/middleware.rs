//! movewiki/crates/mw-api/src/middleware.rs Middleware
//!
//! Custom middleware for security and logging.

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};

/// Access log line per request:
/// remote-ip "request-line" status-code response-size "referrer" time-taken
pub fn standard_middleware() -> Logger {
    Logger::new(r#"%a "%r" %s %b "%{Referer}i" %Dms"#)
}

// Configures CORS (Cross-Origin Resource Sharing) for feed readers and
// embeds on other origins.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST"])
        .max_age(3600)
}

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
        .add(("X-Frame-Options", "SAMEORIGIN"))
}
