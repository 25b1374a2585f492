//! Request-level middleware.

use std::time::Instant;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::CorsConfig;
use crate::observability::metrics;

/// Count and time every request.
pub async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    let response = next.run(request).await;

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

/// Build the CORS layer.
///
/// `"*"` mirrors the caller's origin so credentials stay allowed, which a
/// literal wildcard would forbid.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::mirror_request()
    } else {
        let list: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring unusable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(config.max_age_secs))
}
