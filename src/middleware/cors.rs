use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::AppConfig;

/// Cross-origin policy: any origin in production, only the configured dev
/// origin otherwise. Credentials are allowed in both modes, so "any origin"
/// is expressed by echoing the request origin. A foreign origin in development
/// gets no `Access-Control-Allow-Origin` header at all.
pub fn cors_layer(config: &AppConfig) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let origin = if config.is_production() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list([HeaderValue::from_str(&config.cors.dev_origin)?])
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
