use axum::Extension;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

use crate::server::dtos::health_dto::{
    CookieJarHealth, HealthResponse, HealthStatus, ServiceHealthDetails,
};
use crate::server::services::proxy_services::ProxyServices;
use crate::server::{get_app_version, get_uptime_seconds};

/// health endpoint, the proxy has no backing store so this is mostly a liveness probe that also
/// shows how many origins the cookie jar is tracking
pub async fn health_endpoint(
    Extension(services): Extension<ProxyServices>,
) -> (StatusCode, Json<HealthResponse>) {
    let cookie_jar = CookieJarHealth {
        status: HealthStatus::Healthy,
        origins: services.cookies.origin_count(),
    };

    let response = HealthResponse {
        status: HealthStatus::Healthy,
        timestamp: Utc::now(),
        uptime_seconds: get_uptime_seconds(),
        version: get_app_version().to_string(),
        environment: format!("{:?}", services.config.cargo_env).to_lowercase(),
        services: ServiceHealthDetails { cookie_jar },
    };

    (StatusCode::OK, Json(response))
}
