//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router: the drawing socket at `/ws`, a health check, and a
//! read-only stats endpoint. CORS is limited to the configured origins and
//! to GET/POST.

pub mod ws;

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::AllowedOrigins;
use crate::services::session::SessionStats;
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState, origins: &AllowedOrigins) -> Router {
    Router::new()
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .route("/api/stats", get(stats))
        .layer(cors_layer(origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let allow_origin = match origins {
        AllowedOrigins::Any => AllowOrigin::any(),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(%origin, error = %e, "cors: skipping invalid origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn stats(State(state): State<AppState>) -> Json<SessionStats> {
    Json(state.stats().await)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
