use anyhow::{anyhow, Result};
use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use crate::AppState;

mod error;
mod handlers;
mod routes;

pub use error::AppError;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn router(state: AppState, cors_allow_origin: Option<&str>) -> Result<Router> {
    let cors = match cors_allow_origin {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)
                .map_err(|err| anyhow!("invalid CORS_ALLOW_ORIGIN: {}", err))?;
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    };

    Ok(Router::new()
        .merge(routes::health())
        .merge(routes::dashboard())
        .merge(routes::listings())
        .merge(routes::users())
        .merge(routes::directory())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state))
}
