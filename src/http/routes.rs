use axum::{routing::delete, routing::get, routing::patch, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn dashboard() -> Router<AppState> {
    Router::new().route("/dashboard", get(handlers::dashboard_summary))
}

pub fn listings() -> Router<AppState> {
    Router::new()
        .route("/listings", get(handlers::list_listings))
        .route("/listings/refresh", post(handlers::refresh_listings))
        .route("/listings/:key", delete(handlers::delete_listing))
        .route("/listings/:key/approve", post(handlers::approve_listing))
        .route("/listings/:key/reject", post(handlers::reject_listing))
        .route(
            "/listings/:key/rejection",
            post(handlers::start_rejection)
                .patch(handlers::edit_rejection)
                .delete(handlers::cancel_rejection),
        )
        .route(
            "/listings/:key/rejection/submit",
            post(handlers::submit_rejection),
        )
}

pub fn users() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/:id/block", post(handlers::block_user))
        .route("/users/:id/unblock", post(handlers::unblock_user))
        .route("/users/:id/role", patch(handlers::update_user_role))
}

pub fn directory() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(handlers::list_contacts))
        .route("/bookings", get(handlers::list_bookings))
}
