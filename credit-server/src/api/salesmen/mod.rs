//! Salesman API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/salesmen", routes())
}

fn routes() -> Router<ServerState> {
    // Read routes: admin-or-self checks happen in the handlers
    let read_routes = Router::new()
        .route("/{id}", get(handler::get_by_id))
        .route("/user/{user_id}", get(handler::get_by_user));

    // Management routes: admin only
    let manage_routes = Router::new()
        .route("/", get(handler::list).post(handler::register))
        .route("/{id}", put(handler::update_limit).delete(handler::remove))
        .route("/{id}/suspend", put(handler::suspend))
        .route("/{id}/restore", put(handler::restore))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
