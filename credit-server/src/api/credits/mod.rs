//! Credit API module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/credits", routes())
}

fn routes() -> Router<ServerState> {
    // Read routes: admin-or-owner checks happen in the handlers
    let read_routes = Router::new()
        .route("/{id}", get(handler::get_by_id))
        .route("/salesman/{salesman_id}", get(handler::by_salesman))
        .route(
            "/salesman/{salesman_id}/exposure",
            get(handler::exposure),
        );

    // Management routes: admin only
    let manage_routes = Router::new()
        .route("/", get(handler::list).post(handler::issue))
        .route("/{id}", delete(handler::revoke))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
