use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn mapping_routes(state: Arc<AppConfig>) -> Router {
    // GET takes a patient id, DELETE a mapping id; they share the route
    // segment so the parameter is named plainly.
    let protected_routes = Router::new()
        .route("/", post(handlers::create_mapping))
        .route("/", get(handlers::list_mappings))
        .route("/{id}", get(handlers::list_mappings_for_patient))
        .route("/{id}", delete(handlers::delete_mapping))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
