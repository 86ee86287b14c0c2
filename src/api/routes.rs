use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Stateless engine call
        .route("/filter", post(handlers::filter_items))
        // Sessions
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:id", delete(handlers::delete_session))
        // Per-context filter state
        .route("/sessions/:id/contexts/:context", get(handlers::get_context))
        .route("/sessions/:id/contexts/:context/facets", put(handlers::set_facet))
        .route("/sessions/:id/contexts/:context/sort", put(handlers::set_sort))
        .route("/sessions/:id/contexts/:context/reset", post(handlers::reset_filters))
        // Feed and derived results
        .route("/sessions/:id/contexts/:context/query", post(handlers::change_query))
        .route("/sessions/:id/contexts/:context/pages", post(handlers::append_page))
        .route("/sessions/:id/contexts/:context/results", get(handlers::get_results))
        .with_state(state)
        // Outermost first: the request id is set before the trace span opens
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}
