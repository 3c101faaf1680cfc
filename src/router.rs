use crate::handlers::{
    categories::{
        create_category, delete_category, get_all_categories, get_category, get_category_names,
        update_category,
    },
    health::health_check,
    users::{get_user_info, update_user_info},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User profile routes
        .route("/user/info/:id", get(get_user_info))
        .route("/user/info", put(update_user_info))
        // Category routes
        .route("/category/names", get(get_category_names))
        .route("/category/all", get(get_all_categories))
        .route("/category", post(create_category).put(update_category))
        .route("/category/:id", get(get_category).delete(delete_category))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
