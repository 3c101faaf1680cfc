use crate::auth::JwtVerifier;
use crate::handlers::{
    categories::{CategoryDto, SubcategoryDto},
    users::UserDto,
};
use crate::messages::MessageCatalog;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Access token verification
    pub auth: Arc<JwtVerifier>,
    /// User-facing messages
    pub messages: Arc<MessageCatalog>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::get_user_info,
        crate::handlers::users::update_user_info,
        crate::handlers::categories::get_category_names,
        crate::handlers::categories::get_all_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            UserDto,
            CategoryDto,
            SubcategoryDto,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Profile of the authenticated user"),
        (name = "categories", description = "Item category taxonomy"),
    ),
    info(
        title = "Items Exchange API",
        description = "Backend of the items exchange platform: user profiles and the category taxonomy",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
