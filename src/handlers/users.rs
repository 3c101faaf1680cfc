use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ValidJson, ValidPath};
use crate::messages;
use crate::schemas::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use model::entities::user;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Profile of a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UserDto {
    pub id: i32,
    #[validate(length(
        min = 2,
        max = 50,
        message = "Username has to be between 2 and 50 symbols"
    ))]
    pub username: String,
    #[validate(email(message = "Email has to be a valid address"))]
    pub email: String,
    #[validate(length(max = 50, message = "Name has to be at most 50 symbols"))]
    pub name: Option<String>,
    #[validate(length(max = 50, message = "Surname has to be at most 50 symbols"))]
    pub surname: Option<String>,
    /// Link to the profile picture
    #[validate(length(max = 255, message = "Avatar link has to be at most 255 symbols"))]
    pub avatar: Option<String>,
    #[validate(length(max = 20, message = "Phone has to be at most 20 symbols"))]
    pub phone: Option<String>,
}

impl From<user::Model> for UserDto {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            name: model.name,
            surname: model.surname,
            avatar: model.avatar,
            phone: model.phone,
        }
    }
}

/// Get the profile of the authenticated user
///
/// Only the owner may read a profile: `id` has to be the caller's own id.
#[utoipa::path(
    get,
    path = "/user/info/{id}",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User ID, must be the caller's own"),
    ),
    responses(
        (status = 200, description = "User profile", body = UserDto),
        (status = 400, description = "Negative identifier", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_info(
    State(state): State<AppState>,
    principal: Principal,
    ValidPath(id): ValidPath<i32>,
) -> ApiResult<Json<UserDto>> {
    trace!("Entering get_user_info function for id: {}", id);

    if id < 0 {
        return Err(ApiError::InvalidDto(
            state.messages.format(messages::INVALID_ID, &[&id]),
        ));
    }

    let user = user::Entity::find_by_username_or_email(&state.db, &principal.login)
        .await?
        .filter(|user| user.id == id)
        .ok_or_else(|| {
            warn!("User '{}' denied access to profile {}", principal.login, id);
            ApiError::AccessDenied(state.messages.get(messages::ACCESS_DENIED_USER_DATA))
        })?;

    info!("Successfully retrieved profile of user {}", user.id);
    Ok(Json(UserDto::from(user)))
}

/// Update the profile of the authenticated user
#[utoipa::path(
    put,
    path = "/user/info",
    tag = "users",
    request_body = UserDto,
    responses(
        (status = 202, description = "User profile updated", body = UserDto),
        (status = 400, description = "Invalid profile", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_user_info(
    State(state): State<AppState>,
    principal: Principal,
    ValidJson(request): ValidJson<UserDto>,
) -> ApiResult<(StatusCode, Json<UserDto>)> {
    trace!("Entering update_user_info function for id: {}", request.id);

    if principal.user_id != request.id {
        warn!(
            "User {} attempted to modify profile {}",
            principal.user_id, request.id
        );
        return Err(ApiError::AccessDenied(
            state.messages.get(messages::PERMISSION_DENIED_USER_PROFILE),
        ));
    }

    let txn = state.db.begin().await?;

    let existing = user::Entity::find_by_id(request.id)
        .one(&txn)
        .await?
        .ok_or_else(|| {
            warn!("User with ID {} not found for update", request.id);
            ApiError::NotFound(state.messages.format(messages::USER_NOT_FOUND, &[&request.id]))
        })?;

    if user::Entity::username_taken(&txn, &request.username, existing.id).await? {
        return Err(ApiError::InvalidDto(
            state.messages.format(messages::USER_DUPLICATE_USERNAME, &[&request.username]),
        ));
    }
    if user::Entity::email_taken(&txn, &request.email, existing.id).await? {
        return Err(ApiError::InvalidDto(
            state.messages.format(messages::USER_DUPLICATE_EMAIL, &[&request.email]),
        ));
    }

    let mut user_active: user::ActiveModel = existing.into();
    user_active.username = Set(request.username);
    user_active.email = Set(request.email);
    user_active.name = Set(request.name);
    user_active.surname = Set(request.surname);
    user_active.avatar = Set(request.avatar);
    user_active.phone = Set(request.phone);

    debug!("Persisting profile of user {}", request.id);
    let updated = user_active.update(&txn).await?;
    txn.commit().await?;

    info!("User with ID {} updated successfully", updated.id);
    Ok((StatusCode::ACCEPTED, Json(UserDto::from(updated))))
}
