use crate::auth::AdminPrincipal;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ValidJson, ValidPath};
use crate::messages;
use crate::schemas::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use model::entities::{category, subcategory};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.message = Some(Cow::Borrowed("Category name has to be not empty"));
        return Err(error);
    }
    Ok(())
}

/// Subcategory as exchanged over the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct SubcategoryDto {
    /// Zero for a subcategory that does not exist yet
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    #[validate(length(
        min = 3,
        max = 50,
        message = "Subcategory name has to be between 3 and 50 symbols"
    ))]
    pub name: String,
}

/// Category with its subcategories.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CategoryDto {
    /// Zero when creating, the existing id when updating
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    #[validate(
        custom(function = "not_empty"),
        length(
            min = 3,
            max = 50,
            message = "Category name has to be between 3 and 50 symbols"
        )
    )]
    pub name: String,
    #[validate(required(message = "Subcategories has to be not null"), nested)]
    pub subcategories: Option<Vec<SubcategoryDto>>,
}

impl From<subcategory::Model> for SubcategoryDto {
    fn from(model: subcategory::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl CategoryDto {
    fn from_models(category: category::Model, subcategories: Vec<subcategory::Model>) -> Self {
        Self {
            id: category.id,
            name: category.name,
            subcategories: Some(subcategories.into_iter().map(SubcategoryDto::from).collect()),
        }
    }

    async fn load<C: ConnectionTrait>(db: &C, category: category::Model) -> Result<Self, DbErr> {
        let subcategories = category.subcategories(db).await?;
        Ok(Self::from_models(category, subcategories))
    }
}

/// Get the names of all categories
#[utoipa::path(
    get,
    path = "/category/names",
    tag = "categories",
    responses(
        (status = 200, description = "Category names", body = Vec<String>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_category_names(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    trace!("Entering get_category_names function");

    let names: Vec<String> = category::Entity::find()
        .select_only()
        .column(category::Column::Name)
        .order_by_asc(category::Column::Id)
        .into_tuple()
        .all(&state.db)
        .await?;

    info!("Retrieved {} category names", names.len());
    Ok(Json(names))
}

/// Get all categories with their subcategories
#[utoipa::path(
    get,
    path = "/category/all",
    tag = "categories",
    responses(
        (status = 200, description = "All categories", body = Vec<CategoryDto>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_all_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryDto>>> {
    trace!("Entering get_all_categories function");

    let rows = category::Entity::find()
        .find_with_related(subcategory::Entity)
        .order_by_asc(category::Column::Id)
        .all(&state.db)
        .await?;

    let categories: Vec<CategoryDto> = rows
        .into_iter()
        .map(|(category, mut subcategories)| {
            subcategories.sort_by_key(|s| s.id);
            CategoryDto::from_models(category, subcategories)
        })
        .collect();

    info!("Retrieved {} categories", categories.len());
    Ok(Json(categories))
}

/// Get a single category by ID
#[utoipa::path(
    get,
    path = "/category/{id}",
    tag = "categories",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = CategoryDto),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> ApiResult<Json<CategoryDto>> {
    debug!("Fetching category with ID: {}", id);

    let category = category::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Category {} not found", id);
            ApiError::NotFound(state.messages.format(messages::CATEGORY_NOT_FOUND, &[&id]))
        })?;

    let dto = CategoryDto::load(&state.db, category).await?;
    info!("Category {} found", id);
    Ok(Json(dto))
}

/// Create a new category together with its subcategories
#[utoipa::path(
    post,
    path = "/category",
    tag = "categories",
    request_body = CategoryDto,
    responses(
        (status = 201, description = "Category created successfully", body = CategoryDto),
        (status = 400, description = "Invalid category", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_category(
    State(state): State<AppState>,
    AdminPrincipal(principal): AdminPrincipal,
    ValidJson(request): ValidJson<CategoryDto>,
) -> ApiResult<(StatusCode, Json<CategoryDto>)> {
    trace!("Admin '{}' writing category", principal.login);
    debug!("Creating category with name: {}", request.name);

    if request.id != 0 {
        return Err(ApiError::InvalidDto(
            state.messages.format(messages::CATEGORY_ID_NOT_ZERO, &[&request.id]),
        ));
    }

    let subcategories = request.subcategories.unwrap_or_default();
    if let Some(sub) = subcategories.iter().find(|s| s.id != 0) {
        return Err(ApiError::InvalidDto(
            state.messages.format(messages::SUBCATEGORY_ID_NOT_ZERO, &[&sub.id]),
        ));
    }

    let txn = state.db.begin().await?;

    if category::Entity::name_taken(&txn, &request.name, None).await? {
        return Err(ApiError::InvalidDto(
            state.messages.format(messages::CATEGORY_DUPLICATE_NAME, &[&request.name]),
        ));
    }

    let created = category::ActiveModel {
        name: Set(request.name),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for sub in subcategories {
        trace!("Adding subcategory '{}' to category {}", sub.name, created.id);
        subcategory::ActiveModel {
            name: Set(sub.name),
            category_id: Set(created.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    let dto = CategoryDto::load(&txn, created).await?;
    txn.commit().await?;

    info!("Category created successfully with ID: {}", dto.id);
    Ok((StatusCode::CREATED, Json(dto)))
}

/// Update a category and reconcile its subcategories
///
/// Subcategories with id zero are created, the others are renamed, and
/// existing subcategories missing from the payload are removed.
#[utoipa::path(
    put,
    path = "/category",
    tag = "categories",
    request_body = CategoryDto,
    responses(
        (status = 202, description = "Category updated successfully", body = CategoryDto),
        (status = 400, description = "Invalid category or unknown identifier", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_category(
    State(state): State<AppState>,
    AdminPrincipal(principal): AdminPrincipal,
    ValidJson(request): ValidJson<CategoryDto>,
) -> ApiResult<(StatusCode, Json<CategoryDto>)> {
    trace!("Admin '{}' writing category", principal.login);
    debug!("Updating category with ID: {}", request.id);

    let subcategories = request.subcategories.unwrap_or_default();
    let txn = state.db.begin().await?;

    let existing = category::Entity::find_by_id(request.id)
        .one(&txn)
        .await?
        .ok_or_else(|| {
            warn!("Category {} not found for update", request.id);
            ApiError::IllegalIdentifier(
                state.messages.format(messages::CATEGORY_NOT_FOUND, &[&request.id]),
            )
        })?;

    if category::Entity::name_taken(&txn, &request.name, Some(existing.id)).await? {
        return Err(ApiError::InvalidDto(
            state.messages.format(messages::CATEGORY_DUPLICATE_NAME, &[&request.name]),
        ));
    }

    let current = existing.subcategories(&txn).await?;
    let current_ids: HashSet<i32> = current.iter().map(|s| s.id).collect();

    for sub in subcategories.iter().filter(|s| s.id != 0) {
        if current_ids.contains(&sub.id) {
            continue;
        }
        let key = match subcategory::Entity::find_by_id(sub.id).one(&txn).await? {
            Some(_) => messages::SUBCATEGORY_FOREIGN,
            None => messages::SUBCATEGORY_NOT_FOUND,
        };
        warn!("Subcategory {} rejected for category {}", sub.id, existing.id);
        return Err(ApiError::InvalidDto(state.messages.format(key, &[&sub.id])));
    }

    let kept: HashSet<i32> = subcategories.iter().map(|s| s.id).filter(|id| *id != 0).collect();
    for removed in current.iter().filter(|s| !kept.contains(&s.id)) {
        if removed.product_count(&txn).await? > 0 {
            warn!("Subcategory {} still has products", removed.id);
            return Err(ApiError::InvalidDto(
                state.messages.format(messages::SUBCATEGORY_HAS_PRODUCTS, &[&removed.id]),
            ));
        }
        debug!("Removing subcategory {} from category {}", removed.id, existing.id);
        subcategory::Entity::delete_by_id(removed.id).exec(&txn).await?;
    }

    let mut category_active: category::ActiveModel = existing.into();
    category_active.name = Set(request.name);
    let updated = category_active.update(&txn).await?;

    for sub in subcategories {
        if sub.id == 0 {
            trace!("Adding subcategory '{}' to category {}", sub.name, updated.id);
            subcategory::ActiveModel {
                name: Set(sub.name),
                category_id: Set(updated.id),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        } else {
            trace!("Renaming subcategory {} to '{}'", sub.id, sub.name);
            subcategory::ActiveModel {
                id: Set(sub.id),
                name: Set(sub.name),
                category_id: Set(updated.id),
            }
            .update(&txn)
            .await?;
        }
    }

    let dto = CategoryDto::load(&txn, updated).await?;
    txn.commit().await?;

    info!("Category {} updated successfully", dto.id);
    Ok((StatusCode::ACCEPTED, Json(dto)))
}

/// Delete a category and its subcategories
#[utoipa::path(
    delete,
    path = "/category/{id}",
    tag = "categories",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted successfully"),
        (status = 400, description = "Unknown category or it still has products", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    AdminPrincipal(principal): AdminPrincipal,
    ValidPath(id): ValidPath<i32>,
) -> ApiResult<StatusCode> {
    trace!("Admin '{}' deleting category", principal.login);
    debug!("Deleting category with ID: {}", id);

    let txn = state.db.begin().await?;

    let existing = category::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| {
            warn!("Category {} not found for deletion", id);
            ApiError::InvalidDto(state.messages.format(messages::CATEGORY_NOT_FOUND, &[&id]))
        })?;

    if existing.product_count(&txn).await? > 0 {
        warn!("Category {} has subcategories with products", id);
        return Err(ApiError::InvalidDto(
            state.messages.format(messages::CATEGORY_HAS_PRODUCTS, &[&id]),
        ));
    }

    let removed = subcategory::Entity::delete_many()
        .filter(subcategory::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    debug!("Removed {} subcategories of category {}", removed.rows_affected, id);

    category::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!("Category {} deleted successfully", id);
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(name: &str) -> CategoryDto {
        CategoryDto {
            id: 0,
            name: name.to_string(),
            subcategories: Some(vec![]),
        }
    }

    fn name_messages(dto: &CategoryDto) -> Vec<String> {
        let errors = dto.validate().unwrap_err();
        errors.field_errors()["name"]
            .iter()
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_name_reports_both_rules() {
        let messages = name_messages(&dto(""));
        assert!(messages.contains(&"Category name has to be not empty".to_string()));
        assert!(messages.contains(&"Category name has to be between 3 and 50 symbols".to_string()));
    }

    #[test]
    fn test_short_name_reports_length_only() {
        let messages = name_messages(&dto("ab"));
        assert_eq!(messages, vec!["Category name has to be between 3 and 50 symbols"]);
    }

    #[test]
    fn test_valid_name() {
        assert!(dto("shoes").validate().is_ok());
    }
}
