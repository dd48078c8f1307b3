use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait, sea_query::Expr,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit,
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    entity::{Categories, Products, categories, products},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Category,
    response::{ApiResponse, Meta, empty_data},
    services::access::{load_catalogue_for, require_edit},
    state::AppState,
};

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn find_in_catalogue(
    state: &AppState,
    catalogue_id: Uuid,
    category_id: Uuid,
) -> AppResult<categories::Model> {
    Categories::find_by_id(category_id)
        .filter(categories::Column::CatalogueId.eq(catalogue_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list_categories(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
) -> AppResult<ApiResponse<CategoryList>> {
    load_catalogue_for(&state.orm, user, catalogue_id).await?;
    let items = Categories::find()
        .filter(categories::Column::CatalogueId.eq(catalogue_id))
        .order_by_asc(categories::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(ApiResponse::success("Categories", CategoryList { items }, None))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    require_edit(&state.orm, user, catalogue_id).await?;
    let name = clean(Some(payload.name))
        .ok_or_else(|| AppError::BadRequest("Category name is required".into()))?;

    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        catalogue_id: Set(catalogue_id),
        name: Set(name),
        description: Set(clean(payload.description)),
        color: Set(clean(payload.color)),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "catalogue_id": catalogue_id, "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    category_id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    require_edit(&state.orm, user, catalogue_id).await?;
    let existing = find_in_catalogue(state, catalogue_id, category_id).await?;

    let mut active: categories::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = clean(Some(name))
            .ok_or_else(|| AppError::BadRequest("Category name is required".into()))?;
        active.name = Set(name);
    }
    if payload.description.is_some() {
        active.description = Set(clean(payload.description));
    }
    if payload.color.is_some() {
        active.color = Set(clean(payload.color));
    }
    let category = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

/// Delete a category. Its products stay in the catalogue, uncategorised.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    category_id: Uuid,
) -> AppResult<ApiResponse<Value>> {
    require_edit(&state.orm, user, catalogue_id).await?;
    find_in_catalogue(state, catalogue_id, category_id).await?;

    let txn = state.orm.begin().await?;
    let detached = Products::update_many()
        .col_expr(products::Column::CategoryId, Expr::value(Option::<Uuid>::None))
        .filter(products::Column::CategoryId.eq(category_id))
        .exec(&txn)
        .await?;
    Categories::delete_by_id(category_id).exec(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "category_delete",
        "categories",
        serde_json::json!({
            "catalogue_id": catalogue_id,
            "category_id": category_id,
            "detached_products": detached.rows_affected,
        }),
    )
    .await;

    Ok(ApiResponse::success("Deleted", empty_data(), Some(Meta::empty())))
}
