//! Products within a catalogue.
//!
//! Positions are always `0..n` per catalogue. Every write that touches
//! positions locks the catalogue row first and relies on the deferred
//! unique constraint, so intermediate duplicates inside a transaction are
//! fine.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use serde_json::Value;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    audit,
    domain::ordering::{SortPosition, assign_positions, move_item, validate_reorder},
    dto::products::{
        CreateProductRequest, MoveProductRequest, ProductList, ProductListQuery,
        ReorderProductsRequest, UpdateProductRequest,
    },
    entity::{Categories, Products, categories, products},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta, empty_data},
    services::access::{load_catalogue_for, require_edit},
    state::AppState,
};

fn check_price(price: Decimal) -> AppResult<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::BadRequest("Price must not be negative".into()));
    }
    Ok(price.round_dp(2))
}

fn clean_urls(urls: Vec<String>) -> Value {
    let urls: Vec<String> = urls
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();
    serde_json::json!(urls)
}

async fn check_category(state: &AppState, catalogue_id: Uuid, category_id: Uuid) -> AppResult<()> {
    let found = Categories::find_by_id(category_id)
        .filter(categories::Column::CatalogueId.eq(catalogue_id))
        .one(&state.orm)
        .await?;
    if found.is_none() {
        return Err(AppError::BadRequest(
            "Category does not belong to this catalogue".into(),
        ));
    }
    Ok(())
}

async fn lock_catalogue(tx: &mut Transaction<'_, Postgres>, catalogue_id: Uuid) -> AppResult<()> {
    sqlx::query("SELECT id FROM catalogues WHERE id = $1 FOR UPDATE")
        .bind(catalogue_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(())
}

async fn ordered_ids(tx: &mut Transaction<'_, Postgres>, catalogue_id: Uuid) -> AppResult<Vec<Uuid>> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT id FROM products WHERE catalogue_id = $1 ORDER BY sort_order, created_at")
            .bind(catalogue_id)
            .fetch_all(&mut **tx)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

async fn write_positions(
    tx: &mut Transaction<'_, Postgres>,
    catalogue_id: Uuid,
    positions: &[SortPosition],
) -> AppResult<()> {
    let ids: Vec<Uuid> = positions.iter().map(|p| p.id).collect();
    let orders: Vec<i32> = positions.iter().map(|p| p.sort_order).collect();
    sqlx::query(
        r#"
        UPDATE products AS p
        SET sort_order = v.sort_order, updated_at = NOW()
        FROM UNNEST($2::uuid[], $3::int4[]) AS v(id, sort_order)
        WHERE p.id = v.id AND p.catalogue_id = $1 AND p.sort_order <> v.sort_order
        "#,
    )
    .bind(catalogue_id)
    .bind(ids)
    .bind(orders)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn ordered_products(state: &AppState, catalogue_id: Uuid) -> AppResult<Vec<Product>> {
    Ok(Products::find()
        .filter(products::Column::CatalogueId.eq(catalogue_id))
        .order_by_asc(products::Column::SortOrder)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect())
}

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    query: ProductListQuery,
) -> AppResult<ApiResponse<ProductList>> {
    load_catalogue_for(&state.orm, user, catalogue_id).await?;

    let mut finder = Products::find().filter(products::Column::CatalogueId.eq(catalogue_id));
    if let Some(category_id) = query.category_id {
        finder = finder.filter(products::Column::CategoryId.eq(category_id));
    }
    let items = finder
        .order_by_asc(products::Column::SortOrder)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success("Products", ProductList { items }, None))
}

/// New products go to the end of the catalogue.
pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    require_edit(&state.orm, user, catalogue_id).await?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Product name is required".into()));
    }
    let price = check_price(payload.price)?;
    if let Some(category_id) = payload.category_id {
        check_category(state, catalogue_id, category_id).await?;
    }

    let id = Uuid::new_v4();
    let mut tx = state.pool.begin().await?;
    lock_catalogue(&mut tx, catalogue_id).await?;
    let (next,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE catalogue_id = $1")
        .bind(catalogue_id)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO products
            (id, catalogue_id, category_id, name, description, price, price_display, image_urls, sort_order)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(catalogue_id)
    .bind(payload.category_id)
    .bind(name)
    .bind(payload.description.filter(|d| !d.trim().is_empty()))
    .bind(price)
    .bind(payload.price_display.unwrap_or_default().as_str())
    .bind(clean_urls(payload.image_urls.unwrap_or_default()))
    .bind(next as i32)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Product::from)
        .ok_or(AppError::NotFound)?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "catalogue_id": catalogue_id, "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    product_id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    require_edit(&state.orm, user, catalogue_id).await?;
    let existing = Products::find_by_id(product_id)
        .filter(products::Column::CatalogueId.eq(catalogue_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: products::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Product name is required".into()));
        }
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        let description = description.trim().to_string();
        active.description = Set((!description.is_empty()).then_some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(check_price(price)?);
    }
    if let Some(display) = payload.price_display {
        active.price_display = Set(display.as_str().to_string());
    }
    if let Some(urls) = payload.image_urls {
        active.image_urls = Set(clean_urls(urls));
    }
    if payload.clear_category {
        active.category_id = Set(None);
    } else if let Some(category_id) = payload.category_id {
        check_category(state, catalogue_id, category_id).await?;
        active.category_id = Set(Some(category_id));
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "catalogue_id": catalogue_id, "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Delete a product and close the gap it leaves in the ordering.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    product_id: Uuid,
) -> AppResult<ApiResponse<Value>> {
    require_edit(&state.orm, user, catalogue_id).await?;

    let mut tx = state.pool.begin().await?;
    lock_catalogue(&mut tx, catalogue_id).await?;
    let removed: Option<(i32,)> = sqlx::query_as(
        "DELETE FROM products WHERE id = $1 AND catalogue_id = $2 RETURNING sort_order",
    )
    .bind(product_id)
    .bind(catalogue_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some((position,)) = removed else {
        return Err(AppError::NotFound);
    };

    sqlx::query(
        "UPDATE products SET sort_order = sort_order - 1 WHERE catalogue_id = $1 AND sort_order > $2",
    )
    .bind(catalogue_id)
    .bind(position)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "catalogue_id": catalogue_id, "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::success("Deleted", empty_data(), Some(Meta::empty())))
}

/// Replace the whole ordering. The request must list every product once
/// with positions `0..n`.
pub async fn reorder_products(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    payload: ReorderProductsRequest,
) -> AppResult<ApiResponse<ProductList>> {
    require_edit(&state.orm, user, catalogue_id).await?;

    let mut tx = state.pool.begin().await?;
    lock_catalogue(&mut tx, catalogue_id).await?;
    let existing = ordered_ids(&mut tx, catalogue_id).await?;
    let new_order = validate_reorder(&existing, &payload.products)?;
    write_positions(&mut tx, catalogue_id, &assign_positions(&new_order)).await?;
    tx.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_reorder",
        "products",
        serde_json::json!({ "catalogue_id": catalogue_id, "count": new_order.len() }),
    )
    .await;

    let items = ordered_products(state, catalogue_id).await?;
    Ok(ApiResponse::success(
        "Products reordered",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

/// Move one product to `to_index`, shifting the ones in between.
pub async fn move_product(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
    payload: MoveProductRequest,
) -> AppResult<ApiResponse<ProductList>> {
    require_edit(&state.orm, user, catalogue_id).await?;

    let mut tx = state.pool.begin().await?;
    lock_catalogue(&mut tx, catalogue_id).await?;
    let existing = ordered_ids(&mut tx, catalogue_id).await?;
    let from = existing
        .iter()
        .position(|id| *id == payload.product_id)
        .ok_or(AppError::NotFound)?;
    let new_order = move_item(existing, from, payload.to_index)?;
    write_positions(&mut tx, catalogue_id, &assign_positions(&new_order)).await?;
    tx.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_move",
        "products",
        serde_json::json!({
            "catalogue_id": catalogue_id,
            "product_id": payload.product_id,
            "from": from,
            "to": payload.to_index,
        }),
    )
    .await;

    let items = ordered_products(state, catalogue_id).await?;
    Ok(ApiResponse::success(
        "Product moved",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceDisplay;
    use std::str::FromStr;

    #[test]
    fn negative_prices_are_rejected_and_others_rounded() {
        assert!(check_price(Decimal::from_str("-0.01").unwrap()).is_err());
        assert_eq!(check_price(Decimal::ZERO).unwrap(), Decimal::ZERO);
        assert_eq!(
            check_price(Decimal::from_str("12.345").unwrap()).unwrap(),
            Decimal::from_str("12.34").unwrap()
        );
    }

    #[test]
    fn blank_image_urls_are_dropped() {
        let urls = clean_urls(vec![" https://cdn.test/a.jpg ".into(), "  ".into()]);
        assert_eq!(urls, serde_json::json!(["https://cdn.test/a.jpg"]));
    }

    #[test]
    fn default_price_display_is_show() {
        assert_eq!(PriceDisplay::default().as_str(), "show");
    }
}
