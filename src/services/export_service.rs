use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        layout::{PrintLayout, build_layout},
        plan::check_export_quota,
        settings::resolve_style,
    },
    entity::{Categories, Products, catalogue_exports, categories, products},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Catalogue, Category, Product},
    response::{ApiResponse, Meta},
    services::{
        access::load_catalogue_for,
        subscription_service::{exports_since, lock_for_profile, period_start, plan_of},
    },
    state::AppState,
};

/// Build the print layout for a catalogue and count it against the caller's
/// export quota. The PDF itself is rendered client-side from the layout.
pub async fn export_catalogue(
    state: &AppState,
    user: &AuthUser,
    catalogue_id: Uuid,
) -> AppResult<ApiResponse<PrintLayout>> {
    let access = load_catalogue_for(&state.orm, user, catalogue_id).await?;

    let now = Utc::now();
    let txn = state.orm.begin().await?;
    let sub = lock_for_profile(&txn, user.user_id).await?;
    let plan = plan_of(&sub);
    let used = exports_since(&txn, user.user_id, period_start(&sub, now)).await?;
    check_export_quota(plan, used)?;

    let categories: Vec<Category> = Categories::find()
        .filter(categories::Column::CatalogueId.eq(catalogue_id))
        .order_by_asc(categories::Column::CreatedAt)
        .all(&txn)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    let products: Vec<Product> = Products::find()
        .filter(products::Column::CatalogueId.eq(catalogue_id))
        .order_by_asc(products::Column::SortOrder)
        .all(&txn)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let catalogue = Catalogue::from(access.catalogue);
    let style = resolve_style(&catalogue.settings);
    let layout = build_layout(&catalogue, &categories, &products, &style);

    let export = catalogue_exports::ActiveModel {
        id: Set(Uuid::new_v4()),
        catalogue_id: Set(Some(catalogue_id)),
        profile_id: Set(user.user_id),
        page_count: Set(layout.page_count as i32),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(
        catalogue_id = %catalogue_id,
        pages = layout.page_count,
        used = used + 1,
        "catalogue exported"
    );
    audit::record(
        &state.orm,
        user.user_id,
        "catalogue_export",
        "catalogue_exports",
        serde_json::json!({ "catalogue_id": catalogue_id, "export_id": export.id }),
    )
    .await;

    Ok(ApiResponse::success("Export ready", layout, Some(Meta::empty())))
}
