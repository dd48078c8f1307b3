use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        plan::{PlanTier, check_catalogue_quota, check_theme_access},
        settings::{merge_settings, validate_patch},
    },
    dto::catalogues::{
        CatalogueDetail, CatalogueList, CatalogueSummary, CreateCatalogueRequest,
        DuplicateCatalogueRequest, UpdateCatalogueRequest,
    },
    entity::{Catalogues, Categories, Products, catalogues, categories, products},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Catalogue, Category, Product},
    response::{ApiResponse, Meta, empty_data},
    routes::params::{CatalogueQuery, CatalogueSortBy, SortOrder},
    services::{
        access::{AccessLevel, load_catalogue_for, require_edit, require_owner, shared_catalogue_ids},
        subscription_service::{current_plan, lock_for_profile, plan_of},
    },
    state::AppState,
    themes::{self, DEFAULT_THEME},
};

fn require_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Catalogue name is required".into()));
    }
    Ok(name.to_string())
}

/// Resolve a theme id and check that `plan` may use it.
pub fn resolve_theme(theme_id: &str, plan: PlanTier) -> AppResult<&'static themes::Theme> {
    let theme = themes::find(theme_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown theme '{theme_id}'")))?;
    check_theme_access(plan, theme.id, theme.premium)?;
    Ok(theme)
}

async fn owned_count<C: ConnectionTrait>(conn: &C, owner_id: Uuid) -> AppResult<u64> {
    Ok(Catalogues::find()
        .filter(catalogues::Column::OwnerId.eq(owner_id))
        .count(conn)
        .await?)
}

async fn product_counts(state: &AppState, ids: &[Uuid]) -> AppResult<HashMap<Uuid, u64>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, i64)> = sqlx::query_as(
        "SELECT catalogue_id, COUNT(*) FROM products WHERE catalogue_id = ANY($1) GROUP BY catalogue_id",
    )
    .bind(ids)
    .fetch_all(&state.pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, count)| (id, count.max(0) as u64))
        .collect())
}

pub async fn list_catalogues(
    state: &AppState,
    user: &AuthUser,
    query: CatalogueQuery,
) -> AppResult<ApiResponse<CatalogueList>> {
    let (page, limit, offset) = query.normalize();
    let shared: HashMap<Uuid, AccessLevel> = shared_catalogue_ids(&state.orm, user.user_id)
        .await?
        .into_iter()
        .collect();

    let mut condition = Condition::all().add(
        Condition::any()
            .add(catalogues::Column::OwnerId.eq(user.user_id))
            .add(catalogues::Column::Id.is_in(shared.keys().copied().collect::<Vec<_>>())),
    );
    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(catalogues::Column::Name).ilike(format!("%{search}%")));
    }

    let sort_col = match query.sort_by.unwrap_or(CatalogueSortBy::UpdatedAt) {
        CatalogueSortBy::CreatedAt => catalogues::Column::CreatedAt,
        CatalogueSortBy::UpdatedAt => catalogues::Column::UpdatedAt,
        CatalogueSortBy::Name => catalogues::Column::Name,
    };
    let mut finder = Catalogues::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let rows = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = rows.iter().map(|c| c.id).collect();
    let counts = product_counts(state, &ids).await?;

    let items = rows
        .into_iter()
        .map(|model| {
            let access = if model.owner_id == user.user_id {
                AccessLevel::Owner
            } else {
                shared.get(&model.id).copied().unwrap_or(AccessLevel::Viewer)
            };
            CatalogueSummary {
                product_count: counts.get(&model.id).copied().unwrap_or(0),
                access,
                catalogue: Catalogue::from(model),
            }
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Catalogues", CatalogueList { items }, Some(meta)))
}

pub async fn create_catalogue(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCatalogueRequest,
) -> AppResult<ApiResponse<Catalogue>> {
    let name = require_name(&payload.name)?;
    let settings = match &payload.settings {
        Some(patch) => merge_settings(&Value::Object(Default::default()), validate_patch(patch)?),
        None => Value::Object(Default::default()),
    };

    let txn = state.orm.begin().await?;
    let plan = plan_of(&lock_for_profile(&txn, user.user_id).await?);
    check_catalogue_quota(plan, owned_count(&txn, user.user_id).await?)?;
    let theme = resolve_theme(payload.theme.as_deref().unwrap_or(DEFAULT_THEME), plan)?;

    let now = Utc::now();
    let catalogue = catalogues::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(user.user_id),
        name: Set(name),
        description: Set(payload.description.filter(|d| !d.trim().is_empty())),
        is_public: Set(payload.is_public.unwrap_or(false)),
        theme: Set(theme.id.to_string()),
        settings: Set(settings),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "catalogue_create",
        "catalogues",
        serde_json::json!({ "catalogue_id": catalogue.id, "plan": plan }),
    )
    .await;

    Ok(ApiResponse::success(
        "Catalogue created",
        Catalogue::from(catalogue),
        Some(Meta::empty()),
    ))
}

async fn detail<C: ConnectionTrait>(
    conn: &C,
    catalogue: catalogues::Model,
    access: AccessLevel,
) -> AppResult<CatalogueDetail> {
    let categories = Categories::find()
        .filter(categories::Column::CatalogueId.eq(catalogue.id))
        .order_by_asc(categories::Column::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    let products = Products::find()
        .filter(products::Column::CatalogueId.eq(catalogue.id))
        .order_by_asc(products::Column::SortOrder)
        .all(conn)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(CatalogueDetail {
        catalogue: Catalogue::from(catalogue),
        access,
        categories,
        products,
    })
}

pub async fn get_catalogue(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<CatalogueDetail>> {
    let access = load_catalogue_for(&state.orm, user, id).await?;
    let data = detail(&state.orm, access.catalogue, access.level).await?;
    Ok(ApiResponse::success("Catalogue", data, None))
}

/// Read-only view of a catalogue marked public. Private ones are `NotFound`.
pub async fn get_public_catalogue(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<CatalogueDetail>> {
    let catalogue = Catalogues::find_by_id(id)
        .filter(catalogues::Column::IsPublic.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let data = detail(&state.orm, catalogue, AccessLevel::Viewer).await?;
    Ok(ApiResponse::success("Catalogue", data, None))
}

pub async fn update_catalogue(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCatalogueRequest,
) -> AppResult<ApiResponse<Catalogue>> {
    let access = require_edit(&state.orm, user, id).await?;
    let owner_id = access.catalogue.owner_id;
    let mut active: catalogues::ActiveModel = access.catalogue.into();

    if let Some(name) = payload.name {
        active.name = Set(require_name(&name)?);
    }
    if let Some(description) = payload.description {
        let description = description.trim().to_string();
        active.description = Set((!description.is_empty()).then_some(description));
    }
    if let Some(is_public) = payload.is_public {
        active.is_public = Set(is_public);
    }
    if let Some(theme_id) = payload.theme {
        let plan = current_plan(&state.orm, owner_id).await?;
        active.theme = Set(resolve_theme(&theme_id, plan)?.id.to_string());
    }
    active.updated_at = Set(Utc::now().into());

    let catalogue = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "catalogue_update",
        "catalogues",
        serde_json::json!({ "catalogue_id": catalogue.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Catalogue::from(catalogue),
        Some(Meta::empty()),
    ))
}

pub async fn delete_catalogue(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Value>> {
    require_owner(&state.orm, user, id).await?;
    let result = Catalogues::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "catalogue_delete",
        "catalogues",
        serde_json::json!({ "catalogue_id": id }),
    )
    .await;

    Ok(ApiResponse::success("Deleted", empty_data(), Some(Meta::empty())))
}

/// Copy a catalogue with its settings, categories and products. Product
/// positions and category assignments carry over.
pub async fn duplicate_catalogue(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: DuplicateCatalogueRequest,
) -> AppResult<ApiResponse<Catalogue>> {
    let source = require_owner(&state.orm, user, id).await?.catalogue;
    let name = match payload.name {
        Some(name) => require_name(&name)?,
        None => format!("{} (copy)", source.name),
    };

    let txn = state.orm.begin().await?;
    let plan = plan_of(&lock_for_profile(&txn, user.user_id).await?);
    check_catalogue_quota(plan, owned_count(&txn, user.user_id).await?)?;
    let now = Utc::now();
    let copy = catalogues::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(user.user_id),
        name: Set(name),
        description: Set(source.description.clone()),
        is_public: Set(false),
        theme: Set(source.theme.clone()),
        settings: Set(source.settings.clone()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut category_map = HashMap::new();
    let source_categories = Categories::find()
        .filter(categories::Column::CatalogueId.eq(source.id))
        .order_by_asc(categories::Column::CreatedAt)
        .all(&txn)
        .await?;
    for category in source_categories {
        let new_id = Uuid::new_v4();
        category_map.insert(category.id, new_id);
        categories::ActiveModel {
            id: Set(new_id),
            catalogue_id: Set(copy.id),
            name: Set(category.name),
            description: Set(category.description),
            color: Set(category.color),
            // Keeps the source's category order.
            created_at: Set(category.created_at),
        }
        .insert(&txn)
        .await?;
    }

    let source_products = Products::find()
        .filter(products::Column::CatalogueId.eq(source.id))
        .order_by_asc(products::Column::SortOrder)
        .all(&txn)
        .await?;
    for product in source_products {
        products::ActiveModel {
            id: Set(Uuid::new_v4()),
            catalogue_id: Set(copy.id),
            category_id: Set(product.category_id.and_then(|c| category_map.get(&c).copied())),
            name: Set(product.name),
            description: Set(product.description),
            price: Set(product.price),
            price_display: Set(product.price_display),
            image_urls: Set(product.image_urls),
            sort_order: Set(product.sort_order),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "catalogue_duplicate",
        "catalogues",
        serde_json::json!({ "source_id": source.id, "catalogue_id": copy.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Catalogue duplicated",
        Catalogue::from(copy),
        Some(Meta::empty()),
    ))
}
