use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    audit,
    domain::plan::{PlanTier, SubscriptionStatus},
    dto::admin::{
        AdminCatalogueList, AdminStats, AdminUser, AdminUserList, PlanCount, SetPlanRequest,
        ThemeStat, ThemeStats,
    },
    entity::{CatalogueExports, Catalogues, Products, Subscriptions, Users, catalogues, subscriptions},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Catalogue, Subscription},
    response::{ApiResponse, Meta, empty_data},
    routes::params::{AdminUserQuery, CatalogueQuery},
    services::subscription_service::ensure_subscription,
    state::AppState,
    themes,
};

pub async fn get_stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<AdminStats>> {
    ensure_admin(user)?;

    let mut subscriptions = Vec::with_capacity(PlanTier::ALL.len());
    for plan in PlanTier::ALL {
        let count = Subscriptions::find()
            .filter(subscriptions::Column::Plan.eq(plan.as_str()))
            .count(&state.orm)
            .await?;
        subscriptions.push(PlanCount { plan, count });
    }

    let stats = AdminStats {
        users: Users::find().count(&state.orm).await?,
        catalogues: Catalogues::find().count(&state.orm).await?,
        products: Products::find().count(&state.orm).await?,
        exports: CatalogueExports::find().count(&state.orm).await?,
        subscriptions,
    };
    Ok(ApiResponse::success("Stats", stats, Some(Meta::empty())))
}

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: Uuid,
    email: String,
    role: String,
    company_name: Option<String>,
    plan: Option<String>,
    status: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AdminUserRow> for AdminUser {
    fn from(row: AdminUserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            role: row.role,
            company_name: row.company_name,
            plan: row
                .plan
                .and_then(|p| p.parse().ok())
                .unwrap_or(PlanTier::Free),
            status: row
                .status
                .and_then(|s| s.parse().ok())
                .unwrap_or(SubscriptionStatus::Active),
            created_at: row.created_at,
        }
    }
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: AdminUserQuery,
) -> AppResult<ApiResponse<AdminUserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.normalize();
    let pattern = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{q}%"));

    let rows: Vec<AdminUserRow> = sqlx::query_as(
        r#"
        SELECT u.id, u.email, u.role, p.company_name, s.plan, s.status, u.created_at
        FROM users u
        LEFT JOIN profiles p ON p.id = u.id
        LEFT JOIN subscriptions s ON s.profile_id = u.id
        WHERE ($1::text IS NULL OR u.email ILIKE $1)
        ORDER BY u.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(pattern.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let (total,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR email ILIKE $1)")
            .bind(pattern.as_deref())
            .fetch_one(&state.pool)
            .await?;

    let items = rows.into_iter().map(AdminUser::from).collect();
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", AdminUserList { items }, Some(meta)))
}

/// Override a user's plan by hand, e.g. for comps. The status becomes active.
pub async fn set_user_plan(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    payload: SetPlanRequest,
) -> AppResult<ApiResponse<Subscription>> {
    ensure_admin(user)?;
    Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let sub = ensure_subscription(&state.orm, user_id).await?;
    let previous = sub.plan.clone();
    let mut active: subscriptions::ActiveModel = sub.into();
    active.plan = Set(payload.plan.as_str().to_string());
    active.status = Set(SubscriptionStatus::Active.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "admin_set_plan",
        "subscriptions",
        serde_json::json!({ "user_id": user_id, "from": previous, "to": payload.plan }),
    )
    .await;

    Ok(ApiResponse::success(
        "Plan updated",
        Subscription::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn list_catalogues(
    state: &AppState,
    user: &AuthUser,
    query: CatalogueQuery,
) -> AppResult<ApiResponse<AdminCatalogueList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(catalogues::Column::Name).ilike(format!("%{search}%")));
    }
    let finder = Catalogues::find()
        .filter(condition)
        .order_by_desc(catalogues::Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Catalogue::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Catalogues",
        AdminCatalogueList { items },
        Some(meta),
    ))
}

pub async fn delete_catalogue(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Value>> {
    ensure_admin(user)?;
    let result = Catalogues::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::warn!(catalogue_id = %id, admin_id = %user.user_id, "catalogue removed by admin");
    audit::record(
        &state.orm,
        user.user_id,
        "admin_catalogue_delete",
        "catalogues",
        serde_json::json!({ "catalogue_id": id }),
    )
    .await;

    Ok(ApiResponse::success("Deleted", empty_data(), Some(Meta::empty())))
}

/// Selection counts for every registered theme, most popular first.
pub async fn theme_stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ThemeStats>> {
    ensure_admin(user)?;
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT theme_id, COUNT(*) FROM theme_selections GROUP BY theme_id")
            .fetch_all(&state.pool)
            .await?;
    let counts: HashMap<String, i64> = rows.into_iter().collect();

    let mut items: Vec<ThemeStat> = themes::all()
        .iter()
        .map(|theme| ThemeStat {
            theme_id: theme.id.to_string(),
            selections: counts.get(theme.id).copied().unwrap_or(0).max(0) as u64,
        })
        .collect();
    items.sort_by(|a, b| b.selections.cmp(&a.selections).then(a.theme_id.cmp(&b.theme_id)));

    Ok(ApiResponse::success("Theme stats", ThemeStats { items }, Some(Meta::empty())))
}
