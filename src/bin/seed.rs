use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use catfy_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    domain::plan::{PlanTier, SubscriptionStatus},
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@catfy.local", "admin12345", "admin").await?;
    let demo_id = ensure_user(&pool, "demo@catfy.local", "demo12345", "user").await?;
    ensure_plan(&pool, admin_id, PlanTier::Yearly).await?;
    let catalogue_id = seed_catalogue(&pool, demo_id).await?;

    tracing::info!(%admin_id, %demo_id, ?catalogue_id, "seed completed");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    sqlx::query("INSERT INTO profiles (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
        .bind(user_id)
        .execute(pool)
        .await?;
    sqlx::query(
        r#"
        INSERT INTO subscriptions (id, profile_id, plan, status)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (profile_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(PlanTier::Free.as_str())
    .bind(SubscriptionStatus::Active.as_str())
    .execute(pool)
    .await?;

    tracing::info!(email, role, "ensured user");
    Ok(user_id)
}

async fn ensure_plan(pool: &sqlx::PgPool, profile_id: Uuid, plan: PlanTier) -> anyhow::Result<()> {
    sqlx::query(
        "UPDATE subscriptions SET plan = $2, status = $3, updated_at = NOW() WHERE profile_id = $1",
    )
    .bind(profile_id)
    .bind(plan.as_str())
    .bind(SubscriptionStatus::Active.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

/// Demo catalogue for the demo user. Skipped when the user already owns one.
async fn seed_catalogue(pool: &sqlx::PgPool, owner_id: Uuid) -> anyhow::Result<Option<Uuid>> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM catalogues WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        tracing::info!("demo catalogue already present, skipping");
        return Ok(None);
    }

    let mut tx = pool.begin().await?;
    let catalogue_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO catalogues (id, owner_id, name, description, is_public, theme, settings)
        VALUES ($1, $2, $3, $4, TRUE, 'classic', $5)
        "#,
    )
    .bind(catalogue_id)
    .bind(owner_id)
    .bind("Spring Collection")
    .bind("Demo catalogue created by the seed script")
    .bind(serde_json::json!({ "layout": { "products_per_page": 6 } }))
    .execute(&mut *tx)
    .await?;

    let categories = [("Furniture", "#8b5cf6"), ("Lighting", "#f59e0b")];
    let mut category_ids = Vec::with_capacity(categories.len());
    for (name, color) in categories {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO categories (id, catalogue_id, name, color) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(catalogue_id)
            .bind(name)
            .bind(color)
            .execute(&mut *tx)
            .await?;
        category_ids.push(id);
    }

    let products = [
        ("Oak side table", Decimal::new(12900, 2), 0),
        ("Linen armchair", Decimal::new(34950, 2), 0),
        ("Brass floor lamp", Decimal::new(8900, 2), 1),
        ("Paper pendant", Decimal::new(3500, 2), 1),
    ];
    for (position, (name, price, category)) in products.into_iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO products (id, catalogue_id, category_id, name, price, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(catalogue_id)
        .bind(category_ids[category])
        .bind(name)
        .bind(price)
        .bind(position as i32)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(Some(catalogue_id))
}
