mod common;

use catfy_api::{
    domain::{invitation::TeamRole, ordering::SortPosition, plan::PlanTier},
    dto::{
        admin::SetPlanRequest,
        catalogues::{CreateCatalogueRequest, DuplicateCatalogueRequest, UpdateCatalogueRequest},
        categories::CreateCategoryRequest,
        products::{CreateProductRequest, MoveProductRequest, ReorderProductsRequest},
        team::{AcceptInvitationRequest, InviteMemberRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::CatalogueQuery,
    services::{
        access::AccessLevel, admin_service, catalogue_service, category_service, export_service,
        product_service, settings_service, team_service,
    },
    state::AppState,
};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

fn new_catalogue(name: &str) -> CreateCatalogueRequest {
    CreateCatalogueRequest {
        name: name.into(),
        description: None,
        is_public: None,
        theme: None,
        settings: None,
    }
}

fn new_product(name: &str, cents: i64) -> CreateProductRequest {
    CreateProductRequest {
        name: name.into(),
        description: None,
        price: Decimal::new(cents, 2),
        price_display: None,
        image_urls: None,
        category_id: None,
    }
}

async fn product_names(state: &AppState, user: &AuthUser, catalogue_id: Uuid) -> Vec<(String, i32)> {
    product_service::list_products(state, user, catalogue_id, Default::default())
        .await
        .unwrap()
        .data
        .unwrap()
        .items
        .into_iter()
        .map(|p| (p.name, p.sort_order))
        .collect()
}

async fn upgrade(state: &AppState, admin: &AuthUser, user: &AuthUser, plan: PlanTier) {
    admin_service::set_user_plan(state, admin, user.user_id, SetPlanRequest { plan })
        .await
        .unwrap();
}

#[tokio::test]
async fn free_plan_limits_and_product_ordering() -> anyhow::Result<()> {
    let Some(state) = common::db_state(false).await? else {
        return Ok(());
    };
    let owner = common::register(&state, "owner").await?;

    let catalogue = catalogue_service::create_catalogue(&state, &owner, new_catalogue("Spring"))
        .await?
        .data
        .unwrap();
    assert_eq!(catalogue.theme, "classic");
    assert!(!catalogue.is_public);

    let second = catalogue_service::create_catalogue(&state, &owner, new_catalogue("Summer")).await;
    assert!(matches!(second, Err(AppError::UpgradeRequired(_))));

    let premium = catalogue_service::update_catalogue(
        &state,
        &owner,
        catalogue.id,
        UpdateCatalogueRequest {
            theme: Some("elegant".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(premium, Err(AppError::UpgradeRequired(_))));

    let export = export_service::export_catalogue(&state, &owner, catalogue.id).await;
    assert!(matches!(export, Err(AppError::UpgradeRequired(_))));

    let mut ids = Vec::new();
    for (name, cents) in [("A", 1000), ("B", 2000), ("C", 3000), ("D", 4000)] {
        let product =
            product_service::create_product(&state, &owner, catalogue.id, new_product(name, cents))
                .await?
                .data
                .unwrap();
        ids.push(product.id);
    }
    assert_eq!(
        product_names(&state, &owner, catalogue.id).await,
        vec![("A".into(), 0), ("B".into(), 1), ("C".into(), 2), ("D".into(), 3)]
    );

    let negative =
        product_service::create_product(&state, &owner, catalogue.id, new_product("X", -1)).await;
    assert!(matches!(negative, Err(AppError::BadRequest(_))));

    // D to the front.
    product_service::move_product(
        &state,
        &owner,
        catalogue.id,
        MoveProductRequest {
            product_id: ids[3],
            to_index: 0,
        },
    )
    .await?;
    assert_eq!(
        product_names(&state, &owner, catalogue.id).await,
        vec![("D".into(), 0), ("A".into(), 1), ("B".into(), 2), ("C".into(), 3)]
    );

    let out_of_range = product_service::move_product(
        &state,
        &owner,
        catalogue.id,
        MoveProductRequest {
            product_id: ids[0],
            to_index: 4,
        },
    )
    .await;
    assert!(matches!(out_of_range, Err(AppError::BadRequest(_))));

    // Full reorder to C, B, A, D.
    let order = [ids[2], ids[1], ids[0], ids[3]];
    let positions = order
        .iter()
        .enumerate()
        .map(|(i, id)| SortPosition {
            id: *id,
            sort_order: i as i32,
        })
        .collect();
    product_service::reorder_products(
        &state,
        &owner,
        catalogue.id,
        ReorderProductsRequest {
            products: positions,
        },
    )
    .await?;

    let partial = product_service::reorder_products(
        &state,
        &owner,
        catalogue.id,
        ReorderProductsRequest {
            products: vec![SortPosition {
                id: ids[0],
                sort_order: 0,
            }],
        },
    )
    .await;
    assert!(matches!(partial, Err(AppError::BadRequest(_))));

    product_service::delete_product(&state, &owner, catalogue.id, ids[1]).await?;
    assert_eq!(
        product_names(&state, &owner, catalogue.id).await,
        vec![("C".into(), 0), ("A".into(), 1), ("D".into(), 2)]
    );

    let listed = catalogue_service::list_catalogues(&state, &owner, CatalogueQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].product_count, 3);
    assert_eq!(listed.items[0].access, AccessLevel::Owner);

    let stranger = common::register(&state, "stranger").await?;
    let hidden = catalogue_service::get_catalogue(&state, &stranger, catalogue.id).await;
    assert!(matches!(hidden, Err(AppError::NotFound)));
    let private = catalogue_service::get_public_catalogue(&state, catalogue.id).await;
    assert!(matches!(private, Err(AppError::NotFound)));

    catalogue_service::delete_catalogue(&state, &owner, catalogue.id).await?;
    let listed = catalogue_service::list_catalogues(&state, &owner, CatalogueQuery::default())
        .await?
        .data
        .unwrap();
    assert!(listed.items.is_empty());

    Ok(())
}

#[tokio::test]
async fn settings_categories_and_duplicate() -> anyhow::Result<()> {
    let Some(state) = common::db_state(false).await? else {
        return Ok(());
    };
    let owner = common::register(&state, "designer").await?;
    let admin = common::as_admin(&common::register(&state, "admin").await?);
    upgrade(&state, &admin, &owner, PlanTier::Monthly).await;

    let catalogue = catalogue_service::create_catalogue(
        &state,
        &owner,
        CreateCatalogueRequest {
            settings: Some(json!({ "colors": { "primary": "#111111" }, "note": "keep" })),
            ..new_catalogue("Lookbook")
        },
    )
    .await?
    .data
    .unwrap();

    let patched = settings_service::patch_settings(
        &state,
        &owner,
        catalogue.id,
        json!({ "colors": { "secondary": "#222222" }, "extra": null }),
    )
    .await?
    .data
    .unwrap();
    // Top-level keys are replaced wholesale; untouched keys survive.
    assert_eq!(patched.settings["colors"], json!({ "secondary": "#222222" }));
    assert_eq!(patched.settings["note"], "keep");
    assert!(patched.settings["extra"].is_null());

    let not_object =
        settings_service::patch_settings(&state, &owner, catalogue.id, json!([1, 2])).await;
    assert!(matches!(not_object, Err(AppError::BadRequest(_))));

    let category = category_service::create_category(
        &state,
        &owner,
        catalogue.id,
        CreateCategoryRequest {
            name: "Chairs".into(),
            description: None,
            color: Some("#ff0000".into()),
        },
    )
    .await?
    .data
    .unwrap();
    category_service::create_category(
        &state,
        &owner,
        catalogue.id,
        CreateCategoryRequest {
            name: "Lamps".into(),
            description: None,
            color: None,
        },
    )
    .await?;
    let chair = product_service::create_product(
        &state,
        &owner,
        catalogue.id,
        CreateProductRequest {
            category_id: Some(category.id),
            ..new_product("Chair", 9900)
        },
    )
    .await?
    .data
    .unwrap();
    product_service::create_product(&state, &owner, catalogue.id, new_product("Table", 19900))
        .await?;

    let copy = catalogue_service::duplicate_catalogue(
        &state,
        &owner,
        catalogue.id,
        DuplicateCatalogueRequest::default(),
    )
    .await?
    .data
    .unwrap();
    assert_ne!(copy.id, catalogue.id);
    assert_eq!(copy.settings, patched.settings);
    let detail = catalogue_service::get_catalogue(&state, &owner, copy.id)
        .await?
        .data
        .unwrap();
    let copied: Vec<&str> = detail.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(copied, vec!["Chairs", "Lamps"]);
    assert_eq!(detail.products.len(), 2);
    assert_eq!(detail.products[0].name, "Chair");
    assert_eq!(detail.products[0].category_id, Some(detail.categories[0].id));
    assert_ne!(detail.categories[0].id, category.id);

    category_service::delete_category(&state, &owner, catalogue.id, category.id).await?;
    let products = product_service::list_products(&state, &owner, catalogue.id, Default::default())
        .await?
        .data
        .unwrap();
    let orphan = products.items.iter().find(|p| p.id == chair.id).unwrap();
    assert_eq!(orphan.category_id, None);

    let layout = export_service::export_catalogue(&state, &owner, catalogue.id).await?;
    assert!(layout.data.is_some());

    Ok(())
}

#[tokio::test]
async fn team_invitation_grants_access() -> anyhow::Result<()> {
    let Some(state) = common::db_state(false).await? else {
        return Ok(());
    };
    let owner = common::register(&state, "teamowner").await?;
    let editor = common::register(&state, "editor").await?;
    let viewer = common::register(&state, "viewer").await?;
    let admin = common::as_admin(&common::register(&state, "teamadmin").await?);

    let catalogue = catalogue_service::create_catalogue(&state, &owner, new_catalogue("Shared"))
        .await?
        .data
        .unwrap();

    let invite = |email: String, role: TeamRole| InviteMemberRequest { email, role };

    let on_free = team_service::invite_member(
        &state,
        &owner,
        catalogue.id,
        invite(editor.email.clone(), TeamRole::Editor),
    )
    .await;
    assert!(matches!(on_free, Err(AppError::UpgradeRequired(_))));

    upgrade(&state, &admin, &owner, PlanTier::Monthly).await;

    let created = team_service::invite_member(
        &state,
        &owner,
        catalogue.id,
        invite(editor.email.to_uppercase(), TeamRole::Editor),
    )
    .await?
    .data
    .unwrap();
    assert!(created.accept_url.ends_with(&created.token));

    let duplicate = team_service::invite_member(
        &state,
        &owner,
        catalogue.id,
        invite(editor.email.clone(), TeamRole::Viewer),
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let wrong_user = team_service::accept_invitation(
        &state,
        &viewer,
        AcceptInvitationRequest {
            token: created.token.clone(),
        },
    )
    .await;
    assert!(matches!(wrong_user, Err(AppError::Forbidden)));

    let member = team_service::accept_invitation(
        &state,
        &editor,
        AcceptInvitationRequest {
            token: created.token.clone(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(member.role, TeamRole::Editor);

    let view_invite = team_service::invite_member(
        &state,
        &owner,
        catalogue.id,
        invite(viewer.email.clone(), TeamRole::Viewer),
    )
    .await?
    .data
    .unwrap();
    team_service::accept_invitation(
        &state,
        &viewer,
        AcceptInvitationRequest {
            token: view_invite.token,
        },
    )
    .await?;

    let shared = catalogue_service::list_catalogues(&state, &editor, CatalogueQuery::default())
        .await?
        .data
        .unwrap();
    assert!(
        shared
            .items
            .iter()
            .any(|c| c.catalogue.id == catalogue.id && c.access == AccessLevel::Editor)
    );

    product_service::create_product(&state, &editor, catalogue.id, new_product("Edited", 500))
        .await?;
    let read_only =
        product_service::create_product(&state, &viewer, catalogue.id, new_product("Nope", 500))
            .await;
    assert!(matches!(read_only, Err(AppError::Forbidden)));
    let not_owner = catalogue_service::delete_catalogue(&state, &editor, catalogue.id).await;
    assert!(matches!(not_owner, Err(AppError::Forbidden)));

    let team = team_service::get_team(&state, &owner, catalogue.id)
        .await?
        .data
        .unwrap();
    assert_eq!(team.members.len(), 2);
    assert!(team.invitations.is_empty());

    team_service::remove_member(&state, &owner, catalogue.id, member.id).await?;
    let gone = catalogue_service::get_catalogue(&state, &editor, catalogue.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_creates_respect_the_catalogue_limit() -> anyhow::Result<()> {
    let Some(state) = common::db_state(false).await? else {
        return Ok(());
    };
    let owner = common::register(&state, "racer").await?;

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..16 {
        let state = state.clone();
        let owner = owner.clone();
        tasks.spawn(async move {
            catalogue_service::create_catalogue(&state, &owner, new_catalogue(&format!("Race {i}")))
                .await
        });
    }

    let mut created = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(_) => created += 1,
            Err(AppError::UpgradeRequired(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(created, 1);

    let (owned,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM catalogues WHERE owner_id = $1")
        .bind(owner.user_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(owned, 1);

    Ok(())
}
