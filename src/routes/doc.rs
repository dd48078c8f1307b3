use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    billing::coupon::{Discount, DiscountKind},
    domain::{
        invitation::{InvitationStatus, TeamRole},
        layout::{LayoutItem, LayoutPage, PageContent, PrintLayout},
        ordering::SortPosition,
        plan::{PlanLimits, PlanTier, SubscriptionStatus},
        settings::{
            AdvancedStyleCustomization, BorderStyle, CatalogueStyle, ColorCustomization,
            FontCustomization, FontStyle, LayoutSettings, SpacingCustomization,
        },
    },
    dto::{
        admin, auth as auth_dto, billing as billing_dto, catalogues as catalogue_dto,
        categories as category_dto, products as product_dto, profile, team as team_dto,
        themes as theme_dto,
    },
    models::{
        Catalogue, Category, Invitation, PriceDisplay, Product, Profile, Subscription, TeamMember,
        User,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin as admin_routes, auth, billing, catalogues, categories, health, params, products,
        team, themes,
    },
    services::access::AccessLevel,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        auth::register,
        auth::login,
        auth::get_profile,
        auth::update_profile,
        catalogues::list_catalogues,
        catalogues::create_catalogue,
        catalogues::get_catalogue,
        catalogues::get_public_catalogue,
        catalogues::update_catalogue,
        catalogues::delete_catalogue,
        catalogues::duplicate_catalogue,
        catalogues::get_settings,
        catalogues::patch_settings,
        catalogues::get_style,
        catalogues::export_catalogue,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        products::list_products,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::reorder_products,
        products::move_product,
        team::get_team,
        team::invite_member,
        team::cancel_invitation,
        team::remove_member,
        team::accept_invitation,
        billing::get_subscription,
        billing::create_checkout_session,
        billing::create_portal_session,
        billing::validate_coupon,
        billing::webhook,
        themes::list_themes,
        themes::select_theme,
        admin_routes::get_stats,
        admin_routes::list_users,
        admin_routes::set_user_plan,
        admin_routes::list_catalogues,
        admin_routes::delete_catalogue,
        admin_routes::theme_stats
    ),
    components(
        schemas(
            User,
            Profile,
            Subscription,
            Catalogue,
            Category,
            Product,
            PriceDisplay,
            TeamMember,
            Invitation,
            TeamRole,
            InvitationStatus,
            PlanTier,
            SubscriptionStatus,
            PlanLimits,
            AccessLevel,
            SortPosition,
            CatalogueStyle,
            ColorCustomization,
            FontCustomization,
            FontStyle,
            SpacingCustomization,
            AdvancedStyleCustomization,
            BorderStyle,
            LayoutSettings,
            PrintLayout,
            LayoutPage,
            PageContent,
            LayoutItem,
            Discount,
            DiscountKind,
            health::HealthData,
            params::SortOrder,
            params::CatalogueSortBy,
            auth_dto::RegisterRequest,
            auth_dto::LoginRequest,
            auth_dto::LoginResponse,
            profile::ProfileWithSubscription,
            profile::UpdateProfileRequest,
            catalogue_dto::CreateCatalogueRequest,
            catalogue_dto::UpdateCatalogueRequest,
            catalogue_dto::DuplicateCatalogueRequest,
            catalogue_dto::CatalogueSummary,
            catalogue_dto::CatalogueList,
            catalogue_dto::CatalogueDetail,
            catalogue_dto::SettingsResponse,
            catalogue_dto::StyleResponse,
            category_dto::CreateCategoryRequest,
            category_dto::UpdateCategoryRequest,
            category_dto::CategoryList,
            product_dto::CreateProductRequest,
            product_dto::UpdateProductRequest,
            product_dto::ReorderProductsRequest,
            product_dto::MoveProductRequest,
            product_dto::ProductList,
            team_dto::InviteMemberRequest,
            team_dto::TeamOverview,
            team_dto::CreatedInvitation,
            team_dto::AcceptInvitationRequest,
            billing_dto::CheckoutRequest,
            billing_dto::HostedRedirect,
            billing_dto::ValidateCouponRequest,
            billing_dto::CouponValidation,
            billing_dto::WebhookAck,
            theme_dto::ThemeView,
            theme_dto::ThemeList,
            theme_dto::SelectThemeRequest,
            theme_dto::ThemeSelection,
            admin::AdminStats,
            admin::PlanCount,
            admin::AdminUser,
            admin::AdminUserList,
            admin::AdminCatalogueList,
            admin::SetPlanRequest,
            admin::ThemeStat,
            admin::ThemeStats,
            Meta,
            ApiResponse<Catalogue>,
            ApiResponse<catalogue_dto::CatalogueList>,
            ApiResponse<product_dto::ProductList>,
            ApiResponse<PrintLayout>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration, login and profile"),
        (name = "Catalogues", description = "Catalogue endpoints"),
        (name = "Settings", description = "Catalogue style settings"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Products", description = "Product endpoints and ordering"),
        (name = "Team", description = "Team members and invitations"),
        (name = "Billing", description = "Subscriptions, checkout and coupons"),
        (name = "Themes", description = "Theme registry"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
