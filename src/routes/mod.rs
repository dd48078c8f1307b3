use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod billing;
pub mod catalogues;
pub mod categories;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod team;
pub mod themes;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    let catalogues = catalogues::router()
        .merge(categories::router())
        .merge(products::router())
        .merge(team::router());

    Router::new()
        .nest("/auth", auth::router())
        .nest("/catalogues", catalogues)
        .nest("/public", catalogues::public_router())
        .nest("/invitations", team::invitation_router())
        .nest("/billing", billing::router())
        .nest("/checkout", billing::checkout_router())
        .nest("/coupons", billing::coupon_router())
        .nest("/themes", themes::router())
        .nest("/admin", admin::router())
}
