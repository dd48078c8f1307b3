pub mod access;
pub mod admin_service;
pub mod auth_service;
pub mod billing_service;
pub mod catalogue_service;
pub mod category_service;
pub mod export_service;
pub mod product_service;
pub mod profile_service;
pub mod settings_service;
pub mod subscription_service;
pub mod team_service;
pub mod theme_service;
