pub mod admin;
pub mod auth;
pub mod billing;
pub mod catalogues;
pub mod categories;
pub mod products;
pub mod profile;
pub mod team;
pub mod themes;
