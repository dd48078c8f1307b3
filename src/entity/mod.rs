pub mod audit_logs;
pub mod catalogue_exports;
pub mod catalogues;
pub mod categories;
pub mod invitations;
pub mod products;
pub mod profiles;
pub mod subscriptions;
pub mod team_members;
pub mod theme_selections;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use catalogue_exports::Entity as CatalogueExports;
pub use catalogues::Entity as Catalogues;
pub use categories::Entity as Categories;
pub use invitations::Entity as Invitations;
pub use products::Entity as Products;
pub use profiles::Entity as Profiles;
pub use subscriptions::Entity as Subscriptions;
pub use team_members::Entity as TeamMembers;
pub use theme_selections::Entity as ThemeSelections;
pub use users::Entity as Users;
