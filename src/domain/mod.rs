//! Catalogue rules that do not touch the database.

pub mod invitation;
pub mod layout;
pub mod ordering;
pub mod plan;
pub mod settings;
