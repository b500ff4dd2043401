//! Lokal Core: domain models, repository traits and the plan rules
//! shared by every other crate.
//!
//! Nothing in here talks to the database; the `lokal-db` crate provides
//! the repository implementations and `lokal-entitlements` composes them
//! into services.

pub mod error;
pub mod lang;
pub mod models;
pub mod plan;
pub mod redirect;
pub mod repository;
pub mod text;

pub use error::{LokalError, LokalResult};
pub use lang::Lang;
