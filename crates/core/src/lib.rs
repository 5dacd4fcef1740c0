//! Domain rules for the client portal backend.
//!
//! This crate has no database dependency. Persistence is reached through the
//! traits in [`store`]; the `portal-db` crate provides the PostgreSQL
//! implementation and tests use an in-memory one.

pub mod batch;
pub mod cascade;
pub mod error;
pub mod features;
pub mod instantiation;
pub mod project;
pub mod roles;
pub mod store;
pub mod template;
pub mod timeline;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
