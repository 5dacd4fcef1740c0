//! Authentication primitives.
//!
//! - [`jwt`] -- validation (and, for tooling and tests, issuance) of the
//!   identity provider's HS256 access tokens.

pub mod jwt;
