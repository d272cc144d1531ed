//! Identity primitives.
//!
//! - [`jwt`] -- verification (and, for tooling and tests, issuance) of the
//!   HS256 access tokens handed out by the campus identity provider.

pub mod jwt;
