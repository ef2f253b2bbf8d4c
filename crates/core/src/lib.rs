//! Domain types and pure logic shared by every Covergen crate.
//!
//! Nothing in here touches the network or the database: catalogs, request
//! validation, the in-memory cache and rate limiter, and the local
//! moderation rules all live here so they can be unit tested in isolation.

pub mod cache;
pub mod error;
pub mod generation;
pub mod hashing;
pub mod moderation;
pub mod naming;
pub mod plans;
pub mod platform;
pub mod rate_limit;
pub mod roles;
pub mod style;
pub mod types;
