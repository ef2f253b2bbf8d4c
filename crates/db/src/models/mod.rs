//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the table row
//! and the `Deserialize` DTOs used for inserts.

pub mod community;
pub mod cover;
pub mod subscription;
pub mod usage;
pub mod user;
