//! Role name constants stored in `users.role`.

/// Regular account holder.
pub const ROLE_USER: &str = "user";

/// Operator with access to cache management and moderation overrides.
pub const ROLE_ADMIN: &str = "admin";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_USER, ROLE_ADMIN];
