//! Object-storage key construction and validation.

use crate::error::CoreError;

/// Longest accepted storage key.
pub const MAX_KEY_LEN: usize = 512;

/// Owner namespace used for covers generated without an account.
pub const ANONYMOUS_OWNER: &str = "anonymous";

/// Owner namespace for a signed-in user.
pub fn user_owner(user_id: i64) -> String {
    format!("user-{user_id}")
}

/// Key for a generated cover: `covers/{owner}/{batch_id}/{platform_id}.{ext}`.
pub fn cover_object_key(owner: &str, batch_id: &uuid::Uuid, platform_id: &str, ext: &str) -> String {
    format!("covers/{owner}/{batch_id}/{platform_id}.{ext}")
}

/// Reject keys that could escape the storage root or are otherwise unsafe to
/// hand to a backend.
///
/// Accepted keys are non-empty, relative, at most [`MAX_KEY_LEN`] bytes, use
/// only `[A-Za-z0-9._/-]` and contain no empty, `.` or `..` segments.
pub fn validate_object_key(key: &str) -> Result<(), CoreError> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err(CoreError::Validation(format!(
            "Storage key must be 1..={MAX_KEY_LEN} bytes"
        )));
    }
    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-')))
    {
        return Err(CoreError::Validation(format!(
            "Storage key contains invalid character '{c}'"
        )));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(CoreError::Validation(
            "Storage key must be relative and contain no empty, '.' or '..' segments".into(),
        ));
    }
    Ok(())
}

/// Guess a MIME type from the key's extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    let ext = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
