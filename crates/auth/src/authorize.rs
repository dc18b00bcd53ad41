use crate::{AuthError, Permission, TokenPayload};

/// Permission gate: require `required` in a verified payload.
///
/// - No IO
/// - No panics
/// - A payload without a `permissions` claim is malformed (400), one that
///   lacks the permission is forbidden (403).
pub fn authorize(payload: &TokenPayload, required: &Permission) -> Result<(), AuthError> {
    let granted = payload
        .permissions
        .as_deref()
        .ok_or(AuthError::PermissionsMissing)?;

    if granted.contains(required) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(required.clone()))
    }
}
