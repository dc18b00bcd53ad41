//! `Authorization` header parsing.

use crate::AuthError;

/// Extract the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; anything other than exactly two
/// whitespace-separated parts is rejected.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(AuthError::MissingHeader)?;

    let mut parts = header.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::MissingHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }

    let token = parts.next().ok_or(AuthError::MissingToken)?;
    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}
