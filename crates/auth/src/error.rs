use thiserror::Error;

use crate::Permission;

/// Authentication/authorization failure.
///
/// Each variant carries a fixed HTTP-style status code and a short error code;
/// the transport layer renders both without further interpretation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingHeader,

    #[error("Authorization header must start with \"Bearer\".")]
    InvalidScheme,

    #[error("Token not found.")]
    MissingToken,

    #[error("Authorization header must be bearer token.")]
    MalformedHeader,

    #[error("Authorization malformed.")]
    MissingKeyId,

    #[error("Unable to find the appropriate key.")]
    UnknownKey,

    #[error("Token expired.")]
    Expired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Token signature is invalid.")]
    InvalidSignature,

    #[error("Unable to parse authentication token.")]
    Malformed,

    #[error("Permissions not included in JWT.")]
    PermissionsMissing,

    #[error("Permission not found.")]
    Forbidden(Permission),
}

impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Malformed | AuthError::PermissionsMissing => 400,
            AuthError::Forbidden(_) => 403,
            _ => 401,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::InvalidScheme
            | AuthError::MissingToken
            | AuthError::MalformedHeader
            | AuthError::MissingKeyId
            | AuthError::UnknownKey
            | AuthError::Malformed => "invalid_header",
            AuthError::Expired => "token_expired",
            AuthError::InvalidClaims | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Forbidden(_) => "unauthorized",
        }
    }
}
