//! Bearer token verification against a published key set.

use std::collections::HashMap;

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use crate::{AuthError, TokenPayload};

/// Verifies a raw bearer token and returns its payload.
///
/// Implementations must check signature, expiry, audience and issuer.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<TokenPayload, AuthError>;
}

/// RS256 verifier backed by a JWKS document.
///
/// Keys are indexed by `kid` once at construction; a token whose header names
/// a key outside the set is rejected before any signature work.
pub struct JwksVerifier {
    keys: HashMap<String, DecodingKey>,
    validation: Validation,
}

impl JwksVerifier {
    pub fn new(key_set: &JwkSet, audience: &str, issuer: &str) -> Self {
        let mut keys = HashMap::new();
        for jwk in &key_set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                tracing::warn!("skipping JWK without a key id");
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(e) => tracing::warn!(kid = %kid, "skipping unusable JWK: {e}"),
            }
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[audience]);
        validation.set_issuer(&[issuer]);

        Self { keys, validation }
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

impl TokenVerifier for JwksVerifier {
    fn verify(&self, token: &str) -> Result<TokenPayload, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::Malformed)?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let key = self.keys.get(&kid).ok_or(AuthError::UnknownKey)?;

        decode::<TokenPayload>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)
    }
}

fn classify(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::InvalidRsaKey(_) => {
            AuthError::InvalidSignature
        }
        _ => AuthError::Malformed,
    }
}
