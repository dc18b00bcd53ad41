use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use coffeeshop_auth::{AuthError, Permission, TokenPayload, TokenVerifier, authorize, bearer_token};

use crate::app::errors::ApiError;

/// Per-route gate: the verifier plus the one permission the route demands.
#[derive(Clone)]
pub struct PermissionGate {
    verifier: Arc<dyn TokenVerifier>,
    required: Permission,
}

impl PermissionGate {
    pub fn new(verifier: Arc<dyn TokenVerifier>, required: Permission) -> Self {
        Self { verifier, required }
    }

    /// Verify the bearer token, then check the permission.
    fn check(&self, headers: &HeaderMap) -> Result<TokenPayload, AuthError> {
        let header = headers
            .get(AUTHORIZATION)
            .map(|v| v.to_str().map_err(|_| AuthError::MalformedHeader))
            .transpose()?;

        let token = bearer_token(header)?;
        let payload = self.verifier.verify(token)?;
        authorize(&payload, &self.required)?;
        Ok(payload)
    }
}

/// Runs the gate and hands the verified payload to the handler as an extension.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let payload = gate.check(req.headers()).map_err(|e| {
        tracing::debug!(
            permission = %gate.required,
            status = e.status_code(),
            code = e.code(),
            "request rejected: {e}"
        );
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(payload);
    Ok(next.run(req).await)
}
