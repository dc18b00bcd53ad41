use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Permission;

/// Verified token payload.
///
/// `permissions` stays optional: a token without the claim is well-formed JWT
/// but malformed for this API, and the permission gate reports it as such.
/// Every other claim (`iss`, `aud`, `exp`, ...) is kept verbatim in `claims`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,

    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl TokenPayload {
    pub fn has_permission(&self, required: &Permission) -> bool {
        self.permissions
            .as_deref()
            .is_some_and(|granted| granted.contains(required))
    }
}
