use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings granted by the identity provider
/// (e.g. "post:drinks") and carried in the token's `permissions` claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const GET_DRINKS_DETAIL: Permission = Permission::from_static("get:drinks-detail");
    pub const POST_DRINKS: Permission = Permission::from_static("post:drinks");
    pub const PATCH_DRINKS: Permission = Permission::from_static("patch:drinks");
    pub const DELETE_DRINKS: Permission = Permission::from_static("delete:drinks");

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
