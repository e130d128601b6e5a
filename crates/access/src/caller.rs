//! Caller identity and per-request context.

use civicpulse_geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Permission level of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// No resolved identity
    #[default]
    Anonymous,
    /// Registered citizen
    User,
    /// Can see hidden issues and moderate
    Moderator,
    /// Full access
    Admin,
}

impl Role {
    /// Moderators and admins may see hidden issues.
    #[inline]
    pub fn can_see_hidden(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }

    /// Returns true for [`Role::Admin`].
    #[inline]
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Anonymous => "anonymous",
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// Identity resolved by the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Everything the access layer knows about the current request's caller.
///
/// Built once per request and passed by reference through every guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallerContext {
    /// `None` means the caller is anonymous
    pub identity: Option<Identity>,
    /// Location the caller sent with this request
    pub query_location: GeoPoint,
}

impl CallerContext {
    pub fn new(identity: Option<Identity>, query_location: GeoPoint) -> Self {
        Self {
            identity,
            query_location,
        }
    }

    /// A caller with no identity.
    pub fn anonymous(query_location: GeoPoint) -> Self {
        Self::new(None, query_location)
    }

    /// A caller with a resolved identity.
    pub fn authenticated(user_id: UserId, role: Role, query_location: GeoPoint) -> Self {
        Self::new(Some(Identity::new(user_id, role)), query_location)
    }

    /// Effective role; no identity resolves to [`Role::Anonymous`].
    pub fn role(&self) -> Role {
        self.identity.map_or(Role::Anonymous, |identity| identity.role)
    }

    /// The caller's user id, when known.
    pub fn user_id(&self) -> Option<UserId> {
        self.identity.map(|identity| identity.user_id)
    }

    /// True when the caller is the given user. `None` never matches.
    pub fn is_user(&self, user: Option<UserId>) -> bool {
        matches!((self.user_id(), user), (Some(me), Some(them)) if me == them)
    }
}
