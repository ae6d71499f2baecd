//! Caller identity.
//!
//! The backend in front of this service authenticates the caller and
//! forwards the identity in `x-user-id` / `x-user-roles`. Those headers are
//! taken at face value, so the edge proxy must strip them from client
//! traffic. Roles are further limited to the deployment's [`TrustedRoles`];
//! with none configured, the roles header is ignored entirely.

use async_trait::async_trait;
use axum::extract::{FromRequest, RequestParts};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{unauthorized_error, Error};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub roles: Vec<String>,
}

impl User {
    pub fn new(id: Uuid) -> Self {
        Self { id, roles: vec![] }
    }

    pub fn new_system_user() -> Self {
        Self {
            id: Uuid::new_v4(),
            roles: vec!["system".into()],
        }
    }

    fn has_role(&self, role: String) -> bool {
        self.roles.iter().any(|x| x == &role)
    }
}

impl PolarClass for User {
    fn get_polar_class_builder() -> oso::ClassBuilder<User> {
        oso::Class::builder()
            .name("User")
            .add_attribute_getter("id", |recv: &User| recv.id.to_string())
            .add_attribute_getter("roles", |recv: &User| recv.roles.clone())
            .add_method("has_role", User::has_role)
    }

    fn get_polar_class() -> oso::Class {
        let builder = User::get_polar_class_builder();
        builder.build()
    }
}

/// Roles accepted from the `x-user-roles` header. Installed on the router as
/// an `Extension`; when absent, no header role is accepted.
#[derive(Clone, Debug, Default)]
pub struct TrustedRoles(pub Vec<String>);

impl TrustedRoles {
    pub fn allows(&self, role: &str) -> bool {
        self.0.iter().any(|x| x == role)
    }
}

#[async_trait]
impl<B> FromRequest<B> for User
where
    B: Send,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let trusted = req
            .extensions()
            .get::<TrustedRoles>()
            .cloned()
            .unwrap_or_default();
        let headers = req.headers();

        let id = headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or_else(|| unauthorized_error())?;

        let roles = headers
            .get(USER_ROLES_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .split(',')
                    .map(|role| role.trim().to_string())
                    .filter(|role| trusted.allows(role))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { id, roles })
    }
}
