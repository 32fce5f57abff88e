use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::jwt::TokenError;
use crate::auth::tenant::Tenant;
use crate::error::AppError;
use crate::models::Role;
use crate::state::SharedState;

/// The authenticated caller, as stated by a validated access token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub tenant: Tenant,
}

impl AuthUser {
    /// A genuine super-admin token: the super-admin role with no tenant attached.
    pub fn is_superadmin(&self) -> bool {
        self.role == Role::Superadmin && self.tenant.is_global()
    }

    pub fn require_level(&self, minimum: Role) -> Result<(), AppError> {
        if self.role.level() >= minimum.level() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Insufficient permissions".to_string()))
        }
    }

    pub fn company_id(&self) -> Result<Uuid, AppError> {
        self.tenant
            .company_id()
            .ok_or_else(|| AppError::Forbidden("Company context required".to_string()))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`. Exactly one space, no other scheme.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Authorization header required".to_string()))?;

    let malformed = || AppError::Unauthorized("Invalid authorization header format".to_string());
    let value = header.to_str().map_err(|_| malformed())?;
    let token = value.strip_prefix("Bearer ").ok_or_else(malformed)?;
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(malformed());
    }
    Ok(token)
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = state.tokens.validate(token).map_err(|err| match err {
            TokenError::Expired => AppError::Unauthorized("Token has expired".to_string()),
            TokenError::Invalid => AppError::Unauthorized("Invalid token".to_string()),
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            tenant: claims.tenant(),
            email: claims.email,
            role: claims.role,
        })
    }
}

/// A caller that has entered a company.
#[derive(Debug, Clone)]
pub struct TenantUser {
    pub user: AuthUser,
    pub company_id: Uuid,
}

impl FromRequestParts<SharedState> for TenantUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let company_id = user.company_id()?;
        Ok(TenantUser { user, company_id })
    }
}

/// A caller holding a genuine super-admin token.
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub AuthUser);

impl FromRequestParts<SharedState> for SuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_superadmin() {
            if user.tenant.company_id().is_some() && user.role == Role::Superadmin {
                tracing::warn!(user_id = %user.user_id, "super-admin role presented with a tenant");
            }
            return Err(AppError::Forbidden("Super admin access required".to_string()));
        }
        Ok(SuperAdmin(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Unauthorized(msg) => msg,
            other => panic!("expected 401, got {other}"),
        }
    }

    #[test]
    fn bearer_header_shapes() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def.ghi"))).unwrap(), "abc.def.ghi");
        assert_eq!(
            message(bearer_token(&parts_with(None)).unwrap_err()),
            "Authorization header required"
        );
        for bad in ["Basic abc", "bearer abc", "Bearer", "Bearer ", "Bearer  abc", "Bearer a b", "abc"] {
            assert_eq!(
                message(bearer_token(&parts_with(Some(bad))).unwrap_err()),
                "Invalid authorization header format",
                "{bad:?}"
            );
        }
    }

    fn caller(role: Role, tenant: Tenant) -> AuthUser {
        AuthUser { user_id: Uuid::now_v7(), email: "c@x.io".into(), role, tenant }
    }

    #[test]
    fn superadmin_needs_role_and_no_tenant() {
        assert!(caller(Role::Superadmin, Tenant::Global).is_superadmin());
        assert!(!caller(Role::Superadmin, Tenant::Scoped(Uuid::now_v7())).is_superadmin());
        assert!(!caller(Role::Admin, Tenant::Global).is_superadmin());
    }

    #[test]
    fn level_checks() {
        let recruiter = caller(Role::Recruiter, Tenant::Scoped(Uuid::now_v7()));
        assert!(recruiter.require_level(Role::User).is_ok());
        assert!(recruiter.require_level(Role::Recruiter).is_ok());
        assert!(matches!(recruiter.require_level(Role::Admin), Err(AppError::Forbidden(_))));
    }
}
