use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::tenant::Tenant;
use crate::models::Role;

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

/// Why a token was refused. Everything except a lapsed `exp` is `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Expired => f.write_str("token has expired"),
            TokenError::Invalid => f.write_str("invalid token"),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    }
}

/// Access-token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub company_id: Option<Uuid>,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub typ: String,
}

impl Claims {
    pub fn tenant(&self) -> Tenant {
        Tenant::from(self.company_id)
    }
}

/// Refresh-token payload: identity only, role and tenant are re-resolved on use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub typ: String,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issues and validates HS256 tokens. Access and refresh tokens use separate secrets.
pub struct TokenService {
    access: Keys,
    refresh: Keys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenService {
    pub fn new(access_secret: &str, refresh_secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access: Keys::new(access_secret),
            refresh: Keys::new(refresh_secret),
            access_ttl,
            refresh_ttl,
            validation,
        }
    }

    /// Access-token lifetime in seconds, as reported to clients.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn issue_access_token(
        &self,
        user_id: Uuid,
        tenant: Tenant,
        email: &str,
        role: Role,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            company_id: tenant.company_id(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            typ: ACCESS.to_string(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.access.encoding)?)
    }

    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
            typ: REFRESH.to_string(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.refresh.encoding)?)
    }

    /// Validate an access token.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.access.decoding, &self.validation)?.claims;
        if claims.typ != ACCESS {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims = decode::<RefreshClaims>(token, &self.refresh.decoding, &self.validation)?.claims;
        if claims.typ != REFRESH {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> TokenService {
        TokenService::new("access-secret", "refresh-secret", Duration::hours(1), Duration::days(30))
    }

    #[test]
    fn access_token_round_trips() {
        let tokens = service();
        let user = Uuid::now_v7();
        let company = Uuid::now_v7();

        let token = tokens
            .issue_access_token(user, Tenant::Scoped(company), "a@acme.com", Role::Admin)
            .unwrap();
        let claims = tokens.validate(&token).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.tenant(), Tenant::Scoped(company));
        assert_eq!(claims.email, "a@acme.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn global_token_has_no_company() {
        let tokens = service();
        let token = tokens
            .issue_access_token(Uuid::now_v7(), Tenant::Global, "root@dvra.io", Role::Superadmin)
            .unwrap();
        let claims = tokens.validate(&token).unwrap();
        assert_eq!(claims.company_id, None);
        assert_eq!(claims.tenant(), Tenant::Global);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let tokens = TokenService::new("a", "b", Duration::seconds(-5), Duration::days(1));
        let token = tokens
            .issue_access_token(Uuid::now_v7(), Tenant::Global, "x@y.z", Role::User)
            .unwrap();
        assert_eq!(tokens.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_and_malformed_tokens_are_invalid() {
        let tokens = service();
        let token = tokens
            .issue_access_token(Uuid::now_v7(), Tenant::Global, "x@y.z", Role::User)
            .unwrap();
        let other = tokens
            .issue_access_token(Uuid::now_v7(), Tenant::Global, "x@y.z", Role::Superadmin)
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(tokens.validate(&tampered), Err(TokenError::Invalid));
        assert_eq!(tokens.validate("not.a.jwt"), Err(TokenError::Invalid));
        assert_eq!(tokens.validate(""), Err(TokenError::Invalid));
    }

    #[test]
    fn other_secret_is_invalid() {
        let issuer = TokenService::new("one", "two", Duration::hours(1), Duration::days(1));
        let verifier = TokenService::new("three", "four", Duration::hours(1), Duration::days(1));
        let token = issuer
            .issue_access_token(Uuid::now_v7(), Tenant::Global, "x@y.z", Role::User)
            .unwrap();
        assert_eq!(verifier.validate(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn refresh_and_access_tokens_do_not_cross() {
        let tokens = service();
        let user = Uuid::now_v7();
        let refresh = tokens.issue_refresh_token(user).unwrap();
        let access = tokens
            .issue_access_token(user, Tenant::Global, "x@y.z", Role::User)
            .unwrap();

        assert_eq!(tokens.validate_refresh(&refresh).unwrap().sub, user);
        assert_eq!(tokens.validate(&refresh), Err(TokenError::Invalid));
        assert_eq!(tokens.validate_refresh(&access), Err(TokenError::Invalid));
    }

    #[test]
    fn token_kind_is_checked_even_with_shared_secret() {
        let tokens = TokenService::new("same", "same", Duration::hours(1), Duration::days(1));
        let refresh = tokens.issue_refresh_token(Uuid::now_v7()).unwrap();
        assert_eq!(tokens.validate(&refresh), Err(TokenError::Invalid));
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let claims = json!({
            "sub": Uuid::now_v7(), "company_id": null, "email": "x@y.z", "role": "superadmin",
            "iat": now, "nbf": now, "exp": now + 600, "typ": "access",
        });
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"access-secret"),
        )
        .unwrap();
        assert_eq!(tokens.validate(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn unknown_role_is_invalid() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let claims = json!({
            "sub": Uuid::now_v7(), "company_id": null, "email": "x@y.z", "role": "owner",
            "iat": now, "nbf": now, "exp": now + 600, "typ": "access",
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"access-secret"),
        )
        .unwrap();
        assert_eq!(tokens.validate(&token), Err(TokenError::Invalid));
    }
}
