//! Session-establishing flows: registration, login, refresh, company switching and
//! password changes. Everything that mints a token goes through here.

use std::fmt;
use std::sync::Arc;

use chrono::{Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwt::{TokenError, TokenService};
use crate::auth::{MembershipResolver, Tenant};
use crate::auth::password;
use crate::db::{
    CompanyRepository, MembershipRepository, PlanRepository, Provisioner, Provisioning, SharedStore,
    StoreError, UserRepository,
};
use crate::error::AppError;
use crate::models::{Company, CompanySummary, Membership, Role, User};

const DEFAULT_PLAN: &str = "free";

#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    EmailExists,
    SlugExists,
    InvalidPassword,
    NoMembership,
    NotSuperAdmin,
    InvalidRefreshToken,
    UserNotFound,
    InactiveAccount,
    CompanyNotFound,
    PlanUnavailable(String),
    Token(TokenError),
    Store(StoreError),
    Hash(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => f.write_str("Invalid email or password"),
            AuthError::EmailExists => f.write_str("Email already exists"),
            AuthError::SlugExists => f.write_str("Company slug already exists"),
            AuthError::InvalidPassword => f.write_str("Invalid old password"),
            AuthError::NoMembership => f.write_str("User does not belong to this company"),
            AuthError::NotSuperAdmin => f.write_str("User is not a superadmin"),
            AuthError::InvalidRefreshToken => f.write_str("Invalid refresh token"),
            AuthError::UserNotFound => f.write_str("User not found"),
            AuthError::InactiveAccount => f.write_str("Account is inactive"),
            AuthError::CompanyNotFound => f.write_str("Company not found"),
            AuthError::PlanUnavailable(slug) => write!(f, "Plan '{slug}' is not available or inactive"),
            AuthError::Token(err) => write!(f, "token error: {err}"),
            AuthError::Store(err) => write!(f, "{err}"),
            AuthError::Hash(err) => write!(f, "password hashing failed: {err}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(ref c) if c == "users_email_key" => AuthError::EmailExists,
            StoreError::Conflict(ref c) if c == "companies_slug_key" => AuthError::SlugExists,
            other => AuthError::Store(other),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::Token(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let msg = err.to_string();
        match err {
            AuthError::InvalidCredentials
            | AuthError::InvalidPassword
            | AuthError::InvalidRefreshToken
            | AuthError::InactiveAccount => {
                AppError::Unauthorized(msg)
            }
            AuthError::EmailExists | AuthError::SlugExists => AppError::Conflict(msg),
            AuthError::NoMembership | AuthError::NotSuperAdmin => AppError::Forbidden(msg),
            AuthError::UserNotFound | AuthError::CompanyNotFound => AppError::NotFound(msg),
            AuthError::PlanUnavailable(_) => AppError::BadRequest(msg),
            AuthError::Token(_) => AppError::Internal(msg),
            AuthError::Hash(_) => AppError::Internal(msg),
            AuthError::Store(err) => err.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Result of any login-like flow.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
    pub companies: Vec<CompanySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredCompany {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub company: CompanySummary,
    pub admin: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwitchedCompany {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub company: CompanySummary,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyRegistration {
    pub company_name: String,
    pub company_slug: String,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_first_name: String,
    pub admin_last_name: String,
    pub timezone: Option<String>,
    /// Honoured only on the super-admin path.
    pub plan_slug: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    store: SharedStore,
    tokens: Arc<TokenService>,
    memberships: MembershipResolver,
    default_timezone: String,
}

impl AuthService {
    pub fn new(store: SharedStore, tokens: Arc<TokenService>, default_timezone: String) -> Self {
        Self {
            memberships: MembershipResolver::new(store.clone()),
            store,
            tokens,
            default_timezone,
        }
    }

    fn token_pair(&self, user: &User, tenant: Tenant, role: Role) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.tokens.issue_access_token(user.id, tenant, &user.email, role)?,
            refresh_token: self.tokens.issue_refresh_token(user.id)?,
            token_type: "Bearer",
            expires_in: self.tokens.access_ttl_secs(),
        })
    }

    /// Look up an account and check its password. Absent, disabled and wrong-password
    /// all produce the same error.
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .filter(User::can_sign_in)
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify(password, &user.password_hash).map_err(AuthError::Hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Create a bare account with no membership.
    pub async fn register(&self, account: Account) -> Result<Session, AuthError> {
        if self.store.find_user_by_email(&account.email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let hash = password::hash(&account.password).map_err(AuthError::Hash)?;
        let user = User::new(&account.email, hash, &account.first_name, &account.last_name);
        let user = self.store.create_user(&user).await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(Session {
            tokens: self.token_pair(&user, Tenant::Global, Role::User)?,
            user,
            companies: Vec::new(),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user = self.authenticate(email, password).await?;
        let (tenant, role) = self.memberships.token_context(user.id).await?;
        let tokens = self.token_pair(&user, tenant, role)?;

        let now = Utc::now();
        self.store.record_login(user.id, now).await?;
        let companies = self.user_companies(user.id).await?;

        Ok(Session {
            tokens,
            user: User { last_login_at: Some(now), ..user },
            companies,
        })
    }

    /// Global login for super-admins. Never consults memberships.
    pub async fn superadmin_login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user = self.authenticate(email, password).await?;
        if !user.is_superadmin {
            tracing::warn!(user_id = %user.id, "super-admin login refused for regular account");
            return Err(AuthError::NotSuperAdmin);
        }

        let tokens = self.token_pair(&user, Tenant::Global, Role::Superadmin)?;
        let now = Utc::now();
        self.store.record_login(user.id, now).await?;

        Ok(Session {
            tokens,
            user: User { last_login_at: Some(now), ..user },
            companies: Vec::new(),
        })
    }

    /// Trade a refresh token for a new pair. Tenant and role are re-resolved, never copied.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .tokens
            .validate_refresh(refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = self
            .store
            .find_user(claims.sub)
            .await?
            .filter(User::can_sign_in)
            .ok_or(AuthError::InvalidRefreshToken)?;

        let (tenant, role) = self.memberships.token_context(user.id).await?;
        self.token_pair(&user, tenant, role)
    }

    /// Re-scope the caller to another company they are an active member of.
    /// The default membership is left alone.
    pub async fn switch_company(&self, user_id: Uuid, company_id: Uuid) -> Result<SwitchedCompany, AuthError> {
        let user = self.store.find_user(user_id).await?.ok_or(AuthError::UserNotFound)?;
        if !user.can_sign_in() {
            return Err(AuthError::InactiveAccount);
        }
        let membership = self
            .memberships
            .active_membership_of(user_id, company_id)
            .await?
            .ok_or(AuthError::NoMembership)?;
        let company = self
            .store
            .find_company(company_id)
            .await?
            .ok_or(AuthError::CompanyNotFound)?;

        let access_token =
            self.tokens
                .issue_access_token(user.id, Tenant::Scoped(company.id), &user.email, membership.role)?;

        Ok(SwitchedCompany {
            access_token,
            token_type: "Bearer",
            expires_in: self.tokens.access_ttl_secs(),
            company: company.summary(),
            role: membership.role,
        })
    }

    /// Public tenant bootstrap: a free-plan company, its admin and the admin's default membership.
    pub async fn register_company(&self, request: CompanyRegistration) -> Result<RegisteredCompany, AuthError> {
        let timezone = request
            .timezone
            .clone()
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or_else(|| self.default_timezone.clone());
        let company = Company::new(&request.company_name, &request.company_slug, DEFAULT_PLAN, &timezone);

        let (company, admin) = self.bootstrap(company, &request).await?;

        Ok(RegisteredCompany {
            tokens: self.token_pair(&admin, Tenant::Scoped(company.id), Role::Admin)?,
            company: company.summary(),
            admin,
        })
    }

    /// Super-admin variant of [`register_company`](Self::register_company): the plan is
    /// chosen and validated, a one month trial starts, and no tokens are issued.
    pub async fn create_company_with_admin(
        &self,
        request: CompanyRegistration,
    ) -> Result<(Company, User), AuthError> {
        let slug = request
            .plan_slug
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PLAN.to_string());
        let plan = self
            .store
            .find_active_plan(&slug)
            .await?
            .ok_or(AuthError::PlanUnavailable(slug))?;

        let timezone = request.timezone.clone().unwrap_or_else(|| self.default_timezone.clone());
        let mut company = Company::new(&request.company_name, &request.company_slug, &plan.slug, &timezone);
        company.trial_ends_at = Utc::now().checked_add_months(Months::new(1));

        self.bootstrap(company, &request).await
    }

    async fn bootstrap(
        &self,
        company: Company,
        request: &CompanyRegistration,
    ) -> Result<(Company, User), AuthError> {
        if self.store.find_user_by_email(&request.admin_email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let hash = password::hash(&request.admin_password).map_err(AuthError::Hash)?;
        let admin = User::new(&request.admin_email, hash, &request.admin_first_name, &request.admin_last_name);
        let membership = Membership::active(admin.id, company.id, Role::Admin, true);

        self.store
            .provision(&Provisioning {
                company: Some(company.clone()),
                user: admin.clone(),
                membership: Some(membership),
            })
            .await?;

        tracing::info!(company_id = %company.id, slug = %company.slug, admin_id = %admin.id, "company provisioned");
        Ok((company, admin))
    }

    /// A wrong old password leaves the stored hash untouched.
    pub async fn change_password(&self, user_id: Uuid, old: &str, new: &str) -> Result<(), AuthError> {
        let user = self.store.find_user(user_id).await?.ok_or(AuthError::UserNotFound)?;
        if !password::verify(old, &user.password_hash).map_err(AuthError::Hash)? {
            return Err(AuthError::InvalidPassword);
        }
        let hash = password::hash(new).map_err(AuthError::Hash)?;
        self.store.update_user_password(user.id, &hash).await?;
        Ok(())
    }

    pub async fn user_companies(&self, user_id: Uuid) -> Result<Vec<CompanySummary>, AuthError> {
        let companies = self.store.list_user_companies(user_id).await?;
        Ok(companies.iter().map(Company::summary).collect())
    }

    pub async fn me(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.store.find_user(user_id).await?.ok_or(AuthError::UserNotFound)
    }
}
