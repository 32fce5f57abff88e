use uuid::Uuid;

use crate::auth::tenant::Tenant;
use crate::db::{CompanyRepository, MembershipRepository, SharedStore, StoreError};
use crate::models::{Membership, Role};

/// Read-side membership lookups. Always hits the store: a revoked membership must
/// stop granting access on the next token issued.
#[derive(Clone)]
pub struct MembershipResolver {
    store: SharedStore,
}

impl MembershipResolver {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn default_membership_of(&self, user_id: Uuid) -> Result<Option<Membership>, StoreError> {
        self.store.find_default_membership(user_id).await
    }

    pub async fn membership_of(&self, user_id: Uuid, company_id: Uuid) -> Result<Option<Membership>, StoreError> {
        self.store.find_user_membership(user_id, company_id).await
    }

    /// The membership if it is active and its company can currently be entered.
    pub async fn active_membership_of(
        &self,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Membership>, StoreError> {
        let Some(membership) = self.membership_of(user_id, company_id).await? else {
            return Ok(None);
        };
        self.enterable(membership).await
    }

    /// Tenant and role for a freshly issued login or refresh token. Falls back to
    /// `(Global, User)`; the super-admin role is never produced here.
    pub async fn token_context(&self, user_id: Uuid) -> Result<(Tenant, Role), StoreError> {
        let fallback = (Tenant::Global, Role::User);
        let Some(default) = self.default_membership_of(user_id).await? else {
            return Ok(fallback);
        };
        match self.enterable(default).await? {
            Some(m) => Ok((Tenant::from(m.company_id), m.role)),
            None => Ok(fallback),
        }
    }

    async fn enterable(&self, membership: Membership) -> Result<Option<Membership>, StoreError> {
        let Some(company_id) = membership.company_id else {
            return Ok(None);
        };
        if !membership.is_active() || membership.role == Role::Superadmin {
            return Ok(None);
        }
        match self.store.find_company(company_id).await? {
            Some(company) if !company.is_suspended() => Ok(Some(membership)),
            _ => Ok(None),
        }
    }
}
