//! Which rows a caller may see or touch. Every tenant resource handler goes through
//! these three checks instead of comparing company ids itself.

use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;

/// Row filter for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Company(Uuid),
}

impl Scope {
    /// `None` means unfiltered.
    pub fn company_id(self) -> Option<Uuid> {
        match self {
            Scope::All => None,
            Scope::Company(id) => Some(id),
        }
    }
}

impl AuthUser {
    /// Super-admins list everything; everyone else lists their own company only.
    pub fn list_scope(&self) -> Result<Scope, AppError> {
        if self.is_superadmin() {
            return Ok(Scope::All);
        }
        self.company_id().map(Scope::Company)
    }

    /// Ownership check for a loaded row. A row with no owner (a global membership or
    /// system value) is never owned by a tenant caller.
    pub fn ensure_can_access(&self, owner: Option<Uuid>) -> Result<(), AppError> {
        if self.is_superadmin() {
            return Ok(());
        }
        let company_id = self.company_id()?;
        if owner == Some(company_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden("Access denied".to_string()))
        }
    }

    /// Company a new row belongs to. Tenant callers always write into their own company
    /// whatever the payload says; super-admins must name one.
    pub fn owning_company(&self, requested: Option<Uuid>) -> Result<Uuid, AppError> {
        if self.is_superadmin() {
            return requested.ok_or_else(|| AppError::BadRequest("company_id is required".to_string()));
        }
        self.company_id()
    }
}
