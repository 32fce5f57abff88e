use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A membership role. The privilege ladder lives in [`Role::level`] and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Recruiter,
    User,
}

impl Role {
    pub fn level(self) -> u8 {
        match self {
            Role::Superadmin => 100,
            Role::Admin => 50,
            Role::Recruiter => 30,
            Role::User => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Recruiter => "recruiter",
            Role::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "superadmin" => Some(Role::Superadmin),
            "admin" => Some(Role::Admin),
            "recruiter" => Some(Role::Recruiter),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// Privilege level of a raw role string. Unknown roles get 0.
    pub fn level_of(s: &str) -> u8 {
        Role::parse(s).map(Role::level).unwrap_or(0)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Inactive,
    Pending,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    /// `None` only for the global super-admin membership.
    pub company_id: Option<Uuid>,
    pub role: Role,
    pub status: MembershipStatus,
    pub is_default: bool,
    pub invited_by: Option<Uuid>,
    pub invited_at: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// An active membership in `company_id`, joined now.
    pub fn active(user_id: Uuid, company_id: Uuid, role: Role, is_default: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            company_id: Some(company_id),
            role,
            status: MembershipStatus::Active,
            is_default,
            invited_by: None,
            invited_at: None,
            joined_at: Some(now),
            created_at: now,
        }
    }

    /// A pending invitation into `company_id`.
    pub fn invited(user_id: Uuid, company_id: Uuid, role: Role, invited_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            company_id: Some(company_id),
            role,
            status: MembershipStatus::Pending,
            is_default: false,
            invited_by: Some(invited_by),
            invited_at: Some(now),
            joined_at: None,
            created_at: now,
        }
    }

    /// The tenant-less super-admin membership.
    pub fn global_superadmin(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            company_id: None,
            role: Role::Superadmin,
            status: MembershipStatus::Active,
            is_default: true,
            invited_by: None,
            invited_at: None,
            joined_at: Some(now),
            created_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }

    /// Super-admin role and missing tenant must go together.
    pub fn has_consistent_scope(&self) -> bool {
        (self.role == Role::Superadmin) == self.company_id.is_none()
    }

    /// Accept a pending invitation.
    pub fn accept(&mut self) -> Result<(), String> {
        if self.status != MembershipStatus::Pending {
            return Err("Only pending memberships can be accepted".to_string());
        }
        self.status = MembershipStatus::Active;
        self.joined_at = Some(Utc::now());
        Ok(())
    }
}
