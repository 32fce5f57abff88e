pub mod extractor;
pub mod jwt;
pub mod membership;
pub mod password;
pub mod scope;
pub mod tenant;

pub use extractor::{AuthUser, SuperAdmin, TenantUser};
pub use membership::MembershipResolver;
pub use scope::Scope;
pub use tenant::Tenant;
