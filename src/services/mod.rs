pub mod admin;
pub mod auth;

pub use admin::AdminService;
pub use auth::{AuthError, AuthService};
