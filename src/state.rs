use std::sync::Arc;

use crate::auth::jwt::TokenService;
use crate::config::Config;
use crate::db::SharedStore;
use crate::rate_limit::LoginRateLimiter;
use crate::services::{AdminService, AuthService};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: SharedStore,
    pub config: Config,
    pub tokens: Arc<TokenService>,
    pub auth: AuthService,
    pub admin: AdminService,
    pub login_limiter: Arc<LoginRateLimiter>,
}
