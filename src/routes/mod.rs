pub mod admin;
pub mod applications;
pub mod auth;
pub mod candidates;
pub mod companies;
pub mod jobs;
pub mod memberships;
pub mod plans;
pub mod system_values;
pub mod users;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/register-company", post(auth::register_company))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/superadmin/login", post(auth::superadmin_login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/change-password", post(auth::change_password))
        .route("/api/v1/auth/switch-company", post(auth::switch_company))
        .route("/api/v1/auth/companies", get(auth::my_companies))
        // Jobs
        .route("/api/v1/jobs", get(jobs::list).post(jobs::create))
        .route(
            "/api/v1/jobs/{id}",
            get(jobs::get).put(jobs::update).delete(jobs::delete),
        )
        // Candidates
        .route("/api/v1/candidates", get(candidates::list).post(candidates::create))
        .route(
            "/api/v1/candidates/{id}",
            get(candidates::get)
                .put(candidates::update)
                .delete(candidates::delete),
        )
        // Applications
        .route(
            "/api/v1/applications",
            get(applications::list).post(applications::create),
        )
        .route(
            "/api/v1/applications/{id}",
            get(applications::get)
                .put(applications::update)
                .delete(applications::delete),
        )
        // System values
        .route(
            "/api/v1/system-values",
            get(system_values::list).post(system_values::create),
        )
        .route(
            "/api/v1/system-values/{id}",
            get(system_values::get)
                .put(system_values::update)
                .delete(system_values::delete),
        )
        // Memberships
        .route(
            "/api/v1/memberships",
            get(memberships::list).post(memberships::create),
        )
        .route(
            "/api/v1/memberships/{id}",
            get(memberships::get)
                .put(memberships::update)
                .delete(memberships::delete),
        )
        .route("/api/v1/memberships/{id}/accept", post(memberships::accept))
        // Users
        .route("/api/v1/users", get(users::list).post(users::create))
        .route(
            "/api/v1/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        // Companies
        .route("/api/v1/companies", get(companies::list))
        .route("/api/v1/companies/current", get(companies::current))
        .route(
            "/api/v1/companies/{id}",
            get(companies::get).put(companies::update),
        )
        // Plans
        .route("/api/v1/plans", get(plans::list))
        // Super admin
        .route(
            "/api/v1/admin/companies",
            get(admin::list_companies).post(admin::create_company),
        )
        .route("/api/v1/admin/companies/{id}/plan", put(admin::change_plan))
        .route("/api/v1/admin/companies/{id}/suspend", post(admin::suspend))
        .route(
            "/api/v1/admin/companies/{id}/reactivate",
            post(admin::reactivate),
        )
        .route(
            "/api/v1/admin/companies/{id}/users",
            get(admin::company_users),
        )
        .route("/api/v1/admin/analytics", get(admin::analytics))
}
