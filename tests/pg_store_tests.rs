mod common;

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{TestDb, PASSWORD};
use dvra::auth::Scope;
use dvra::db::{
    CompanyRepository, JobRepository, MembershipRepository, PgStore, Provisioner, Provisioning,
    StoreError, SystemValueRepository, UserRepository,
};
use dvra::models::{Company, Job, JobStatus, Membership, Role, SystemValue, User};

fn user(email: &str) -> User {
    User::new(email, "hash".to_string(), "Test", "User")
}

async fn company_with_admin(store: &PgStore, slug: &str) -> (Company, User) {
    let company = Company::new(slug, slug, "free", "UTC");
    let admin = user(&format!("admin@{slug}.io"));
    let membership = Membership::active(admin.id, company.id, Role::Admin, true);
    store
        .provision(&Provisioning {
            company: Some(company.clone()),
            user: admin.clone(),
            membership: Some(membership),
        })
        .await
        .unwrap();
    (company, admin)
}

fn job(company_id: Uuid, title: &str) -> Job {
    let now = Utc::now();
    Job {
        id: Uuid::now_v7(),
        company_id,
        title: title.to_string(),
        description: "Build things".to_string(),
        requirements: None,
        benefits: None,
        salary_min: None,
        salary_max: None,
        status: JobStatus::Draft,
        location_type: "remote".to_string(),
        assigned_recruiter: None,
        hiring_manager: None,
        created_at: now,
        updated_at: now,
    }
}

fn system_value(company_id: Option<Uuid>, value: &str) -> SystemValue {
    SystemValue {
        id: Uuid::now_v7(),
        company_id,
        category: "skill".to_string(),
        value: value.to_string(),
        label: value.to_uppercase(),
        description: None,
        display_order: 0,
        is_active: true,
        created_at: Utc::now(),
    }
}

fn store(db: &TestDb) -> PgStore {
    PgStore::new(db.pool.clone())
}

#[tokio::test]
async fn duplicate_slug_rolls_back_the_whole_bootstrap() {
    let Some(db) = common::test_db().await else { return };
    let store = store(&db);
    company_with_admin(&store, "acme").await;

    let again = Company::new("Acme 2", "acme", "free", "UTC");
    let admin = user("second@acme.io");
    let membership = Membership::active(admin.id, again.id, Role::Admin, true);
    let err = store
        .provision(&Provisioning { company: Some(again.clone()), user: admin, membership: Some(membership) })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(ref c) if c == "companies_slug_key"), "{err}");
    assert!(store.find_user_by_email("second@acme.io").await.unwrap().is_none());
    assert!(store.find_company(again.id).await.unwrap().is_none());

    // Failure after the company and user rows were written.
    let company = Company::new("Broken", "broken", "free", "UTC");
    let stranded = user("stranded@broken.io");
    let bad = Membership::active(stranded.id, company.id, Role::Superadmin, true);
    let err = store
        .provision(&Provisioning { company: Some(company.clone()), user: stranded, membership: Some(bad) })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)), "{err}");
    assert!(store.find_company(company.id).await.unwrap().is_none());
    assert!(store.find_user_by_email("stranded@broken.io").await.unwrap().is_none());

    common::drop_test_db(db).await;
}

#[tokio::test]
async fn a_new_default_replaces_the_old_one() {
    let Some(db) = common::test_db().await else { return };
    let store = store(&db);
    let (first, admin) = company_with_admin(&store, "first").await;
    let (second, _) = company_with_admin(&store, "second").await;

    let joined = Membership::active(admin.id, second.id, Role::Recruiter, true);
    store.create_membership(&joined).await.unwrap();
    let default = store.find_default_membership(admin.id).await.unwrap().unwrap();
    assert_eq!(default.company_id, Some(second.id));

    let mut original = store.find_user_membership(admin.id, first.id).await.unwrap().unwrap();
    assert!(!original.is_default);
    original.is_default = true;
    store.update_membership(&original).await.unwrap();

    let defaults: Vec<_> = store
        .list_user_memberships(admin.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|m| m.is_default)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].company_id, Some(first.id));

    // A rejected insert must not have cleared the existing default.
    let duplicate = Membership::active(admin.id, first.id, Role::User, true);
    let err = store.create_membership(&duplicate).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(ref c) if c == "memberships_user_company_key"), "{err}");
    let default = store.find_default_membership(admin.id).await.unwrap().unwrap();
    assert_eq!(default.company_id, Some(first.id));

    common::drop_test_db(db).await;
}

#[tokio::test]
async fn scoped_queries_only_return_own_rows() {
    let Some(db) = common::test_db().await else { return };
    let store = store(&db);
    let (a, a_admin) = company_with_admin(&store, "a").await;
    let (b, b_admin) = company_with_admin(&store, "b").await;

    store.create_job(&job(a.id, "Rust engineer")).await.unwrap();
    store.create_job(&job(a.id, "Go engineer")).await.unwrap();
    store.create_job(&job(b.id, "Designer")).await.unwrap();
    assert_eq!(store.list_jobs(Scope::Company(a.id)).await.unwrap().len(), 2);
    assert_eq!(store.list_jobs(Scope::Company(b.id)).await.unwrap().len(), 1);
    assert_eq!(store.list_jobs(Scope::All).await.unwrap().len(), 3);
    assert_eq!(store.count_jobs(Scope::Company(b.id)).await.unwrap(), 1);

    store.create_system_value(&system_value(Some(a.id), "rust")).await.unwrap();
    store.create_system_value(&system_value(Some(b.id), "rust")).await.unwrap();
    store.create_system_value(&system_value(None, "sql")).await.unwrap();
    let visible = store.list_system_values(Scope::Company(a.id), Some("skill")).await.unwrap();
    assert_eq!(visible.len(), 2);
    assert!(visible.iter().all(|v| v.company_id.is_none() || v.company_id == Some(a.id)));
    assert!(store.list_system_values(Scope::Company(a.id), Some("stage")).await.unwrap().is_empty());

    let members = store.list_memberships(Scope::Company(a.id)).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, a_admin.id);
    let users = store.list_company_users(b.id).await.unwrap();
    assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), [b_admin.id]);

    common::drop_test_db(db).await;
}

#[tokio::test]
async fn updates_write_every_editable_column() {
    let Some(db) = common::test_db().await else { return };
    let store = store(&db);
    let (company, admin) = company_with_admin(&store, "acme").await;

    let rust = store.create_system_value(&system_value(Some(company.id), "rust")).await.unwrap();
    let mut go = store.create_system_value(&system_value(Some(company.id), "go")).await.unwrap();
    go.value = "golang".to_string();
    assert_eq!(store.update_system_value(&go).await.unwrap().value, "golang");

    let mut clash = rust.clone();
    clash.value = "golang".to_string();
    let err = store.update_system_value(&clash).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(ref c) if c == "system_values_company_key"), "{err}");

    let mut renamed = admin.clone();
    renamed.first_name = "Grace".to_string();
    renamed.is_active = false;
    let updated = store.update_user(&renamed).await.unwrap();
    assert_eq!(updated.first_name, "Grace");
    assert!(!updated.is_active);

    store.soft_delete_user(admin.id).await.unwrap();
    assert!(matches!(store.update_user(&renamed).await, Err(StoreError::NotFound)));
    store.create_user(&user(&admin.email)).await.unwrap();

    common::drop_test_db(db).await;
}

#[tokio::test]
async fn registration_and_tenant_flow_over_postgres() {
    let Some(db) = common::test_db().await else { return };
    let app = common::spawn_pg_app(&db).await;

    let (acme, acme_id) = app.tenant("acme", "a@acme.com").await;
    let (_, status) = app.register_company("acme", "b@acme.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, status) = app.login("b@acme.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (job, status) = app
        .post_auth(
            "/api/v1/jobs",
            &acme,
            &json!({ "title": "Rust engineer", "description": "Build things", "location_type": "remote" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{job}");
    assert_eq!(job["company_id"], acme_id.as_str());

    let (globex, _) = app.tenant("globex", "g@globex.com").await;
    let (body, _) = app.get_auth("/api/v1/jobs", &globex).await;
    assert_eq!(body, json!([]));
    let path = format!("/api/v1/jobs/{}", job["id"].as_str().unwrap());
    let (_, status) = app.get_auth(&path, &globex).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let root = app.superadmin_token().await;
    let (body, status) = app.get_auth("/api/v1/admin/companies", &root).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    common::drop_test_db(db).await;
}
