use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Duration;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use dvra::config::{Config, StoreKind, SuperAdminSeed};
use dvra::db::{MemoryStore, PgStore, SharedStore};
use dvra::rate_limit::LoginRateLimiter;

pub const SUPERADMIN_EMAIL: &str = "root@dvra.test";
pub const SUPERADMIN_PASSWORD: &str = "root-password";
pub const PASSWORD: &str = "password123";

/// A running test server backed by its own in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: SharedStore,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> (Value, StatusCode) {
        let resp = req.send().await.expect("request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Unauthenticated POST with JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    /// Public company registration; returns the response body and status.
    pub async fn register_company(&self, slug: &str, email: &str) -> (Value, StatusCode) {
        self.post(
            "/api/v1/auth/register-company",
            &json!({
                "company_name": format!("{slug} inc"),
                "company_slug": slug,
                "admin_email": email,
                "admin_password": PASSWORD,
                "admin_first_name": "Ada",
                "admin_last_name": "Admin",
            }),
        )
        .await
    }

    /// Register a company and return (admin access token, company id).
    pub async fn tenant(&self, slug: &str, email: &str) -> (String, String) {
        let (body, status) = self.register_company(slug, email).await;
        assert_eq!(status, StatusCode::CREATED, "register-company failed: {body}");
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["company"]["id"].as_str().unwrap().to_string(),
        )
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        self.post("/api/v1/auth/login", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn superadmin_login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            "/api/v1/auth/superadmin/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Access token for the seeded platform super-admin.
    pub async fn superadmin_token(&self) -> String {
        let (body, status) = self.superadmin_login(SUPERADMIN_EMAIL, SUPERADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "superadmin login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        self.send(self.client.get(self.url(path)).bearer_auth(token)).await
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        self.send(self.client.post(self.url(path)).bearer_auth(token).json(body))
            .await
    }

    /// Make an authenticated PUT request with JSON body.
    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        self.send(self.client.put(self.url(path)).bearer_auth(token).json(body))
            .await
    }

    /// Make an authenticated DELETE request.
    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        self.send(self.client.delete(self.url(path)).bearer_auth(token)).await
    }
}

pub fn test_config() -> Config {
    Config {
        store: StoreKind::Memory,
        jwt_secret: "test-access-secret".to_string(),
        jwt_refresh_secret: "test-refresh-secret".to_string(),
        access_ttl: Duration::hours(1),
        refresh_ttl: Duration::days(30),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        cors_origins: vec!["http://localhost:3000".to_string()],
        max_body_size: 1_048_576,
        default_timezone: "America/Bogota".to_string(),
        log_level: "warn".to_string(),
        superadmin: Some(SuperAdminSeed {
            email: SUPERADMIN_EMAIL.to_string(),
            password: SUPERADMIN_PASSWORD.to_string(),
        }),
    }
}

/// Spawn a test app on a random port with a seeded super-admin.
pub async fn spawn_app() -> TestApp {
    serve(test_config(), Arc::new(MemoryStore::new())).await
}

/// Same server, backed by a Postgres test database.
#[allow(dead_code)]
pub async fn spawn_pg_app(db: &TestDb) -> TestApp {
    let mut config = test_config();
    config.store = StoreKind::Postgres { database_url: db.url.clone() };
    serve(config, Arc::new(PgStore::new(db.pool.clone()))).await
}

async fn serve(config: Config, store: SharedStore) -> TestApp {
    if let Some(seed) = &config.superadmin {
        dvra::seed::ensure_superadmin(&store, seed)
            .await
            .expect("Failed to seed super admin");
    }

    let app = dvra::build_app(store.clone(), config, Arc::new(LoginRateLimiter::new()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        store,
        client: Client::new(),
    }
}

/// A throwaway database with migrations applied.
#[allow(dead_code)]
pub struct TestDb {
    pub pool: PgPool,
    pub url: String,
    pub db_name: String,
}

fn database_url() -> Option<String> {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").ok()
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Create a fresh database. Returns `None` when `DATABASE_URL` is unset so the
/// Postgres suite is skipped on machines without a server.
#[allow(dead_code)]
pub async fn test_db() -> Option<TestDb> {
    let Some(base_url) = database_url() else {
        eprintln!("DATABASE_URL not set; skipping Postgres test");
        return None;
    };

    let db_name = format!("dvra_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    Some(TestDb { pool, url, db_name })
}

/// Drop the test database after the test completes.
#[allow(dead_code)]
pub async fn drop_test_db(db: TestDb) {
    db.pool.close().await;

    let Some(base_url) = database_url() else {
        return;
    };
    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", db.db_name))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
