#![allow(dead_code)]

use std::net::TcpListener;
use once_cell::sync::Lazy;
use reqwest::{Client, Response};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

use scorer_backend::run;
use scorer_backend::auth::jwt::generate_token;
use scorer_backend::config::jwt::JwtSettings;
use scorer_backend::config::settings::{get_config, DatabaseSettings};
use scorer_backend::db::Repositories;
use scorer_backend::telemetry::{get_subscriber, init_subscriber};

const TEST_JWT_SECRET: &str = "integration-test-secret";

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::stdout
        );
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::sink
        );
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub client: Client,
    jwt_settings: JwtSettings,
}

pub fn test_jwt_settings() -> JwtSettings {
    JwtSettings::new(TEST_JWT_SECRET.to_string(), 1)
}

pub async fn spawn_app() -> TestApp {
    spawn_app_on(Repositories::in_memory()).await
}

/// Same app, backed by a freshly migrated Postgres database
pub async fn spawn_app_on_postgres() -> TestApp {
    spawn_app_on(Repositories::postgres(test_db_pool().await)).await
}

async fn spawn_app_on(repositories: Repositories) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let server = run(
        listener,
        repositories,
        test_jwt_settings(),
        vec!["http://localhost:3000".to_string()],
    )
        .expect("Failed to bind address");
    // Launch the server as a background task
    let _ = tokio::spawn(server);

    TestApp {
        address,
        client: Client::new(),
        jwt_settings: test_jwt_settings(),
    }
}

/// A throwaway database named after a random uuid, migrated to the latest schema
pub async fn test_db_pool() -> PgPool {
    Lazy::force(&TRACING);

    let mut configuration = get_config().expect("Failed to read configuration.");
    configuration.database.db_name = Uuid::new_v4().to_string();
    configure_db(&configuration.database).await
}

pub async fn configure_db(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(
            config.connection_string_without_db().expose_secret()
        )
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.db_name).as_str())
        .await
        .expect("Failed to create database.");

    // Migrate database
    let connection_pool = PgPool::connect(
            config.connection_string_for(&config.db_name).expose_secret()
        )
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    connection_pool
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Bearer token for an identity that may or may not be registered yet
    pub fn token_for(&self, auth_id: &str) -> String {
        let email = format!("{}@example.com", auth_id);
        generate_token(&self.jwt_settings, auth_id, Some(email.as_str()))
            .expect("Failed to generate token")
    }

    /// Sign in as `auth_id` and complete registration; returns the token
    pub async fn register_user(&self, auth_id: &str, username: &str) -> String {
        let token = self.token_for(auth_id);
        let response = self
            .post(
                "/api/auth/register",
                &token,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username)
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201, "registration of {} failed", username);
        token
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str, token: &str) -> Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete(&self, path: &str, token: &str) -> Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Make `a` and `b` friends through the request/accept flow
    pub async fn befriend(&self, a_token: &str, b_token: &str, b_id: &str, a_id: &str) {
        let sent = self
            .post("/api/friends/request", a_token, json!({ "user_id": b_id }))
            .await;
        assert!(sent.status().is_success());
        let accepted = self
            .post("/api/friends/accept", b_token, json!({ "user_id": a_id }))
            .await;
        assert!(accepted.status().is_success());
    }
}

pub async fn body_json(response: Response) -> Value {
    response.json::<Value>().await.expect("Cannot turn into a json.")
}
