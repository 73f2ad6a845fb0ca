use std::net::TcpListener;
use std::time::Duration;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;

use scorer_backend::run;
use scorer_backend::config::settings::{get_config, get_jwt_settings};
use scorer_backend::db::Repositories;
use scorer_backend::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Panic if we can't read the config
    let config = get_config().expect("Failed to read the config.");

    let subscriber = get_subscriber(
        "scorer-backend".into(),
        config.application.log_level.clone(),
        std::io::stdout
    );
    init_subscriber(subscriber);

    let jwt_settings = get_jwt_settings(&config);

    let repositories = if config.database.in_memory {
        tracing::warn!("Running on the in-memory store, data is lost on restart");
        Repositories::in_memory()
    } else {
        // Only try to establish connection when actually used
        let connection_pool = PgPoolOptions::new()
            .max_connections(32)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect_lazy(
                config.database.connection_string().expose_secret()
            )
            .expect("Failed to create Postgres connection pool");

        if let Err(e) = sqlx::migrate!("./migrations").run(&connection_pool).await {
            tracing::error!("Failed to run database migrations: {}", e);
            std::process::exit(1);
        }
        tracing::info!("Database migrations applied");

        Repositories::postgres(connection_pool)
    };

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Listening on {}", address);

    run(
        listener,
        repositories,
        jwt_settings,
        config.application.allowed_origins.clone()
    )?.await
}
