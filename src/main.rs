use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Compress, web, App, HttpServer};
use anyhow::Context;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use forum::openapi::ApiDoc;
use forum::{config, AppConfig, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cfg = AppConfig::from_env()?;
    info!("Bootstrapping forum server");
    info!("Frontend URL: {}", cfg.frontend_url.as_deref().unwrap_or("http://localhost:5173"));

    let state = build_state(&cfg).await?;
    let openapi = ApiDoc::openapi();

    let frontend_url = cfg.frontend_url.clone();
    let server = HttpServer::new(move || {
        let cors = {
            let mut c = Cors::default()
                .allowed_origin("http://localhost:5173")
                .allowed_origin("http://127.0.0.1:5173")
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allow_any_header()
                .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .supports_credentials()
                .max_age(3600);
            if let Some(front) = &frontend_url {
                c = c.allowed_origin(front);
            }
            c
        };

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()))
    })
    .bind((cfg.host.as_str(), cfg.port))
    .with_context(|| format!("binding {}:{}", cfg.host, cfg.port))?;

    info!("Listening on http://{}:{}", cfg.host, cfg.port);

    server.run().await?;
    Ok(())
}

/// Postgres when `DATABASE_URL` is set, the in-memory store otherwise.
async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    if let Some(db_url) = &cfg.database_url {
        return postgres_state(cfg, db_url).await;
    }
    in_memory_state()
}

#[cfg(feature = "postgres-store")]
async fn postgres_state(cfg: &AppConfig, db_url: &str) -> anyhow::Result<AppState> {
    use forum::repo::pg::PgRepo;
    use sqlx::postgres::PgPoolOptions;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_max_connections)
        .connect(db_url)
        .await
        .context("connecting to Postgres")?;
    if cfg.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await.context("running migrations")?;
        info!("Migrations applied");
    }
    info!("Using Postgres repository backend");
    Ok(AppState::new(Arc::new(PgRepo::new(pool))))
}

#[cfg(not(feature = "postgres-store"))]
async fn postgres_state(_cfg: &AppConfig, _db_url: &str) -> anyhow::Result<AppState> {
    anyhow::bail!("DATABASE_URL is set but the postgres-store feature is disabled")
}

#[cfg(feature = "inmem-store")]
fn in_memory_state() -> anyhow::Result<AppState> {
    info!("Using in-memory repository backend");
    Ok(AppState::new(Arc::new(forum::repo::inmem::InMemRepo::new())))
}

#[cfg(not(feature = "inmem-store"))]
fn in_memory_state() -> anyhow::Result<AppState> {
    anyhow::bail!("DATABASE_URL must be set when the inmem-store feature is disabled")
}
