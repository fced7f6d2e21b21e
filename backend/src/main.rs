use backend::{build_rocket, config::AppConfig, queries::PgPollStore, routes::AppState};
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use tracing::info;

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting poll server");

    let config = AppConfig::from_lookup(|key| secret_store.get(key))
        .map_err(CustomError::new)?;

    PgPollStore::new(pool.clone())
        .migrate()
        .await
        .map_err(CustomError::new)?;

    info!("📋 Migrations complete");

    let rocket = build_rocket(AppState::new(pool, config));

    Ok(rocket.into())
}
