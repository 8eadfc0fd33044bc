use dotenvy::dotenv;
use pub_express_pos::{
    api::{self, AppState},
    config::{
        self,
        database::{create_connection, create_tables, get_database_url},
    },
    core::bootstrap,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::app::load_app_configuration()?;
    info!("Successfully processed application configuration.");

    // 4. Open the database, creating its directory on first start
    if let Some(parent) = app_config
        .database
        .path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    let database_url = get_database_url(&app_config.database);
    let db = create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to open database: {}", e))?;
    create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Supervisor provisioning, orphan sweep, monthly backup
    let report = bootstrap::run_startup_tasks(&db, &app_config, &database_url).await?;
    info!(
        supervisor_created = report.supervisor_created,
        orphans_removed = report.orphans_removed,
        backup = ?report.backup,
        "Startup tasks finished."
    );

    // 6. Serve the HTTP API
    api::serve(AppState::new(db), &app_config.server.bind_address()).await
}
