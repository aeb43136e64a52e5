use dotenvy::dotenv;
use std::sync::Arc;
use streeplijst::{
    api::CongressusClient,
    config::{app, database},
    controller::SyncController,
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since variables can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = app::load_default_config()
        .inspect_err(|e| error!("Failed to load config.toml: {}", e))?;
    let app_config = Arc::new(app_config);
    info!(
        folders = app_config.folders.len(),
        "Loaded application configuration."
    );

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Build the remote client; the token is read here, directly before use
    let token =
        app::get_api_token().inspect_err(|e| error!("CONGRESSUS_TOKEN not found: {}", e))?;
    let client = CongressusClient::new(&app_config.api, token)?;

    // 6. Register configured folders and warm them
    let sync = SyncController::new(db, client, Arc::clone(&app_config));
    let folders = sync.register_configured_folders().await?;
    for folder in folders {
        match sync.load_folder(folder.id, false, None, None).await {
            Ok(folder) => info!(
                folder_id = folder.id,
                name = %folder.name,
                synchronized_at = %folder.synchronized_at,
                "Folder ready."
            ),
            Err(e) => warn!(folder_id = folder.id, "Serving stale folder: {}", e),
        }
    }

    Ok(())
}
