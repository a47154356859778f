use lockbox_api::routes;
use lockbox_api::state::AppState;
use lockbox_core::{AesGcmEncryption, Config, Encryption, InMemoryKeyStore};
use lockbox_db::SqliteFiler;
use lockbox_processing::{
    scaler, ImagePreviewGenerator, ImageScaler, NoOpScanner, PreviewService,
};
use lockbox_storage::create_store;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let keystore = Arc::new(InMemoryKeyStore::new());
    let encryption: Arc<dyn Encryption> = Arc::new(AesGcmEncryption::new(keystore));

    let store = create_store(&config, encryption)?;
    store.initialise().await?;

    let pool = lockbox_db::connect(&config.database_url).await?;
    let filer = SqliteFiler::new(pool);
    filer.init().await?;

    let image_scaler = Arc::new(ImageScaler::with_default_types());
    let preview_generator = Arc::new(ImagePreviewGenerator::new(image_scaler.clone()));
    let mut previews = PreviewService::new();
    for content_type in [scaler::PNG, scaler::GIF, scaler::JPEG] {
        previews.register(content_type, preview_generator.clone());
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        filer: Arc::new(filer),
        scaler: image_scaler,
        previews: Arc::new(previews),
        scanner: Arc::new(NoOpScanner),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        backend = %config.storage_backend,
        "lockbox attachment service listening"
    );
    axum::serve(listener, routes::router(state)).await?;

    Ok(())
}
