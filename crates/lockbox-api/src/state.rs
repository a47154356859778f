use lockbox_core::{Config, Filer};
use lockbox_processing::{ImageScaler, PreviewService, Scanner};
use lockbox_storage::AttachmentStore;
use std::sync::Arc;

/// Shared application state, cloned cheaply into every handler.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn AttachmentStore>,
    pub filer: Arc<dyn Filer>,
    pub scaler: Arc<ImageScaler>,
    pub previews: Arc<PreviewService>,
    pub scanner: Arc<dyn Scanner>,
}
