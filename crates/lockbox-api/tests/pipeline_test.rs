//! End-to-end pipeline tests over the local backend: stage, transform,
//! encrypt, persist, then stream back and verify bytes.

use futures::StreamExt;
use image::{GenericImageView, ImageFormat, ImageReader, Rgba, RgbaImage};
use lockbox_api::services::pipeline;
use lockbox_api::state::AppState;
use lockbox_core::{
    AesGcmEncryption, AppError, Config, Encryption, Filer, InMemoryKeyStore, RawUpload, S3Config,
    StorageBackend,
};
use lockbox_db::SqliteFiler;
use lockbox_processing::{
    scaler, ImagePreviewGenerator, ImageScaler, NoOpScanner, PreviewService,
};
use lockbox_storage::{AttachmentStore, DownloadStream, LocalVault};
use sqlx::sqlite::SqlitePoolOptions;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

const KEY: &str = "12345678901234567890123456789012";
const WRONG_KEY: &str = "abcdefghijklmnopqrstuvwxyz012345";

async fn test_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let staging = dir.path().join("staging");
    let vault = dir.path().join("vault");

    let config = Config {
        server_port: 0,
        storage_backend: StorageBackend::Local,
        staging_path: staging.to_string_lossy().into_owned(),
        durable_path: vault.to_string_lossy().into_owned(),
        s3: S3Config::default(),
        database_url: "sqlite::memory:".to_string(),
        max_image_width: 1024,
        preview_width: 320,
    };

    let keystore = Arc::new(InMemoryKeyStore::new());
    let encryption: Arc<dyn Encryption> = Arc::new(AesGcmEncryption::new(keystore));
    let store = LocalVault::new(&staging, &vault, encryption);
    store.initialise().await.unwrap();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let filer = SqliteFiler::new(pool);
    filer.init().await.unwrap();

    let image_scaler = Arc::new(ImageScaler::with_default_types());
    let generator = Arc::new(ImagePreviewGenerator::new(image_scaler.clone()));
    let mut previews = PreviewService::new();
    for content_type in [scaler::PNG, scaler::GIF, scaler::JPEG] {
        previews.register(content_type, generator.clone());
    }

    let state = AppState {
        config,
        store: Arc::new(store),
        filer: Arc::new(filer),
        scaler: image_scaler,
        previews: Arc::new(previews),
        scanner: Arc::new(NoOpScanner),
    };
    (state, dir)
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    RgbaImage::from_pixel(width, height, Rgba([128, 64, 32, 255]))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn png_upload(data: Vec<u8>) -> RawUpload {
    RawUpload::from_bytes("photo.png", scaler::PNG, 1, data)
}

async fn collect(mut stream: DownloadStream) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

fn decode_dimensions(data: &[u8]) -> (u32, u32) {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap()
        .dimensions()
}

#[tokio::test]
async fn test_upload_download_round_trip() {
    let (state, _dir) = test_state().await;
    let data = png_bytes(16, 16);

    let attachment = pipeline::process_upload(&state, png_upload(data.clone()), KEY)
        .await
        .unwrap();

    // Below both width caps, so the persisted original is byte-identical.
    let (fetched, stream) = pipeline::open_download(&state, attachment.uid, false, KEY)
        .await
        .unwrap();
    assert_eq!(fetched.file_name, "photo.png");
    assert_eq!(collect(stream).await, data);

    // The preview derivative was persisted alongside the original.
    let (_, preview_stream) = pipeline::open_download(&state, attachment.uid, true, KEY)
        .await
        .unwrap();
    assert_eq!(decode_dimensions(&collect(preview_stream).await), (16, 16));
}

#[tokio::test]
async fn test_wide_image_is_scaled_down() {
    let (state, _dir) = test_state().await;

    let attachment = pipeline::process_upload(&state, png_upload(png_bytes(2048, 1024)), KEY)
        .await
        .unwrap();

    let (_, stream) = pipeline::open_download(&state, attachment.uid, false, KEY)
        .await
        .unwrap();
    assert_eq!(decode_dimensions(&collect(stream).await), (1024, 512));

    let (_, preview_stream) = pipeline::open_download(&state, attachment.uid, true, KEY)
        .await
        .unwrap();
    assert_eq!(
        decode_dimensions(&collect(preview_stream).await),
        (320, 160)
    );
}

#[tokio::test]
async fn test_download_with_wrong_key_fails() {
    let (state, _dir) = test_state().await;

    let attachment = pipeline::process_upload(&state, png_upload(png_bytes(8, 8)), KEY)
        .await
        .unwrap();

    let result = pipeline::open_download(&state, attachment.uid, false, WRONG_KEY).await;
    match result {
        Err(AppError::Internal(msg)) => assert!(msg.contains("authentication")),
        other => panic!("expected authentication failure, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_unsupported_content_type_rejected() {
    let (state, _dir) = test_state().await;
    let upload = RawUpload::from_bytes("doc.pdf", "application/pdf", 1, vec![1, 2, 3]);

    let result = pipeline::process_upload(&state, upload, KEY).await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_remove_attachment_is_complete_and_idempotent() {
    let (state, _dir) = test_state().await;

    let attachment = pipeline::process_upload(&state, png_upload(png_bytes(8, 8)), KEY)
        .await
        .unwrap();

    pipeline::remove_attachment(&state, attachment.uid)
        .await
        .unwrap();

    assert!(matches!(
        state.filer.fetch(attachment.uid).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        pipeline::open_download(&state, attachment.uid, false, KEY).await,
        Err(AppError::NotFound(_))
    ));

    // Removing twice is fine.
    pipeline::remove_attachment(&state, attachment.uid)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unknown_uid_download_is_not_found() {
    let (state, _dir) = test_state().await;
    assert!(matches!(
        pipeline::open_download(&state, Uuid::new_v4(), false, KEY).await,
        Err(AppError::NotFound(_))
    ));
}
