//! SQLite filer — the metadata record store
//!
//! One row per attachment, keyed by UID. Rows hold only the immutable
//! descriptive fields; local working paths are never persisted.

use async_trait::async_trait;
use lockbox_core::{AppError, Attachment, Filer};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct AttachmentRow {
    uid: String,
    owner_id: i64,
    file_name: String,
    file_size: i64,
    extension: String,
    content_type: String,
}

impl AttachmentRow {
    fn into_attachment(self) -> Result<Attachment, AppError> {
        let uid = Uuid::parse_str(&self.uid)?;
        Ok(Attachment::from_record(
            uid,
            self.owner_id,
            self.file_name,
            self.file_size,
            self.extension,
            self.content_type,
        ))
    }
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::Internal(format!("database error: {}", e))
}

#[derive(Clone)]
pub struct SqliteFiler {
    pool: SqlitePool,
}

impl SqliteFiler {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the attachments table when absent. Idempotent.
    pub async fn init(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attachments (
                uid          TEXT PRIMARY KEY,
                owner_id     INTEGER NOT NULL,
                file_name    TEXT NOT NULL,
                file_size    INTEGER NOT NULL,
                extension    TEXT NOT NULL,
                content_type TEXT NOT NULL,
                created_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl Filer for SqliteFiler {
    async fn record(&self, attachment: &Attachment) -> Result<(), AppError> {
        // Re-recording after an upload retry is a no-op overwrite of the
        // same immutable fields.
        sqlx::query(
            r#"
            INSERT INTO attachments (uid, owner_id, file_name, file_size, extension, content_type)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(uid) DO UPDATE SET
                owner_id = excluded.owner_id,
                file_name = excluded.file_name,
                file_size = excluded.file_size,
                extension = excluded.extension,
                content_type = excluded.content_type
            "#,
        )
        .bind(attachment.uid.to_string())
        .bind(attachment.owner_id)
        .bind(&attachment.file_name)
        .bind(attachment.file_size)
        .bind(&attachment.extension)
        .bind(&attachment.content_type)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        tracing::debug!(uid = %attachment.uid, "attachment metadata recorded");
        Ok(())
    }

    async fn fetch(&self, uid: Uuid) -> Result<Attachment, AppError> {
        let row: Option<AttachmentRow> = sqlx::query_as(
            r#"
            SELECT uid, owner_id, file_name, file_size, extension, content_type
            FROM attachments
            WHERE uid = ?1
            "#,
        )
        .bind(uid.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.ok_or_else(|| AppError::NotFound(format!("attachment {} not found", uid)))?
            .into_attachment()
    }

    async fn delete(&self, uid: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM attachments WHERE uid = ?1")
            .bind(uid.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_core::RawUpload;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_filer() -> SqliteFiler {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let filer = SqliteFiler::new(pool);
        filer.init().await.unwrap();
        filer
    }

    fn test_attachment() -> Attachment {
        let upload = RawUpload::from_bytes("photo.png", "image/png", 3, vec![0; 128]);
        Attachment::new(&upload)
    }

    #[tokio::test]
    async fn test_record_and_fetch() {
        let filer = test_filer().await;
        let attachment = test_attachment();

        filer.record(&attachment).await.unwrap();

        let fetched = filer.fetch(attachment.uid).await.unwrap();
        assert_eq!(fetched.uid, attachment.uid);
        assert_eq!(fetched.owner_id, 3);
        assert_eq!(fetched.file_name, "photo.png");
        assert_eq!(fetched.file_size, 128);
        assert_eq!(fetched.extension, "png");
        assert_eq!(fetched.content_type, "image/png");
        // Reconstructed attachments carry no local working paths.
        assert!(fetched.local_path.is_none());
        assert!(fetched.preview_local_path.is_none());
    }

    #[tokio::test]
    async fn test_record_is_idempotent() {
        let filer = test_filer().await;
        let attachment = test_attachment();

        filer.record(&attachment).await.unwrap();
        filer.record(&attachment).await.unwrap();

        assert_eq!(filer.fetch(attachment.uid).await.unwrap().uid, attachment.uid);
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let filer = test_filer().await;
        assert!(matches!(
            filer.fetch(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let filer = test_filer().await;
        let attachment = test_attachment();

        filer.record(&attachment).await.unwrap();
        filer.delete(attachment.uid).await.unwrap();

        assert!(matches!(
            filer.fetch(attachment.uid).await,
            Err(AppError::NotFound(_))
        ));

        // Deleting a missing record is not an error.
        filer.delete(attachment.uid).await.unwrap();
    }
}
