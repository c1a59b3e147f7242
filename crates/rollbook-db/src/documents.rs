//! Document repository

use rollbook_core::models::{Document, NewDocument};
use rollbook_core::AppError;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(document)
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE student_id = $1 ORDER BY created_at, id",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(documents)
    }

    /// Record a freshly stored document. Runs on the caller's connection so
    /// it can be scoped inside a transaction.
    pub async fn insert(conn: &mut PgConnection, new: &NewDocument) -> Result<Document, AppError> {
        let document = sqlx::query_as::<_, Document>(
            "INSERT INTO documents (student_id, file_path, original_filename, file_size, mime_type)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(new.student_id)
        .bind(&new.file_path)
        .bind(&new.original_filename)
        .bind(new.file_size)
        .bind(&new.mime_type)
        .fetch_one(conn)
        .await?;
        Ok(document)
    }

    /// Point an existing document at a new storage object. The record is
    /// otherwise preserved.
    pub async fn update_storage_key(
        conn: &mut PgConnection,
        id: Uuid,
        file_path: &str,
        file_size: i64,
        mime_type: &str,
    ) -> Result<Document, AppError> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET
                 file_path = $2,
                 file_size = $3,
                 mime_type = $4,
                 updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(file_path)
        .bind(file_size)
        .bind(mime_type)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Document not found".to_string()));
        }
        Ok(())
    }
}
