//! File ingestion workflows
//!
//! Coordinates the metadata repositories, the storage backend and the
//! avatar quality gate. Transaction scope per workflow: metadata writes
//! happen inside one [`TransactionGuard`], storage writes are compensated
//! on failure for single-file flows and best-effort for batch flows.
//!
//! Per-document isolation: in multi-file workflows a failing file lands in
//! the failed list and never aborts its siblings or the transaction. The
//! avatar is the opposite: a rejected or faulty avatar aborts the whole
//! create action before any of it becomes visible.

use bytes::Bytes;
use rollbook_core::models::{
    Document, DocumentResponse, NewDocument, NewStudent, Student, StudentResponse, UpdateStudent,
};
use rollbook_core::validation::{validate_avatar_file, validate_document_file};
use rollbook_core::{dedupe, AppError, Config};
use rollbook_db::{DocumentRepository, StudentRepository, TransactionGuard};
use rollbook_storage::naming;
use rollbook_storage::Storage;
use rollbook_vision::{FaceQualityAssessor, FaceValidation, QualityReport};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::extract::UploadedFile;

/// A file that could not be ingested, with the client-facing reason.
#[derive(Debug, Clone, Serialize)]
pub struct FailedUpload {
    pub filename: String,
    pub reason: String,
}

/// A file skipped because the student already has it. Not a failure.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateUpload {
    pub filename: String,
    pub existing_document_id: Uuid,
    pub existing_filename: String,
}

/// Outcome of the create-student workflow.
pub enum CreateStudentOutcome {
    Created {
        student: StudentResponse,
        failed: Vec<FailedUpload>,
        avatar_quality: Option<QualityReport>,
    },
    /// The avatar failed the quality gate; nothing was persisted.
    AvatarRejected(FaceValidation),
}

/// Outcome of the add-files workflow. `uploaded` carries short-TTL signed
/// URLs; duplicates and failures are partitioned out per file.
pub struct AddFilesOutcome {
    pub uploaded: Vec<DocumentResponse>,
    pub duplicates: Vec<DuplicateUpload>,
    pub failed: Vec<FailedUpload>,
}

/// Outcome of the replace-avatar workflow.
pub enum ReplaceAvatarOutcome {
    Replaced {
        student: StudentResponse,
        avatar_quality: Option<QualityReport>,
    },
    Rejected(FaceValidation),
}

pub struct IngestionService {
    pool: PgPool,
    storage: Arc<dyn Storage>,
    assessor: Arc<FaceQualityAssessor>,
    students: StudentRepository,
    documents: DocumentRepository,
    max_upload_bytes: usize,
    signed_url_ttl: Duration,
    cdn_base_url: Option<String>,
}

impl IngestionService {
    pub fn new(
        pool: PgPool,
        storage: Arc<dyn Storage>,
        assessor: Arc<FaceQualityAssessor>,
        students: StudentRepository,
        documents: DocumentRepository,
        config: &Config,
    ) -> Self {
        Self {
            pool,
            storage,
            assessor,
            students,
            documents,
            max_upload_bytes: config.max_upload_bytes,
            signed_url_ttl: Duration::from_secs(config.signed_url_ttl_secs),
            cdn_base_url: config.cdn_base_url.clone(),
        }
    }

    /// Public URL for a stored object, preferring the CDN base when one is
    /// configured.
    pub fn file_url(&self, key: &str) -> String {
        match &self.cdn_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => self.storage.public_url(key),
        }
    }

    fn document_response(&self, document: Document) -> DocumentResponse {
        let url = self.file_url(&document.file_path);
        DocumentResponse::from_document(document, url)
    }

    /// Student with resolved avatar URL and document list, as handlers
    /// return it.
    pub fn student_response(&self, student: Student, documents: Vec<Document>) -> StudentResponse {
        let avatar_url = student.avatar_path.as_deref().map(|key| self.file_url(key));
        let documents = documents
            .into_iter()
            .map(|d| self.document_response(d))
            .collect();
        StudentResponse::from_parts(student, avatar_url, documents)
    }

    async fn cleanup_stored(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(key = %key, error = %e, "Failed to clean up stored object");
            }
        }
    }

    async fn delete_best_effort(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete storage object");
        }
    }

    /// Store one document and record it on the given connection. On a
    /// metadata failure the freshly stored object is removed again so the
    /// file is either fully ingested or absent.
    async fn ingest_document(
        &self,
        conn: &mut sqlx::PgConnection,
        student_id: Uuid,
        file: &UploadedFile,
    ) -> Result<Document, AppError> {
        validate_document_file(
            &file.filename,
            &file.content_type,
            file.data.len(),
            self.max_upload_bytes,
        )?;

        let key = naming::document_key(&file.filename)?;
        self.storage
            .put(&key, file.data.clone(), &file.content_type)
            .await?;

        let new = NewDocument {
            student_id,
            file_path: key.clone(),
            original_filename: file.filename.clone(),
            file_size: file.data.len() as i64,
            mime_type: file.content_type.clone(),
        };

        match DocumentRepository::insert(conn, &new).await {
            Ok(document) => {
                tracing::info!(
                    student_id = %student_id,
                    key = %key,
                    size = file.data.len(),
                    "Ingested document"
                );
                Ok(document)
            }
            Err(e) => {
                self.delete_best_effort(&key).await;
                Err(e)
            }
        }
    }

    /// Create a student, gate the avatar, and ingest the attached documents.
    ///
    /// Avatar handling is all-or-nothing for the action; document failures
    /// are isolated per file and reported back, and the transaction commits
    /// for whatever succeeded.
    pub async fn create_student(
        &self,
        new: NewStudent,
        avatar: Option<UploadedFile>,
        files: Vec<UploadedFile>,
    ) -> Result<CreateStudentOutcome, AppError> {
        new.validate()?;
        if self.students.email_taken(&new.email, None).await? {
            return Err(AppError::Validation(
                "This email is already registered.".to_string(),
            ));
        }

        // Validate the avatar's basic constraints before opening the
        // transaction; a rejected file type aborts the whole action.
        if let Some(avatar) = &avatar {
            validate_avatar_file(
                &avatar.filename,
                &avatar.content_type,
                avatar.data.len(),
                self.max_upload_bytes,
            )?;
        }

        let mut stored_keys: Vec<String> = Vec::new();
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let student = match StudentRepository::insert(&mut *tx, &new).await {
            Ok(student) => student,
            Err(e) => {
                tx.rollback().await.ok();
                return Err(e);
            }
        };

        let mut avatar_quality = None;
        if let Some(avatar) = &avatar {
            let verdict = self.assessor.assess(&avatar.data).await;
            if !verdict.valid {
                tx.rollback().await.ok();
                tracing::info!(
                    email = %new.email,
                    issues = verdict.issues.len(),
                    "Student creation aborted by avatar gate"
                );
                return Ok(CreateStudentOutcome::AvatarRejected(verdict));
            }
            avatar_quality = verdict.quality.clone();

            match self.store_avatar(&mut tx, student.id, avatar).await {
                Ok(key) => stored_keys.push(key),
                Err(e) => {
                    tx.rollback().await.ok();
                    self.cleanup_stored(&stored_keys).await;
                    return Err(e);
                }
            }
        }

        let mut uploaded = Vec::new();
        let mut failed = Vec::new();
        for file in &files {
            match self.ingest_document(&mut *tx, student.id, file).await {
                Ok(document) => {
                    stored_keys.push(document.file_path.clone());
                    uploaded.push(document);
                }
                Err(e) => failed.push(FailedUpload {
                    filename: file.filename.clone(),
                    reason: rollbook_core::ErrorMetadata::client_message(&e),
                }),
            }
        }

        if let Err(e) = tx.commit().await {
            self.cleanup_stored(&stored_keys).await;
            return Err(e.into());
        }

        // Re-read the avatar path set inside the transaction.
        let student = self
            .students
            .get(student.id)
            .await?
            .ok_or_else(|| AppError::Internal("Created student vanished".to_string()))?;

        Ok(CreateStudentOutcome::Created {
            student: self.student_response(student, uploaded),
            failed,
            avatar_quality,
        })
    }

    async fn store_avatar(
        &self,
        tx: &mut TransactionGuard<'_>,
        student_id: Uuid,
        avatar: &UploadedFile,
    ) -> Result<String, AppError> {
        let key = naming::avatar_key(student_id, &avatar.filename)?;
        self.storage
            .put(&key, avatar.data.clone(), &avatar.content_type)
            .await?;
        StudentRepository::set_avatar_path(&mut **tx, student_id, Some(&key)).await?;
        tracing::info!(student_id = %student_id, key = %key, "Stored avatar");
        Ok(key)
    }

    /// Add documents to an existing student. Duplicates are reported, not
    /// stored; failures are isolated per file.
    pub async fn add_files(
        &self,
        student_id: Uuid,
        files: Vec<UploadedFile>,
    ) -> Result<AddFilesOutcome, AppError> {
        let _student = self
            .students
            .get(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
        let existing = self.documents.list_for_student(student_id).await?;

        let mut uploaded_docs = Vec::new();
        let mut duplicates = Vec::new();
        let mut failed = Vec::new();
        let mut stored_keys: Vec<String> = Vec::new();

        let mut tx = TransactionGuard::begin(&self.pool).await?;

        for file in &files {
            if let Some(existing_doc) = dedupe::find_duplicate(&existing, &file.filename) {
                duplicates.push(DuplicateUpload {
                    filename: file.filename.clone(),
                    existing_document_id: existing_doc.id,
                    existing_filename: existing_doc.original_filename.clone(),
                });
                continue;
            }

            match self.ingest_document(&mut *tx, student_id, file).await {
                Ok(document) => {
                    stored_keys.push(document.file_path.clone());
                    uploaded_docs.push(document);
                }
                Err(e) => failed.push(FailedUpload {
                    filename: file.filename.clone(),
                    reason: rollbook_core::ErrorMetadata::client_message(&e),
                }),
            }
        }

        if let Err(e) = tx.commit().await {
            self.cleanup_stored(&stored_keys).await;
            return Err(e.into());
        }

        // Fresh uploads get a short-lived direct link; fall back to the
        // public URL when the backend cannot sign.
        let mut uploaded = Vec::new();
        for document in uploaded_docs {
            let url = match self
                .storage
                .signed_url(&document.file_path, self.signed_url_ttl)
                .await
            {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(key = %document.file_path, error = %e, "Failed to sign URL");
                    self.file_url(&document.file_path)
                }
            };
            uploaded.push(DocumentResponse::from_document(document, url));
        }

        tracing::info!(
            student_id = %student_id,
            uploaded = uploaded.len(),
            duplicates = duplicates.len(),
            failed = failed.len(),
            "Add-files completed"
        );

        Ok(AddFilesOutcome {
            uploaded,
            duplicates,
            failed,
        })
    }

    /// Replace a document's backing file. The new object is stored before
    /// the old one is touched, so the document always has a backing file;
    /// failure to delete the old object never rolls back the key update.
    pub async fn replace_document_file(
        &self,
        document_id: Uuid,
        file: UploadedFile,
    ) -> Result<DocumentResponse, AppError> {
        let document = self
            .documents
            .get(document_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        validate_document_file(
            &file.filename,
            &file.content_type,
            file.data.len(),
            self.max_upload_bytes,
        )?;

        let new_key = naming::document_key(&file.filename)?;
        self.storage
            .put(&new_key, file.data.clone(), &file.content_type)
            .await?;

        self.delete_best_effort(&document.file_path).await;

        let mut tx = TransactionGuard::begin(&self.pool).await?;
        let updated = match DocumentRepository::update_storage_key(
            &mut *tx,
            document_id,
            &new_key,
            file.data.len() as i64,
            &file.content_type,
        )
        .await
        {
            Ok(updated) => updated,
            Err(e) => {
                tx.rollback().await.ok();
                self.delete_best_effort(&new_key).await;
                return Err(e);
            }
        };
        tx.commit().await?;

        tracing::info!(
            document_id = %document_id,
            old_key = %document.file_path,
            new_key = %new_key,
            "Replaced document file"
        );

        Ok(self.document_response(updated))
    }

    /// Replace a student's avatar. The quality gate runs before storage is
    /// touched; on rejection nothing changes.
    pub async fn replace_avatar(
        &self,
        student_id: Uuid,
        file: UploadedFile,
    ) -> Result<ReplaceAvatarOutcome, AppError> {
        let student = self
            .students
            .get(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

        validate_avatar_file(
            &file.filename,
            &file.content_type,
            file.data.len(),
            self.max_upload_bytes,
        )?;

        let verdict = self.assessor.assess(&file.data).await;
        if !verdict.valid {
            return Ok(ReplaceAvatarOutcome::Rejected(verdict));
        }
        let avatar_quality = verdict.quality;

        if let Some(old_key) = &student.avatar_path {
            self.delete_best_effort(old_key).await;
        }

        let new_key = naming::avatar_key(student_id, &file.filename)?;
        self.storage
            .put(&new_key, file.data.clone(), &file.content_type)
            .await?;

        let mut tx = TransactionGuard::begin(&self.pool).await?;
        if let Err(e) =
            StudentRepository::set_avatar_path(&mut *tx, student_id, Some(&new_key)).await
        {
            tx.rollback().await.ok();
            self.delete_best_effort(&new_key).await;
            return Err(e);
        }
        tx.commit().await?;

        tracing::info!(student_id = %student_id, key = %new_key, "Replaced avatar");

        let student = self
            .students
            .get(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
        let documents = self.documents.list_for_student(student_id).await?;

        Ok(ReplaceAvatarOutcome::Replaced {
            student: self.student_response(student, documents),
            avatar_quality,
        })
    }

    /// Apply a partial update to a student's record fields.
    pub async fn update_student(
        &self,
        student_id: Uuid,
        update: UpdateStudent,
    ) -> Result<StudentResponse, AppError> {
        update.validate()?;
        if update.is_empty() {
            return Err(AppError::Validation(
                "No fields were provided for update.".to_string(),
            ));
        }
        if let Some(email) = &update.email {
            if self.students.email_taken(email, Some(student_id)).await? {
                return Err(AppError::Validation(
                    "This email is already registered.".to_string(),
                ));
            }
        }

        let mut tx = TransactionGuard::begin(&self.pool).await?;
        let student = match StudentRepository::update_fields(&mut *tx, student_id, &update).await {
            Ok(student) => student,
            Err(e) => {
                tx.rollback().await.ok();
                return Err(e);
            }
        };
        tx.commit().await?;

        let documents = self.documents.list_for_student(student_id).await?;
        Ok(self.student_response(student, documents))
    }

    /// Delete a student with all documents and storage objects. Storage
    /// deletions are compensating, not transactional: a metadata failure
    /// rolls back the rows but already-deleted objects stay gone.
    pub async fn delete_student(&self, student_id: Uuid) -> Result<(), AppError> {
        let student = self
            .students
            .get(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
        let documents = self.documents.list_for_student(student_id).await?;

        let mut tx = TransactionGuard::begin(&self.pool).await?;

        if let Some(avatar_key) = &student.avatar_path {
            self.delete_best_effort(avatar_key).await;
        }

        for document in &documents {
            self.delete_best_effort(&document.file_path).await;
            if let Err(e) = DocumentRepository::delete(&mut *tx, document.id).await {
                tx.rollback().await.ok();
                return Err(e);
            }
        }

        if let Err(e) = StudentRepository::delete(&mut *tx, student_id).await {
            tx.rollback().await.ok();
            return Err(e);
        }
        tx.commit().await?;

        tracing::info!(
            student_id = %student_id,
            documents = documents.len(),
            "Deleted student"
        );
        Ok(())
    }

    /// Delete one document and its storage object, returning the refreshed
    /// student view.
    pub async fn delete_file(&self, document_id: Uuid) -> Result<StudentResponse, AppError> {
        let document = self
            .documents
            .get(document_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        self.delete_best_effort(&document.file_path).await;

        let mut tx = TransactionGuard::begin(&self.pool).await?;
        if let Err(e) = DocumentRepository::delete(&mut *tx, document_id).await {
            tx.rollback().await.ok();
            return Err(e);
        }
        tx.commit().await?;

        tracing::info!(document_id = %document_id, "Deleted document");

        let student = self
            .students
            .get(document.student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
        let documents = self.documents.list_for_student(student.id).await?;
        Ok(self.student_response(student, documents))
    }
}
