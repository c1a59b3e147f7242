use rollbook_core::Config;
use rollbook_db::{DocumentRepository, StudentRepository};
use rollbook_storage::Storage;
use rollbook_vision::FaceQualityAssessor;
use sqlx::PgPool;
use std::sync::Arc;

use crate::services::ingestion::IngestionService;

/// Shared application state. Cheap to clone; everything heavyweight is
/// behind an `Arc` or a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub students: StudentRepository,
    pub documents: DocumentRepository,
    pub storage: Arc<dyn Storage>,
    pub ingestion: Arc<IngestionService>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        db_pool: PgPool,
        storage: Arc<dyn Storage>,
        assessor: Arc<FaceQualityAssessor>,
    ) -> Self {
        let students = StudentRepository::new(db_pool.clone());
        let documents = DocumentRepository::new(db_pool.clone());
        let ingestion = Arc::new(IngestionService::new(
            db_pool.clone(),
            storage.clone(),
            assessor,
            students.clone(),
            documents.clone(),
            &config,
        ));

        Self {
            db_pool,
            students,
            documents,
            storage,
            ingestion,
            config,
        }
    }
}

#[allow(dead_code)]
fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    assert_send::<AppState>();
    assert_sync::<AppState>();
}
