//! Rollbook database layer
//!
//! sqlx/Postgres repositories for students and documents, plus the
//! transaction guard used to scope a workflow's metadata writes.
//!
//! Repositories expose pool-based reads as methods and executor-based
//! writes as associated functions taking `&mut PgConnection`, so callers
//! can run writes inside a [`TransactionGuard`].

pub mod documents;
pub mod students;
pub mod transaction;

pub use documents::DocumentRepository;
pub use students::StudentRepository;
pub use transaction::TransactionGuard;

/// Run pending migrations against the given pool.
pub async fn run_migrations(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
