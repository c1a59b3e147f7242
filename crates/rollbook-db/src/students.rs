//! Student repository

use rollbook_core::models::{Document, NewStudent, Student, UpdateStudent};
use rollbook_core::AppError;
use sqlx::{Error as SqlxError, PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

const EMAIL_UNIQUE_CONSTRAINT: &str = "students_email_key";

fn map_email_conflict(e: SqlxError) -> AppError {
    if let SqlxError::Database(db) = &e {
        if db.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) {
            return AppError::Validation("This email is already registered.".to_string());
        }
    }
    AppError::Database(e)
}

#[derive(Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    /// All students with their documents, in creation order.
    pub async fn list_with_documents(&self) -> Result<Vec<(Student, Vec<Document>)>, AppError> {
        let students =
            sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await?;

        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_student: HashMap<Uuid, Vec<Document>> = HashMap::new();
        for doc in documents {
            by_student.entry(doc.student_id).or_default().push(doc);
        }

        Ok(students
            .into_iter()
            .map(|s| {
                let docs = by_student.remove(&s.id).unwrap_or_default();
                (s, docs)
            })
            .collect())
    }

    pub async fn email_taken(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM students WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Insert a student. Runs on the caller's connection so it can be scoped
    /// inside a transaction.
    pub async fn insert(conn: &mut PgConnection, new: &NewStudent) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            "INSERT INTO students (name, age, address, email, course)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&new.name)
        .bind(new.age)
        .bind(&new.address)
        .bind(&new.email)
        .bind(&new.course)
        .fetch_one(conn)
        .await
        .map_err(map_email_conflict)
    }

    pub async fn set_avatar_path(
        conn: &mut PgConnection,
        id: Uuid,
        avatar_path: Option<&str>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE students SET avatar_path = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(avatar_path)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Student not found".to_string()));
        }
        Ok(())
    }

    /// Apply a partial update; absent fields keep their current value.
    pub async fn update_fields(
        conn: &mut PgConnection,
        id: Uuid,
        update: &UpdateStudent,
    ) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            "UPDATE students SET
                 name = COALESCE($2, name),
                 age = COALESCE($3, age),
                 address = COALESCE($4, address),
                 email = COALESCE($5, email),
                 course = COALESCE($6, course),
                 updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.age)
        .bind(update.address.as_deref())
        .bind(update.email.as_deref())
        .bind(update.course.as_deref())
        .fetch_optional(conn)
        .await
        .map_err(map_email_conflict)?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Student not found".to_string()));
        }
        tracing::debug!(student_id = %id, "Deleted student row");
        Ok(())
    }
}
