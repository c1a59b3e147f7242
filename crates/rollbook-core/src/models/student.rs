use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::DocumentResponse;

/// A student row. `avatar_path` is the storage key of the current avatar
/// object, not a URL; URL construction is a presentation concern.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub address: String,
    pub email: String,
    pub course: String,
    pub avatar_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a student.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStudent {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: String,
    #[validate(range(min = 1, message = "The age must be at least 1."))]
    pub age: i32,
    #[validate(length(min = 1, max = 255, message = "The address must be between 1 and 255 characters."))]
    pub address: String,
    #[validate(email(message = "Please provide a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "The course name cannot exceed 255 characters."))]
    pub course: String,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStudent {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: Option<String>,
    #[validate(range(min = 1, message = "The age must be at least 1."))]
    pub age: Option<i32>,
    #[validate(length(min = 1, max = 255, message = "The address must be between 1 and 255 characters."))]
    pub address: Option<String>,
    #[validate(email(message = "Please provide a valid email address."))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 255, message = "The course name cannot exceed 255 characters."))]
    pub course: Option<String>,
}

impl UpdateStudent {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.address.is_none()
            && self.email.is_none()
            && self.course.is_none()
    }
}

/// Student as presented to API clients, with resolved URLs and documents.
#[derive(Debug, Clone, Serialize)]
pub struct StudentResponse {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub address: String,
    pub email: String,
    pub course: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub documents: Vec<DocumentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentResponse {
    pub fn from_parts(
        student: Student,
        avatar_url: Option<String>,
        documents: Vec<DocumentResponse>,
    ) -> Self {
        Self {
            id: student.id,
            name: student.name,
            age: student.age,
            address: student.address,
            email: student.email,
            course: student.course,
            avatar_url,
            documents,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn valid_student() -> NewStudent {
        NewStudent {
            name: "Ada Lovelace".into(),
            age: 21,
            address: "12 Analytical Way".into(),
            email: "ada@example.com".into(),
            course: "Mathematics".into(),
        }
    }

    #[test]
    fn test_new_student_valid() {
        assert!(valid_student().validate().is_ok());
    }

    #[test]
    fn test_new_student_rejects_bad_email() {
        let mut s = valid_student();
        s.email = "not-an-email".into();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_new_student_rejects_zero_age() {
        let mut s = valid_student();
        s.age = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_update_student_empty() {
        assert!(UpdateStudent::default().is_empty());
        let upd = UpdateStudent {
            course: Some("Physics".into()),
            ..Default::default()
        };
        assert!(!upd.is_empty());
        assert!(upd.validate().is_ok());
    }
}
