//! Domain models

mod document;
mod student;

pub use document::{Document, DocumentResponse, NewDocument};
pub use student::{NewStudent, Student, StudentResponse, UpdateStudent};
