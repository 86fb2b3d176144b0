// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::models::attempt::{QuestionSnapshot, SnapshotOptions};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// The text content of the question.
    pub question_text: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,

    /// Legacy fourth option slot. Always stored empty.
    #[serde(skip)]
    pub option_d: String,

    /// The correct option letter: 'a', 'b' or 'c'.
    pub correct_answer: String,

    pub category: Option<String>,
    pub difficulty: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Question {
    /// Serializes the question into the form embedded in a quiz attempt.
    /// Later edits or deletions of the row never touch the snapshot.
    pub fn to_snapshot(&self) -> QuestionSnapshot {
        QuestionSnapshot {
            id: self.id,
            question_text: self.question_text.clone(),
            options: SnapshotOptions {
                a: self.option_a.clone(),
                b: self.option_b.clone(),
                c: self.option_c.clone(),
            },
            correct_answer: self.correct_answer.clone(),
        }
    }
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question_text: String,
    #[validate(length(min = 1, max = 255))]
    pub option_a: String,
    #[validate(length(min = 1, max = 255))]
    pub option_b: String,
    #[validate(length(min = 1, max = 255))]
    pub option_c: String,
    #[validate(custom(function = validate_answer_letter))]
    pub correct_answer: String,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 20))]
    pub difficulty: Option<String>,
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub question_text: Option<String>,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub correct_answer: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
}

pub fn validate_answer_letter(letter: &str) -> Result<(), validator::ValidationError> {
    match letter {
        "a" | "b" | "c" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_answer_letter")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> Question {
        Question {
            id: 7,
            question_text: "Which layer handles routing?".to_string(),
            option_a: "axum".to_string(),
            option_b: "sqlx".to_string(),
            option_c: "serde".to_string(),
            option_d: String::new(),
            correct_answer: "a".to_string(),
            category: None,
            difficulty: None,
            created_at: None,
        }
    }

    #[test]
    fn snapshot_copies_all_presented_fields() {
        let q = sample_question();
        let snap = q.to_snapshot();
        assert_eq!(snap.id, 7);
        assert_eq!(snap.question_text, q.question_text);
        assert_eq!(snap.options.a, "axum");
        assert_eq!(snap.options.b, "sqlx");
        assert_eq!(snap.options.c, "serde");
        assert_eq!(snap.correct_answer, "a");
    }

    #[test]
    fn answer_letter_validation() {
        assert!(validate_answer_letter("a").is_ok());
        assert!(validate_answer_letter("c").is_ok());
        assert!(validate_answer_letter("d").is_err());
        assert!(validate_answer_letter("A").is_err());
        assert!(validate_answer_letter("").is_err());
    }
}
