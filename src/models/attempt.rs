// src/models/attempt.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// Immutable copy of one sampled question, embedded in a quiz attempt
/// at creation time. Scoring reads this copy and never the live bank,
/// so bank edits cannot corrupt historical results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionSnapshot {
    pub id: i64,
    pub question_text: String,
    pub options: SnapshotOptions,
    pub correct_answer: String,
}

/// The three answer options presented for a snapshot question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotOptions {
    pub a: String,
    pub b: String,
    pub c: String,
}

impl SnapshotOptions {
    /// Returns true if the letter names one of the presented options.
    pub fn contains(&self, letter: &str) -> bool {
        matches!(letter, "a" | "b" | "c")
    }

    pub fn get(&self, letter: &str) -> Option<&str> {
        match letter {
            "a" => Some(&self.a),
            "b" => Some(&self.b),
            "c" => Some(&self.c),
            _ => None,
        }
    }
}

/// Represents the 'quiz_attempts' table in the database.
///
/// The question snapshot is fixed at creation; only the answer map
/// mutates until the attempt is finalized. Answers are keyed by the
/// question id rendered as a string, matching the import format.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,

    #[serde(skip)]
    pub questions: Json<Vec<QuestionSnapshot>>,

    #[serde(skip)]
    pub answers: Json<HashMap<String, String>>,

    /// Percentage score, rounded to 2 decimals. Meaningful only once
    /// `is_completed` is set.
    pub score: f64,
    pub correct_answers: i64,
    pub total_questions: i64,

    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_completed: bool,
}

/// Result of grading an attempt.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ScoreSummary {
    pub score: f64,
    pub correct_answers: i64,
    pub total_questions: i64,
}

impl QuizAttempt {
    /// Grades the attempt against its immutable snapshot.
    ///
    /// An unanswered question counts as wrong. A pure function of the
    /// snapshot and the answer map: calling it twice yields the same
    /// summary. An empty snapshot scores 0, never NaN.
    pub fn calculate_score(&self) -> ScoreSummary {
        grade(&self.questions.0, &self.answers.0)
    }
}

/// Grades an answer map against a question snapshot.
pub fn grade(questions: &[QuestionSnapshot], answers: &HashMap<String, String>) -> ScoreSummary {
    let correct = questions
        .iter()
        .filter(|q| {
            answers
                .get(&q.id.to_string())
                .is_some_and(|given| *given == q.correct_answer)
        })
        .count() as i64;

    let total = questions.len() as i64;
    let score = if total > 0 {
        round2(correct as f64 / total as f64 * 100.0)
    } else {
        0.0
    };

    ScoreSummary {
        score,
        correct_answers: correct,
        total_questions: total,
    }
}

/// Aggregated statistics over a user's completed attempts.
/// Recomputed from the full history on every request; no caching.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserStatistics {
    pub total_quizzes: i64,
    pub average_score: f64,
    pub best_score: f64,
    pub total_questions_answered: i64,
    pub correct_answers: i64,
    pub accuracy_percentage: f64,
}

impl UserStatistics {
    pub fn from_attempts(attempts: &[QuizAttempt]) -> Self {
        if attempts.is_empty() {
            return Self {
                total_quizzes: 0,
                average_score: 0.0,
                best_score: 0.0,
                total_questions_answered: 0,
                correct_answers: 0,
                accuracy_percentage: 0.0,
            };
        }

        let total_quizzes = attempts.len() as i64;
        let score_sum: f64 = attempts.iter().map(|a| a.score).sum();
        let best_score = attempts.iter().map(|a| a.score).fold(0.0, f64::max);
        let correct: i64 = attempts.iter().map(|a| a.correct_answers).sum();
        let total: i64 = attempts.iter().map(|a| a.total_questions).sum();

        let accuracy = if total > 0 {
            round2(correct as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        Self {
            total_quizzes,
            average_score: round2(score_sum / total_quizzes as f64),
            best_score,
            total_questions_answered: total,
            correct_answers: correct,
            accuracy_percentage: accuracy,
        }
    }
}

/// Rounds to 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compact attempt view for dashboards and history lists.
/// Excludes the snapshot and answer map.
#[derive(Debug, Serialize)]
pub struct AttemptSummary {
    pub id: i64,
    pub score: f64,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&QuizAttempt> for AttemptSummary {
    fn from(attempt: &QuizAttempt) -> Self {
        Self {
            id: attempt.id,
            score: attempt.score,
            correct_answers: attempt.correct_answers,
            total_questions: attempt.total_questions,
            started_at: attempt.started_at,
            completed_at: attempt.completed_at,
        }
    }
}

/// Snapshot question as shown while the quiz is in progress.
/// Hides the correct answer.
#[derive(Debug, Serialize)]
pub struct PublicSnapshotQuestion {
    pub id: i64,
    pub question_text: String,
    pub options: SnapshotOptions,
}

impl From<&QuestionSnapshot> for PublicSnapshotQuestion {
    fn from(q: &QuestionSnapshot) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text.clone(),
            options: q.options.clone(),
        }
    }
}

/// Per-question detail for the results view of a completed attempt.
#[derive(Debug, Serialize)]
pub struct QuestionResult {
    pub question: QuestionSnapshot,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Builds the per-question results for a completed attempt, reading
/// exclusively from the stored snapshot.
pub fn detailed_results(
    questions: &[QuestionSnapshot],
    answers: &HashMap<String, String>,
) -> Vec<QuestionResult> {
    questions
        .iter()
        .map(|q| {
            let user_answer = answers.get(&q.id.to_string()).cloned().unwrap_or_default();
            let is_correct = user_answer == q.correct_answer;
            QuestionResult {
                question: q.clone(),
                user_answer,
                correct_answer: q.correct_answer.clone(),
                is_correct,
            }
        })
        .collect()
}
