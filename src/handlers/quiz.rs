// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{SqlitePool, types::Json as SqlJson};

use crate::{
    config::Config,
    error::AppError,
    models::{
        attempt::{PublicSnapshotQuestion, QuizAttempt, detailed_results},
        question::Question,
    },
    utils::jwt::Claims,
};

const ATTEMPT_COLUMNS: &str = "id, user_id, questions, answers, score, correct_answers, \
     total_questions, started_at, completed_at, is_completed";

/// Fetches an attempt owned by the calling user.
///
/// A missing id and someone else's attempt produce the same 403, so the
/// response does not reveal whether the id exists.
async fn fetch_owned_attempt(
    pool: &SqlitePool,
    attempt_id: i64,
    user_id: i64,
) -> Result<QuizAttempt, AppError> {
    let query = format!(
        "SELECT {} FROM quiz_attempts WHERE id = ? AND user_id = ?",
        ATTEMPT_COLUMNS
    );

    sqlx::query_as::<_, QuizAttempt>(&query)
        .bind(attempt_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Forbidden(
            "Unauthorized access to quiz attempt".to_string(),
        ))
}

/// Starts a new quiz attempt for the calling user.
///
/// Samples N questions uniformly without replacement from the bank and
/// freezes them into the attempt as a snapshot. Refuses when the bank
/// holds fewer than N questions.
pub async fn start_quiz(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let bank_size: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(&pool)
        .await?;

    if bank_size < config.questions_per_quiz {
        return Err(AppError::BadRequest(format!(
            "Not enough questions in the bank. At least {} are required.",
            config.questions_per_quiz
        )));
    }

    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question_text, option_a, option_b, option_c, option_d,
               correct_answer, category, difficulty, created_at
        FROM questions
        ORDER BY RANDOM()
        LIMIT ?
        "#,
    )
    .bind(config.questions_per_quiz)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to sample questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let snapshot: Vec<_> = questions.iter().map(Question::to_snapshot).collect();
    let total = snapshot.len() as i64;

    let attempt_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quiz_attempts
        (user_id, questions, answers, score, correct_answers, total_questions, started_at, is_completed)
        VALUES (?, ?, '{}', 0, 0, ?, ?, 0)
        RETURNING id
        "#,
    )
    .bind(claims.user_id())
    .bind(SqlJson(&snapshot))
    .bind(total)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "attempt_id": attempt_id,
            "total_questions": total,
            "time_limit_minutes": config.quiz_time_minutes
        })),
    ))
}

/// Returns an in-progress attempt for taking the quiz.
///
/// Questions come from the stored snapshot with the correct answers
/// hidden, together with the answers given so far.
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = fetch_owned_attempt(&pool, attempt_id, claims.user_id()).await?;

    if attempt.is_completed {
        return Err(AppError::Conflict("Quiz is already completed".to_string()));
    }

    let questions: Vec<PublicSnapshotQuestion> =
        attempt.questions.0.iter().map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "attempt_id": attempt.id,
        "questions": questions,
        "answers": attempt.answers.0,
        "time_limit_minutes": config.quiz_time_minutes
    })))
}

/// DTO for submitting a single answer.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_id: i64,
    pub answer: String,
}

/// Records one answer on an in-progress attempt.
///
/// Upserts question-id -> letter into the answer map; resubmitting the
/// same question overwrites the previous letter (last-write-wins). The
/// question must belong to the attempt's snapshot and the letter must
/// name one of its options; completed attempts reject further answers.
pub async fn submit_answer(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = fetch_owned_attempt(&pool, attempt_id, claims.user_id()).await?;

    if attempt.is_completed {
        return Err(AppError::Conflict(
            "Cannot answer a completed quiz".to_string(),
        ));
    }

    let question = attempt
        .questions
        .0
        .iter()
        .find(|q| q.id == payload.question_id)
        .ok_or(AppError::BadRequest(
            "Question is not part of this quiz".to_string(),
        ))?;

    if !question.options.contains(&payload.answer) {
        return Err(AppError::BadRequest(format!(
            "'{}' is not a valid option letter",
            payload.answer
        )));
    }

    let mut answers = attempt.answers.0;
    answers.insert(payload.question_id.to_string(), payload.answer);

    sqlx::query("UPDATE quiz_attempts SET answers = ? WHERE id = ?")
        .bind(SqlJson(&answers))
        .bind(attempt.id)
        .execute(&pool)
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

/// Finalizes an attempt: grades it against the immutable snapshot and
/// stamps the completion time.
///
/// The score never consults the live question bank, so edits made after
/// the quiz started cannot change the result. Finalizing twice is
/// rejected; the stored score stays what the first call computed.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = fetch_owned_attempt(&pool, attempt_id, claims.user_id()).await?;

    if attempt.is_completed {
        return Err(AppError::Conflict("Quiz is already submitted".to_string()));
    }

    let summary = attempt.calculate_score();

    sqlx::query(
        r#"
        UPDATE quiz_attempts
        SET score = ?, correct_answers = ?, total_questions = ?,
            is_completed = 1, completed_at = ?
        WHERE id = ?
        "#,
    )
    .bind(summary.score)
    .bind(summary.correct_answers)
    .bind(summary.total_questions)
    .bind(chrono::Utc::now())
    .bind(attempt.id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to finalize quiz attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(serde_json::json!({
        "attempt_id": attempt.id,
        "score": summary.score,
        "correct_answers": summary.correct_answers,
        "total_questions": summary.total_questions
    })))
}

/// Per-question results for a completed attempt, built entirely from
/// the stored snapshot and answer map.
pub async fn quiz_results(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = fetch_owned_attempt(&pool, attempt_id, claims.user_id()).await?;

    if !attempt.is_completed {
        return Err(AppError::BadRequest(
            "Quiz is not completed yet".to_string(),
        ));
    }

    let results = detailed_results(&attempt.questions.0, &attempt.answers.0);

    Ok(Json(serde_json::json!({
        "attempt_id": attempt.id,
        "score": attempt.score,
        "correct_answers": attempt.correct_answers,
        "total_questions": attempt.total_questions,
        "started_at": attempt.started_at,
        "completed_at": attempt.completed_at,
        "results": results
    })))
}
