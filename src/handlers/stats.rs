// src/handlers/stats.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::attempt::{AttemptSummary, QuizAttempt, UserStatistics},
    utils::jwt::Claims,
};

/// Loads the user's completed attempts, newest first. Statistics only
/// ever aggregate completed attempts.
async fn completed_attempts(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<QuizAttempt>, AppError> {
    let attempts = sqlx::query_as::<_, QuizAttempt>(
        r#"
        SELECT id, user_id, questions, answers, score, correct_answers,
               total_questions, started_at, completed_at, is_completed
        FROM quiz_attempts
        WHERE user_id = ? AND is_completed = 1
        ORDER BY completed_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(attempts)
}

/// Aggregated statistics plus the five most recent completed attempts
/// for the dashboard. Recomputed from the full history on every call.
pub async fn get_statistics(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = completed_attempts(&pool, claims.user_id()).await?;

    let stats = UserStatistics::from_attempts(&attempts);
    let recent: Vec<AttemptSummary> = attempts.iter().take(5).map(Into::into).collect();

    Ok(Json(serde_json::json!({
        "stats": stats,
        "recent_attempts": recent
    })))
}

/// Full completed-attempt history plus chart data covering the ten
/// most recent attempts in chronological order.
pub async fn get_history(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = completed_attempts(&pool, claims.user_id()).await?;

    let stats = UserStatistics::from_attempts(&attempts);
    let history: Vec<AttemptSummary> = attempts.iter().map(Into::into).collect();

    let mut dates = Vec::new();
    let mut scores = Vec::new();
    for attempt in attempts.iter().take(10).rev() {
        if let Some(completed_at) = attempt.completed_at {
            dates.push(completed_at.format("%Y-%m-%d").to_string());
            scores.push(attempt.score);
        }
    }

    Ok(Json(serde_json::json!({
        "stats": stats,
        "attempts": history,
        "chart_data": { "dates": dates, "scores": scores }
    })))
}

/// Irreversibly deletes every attempt of the calling user, completed
/// or not, in one statement.
pub async fn reset_statistics(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM quiz_attempts WHERE user_id = ?")
        .bind(claims.user_id())
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reset statistics: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    tracing::info!(
        "User {} reset statistics, {} attempts deleted",
        claims.user_id(),
        result.rows_affected()
    );

    Ok(Json(serde_json::json!({
        "message": "Statistics reset successfully",
        "deleted_attempts": result.rows_affected()
    })))
}
