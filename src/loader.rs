// src/loader.rs

use serde::Deserialize;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::AppError;

/// One entry of the JSON question source.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionEntry {
    pub question: String,
    pub options: EntryOptions,
    pub correct_answer: String,

    /// Optional source metadata. Only the reload variant uses it, to
    /// prefix the stored question text and fill the category column.
    #[serde(default)]
    pub chapter: Option<Value>,
    #[serde(default)]
    pub question_number_rel: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
}

/// The three answer options of a source entry.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryOptions {
    pub a: String,
    pub b: String,
    pub c: String,
}

/// Imports the question source into the bank, skipping entries whose
/// exact question text is already present. Idempotent: a second run
/// over the same source inserts zero rows.
///
/// A missing source file is not fatal; the bank keeps whatever rows it
/// already has. A malformed file aborts the whole load with no partial
/// commit.
pub async fn load_question_bank(pool: &SqlitePool, path: &str) -> Result<u64, AppError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Question file '{}' not found, skipping import", path);
            let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
                .fetch_one(pool)
                .await?;
            if existing > 0 {
                tracing::info!("Found {} questions already in the database", existing);
            } else {
                tracing::warn!("Question bank is empty; quizzes cannot start");
            }
            return Ok(0);
        }
        Err(e) => {
            return Err(AppError::InternalServerError(format!(
                "Failed to read question file '{}': {}",
                path, e
            )));
        }
    };

    let entries: Vec<QuestionEntry> = serde_json::from_str(&raw)
        .map_err(|e| AppError::BadRequest(format!("Malformed question file '{}': {}", path, e)))?;

    let added = insert_entries(pool, &entries, false).await?;
    tracing::info!("Question import finished, added {} new questions", added);
    Ok(added)
}

/// Flushes the bank and reloads it from the source file. This variant
/// prefixes the stored text with chapter metadata when present and
/// stores the chapter as the category. Single transaction: either the
/// whole bank is replaced or nothing changes.
pub async fn reload_question_bank(pool: &SqlitePool, path: &str) -> Result<u64, AppError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read question file '{}': {}", path, e))
    })?;

    let entries: Vec<QuestionEntry> = serde_json::from_str(&raw)
        .map_err(|e| AppError::BadRequest(format!("Malformed question file '{}': {}", path, e)))?;

    validate_entries(&entries)?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM questions").execute(&mut *tx).await?;

    let mut added = 0u64;
    for entry in entries {
        insert_entry(&mut tx, &entry, true).await?;
        added += 1;
    }

    tx.commit().await?;
    tracing::info!("Question bank flushed and reloaded with {} questions", added);
    Ok(added)
}

/// Inserts every entry not already present, in one transaction.
async fn insert_entries(
    pool: &SqlitePool,
    entries: &[QuestionEntry],
    prefix_metadata: bool,
) -> Result<u64, AppError> {
    validate_entries(entries)?;

    let mut tx = pool.begin().await?;
    let mut added = 0u64;

    for entry in entries {
        let text = stored_text(entry, prefix_metadata);
        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM questions WHERE question_text = ?")
            .bind(&text)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_none() {
            insert_entry(&mut tx, entry, prefix_metadata).await?;
            added += 1;
        }
    }

    tx.commit().await?;
    Ok(added)
}

async fn insert_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    entry: &QuestionEntry,
    prefix_metadata: bool,
) -> Result<(), AppError> {
    let text = stored_text(entry, prefix_metadata);
    let category = if prefix_metadata {
        entry
            .chapter
            .as_ref()
            .map(value_text)
            .or_else(|| entry.category.clone())
    } else {
        entry.category.clone()
    };

    sqlx::query(
        r#"
        INSERT INTO questions
        (question_text, option_a, option_b, option_c, option_d, correct_answer, category, created_at)
        VALUES (?, ?, ?, ?, '', ?, ?, ?)
        "#,
    )
    .bind(&text)
    .bind(&entry.options.a)
    .bind(&entry.options.b)
    .bind(&entry.options.c)
    .bind(&entry.correct_answer)
    .bind(category)
    .bind(chrono::Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Rejects the whole batch before any write when an entry is malformed.
pub fn validate_entries(entries: &[QuestionEntry]) -> Result<(), AppError> {
    for (index, entry) in entries.iter().enumerate() {
        if entry.question.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "Entry {} has an empty question text",
                index
            )));
        }
        if !matches!(entry.correct_answer.as_str(), "a" | "b" | "c") {
            return Err(AppError::BadRequest(format!(
                "Entry {} has an invalid correct answer '{}'",
                index, entry.correct_answer
            )));
        }
    }
    Ok(())
}

/// The question text as stored: optionally prefixed with the chapter
/// and relative question number from the source metadata.
pub fn stored_text(entry: &QuestionEntry, prefix_metadata: bool) -> String {
    if prefix_metadata {
        if let (Some(chapter), Some(number)) = (&entry.chapter, &entry.question_number_rel) {
            return format!(
                "[Ch. {}, Q. {}] {}",
                value_text(chapter),
                value_text(number),
                entry.question
            );
        }
    }
    entry.question.clone()
}

/// Renders a JSON metadata value without surrounding quotes.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
