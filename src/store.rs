//! Progression state persistence
//!
//! One row per (program, exercise) pair plus an append-only history of
//! every evaluated session. The engine never touches this module; callers
//! read before and write after each evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Executor, Row, Sqlite, SqlitePool};

use crate::models::{ProgressionAction, ProgressionState, ProgressionVariant};

// ---------------------------------------------------------------------------
/// Error Handling
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum StoreError {
    #[error("Progression state not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Corrupt(e.to_string())
    }
}

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

fn parse_created_at(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("created_at {:?}: {}", value, e)))
}

fn to_u32(value: i64, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{} out of range: {}", column, value)))
}

// ---------------------------------------------------------------------------
// State Operations
// ---------------------------------------------------------------------------

/// Create a zero state for an exercise newly attached to a program.
/// Existing state is left alone.
pub async fn attach_exercise(
    pool: &SqlitePool,
    program_id: &str,
    exercise_id: &str,
) -> Result<bool, StoreError> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO progression_states (program_id, exercise_id, consecutive_failures)
        VALUES (?, ?, 0)
        "#,
    )
    .bind(program_id)
    .bind(exercise_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn state_from_row(row: &SqliteRow) -> Result<ProgressionState, StoreError> {
    let max_reps: Option<i64> = row.try_get("max_reps")?;
    let failures: i64 = row.try_get("consecutive_failures")?;
    let last_progression_at: Option<String> = row.try_get("last_progression_at")?;

    Ok(ProgressionState {
        max_weight: row.try_get("max_weight")?,
        max_reps: max_reps.map(|r| to_u32(r, "max_reps")).transpose()?,
        max_time: row.try_get("max_time")?,
        consecutive_failures: to_u32(failures, "consecutive_failures")?,
        last_progression_at: parse_timestamp(last_progression_at),
    })
}

/// Load the state for one exercise in one program
pub async fn load_state(
    pool: &SqlitePool,
    program_id: &str,
    exercise_id: &str,
) -> Result<ProgressionState, StoreError> {
    let row = sqlx::query(
        r#"
        SELECT max_weight, max_reps, max_time, consecutive_failures, last_progression_at
        FROM progression_states
        WHERE program_id = ? AND exercise_id = ?
        "#,
    )
    .bind(program_id)
    .bind(exercise_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => state_from_row(&row),
        None => Err(StoreError::NotFound(format!("{}/{}", program_id, exercise_id))),
    }
}

/// Write the state back. Last write wins.
/// Runs on a pool or inside a caller's transaction.
pub async fn save_state<'e, E>(
    executor: E,
    program_id: &str,
    exercise_id: &str,
    state: &ProgressionState,
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let last_progression = state.last_progression_at.map(|d| d.to_rfc3339());
    let updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO progression_states
            (program_id, exercise_id, max_weight, max_reps, max_time,
             consecutive_failures, last_progression_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(program_id, exercise_id) DO UPDATE SET
            max_weight = excluded.max_weight,
            max_reps = excluded.max_reps,
            max_time = excluded.max_time,
            consecutive_failures = excluded.consecutive_failures,
            last_progression_at = excluded.last_progression_at,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(program_id)
    .bind(exercise_id)
    .bind(state.max_weight)
    .bind(state.max_reps.map(i64::from))
    .bind(state.max_time)
    .bind(i64::from(state.consecutive_failures))
    .bind(&last_progression)
    .bind(&updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Drop every state and history row of a deleted program.
/// Returns the number of exercise states removed.
pub async fn delete_program(pool: &SqlitePool, program_id: &str) -> Result<u64, StoreError> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM progression_states WHERE program_id = ?")
        .bind(program_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM progression_history WHERE program_id = ?")
        .bind(program_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(removed)
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub program_id: String,
    pub exercise_id: String,
    pub variant: ProgressionVariant,
    pub action: ProgressionAction,
    pub details: String,
    pub previous_state: ProgressionState,
    pub new_state: ProgressionState,
    pub created_at: DateTime<Utc>,
}

/// Append one evaluated session to the history
#[allow(clippy::too_many_arguments)]
pub async fn log_progression<'e, E>(
    executor: E,
    program_id: &str,
    exercise_id: &str,
    variant: ProgressionVariant,
    action: ProgressionAction,
    details: &str,
    previous_state: &ProgressionState,
    new_state: &ProgressionState,
) -> Result<i64, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let previous_json = serde_json::to_string(previous_state)?;
    let new_json = serde_json::to_string(new_state)?;

    let result = sqlx::query(
        r#"
        INSERT INTO progression_history
            (program_id, exercise_id, variant, action, details,
             previous_state_json, new_state_json, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(program_id)
    .bind(exercise_id)
    .bind(variant.to_string())
    .bind(action.to_string())
    .bind(details)
    .bind(&previous_json)
    .bind(&new_json)
    .bind(Utc::now().to_rfc3339())
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Most recent history entries first
pub async fn load_history(
    pool: &SqlitePool,
    program_id: &str,
    exercise_id: &str,
    limit: i64,
) -> Result<Vec<HistoryEntry>, StoreError> {
    let rows = sqlx::query(
        r#"
        SELECT id, program_id, exercise_id, variant, action, details,
               previous_state_json, new_state_json, created_at
        FROM progression_history
        WHERE program_id = ? AND exercise_id = ?
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(program_id)
    .bind(exercise_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let variant: String = row.try_get("variant")?;
        let action: String = row.try_get("action")?;
        let previous_json: String = row.try_get("previous_state_json")?;
        let new_json: String = row.try_get("new_state_json")?;
        let created_at: String = row.try_get("created_at")?;

        entries.push(HistoryEntry {
            id: row.try_get("id")?,
            program_id: row.try_get("program_id")?,
            exercise_id: row.try_get("exercise_id")?,
            variant: variant.parse().map_err(StoreError::Corrupt)?,
            action: action.parse().map_err(StoreError::Corrupt)?,
            details: row.try_get("details")?,
            previous_state: serde_json::from_str(&previous_json)?,
            new_state: serde_json::from_str(&new_json)?,
            created_at: parse_created_at(&created_at)?,
        });
    }

    Ok(entries)
}
