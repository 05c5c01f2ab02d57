//! Test utilities and helpers
//!
//! - In-memory database setup/teardown
//! - Seeded progression states
//! - Mock sessions and configurations

use sqlx::SqlitePool;

use crate::models::{
  AdjustmentKind, DeloadPolicy, ExercisePerformance, ProgressionConfiguration, ProgressionRules,
  SetRecord, TargetRange, TemplateContext,
};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database with all migrations applied
///
/// Uses max_connections(1) so every query sees the same in-memory database
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed progression states:
/// - 5x5/squat: 100 x 5
/// - 5x5/bench: 60 x 5, one failure
/// - ppl/plank: 10 kg for 40s
pub async fn seed_test_states(pool: &SqlitePool) -> Vec<(String, String)> {
  let states: Vec<(&str, &str, Option<f64>, Option<i64>, Option<f64>, i64)> = vec![
    ("5x5", "squat", Some(100.0), Some(5), None, 0),
    ("5x5", "bench", Some(60.0), Some(5), None, 1),
    ("ppl", "plank", Some(10.0), None, Some(40.0), 0),
  ];

  let mut keys = Vec::new();

  for (program, exercise, weight, reps, time, failures) in states {
    sqlx::query(
      r#"
      INSERT OR REPLACE INTO progression_states (
        program_id, exercise_id, max_weight, max_reps, max_time, consecutive_failures
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6)
      "#,
    )
    .bind(program)
    .bind(exercise)
    .bind(weight)
    .bind(reps)
    .bind(time)
    .bind(failures)
    .execute(pool)
    .await
    .expect("Failed to seed progression state");

    keys.push((program.to_string(), exercise.to_string()));
  }

  keys
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Linear +5 with 2.5 rounding, 10% deload after 3 failures
pub fn mock_linear_config() -> ProgressionConfiguration {
  ProgressionConfiguration::Linear(ProgressionRules {
    weight_increment: Some(5.0),
    weight_rounding_step: Some(2.5),
    deload: DeloadPolicy {
      kind: AdjustmentKind::Percentage,
      amount: Some(10.0),
      failure_threshold: Some(3),
      ..Default::default()
    },
    ..Default::default()
  })
}

/// `count` completed sets of `weight` x `reps`
pub fn mock_session(weight: f64, reps: u32, count: usize) -> ExercisePerformance {
  ExercisePerformance::new(
    (0..count)
      .map(|_| SetRecord {
        weight: Some(weight),
        reps: Some(reps),
        completed: true,
        ..Default::default()
      })
      .collect(),
  )
}

/// Session whose last set was failed
pub fn mock_failed_session(weight: f64, reps: u32, count: usize) -> ExercisePerformance {
  let mut session = mock_session(weight, reps, count);
  if let Some(last) = session.sets.last_mut() {
    last.completed = false;
    last.failed = true;
  }
  session
}

pub fn mock_rep_template(min: u32, max: u32) -> TemplateContext {
  TemplateContext {
    rep_range: Some(TargetRange::new(min, max)),
    ..Default::default()
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('progression_states', 'progression_history')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2, "Expected both progression tables, got {:?}", tables);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_states_returns_keys() {
    let pool = setup_test_db().await;

    let keys = seed_test_states(&pool).await;
    assert_eq!(keys.len(), 3);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM progression_states")
      .fetch_one(&pool)
      .await
      .expect("Failed to count states");
    assert_eq!(count, 3);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let session = mock_failed_session(100.0, 5, 3);
    assert_eq!(session.sets.len(), 3);
    assert!(session.sets[2].failed);
    assert!(!session.sets[0].failed);

    assert!(mock_linear_config().rules().is_some());
    assert_eq!(mock_rep_template(5, 8).rep_range, Some(TargetRange::new(5, 8)));
  }
}
