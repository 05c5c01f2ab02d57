//! Session commands: read state, run the engine, persist the result

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::CommandError;
use crate::db::AppState;
use crate::models::{
    ExercisePerformance, ProgressionAction, ProgressionConfiguration, ProgressionResult,
    ProgressionState, TemplateContext,
};
use crate::progression::calculate_progression;
use crate::store::{self, HistoryEntry};

/// One completed exercise in one logged session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub program_id: String,
    pub exercise_id: String,
    #[serde(default)]
    pub config: ProgressionConfiguration,
    #[serde(default)]
    pub template: TemplateContext,
    pub performance: ExercisePerformance,
}

pub fn parse_session_request(json: &str) -> Result<SessionRequest, CommandError> {
    Ok(serde_json::from_str(json)?)
}

/// Evaluate a logged session and persist the new state.
/// Exercises seen for the first time start from a zero state.
pub async fn record_session(
    state: &AppState,
    request: SessionRequest,
) -> Result<ProgressionResult, CommandError> {
    let SessionRequest {
        program_id,
        exercise_id,
        config,
        template,
        performance,
    } = request;

    if store::attach_exercise(&state.db, &program_id, &exercise_id).await? {
        info!(%program_id, %exercise_id, "attached new exercise");
    }
    let current = store::load_state(&state.db, &program_id, &exercise_id).await?;

    let result = calculate_progression(&config, &current, &performance, &template);
    let next = current.apply(&result, chrono::Utc::now());

    // State and its history row land together or not at all
    let mut tx = state.db.begin().await.map_err(store::StoreError::from)?;
    store::save_state(&mut *tx, &program_id, &exercise_id, &next).await?;
    store::log_progression(
        &mut *tx,
        &program_id,
        &exercise_id,
        config.variant(),
        result.action,
        &result.details,
        &current,
        &next,
    )
    .await?;
    tx.commit().await.map_err(store::StoreError::from)?;

    match result.action {
        ProgressionAction::Progression | ProgressionAction::Deload => {
            info!(
                %program_id,
                %exercise_id,
                action = %result.action,
                details = %result.details,
                "progression state updated"
            );
        }
        ProgressionAction::Maintain if config.rules().is_some() => {
            // Configured but not progressed: surface it rather than drop it
            warn!(
                %program_id,
                %exercise_id,
                details = %result.details,
                "no progression this session"
            );
        }
        ProgressionAction::Maintain => {}
    }

    Ok(result)
}

/// Current state for one exercise
pub async fn get_progression_state(
    state: &AppState,
    program_id: &str,
    exercise_id: &str,
) -> Result<ProgressionState, CommandError> {
    Ok(store::load_state(&state.db, program_id, exercise_id).await?)
}

/// Recent evaluations for one exercise, newest first
pub async fn get_progression_history(
    state: &AppState,
    program_id: &str,
    exercise_id: &str,
    limit: Option<i64>,
) -> Result<Vec<HistoryEntry>, CommandError> {
    Ok(store::load_history(&state.db, program_id, exercise_id, limit.unwrap_or(50)).await?)
}

/// Drop all progression data of a deleted program
pub async fn remove_program(state: &AppState, program_id: &str) -> Result<u64, CommandError> {
    let removed = store::delete_program(&state.db, program_id).await?;
    info!(%program_id, removed, "program progression removed");
    Ok(removed)
}
