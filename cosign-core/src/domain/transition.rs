use crate::foundation::CosignError;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransitionResult {
    pub valid: bool,
    pub from_state: String,
    pub to_state: String,
    pub transition_reason: Option<String>,
}

/// Same-state transitions are valid no-ops; everything else must appear in `table`.
pub fn validate_against<S>(table: &[(S, S)], from: S, to: S) -> StateTransitionResult
where
    S: Copy + PartialEq + Display,
{
    let (from_state, to_state) = (from.to_string(), to.to_string());
    if from == to {
        return StateTransitionResult { valid: true, from_state, to_state, transition_reason: Some("no_op".to_string()) };
    }
    if table.contains(&(from, to)) {
        return StateTransitionResult { valid: true, from_state, to_state, transition_reason: None };
    }
    StateTransitionResult { valid: false, from_state, to_state, transition_reason: Some("not_allowed".to_string()) }
}

pub fn ensure_against<S>(entity: &'static str, table: &[(S, S)], from: S, to: S) -> Result<(), CosignError>
where
    S: Copy + PartialEq + Display,
{
    let result = validate_against(table, from, to);
    if result.valid {
        Ok(())
    } else {
        Err(CosignError::InvalidStateTransition { entity, from: result.from_state, to: result.to_state })
    }
}
