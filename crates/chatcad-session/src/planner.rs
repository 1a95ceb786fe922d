//! The reasoning collaborator boundary.
//!
//! A [`Planner`] turns a user utterance plus geometric feedback about the
//! live registry into an operation log. The production front-end speaks
//! JSON over this boundary; tests substitute scripted planners.

use chatcad_engine::ModelSummary;
use chatcad_ops::OperationLog;
use thiserror::Error;

/// Errors from the planning boundary.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// The planner produced a payload that does not parse as an
    /// operation log.
    #[error("malformed operation payload: {0}")]
    Payload(String),
}

/// Produces an operation log for each conversation turn.
///
/// `feedback` describes every live model (identifier, kind, bounds) so
/// follow-up utterances can be grounded against existing geometry.
pub trait Planner {
    /// Plan one turn.
    fn plan(
        &mut self,
        utterance: &str,
        feedback: &[ModelSummary],
    ) -> Result<OperationLog, PlannerError>;
}

/// Planner for front-ends that deliver ready-made JSON operation logs,
/// treating the utterance itself as the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPlanner;

impl Planner for JsonPlanner {
    fn plan(
        &mut self,
        utterance: &str,
        _feedback: &[ModelSummary],
    ) -> Result<OperationLog, PlannerError> {
        OperationLog::from_json(utterance).map_err(|e| PlannerError::Payload(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_planner_parses_log() {
        let payload = r#"{
            "operations": [
                {
                    "type": "CreatePrimitive",
                    "id": "A",
                    "primitive": {
                        "type": "Cuboid",
                        "width": 1.0, "height": 1.0, "depth": 1.0
                    }
                }
            ]
        }"#;
        let log = JsonPlanner.plan(payload, &[]).unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn json_planner_rejects_garbage() {
        let err = JsonPlanner.plan("delete everything", &[]).unwrap_err();
        assert!(matches!(err, PlannerError::Payload(_)));
    }
}
