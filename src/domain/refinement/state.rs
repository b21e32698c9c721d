//! Refinement conversation lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle of one refinement conversation.
///
/// - `New`: start request received, nothing stored yet
/// - `AwaitingAnswer`: a clarifying question was asked and the history is stored
/// - `Terminated`: the refined query was produced and the history deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RefinementState {
    #[default]
    New,
    AwaitingAnswer,
    Terminated,
}

impl RefinementState {
    /// Returns true if a stored history exists for this state.
    pub fn has_session(&self) -> bool {
        matches!(self, Self::AwaitingAnswer)
    }
}

impl StateMachine for RefinementState {
    const STATES: &'static [Self] = &[Self::New, Self::AwaitingAnswer, Self::Terminated];

    fn can_transition_to(&self, target: &Self) -> bool {
        use RefinementState::*;
        matches!(
            (self, target),
            // First reply is a question
            (New, AwaitingAnswer) |
            // First reply is already the final query
            (New, Terminated) |
            // Another clarifying round
            (AwaitingAnswer, AwaitingAnswer) |
            (AwaitingAnswer, Terminated)
        )
    }
}
