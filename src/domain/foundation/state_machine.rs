//! State machine trait for lifecycle enums.

use super::ValidationError;

/// A lifecycle enum with a closed set of states and an explicit edge list.
///
/// Implementors list every state in [`STATES`](Self::STATES) and answer
/// [`can_transition_to`](Self::can_transition_to); the outgoing edges,
/// validated transitions and terminal check follow from those two.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug + 'static {
    /// Every state of the machine.
    const STATES: &'static [Self];

    /// Returns true if an edge from `self` to `target` exists.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// States reachable in one step.
    fn valid_transitions(&self) -> Vec<Self> {
        Self::STATES
            .iter()
            .copied()
            .filter(|target| self.can_transition_to(target))
            .collect()
    }

    /// Moves to `target`, or explains why the edge does not exist.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state",
                format!("no transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// True when no edge leaves this state.
    fn is_terminal(&self) -> bool {
        !Self::STATES
            .iter()
            .any(|target| self.can_transition_to(target))
    }
}
