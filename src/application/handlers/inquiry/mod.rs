//! Inquiry handlers - the refinement dialogue turn by turn.
//!
//! `TurnOrchestrator` is the single entry point used by the HTTP layer.
//! It exposes a blocking and a streaming variant of both the start and
//! the continue operation.

mod orchestrator;
mod turn;

pub use orchestrator::{TurnEventStream, TurnOrchestrator};
pub use turn::{
    ContinueInquiryCommand, StartInquiryCommand, TurnConfig, TurnError, TurnEvent, TurnOutcome,
};
