//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod inquiry;

pub use inquiry::{
    ContinueInquiryCommand, StartInquiryCommand, TurnConfig, TurnError, TurnEvent,
    TurnEventStream, TurnOrchestrator, TurnOutcome,
};
