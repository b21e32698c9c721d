//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, state machine trait)
//! - `refinement` - Query refinement dialogue: history, final-query scanning,
//!   stream reassembly, and conversation lifecycle

pub mod foundation;
pub mod refinement;
