//! Refinement domain module.
//!
//! Narrows an ambiguous request into a single refined query through a
//! clarifying dialogue. The assistant signals completion by emitting the
//! `@FINAL_QUERY:` marker; everything here is about recognising that marker
//! in a growing transcript and turning what follows it into a clean query.

mod message;
mod prompt;
mod reassembler;
mod sentinel;
mod state;

pub use message::{ConversationHistory, Message, MessageRole, MAX_MESSAGE_LENGTH};
pub use prompt::SYSTEM_PROMPT;
pub use reassembler::{reassemble, Reassembled, ReassemblyEvent, StreamReassembler};
pub use sentinel::{
    extract_refined_query, scan, RefinedQuery, ScanResult, ScanState, SentinelScanner,
    CLOSING_PHRASES, FINAL_QUERY_MARKER, REFINED_QUERY_FRAME,
};
pub use state::RefinementState;
