//! Inquiry HTTP adapter.
//!
//! Blocking JSON endpoints and SSE streaming endpoints for the
//! refinement dialogue.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ApiResponse, ContinueRequest, ErrorResponse, StartRequest, StreamEvent};
pub use handlers::{InquiryApiError, InquiryAppState};
pub use routes::{inquiry_router, inquiry_routes};
