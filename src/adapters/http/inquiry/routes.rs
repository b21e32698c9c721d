//! Axum routes for inquiry endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    continue_inquiry, continue_inquiry_stream, root, start_inquiry, start_inquiry_stream,
    InquiryAppState,
};

/// Creates routes for inquiry endpoints.
///
/// - POST /inquire/start - Open a conversation
/// - POST /inquire/continue - Answer the last question
/// - POST /inquire/start/stream - Streaming start (SSE)
/// - POST /inquire/continue/stream - Streaming continue (SSE)
pub fn inquiry_routes() -> Router<InquiryAppState> {
    Router::new()
        .route("/inquire/start", post(start_inquiry))
        .route("/inquire/continue", post(continue_inquiry))
        .route("/inquire/start/stream", post(start_inquiry_stream))
        .route("/inquire/continue/stream", post(continue_inquiry_stream))
}

/// Full router: liveness probe plus inquiry routes, state applied.
pub fn inquiry_router(state: InquiryAppState) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(inquiry_routes())
        .with_state(state)
}
