//! Final-query marker scanning and payload cleanup.
//!
//! The assistant ends a refinement dialogue by writing `@FINAL_QUERY:`
//! followed by the refined request. Models are not perfectly obedient, so the
//! marker is matched case-insensitively anywhere in the text, and the payload
//! is trimmed back to its first paragraph with any closing pleasantry
//! ("Hope this helps!") cut off.
//!
//! Two entry points share the same rules:
//!
//! - [`scan`] is a pure function over a complete buffer.
//! - [`SentinelScanner`] is the incremental form used while a reply is still
//!   streaming. It only searches the newly appended tail on each call and,
//!   once triggered, never goes back to scanning.

use std::fmt;

/// Marker that separates conversational text from the final query.
pub const FINAL_QUERY_MARKER: &str = "@FINAL_QUERY:";

/// Closing phrases stripped from the end of a payload (case-insensitive).
pub const CLOSING_PHRASES: [&str; 6] = [
    "hope this helps",
    "does that help",
    "hope that helps",
    "let me know",
    "hope this",
    "does that",
];

/// Frame wrapped around every refined query handed back to callers.
pub const REFINED_QUERY_FRAME: &str = "User wants to say this: ";

/// Result of scanning a complete buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// The buffer contains the marker.
    pub triggered: bool,
    /// Cleaned payload; `None` when not triggered or when cleanup left nothing.
    pub payload: Option<String>,
}

/// Scans a buffer for the marker and extracts the cleaned payload.
pub fn scan(buffer: &str) -> ScanResult {
    let triggered = marker_position(buffer).is_some();
    let payload = if triggered {
        extract_refined_query(buffer).map(|query| query.payload().to_string())
    } else {
        None
    };
    ScanResult { triggered, payload }
}

/// Extracts the refined query following the first marker.
///
/// Returns `None` when there is no marker or when the cleaned payload is
/// empty; an empty payload is never a final answer.
pub fn extract_refined_query(buffer: &str) -> Option<RefinedQuery> {
    let start = marker_position(buffer)? + FINAL_QUERY_MARKER.len();
    let after = buffer[start..].trim_start();

    let paragraph = match after.find("\n\n") {
        Some(end) => &after[..end],
        None => after.trim_end_matches('\n'),
    };

    // Phrases are tried in list order; the first one present decides the cut.
    let cut = CLOSING_PHRASES
        .iter()
        .find_map(|phrase| find_ignore_ascii_case(paragraph.as_bytes(), phrase.as_bytes(), 0));

    let query = match cut {
        Some(at) => &paragraph[..at],
        None => paragraph,
    }
    .trim();

    (!query.is_empty()).then(|| RefinedQuery::new(query))
}

/// Byte offset where a trailing, incomplete marker begins.
///
/// `"talk. @FINAL"` returns the offset of `@`: the text may still turn
/// into the marker once the next increment arrives, so a streaming caller
/// should hold it back rather than forward it.
pub fn partial_marker_start(buffer: &str) -> Option<usize> {
    let bytes = buffer.as_bytes();
    let marker = FINAL_QUERY_MARKER.as_bytes();

    (1..marker.len()).rev().find_map(|len| {
        let start = bytes.len().checked_sub(len)?;
        bytes[start..]
            .eq_ignore_ascii_case(&marker[..len])
            .then_some(start)
    })
}

fn marker_position(buffer: &str) -> Option<usize> {
    find_ignore_ascii_case(buffer.as_bytes(), FINAL_QUERY_MARKER.as_bytes(), 0)
}

/// Finds `needle` in `haystack` at or after `from`, ignoring ASCII case.
///
/// Needles are ASCII, so any match offset is also a UTF-8 char boundary.
fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|pos| pos + from)
}

// ════════════════════════════════════════════════════════════════════════════════
// Incremental scanner
// ════════════════════════════════════════════════════════════════════════════════

/// State of an incremental scan over one reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// No marker seen yet.
    #[default]
    Scanning,
    /// Marker found; this state is final for the rest of the reply.
    Triggered {
        /// Byte offset of the first marker occurrence.
        marker_at: usize,
    },
}

impl ScanState {
    pub fn is_triggered(&self) -> bool {
        matches!(self, Self::Triggered { .. })
    }
}

/// Incremental marker detector for a monotonically growing buffer.
///
/// Each call to [`observe`](Self::observe) must receive the whole buffer so
/// far. Only the region not yet searched (plus enough overlap to catch a
/// marker split across increments) is examined.
#[derive(Debug, Clone, Default)]
pub struct SentinelScanner {
    state: ScanState,
    searched_to: usize,
}

impl SentinelScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes the current buffer and returns the resulting state.
    pub fn observe(&mut self, buffer: &str) -> ScanState {
        if self.state.is_triggered() {
            return self.state;
        }

        let overlap = FINAL_QUERY_MARKER.len() - 1;
        let from = self.searched_to.min(buffer.len()).saturating_sub(overlap);

        if let Some(marker_at) =
            find_ignore_ascii_case(buffer.as_bytes(), FINAL_QUERY_MARKER.as_bytes(), from)
        {
            self.state = ScanState::Triggered { marker_at };
        }
        self.searched_to = buffer.len();
        self.state
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_triggered(&self) -> bool {
        self.state.is_triggered()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Refined query
// ════════════════════════════════════════════════════════════════════════════════

/// A cleaned, non-empty final query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinedQuery(String);

impl RefinedQuery {
    pub(crate) fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    /// The cleaned payload without the frame.
    pub fn payload(&self) -> &str {
        &self.0
    }

    /// The payload wrapped in the caller-facing frame.
    pub fn framed(&self) -> String {
        format!("{}{}", REFINED_QUERY_FRAME, self.0)
    }
}

impl fmt::Display for RefinedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", REFINED_QUERY_FRAME, self.0)
    }
}
