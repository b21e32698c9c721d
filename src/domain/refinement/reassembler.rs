//! Stream reassembly with final-query suppression.
//!
//! A streamed reply is forwarded to the caller increment by increment until
//! the final-query marker shows up. From that increment on nothing else is
//! forwarded: the rest of the reply is accumulated silently and, once the
//! stream ends, the whole buffer is either turned into a [`RefinedQuery`] or
//! handed back as an ordinary assistant message.
//!
//! Text that could still become the marker (a trailing `@FINAL`, say) is held
//! back instead of forwarded. If the next increment shows it was not the
//! marker after all, the held text goes out together with that increment.

use futures::stream::{self, Stream, StreamExt};

use super::sentinel::{extract_refined_query, partial_marker_start, RefinedQuery, SentinelScanner};

/// Result of a complete reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reassembled {
    /// The reply carried a non-empty final query.
    Terminal(RefinedQuery),
    /// Ordinary reply (or a marker with nothing usable after it); the full text.
    Continuation(String),
}

/// Item produced while reassembling a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassemblyEvent {
    /// Text to forward to the caller as-is.
    Token(String),
    /// Stream ended; always the last event.
    ///
    /// `tail` is held-back text released only because the stream ended. It
    /// belongs after every earlier `Token` and before the outcome.
    Finished {
        tail: Option<String>,
        reply: Reassembled,
    },
}

/// Per-reply buffer and forwarding decision.
#[derive(Debug, Default)]
pub struct StreamReassembler {
    full_content: String,
    forwarded_to: usize,
    scanner: SentinelScanner,
}

impl StreamReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an increment and returns the text to forward, if any.
    pub fn push(&mut self, delta: &str) -> Option<String> {
        if delta.is_empty() {
            return None;
        }
        self.full_content.push_str(delta);

        if self.scanner.is_triggered() || self.scanner.observe(&self.full_content).is_triggered() {
            return None;
        }

        let release_to = partial_marker_start(&self.full_content)
            .unwrap_or(self.full_content.len())
            .max(self.forwarded_to);
        self.release(release_to)
    }

    /// Releases held-back text once the stream has ended without a marker.
    pub fn flush(&mut self) -> Option<String> {
        if self.scanner.is_triggered() {
            return None;
        }
        self.release(self.full_content.len())
    }

    /// True once the marker has been seen in this reply.
    pub fn found_final(&self) -> bool {
        self.scanner.is_triggered()
    }

    pub fn full_content(&self) -> &str {
        &self.full_content
    }

    /// Consumes the reassembler and classifies the complete reply.
    pub fn finish(self) -> Reassembled {
        if self.scanner.is_triggered() {
            if let Some(query) = extract_refined_query(&self.full_content) {
                return Reassembled::Terminal(query);
            }
        }
        Reassembled::Continuation(self.full_content)
    }

    /// Classifies a reply that arrived in one piece.
    pub fn reassemble_text(text: &str) -> Reassembled {
        let mut reassembler = Self::new();
        reassembler.push(text);
        reassembler.finish()
    }

    fn release(&mut self, to: usize) -> Option<String> {
        if to <= self.forwarded_to {
            return None;
        }
        let token = self.full_content[self.forwarded_to..to].to_string();
        self.forwarded_to = to;
        Some(token)
    }
}

/// Reassembles a stream of text increments.
///
/// Pull-based: each poll awaits at most one upstream increment at a time.
/// The output ends after [`ReassemblyEvent::Finished`] or after the first
/// upstream error, whichever comes first.
pub fn reassemble<S, E>(deltas: S) -> impl Stream<Item = Result<ReassemblyEvent, E>>
where
    S: Stream<Item = Result<String, E>> + Unpin,
{
    stream::unfold(
        Some((deltas.fuse(), StreamReassembler::new())),
        |state| async move {
            let (mut deltas, mut reassembler) = match state {
                Some(state) => state,
                None => return None,
            };

            loop {
                match deltas.next().await {
                    Some(Ok(delta)) => {
                        if let Some(token) = reassembler.push(&delta) {
                            return Some((
                                Ok(ReassemblyEvent::Token(token)),
                                Some((deltas, reassembler)),
                            ));
                        }
                    }
                    Some(Err(err)) => return Some((Err(err), None)),
                    None => {
                        let tail = reassembler.flush();
                        let finished = ReassemblyEvent::Finished {
                            tail,
                            reply: reassembler.finish(),
                        };
                        return Some((Ok(finished), None));
                    }
                }
            }
        },
    )
}
