//! TurnOrchestrator - runs one refinement turn end to end.
//!
//! A turn resolves (or seeds) the conversation history, appends the user's
//! text, calls the backend, classifies the reply and only then touches the
//! session store:
//!
//! - reply is a question: the history, now ending with that question, is
//!   created (first turn) or written back (later turns)
//! - reply carries the final query: the stored history is deleted, or never
//!   stored at all when the very first reply is already final
//!
//! Backend failures surface before the commit step, so a failed turn leaves
//! the committed history exactly as it was. The streaming variant is pull
//! based: dropping the event stream while the backend is still replying drops
//! the backend stream with it and nothing is committed. Once the reply is
//! complete the commit runs on its own task and finishes even if the caller
//! has gone.

use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::domain::foundation::{ConversationId, StateMachine};
use crate::domain::refinement::{
    reassemble, ConversationHistory, Message, Reassembled, ReassemblyEvent, RefinementState,
    StreamReassembler,
};
use crate::ports::{AIError, AIProvider, CompletionRequest, SessionStore, StreamChunk};

use super::turn::{
    ContinueInquiryCommand, StartInquiryCommand, TurnConfig, TurnError, TurnEvent, TurnOutcome,
};

/// Events of one streamed turn.
pub type TurnEventStream = Pin<Box<dyn Stream<Item = TurnEvent> + Send>>;

type ReplyEvents = Pin<Box<dyn Stream<Item = Result<ReassemblyEvent, AIError>> + Send>>;

/// Drives refinement turns against a backend and a session store.
#[derive(Clone)]
pub struct TurnOrchestrator {
    ai_provider: Arc<dyn AIProvider>,
    session_store: Arc<dyn SessionStore>,
    config: TurnConfig,
}

/// A turn whose history is ready but whose reply is not committed yet.
struct PendingTurn {
    conversation_id: ConversationId,
    history: ConversationHistory,
    state: RefinementState,
}

enum StreamState {
    Streaming {
        events: ReplyEvents,
        turn: PendingTurn,
        orchestrator: TurnOrchestrator,
    },
    /// Outcome still owed after a trailing token.
    Outcome(TurnEvent),
    Finished,
}

impl TurnOrchestrator {
    pub fn new(ai_provider: Arc<dyn AIProvider>, session_store: Arc<dyn SessionStore>) -> Self {
        Self {
            ai_provider,
            session_store,
            config: TurnConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TurnConfig) -> Self {
        self.config = config;
        self
    }

    /// Opens a conversation and runs its first turn.
    pub async fn start(&self, cmd: StartInquiryCommand) -> Result<TurnOutcome, TurnError> {
        let turn = self.begin_start(cmd)?;
        self.run_blocking(turn).await
    }

    /// Runs the next turn of an open conversation.
    pub async fn continue_inquiry(
        &self,
        cmd: ContinueInquiryCommand,
    ) -> Result<TurnOutcome, TurnError> {
        let turn = self.begin_continue(cmd).await?;
        self.run_blocking(turn).await
    }

    /// Streaming form of [`start`](Self::start).
    pub async fn start_stream(&self, cmd: StartInquiryCommand) -> Result<TurnEventStream, TurnError> {
        let turn = self.begin_start(cmd)?;
        self.run_stream(turn).await
    }

    /// Streaming form of [`continue_inquiry`](Self::continue_inquiry).
    pub async fn continue_stream(
        &self,
        cmd: ContinueInquiryCommand,
    ) -> Result<TurnEventStream, TurnError> {
        let turn = self.begin_continue(cmd).await?;
        self.run_stream(turn).await
    }

    fn begin_start(&self, cmd: StartInquiryCommand) -> Result<PendingTurn, TurnError> {
        Message::validate_user_text("message", &cmd.message).map_err(TurnError::InvalidInput)?;

        let conversation_id = ConversationId::new();
        info!(conversation_id = %conversation_id, "Starting inquiry");

        Ok(PendingTurn {
            conversation_id,
            history: ConversationHistory::seeded(self.config.system_prompt.as_str(), cmd.message),
            state: RefinementState::New,
        })
    }

    async fn begin_continue(&self, cmd: ContinueInquiryCommand) -> Result<PendingTurn, TurnError> {
        Message::validate_user_text("answer", &cmd.answer).map_err(TurnError::InvalidInput)?;

        let conversation_id: ConversationId = cmd
            .conversation_id
            .trim()
            .parse()
            .map_err(|_| TurnError::NotFound)?;

        let mut history = match self.session_store.get(&conversation_id).await? {
            Some(history) => history,
            None => {
                debug!(conversation_id = %conversation_id, "Continue for unknown conversation");
                return Err(TurnError::NotFound);
            }
        };
        history.push_user(cmd.answer);
        info!(
            conversation_id = %conversation_id,
            messages = history.len(),
            "Continuing inquiry"
        );

        Ok(PendingTurn {
            conversation_id,
            history,
            state: RefinementState::AwaitingAnswer,
        })
    }

    fn request_for(&self, turn: &PendingTurn) -> CompletionRequest {
        let mut request = CompletionRequest::new(turn.conversation_id).with_history(&turn.history);
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }

    async fn run_blocking(&self, turn: PendingTurn) -> Result<TurnOutcome, TurnError> {
        let response = self
            .ai_provider
            .complete(self.request_for(&turn))
            .await
            .map_err(|err| backend_failure(&turn, err))?;
        debug!(
            conversation_id = %turn.conversation_id,
            model = %response.model,
            finish_reason = ?response.finish_reason,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Backend reply received"
        );

        self.commit(turn, StreamReassembler::reassemble_text(&response.content))
            .await
    }

    async fn run_stream(&self, turn: PendingTurn) -> Result<TurnEventStream, TurnError> {
        let chunks = self
            .ai_provider
            .stream_complete(self.request_for(&turn))
            .await
            .map_err(|err| backend_failure(&turn, err))?;

        let conversation_id = turn.conversation_id;
        let deltas = chunks
            .inspect(move |chunk| {
                if let Ok(StreamChunk {
                    finish_reason,
                    usage,
                    ..
                }) = chunk
                {
                    if finish_reason.is_some() || usage.is_some() {
                        debug!(
                            conversation_id = %conversation_id,
                            finish_reason = ?finish_reason,
                            total_tokens = usage.as_ref().map(|u| u.total_tokens),
                            "Backend stream finishing"
                        );
                    }
                }
            })
            .map(|chunk| chunk.map(|c| c.delta));
        let events: ReplyEvents = Box::pin(reassemble(deltas));
        let initial = StreamState::Streaming {
            events,
            turn,
            orchestrator: self.clone(),
        };

        let stream = stream::unfold(initial, |state| async move {
            let (mut events, turn, orchestrator) = match state {
                StreamState::Streaming {
                    events,
                    turn,
                    orchestrator,
                } => (events, turn, orchestrator),
                StreamState::Outcome(event) => return Some((event, StreamState::Finished)),
                StreamState::Finished => return None,
            };

            let item = match events.next().await {
                Some(item) => item,
                None => return None,
            };

            match item {
                Ok(ReassemblyEvent::Token(content)) => {
                    let event = TurnEvent::Token {
                        content,
                        conversation_id: turn.conversation_id,
                    };
                    let next = StreamState::Streaming {
                        events,
                        turn,
                        orchestrator,
                    };
                    Some((event, next))
                }
                Ok(ReassemblyEvent::Finished { tail, reply }) => {
                    let conversation_id = turn.conversation_id;
                    let outcome = orchestrator.commit_detached(turn, reply).await;
                    match tail {
                        Some(content) => Some((
                            TurnEvent::Token {
                                content,
                                conversation_id,
                            },
                            StreamState::Outcome(outcome),
                        )),
                        None => Some((outcome, StreamState::Finished)),
                    }
                }
                Err(err) => {
                    let err = backend_failure(&turn, err);
                    let event = TurnEvent::Error {
                        content: err.to_string(),
                    };
                    Some((event, StreamState::Finished))
                }
            }
        });

        Ok(Box::pin(stream))
    }

    /// Commits on a spawned task so the write survives the caller dropping
    /// the event stream once the backend reply is complete.
    async fn commit_detached(&self, turn: PendingTurn, reply: Reassembled) -> TurnEvent {
        let conversation_id = turn.conversation_id;
        let orchestrator = self.clone();
        let task = tokio::spawn(async move { orchestrator.commit(turn, reply).await });

        match task.await {
            Ok(Ok(outcome)) => outcome.into_event(),
            Ok(Err(err)) => TurnEvent::Error {
                content: err.to_string(),
            },
            Err(err) => {
                error!(conversation_id = %conversation_id, error = %err, "Commit task failed");
                TurnEvent::Error {
                    content: "Failed to save conversation.".to_string(),
                }
            }
        }
    }

    /// Applies a classified reply to the session store.
    async fn commit(&self, turn: PendingTurn, reply: Reassembled) -> Result<TurnOutcome, TurnError> {
        let PendingTurn {
            conversation_id,
            mut history,
            state,
        } = turn;

        match reply {
            Reassembled::Terminal(query) => {
                state
                    .transition_to(RefinementState::Terminated)
                    .map_err(TurnError::InvalidTransition)?;
                if state.has_session() {
                    self.session_store.delete(&conversation_id).await?;
                }
                info!(conversation_id = %conversation_id, "Refined query extracted");

                Ok(TurnOutcome::RefinedQuery {
                    refined_query: query.framed(),
                })
            }
            Reassembled::Continuation(question) => {
                state
                    .transition_to(RefinementState::AwaitingAnswer)
                    .map_err(TurnError::InvalidTransition)?;
                history.push_assistant(question.as_str());
                let messages = history.len();

                if state.has_session() {
                    self.session_store.put(conversation_id, history).await?;
                } else {
                    self.session_store.create(conversation_id, history).await?;
                }
                debug!(conversation_id = %conversation_id, messages, "Awaiting answer");

                Ok(TurnOutcome::Question {
                    conversation_id,
                    question,
                })
            }
        }
    }
}

fn backend_failure(turn: &PendingTurn, err: AIError) -> TurnError {
    error!(
        conversation_id = %turn.conversation_id,
        error = %err,
        "Backend call failed"
    );
    TurnError::Backend(err)
}
