//! Interaction runtime executor

use super::traits::{ChatPlatform, TelemetrySink};
use super::{RuntimeInput, SessionEvent};

use crate::provider::ProviderRegistry;
use crate::state_machine::{
    transition, Effect, Event, Interaction, InteractionContext, InteractionState, StateView,
    TransitionError,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// When a runtime stops on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retirement {
    /// Quiet time after which an idle session with no subscribers stops
    pub idle: Duration,
    /// Quiet time after which a session stops whatever its state
    pub untouched: Duration,
}

/// Per-session runtime. Drains one input channel and runs every transition
/// and its effects to completion before taking the next input.
pub struct InteractionRuntime<P, T>
where
    P: ChatPlatform + 'static,
    T: TelemetrySink + 'static,
{
    context: InteractionContext,
    interaction: Interaction,
    registry: Arc<ProviderRegistry>,
    platform: P,
    telemetry: T,
    input_rx: mpsc::Receiver<RuntimeInput>,
    /// Cloned into dispatch tasks so completions come back through the loop
    input_tx: mpsc::Sender<RuntimeInput>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    shutdown: CancellationToken,
    retirement: Option<Retirement>,
    last_activity: Instant,
}

impl<P, T> InteractionRuntime<P, T>
where
    P: ChatPlatform + 'static,
    T: TelemetrySink + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: InteractionContext,
        registry: Arc<ProviderRegistry>,
        platform: P,
        telemetry: T,
        input_rx: mpsc::Receiver<RuntimeInput>,
        input_tx: mpsc::Sender<RuntimeInput>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            context,
            interaction: Interaction::new(),
            registry,
            platform,
            telemetry,
            input_rx,
            input_tx,
            broadcast_tx,
            shutdown,
            retirement: None,
            last_activity: Instant::now(),
        }
    }

    /// Stop the runtime once it has been quiet for long enough
    #[must_use]
    pub fn with_retirement(mut self, retirement: Retirement) -> Self {
        self.retirement = Some(retirement);
        self
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting interaction runtime");

        let check_every = self
            .retirement
            .map_or(Duration::from_secs(3600), |r| r.idle.min(r.untouched));
        let mut sweep = tokio::time::interval_at(Instant::now() + check_every, check_every);

        loop {
            tokio::select! {
                biased;

                () = self.shutdown.cancelled() => break,

                Some(input) = self.input_rx.recv() => {
                    self.last_activity = Instant::now();
                    self.handle_input(input).await;
                }

                _ = sweep.tick(), if self.retirement.is_some() => {
                    if self.should_retire() {
                        tracing::info!(
                            session_id = %self.context.session_id,
                            state = self.interaction.state.name(),
                            "Retiring quiet session"
                        );
                        break;
                    }
                }

                else => break,
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Interaction runtime stopped");
    }

    fn should_retire(&self) -> bool {
        let Some(retirement) = self.retirement else {
            return false;
        };
        let quiet = self.last_activity.elapsed();
        if quiet >= retirement.untouched {
            return true;
        }
        quiet >= retirement.idle
            && self.interaction.state == InteractionState::Idle
            && self.broadcast_tx.receiver_count() == 0
    }

    fn view(&self) -> StateView {
        self.interaction.view(Utc::now())
    }

    async fn handle_input(&mut self, input: RuntimeInput) {
        match input {
            RuntimeInput::Trigger { event, reply } => {
                if let Event::ProviderCompleted { request_id, .. } = &event {
                    if !self.interaction.awaits(*request_id) {
                        tracing::debug!(
                            session_id = %self.context.session_id,
                            request_id = %request_id,
                            "Dropping stale provider response"
                        );
                        return;
                    }
                }

                let result = self.process_event(event).await;
                if let Some(reply) = reply {
                    let _ = reply.send(result.map(|()| self.view()));
                }
            }
            RuntimeInput::Snapshot { reply } => {
                let _ = reply.send(self.view());
            }
        }
    }

    async fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let event_name = event.name();

        // Pure state transition
        let result = match transition(&self.interaction, &self.context, event, Utc::now()) {
            Ok(r) => r,
            Err(e) => {
                // Transition errors are user-facing (validation, busy, feedback)
                tracing::info!(
                    session_id = %self.context.session_id,
                    event = event_name,
                    kind = e.kind(),
                    "Trigger rejected"
                );
                let _ = self.broadcast_tx.send(SessionEvent::Error {
                    kind: e.kind(),
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let from = self.interaction.state.name();
        self.interaction = result.next;
        let to = self.interaction.state.name();
        if from != to {
            tracing::debug!(
                session_id = %self.context.session_id,
                event = event_name,
                from,
                to,
                "State transition"
            );
        }

        for effect in result.effects {
            self.execute_effect(effect).await;
        }

        Ok(())
    }

    /// Execute an effect. Outbound failures are reported to clients but never
    /// roll back the transition that produced them.
    async fn execute_effect(&mut self, effect: Effect) {
        let session_id = self.context.session_id.clone();

        match effect {
            Effect::Dispatch { request } => {
                // Spawn provider call as background task
                let registry = self.registry.clone();
                let input_tx = self.input_tx.clone();

                tracing::info!(
                    session_id = %session_id,
                    request_id = %request.id,
                    mode = %request.mode(),
                    "Dispatching transformation (background)"
                );

                tokio::spawn(async move {
                    let outcome = registry.dispatch(&request).await;
                    let _ = input_tx
                        .send(RuntimeInput::Trigger {
                            event: Event::ProviderCompleted {
                                request_id: request.id,
                                outcome,
                            },
                            reply: None,
                        })
                        .await;
                });
            }

            Effect::InsertIntoConversation { request_id, text } => {
                match self.platform.insert_into_conversation(&session_id, &text).await {
                    Ok(()) => {
                        tracing::info!(session_id = %session_id, request_id = %request_id, "Result inserted");
                    }
                    Err(e) => {
                        tracing::warn!(session_id = %session_id, request_id = %request_id, error = %e, "Insert failed");
                        self.report(e.kind(), e.to_string());
                    }
                }
            }

            Effect::CopyToClipboard { request_id, text } => {
                if let Err(e) = self.platform.copy_to_clipboard(&session_id, &text).await {
                    tracing::warn!(session_id = %session_id, request_id = %request_id, error = %e, "Copy failed");
                    self.report(e.kind(), e.to_string());
                }
            }

            Effect::EmitTelemetry { record } => {
                if let Err(e) = self.telemetry.emit(&record).await {
                    tracing::warn!(
                        session_id = %session_id,
                        request_id = %record.request_id,
                        error = %e,
                        "Telemetry emit failed"
                    );
                    self.report(e.kind(), e.to_string());
                }
            }

            Effect::NotifyState => {
                let _ = self
                    .broadcast_tx
                    .send(SessionEvent::StateChange { state: self.view() });
            }

            Effect::NotifyResultExpired => {
                let _ = self.broadcast_tx.send(SessionEvent::Notice {
                    kind: "result_expired",
                    message: "This result has expired. Run the transformation again.".to_string(),
                });
            }
        }
    }

    fn report(&self, kind: &'static str, message: String) {
        let _ = self.broadcast_tx.send(SessionEvent::Error { kind, message });
    }
}
