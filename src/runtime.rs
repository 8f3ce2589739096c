//! Runtime for executing interactions
//!
//! One runtime task per session applies the effects the state machine asks
//! for and feeds provider completions back in as events.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{InteractionRuntime, Retirement};
pub use traits::*;

use crate::command::{self, CommandError};
use crate::config::AssistantConfig;
use crate::feedback::FeedbackCollector;
use crate::provider::ProviderRegistry;
use crate::state_machine::{Event, InteractionContext, StateView, TransitionError};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tokio_util::sync::CancellationToken;

/// Type alias for production runtime with trait-object ports
pub type ProductionRuntime = InteractionRuntime<Arc<dyn ChatPlatform>, Arc<dyn TelemetrySink>>;

/// Reply to a trigger: the resulting view, or the user-facing rejection
pub type TriggerReply = Result<StateView, TransitionError>;

/// Input accepted by a session runtime
#[derive(Debug)]
pub enum RuntimeInput {
    Trigger {
        event: Event,
        reply: Option<oneshot::Sender<TriggerReply>>,
    },
    Snapshot {
        reply: oneshot::Sender<StateView>,
    },
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Init { state: StateView },
    StateChange { state: StateView },
    Notice { kind: &'static str, message: String },
    Error { kind: &'static str, message: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("No such session")]
    NotFound,
    #[error("Session runtime has stopped")]
    Stopped,
}

impl SessionError {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::Transition(e) => e.kind(),
            SessionError::Command(e) => e.kind(),
            SessionError::NotFound => "session_not_found",
            SessionError::Stopped => "stopped",
        }
    }
}

/// Handle to interact with a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    input_tx: mpsc::Sender<RuntimeInput>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Apply a trigger and wait for the resulting view
    pub async fn trigger(&self, event: Event) -> Result<StateView, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.input_tx
            .send(RuntimeInput::Trigger {
                event,
                reply: Some(reply),
            })
            .await
            .map_err(|_| SessionError::Stopped)?;
        Ok(rx.await.map_err(|_| SessionError::Stopped)??)
    }

    pub async fn snapshot(&self) -> Result<StateView, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.input_tx
            .send(RuntimeInput::Snapshot { reply })
            .await
            .map_err(|_| SessionError::Stopped)?;
        rx.await.map_err(|_| SessionError::Stopped)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Whether the runtime behind this handle has exited
    pub fn is_stopped(&self) -> bool {
        self.input_tx.is_closed()
    }
}

type SessionMap = Arc<RwLock<HashMap<String, SessionHandle>>>;

/// Manager for all session runtimes
pub struct SessionManager {
    registry: Arc<ProviderRegistry>,
    platform: Arc<dyn ChatPlatform>,
    telemetry: Arc<dyn TelemetrySink>,
    retention: Duration,
    retirement: Retirement,
    feedback: FeedbackCollector,
    sessions: SessionMap,
    shutdown: CancellationToken,
}

impl SessionManager {
    pub fn new(
        config: &AssistantConfig,
        registry: Arc<ProviderRegistry>,
        platform: Arc<dyn ChatPlatform>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            registry,
            platform,
            telemetry,
            retention: config.retention(),
            retirement: Retirement {
                idle: config.session_idle_timeout,
                untouched: config.retention_period(),
            },
            feedback: FeedbackCollector::new(config.comment_max_chars),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Handle of a running session, without creating one
    pub async fn find(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .filter(|h| !h.is_stopped())
            .cloned()
    }

    /// Get or create the runtime for a session
    pub async fn get_or_create(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        if self.shutdown.is_cancelled() {
            return Err(SessionError::Stopped);
        }
        if let Some(handle) = self.find(session_id).await {
            return Ok(handle);
        }

        let mut sessions = self.sessions.write().await;
        // Another caller may have created it while we waited for the lock
        if let Some(handle) = sessions.get(session_id).filter(|h| !h.is_stopped()) {
            return Ok(handle.clone());
        }

        let (input_tx, input_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let context = InteractionContext::new(session_id, self.retention, self.feedback);

        let runtime: ProductionRuntime = InteractionRuntime::new(
            context,
            self.registry.clone(),
            self.platform.clone(),
            self.telemetry.clone(),
            input_rx,
            input_tx.clone(),
            broadcast_tx.clone(),
            self.shutdown.child_token(),
        )
        .with_retirement(self.retirement);

        // Start runtime in background; its map entry goes when it stops
        let sid = session_id.to_string();
        let map = self.sessions.clone();
        tokio::spawn(async move {
            runtime.run().await;
            let mut sessions = map.write().await;
            if sessions.get(&sid).is_some_and(SessionHandle::is_stopped) {
                sessions.remove(&sid);
            }
            tracing::info!(session_id = %sid, "Interaction runtime finished");
        });

        let handle = SessionHandle {
            input_tx,
            broadcast_tx,
        };
        sessions.insert(session_id.to_string(), handle.clone());
        Ok(handle)
    }

    /// Send a trigger to a session. A runtime that retired between lookup
    /// and delivery is replaced once.
    pub async fn trigger(&self, session_id: &str, event: Event) -> Result<StateView, SessionError> {
        let handle = self.get_or_create(session_id).await?;
        match handle.trigger(event.clone()).await {
            Err(SessionError::Stopped) if !self.shutdown.is_cancelled() => {
                self.get_or_create(session_id).await?.trigger(event).await
            }
            result => result,
        }
    }

    /// Run a slash command: each event it expands to is applied in order
    pub async fn command(&self, session_id: &str, text: &str) -> Result<StateView, SessionError> {
        let invocation = command::parse(text)?;
        let handle = self.get_or_create(session_id).await?;

        let mut view = handle.snapshot().await?;
        for event in invocation.events() {
            view = handle.trigger(event).await?;
        }
        Ok(view)
    }

    /// Current view of an existing session
    pub async fn snapshot(&self, session_id: &str) -> Result<StateView, SessionError> {
        self.find(session_id)
            .await
            .ok_or(SessionError::NotFound)?
            .snapshot()
            .await
    }

    /// Subscribe to updates of an existing session
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<broadcast::Receiver<SessionEvent>, SessionError> {
        Ok(self
            .find(session_id)
            .await
            .ok_or(SessionError::NotFound)?
            .subscribe())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Stop every session runtime
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
