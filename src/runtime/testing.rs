//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use super::{InteractionRuntime, Retirement, RuntimeInput, SessionEvent, SessionHandle};
use crate::feedback::FeedbackCollector;
use crate::model::{FeedbackRecord, Mode};
use crate::provider::{ProviderError, ProviderRegistry, TransformProvider};
use crate::state_machine::InteractionContext;
use crate::validator::ValidatedInput;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Notify};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Mock Provider
// ============================================================================

/// Provider that returns queued responses, optionally after a delay
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    delay: Option<Duration>,
    /// Record of every input dispatched
    pub calls: Mutex<Vec<ValidatedInput>>,
    /// Notified when a transform starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            delay: None,
            calls: Mutex::new(Vec::new()),
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: ProviderError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransformProvider for MockProvider {
    async fn transform(&self, input: &ValidatedInput) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(input.clone());
        self.request_started.notify_one();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::unavailable("No mock response queued")))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Recording Platform and Telemetry
// ============================================================================

/// Chat platform that records every action
#[derive(Default)]
pub struct RecordingPlatform {
    pub inserts: Mutex<Vec<String>>,
    pub copies: Mutex<Vec<String>>,
    /// When set, every action fails with this error
    pub fail_with: Mutex<Option<PlatformError>>,
}

impl RecordingPlatform {
    pub fn inserted(&self) -> Vec<String> {
        self.inserts.lock().unwrap().clone()
    }

    pub fn copied(&self) -> Vec<String> {
        self.copies.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), PlatformError> {
        match self.fail_with.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn insert_into_conversation(
        &self,
        _session_id: &str,
        text: &str,
    ) -> Result<(), PlatformError> {
        self.check()?;
        self.inserts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn copy_to_clipboard(&self, _session_id: &str, text: &str) -> Result<(), PlatformError> {
        self.check()?;
        self.copies.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Telemetry sink that keeps every record
#[derive(Default)]
pub struct RecordingTelemetry {
    pub records: Mutex<Vec<FeedbackRecord>>,
}

impl RecordingTelemetry {
    pub fn recorded(&self) -> Vec<FeedbackRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelemetrySink for RecordingTelemetry {
    async fn emit(&self, record: &FeedbackRecord) -> Result<(), TelemetryError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// ============================================================================
// Test Session
// ============================================================================

/// A running session wired to mocks
pub struct TestSession {
    pub handle: SessionHandle,
    pub events: broadcast::Receiver<SessionEvent>,
    pub provider: Arc<MockProvider>,
    pub platform: Arc<RecordingPlatform>,
    pub telemetry: Arc<RecordingTelemetry>,
    shutdown: CancellationToken,
}

impl TestSession {
    pub fn builder() -> TestSessionBuilder {
        TestSessionBuilder::default()
    }

    /// Wait for a state change to `expected` with timeout
    pub async fn wait_for_state(&mut self, expected: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.events.recv()).await {
                Ok(Ok(SessionEvent::StateChange { state })) if state.name() == expected => {
                    return true;
                }
                _ => continue,
            }
        }
        false
    }

    /// Wait for an error event of `kind` with timeout
    pub async fn wait_for_error(&mut self, kind: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.events.recv()).await {
                Ok(Ok(SessionEvent::Error { kind: k, .. })) if k == kind => return true,
                _ => continue,
            }
        }
        false
    }
}

impl Drop for TestSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

pub struct TestSessionBuilder {
    provider: Option<MockProvider>,
    modes: Vec<Mode>,
    timeout: Duration,
    retention: chrono::Duration,
    retirement: Option<Retirement>,
}

impl Default for TestSessionBuilder {
    fn default() -> Self {
        Self {
            provider: None,
            modes: Mode::ALL.to_vec(),
            timeout: Duration::from_secs(5),
            retention: chrono::Duration::hours(48),
            retirement: None,
        }
    }
}

impl TestSessionBuilder {
    pub fn provider(mut self, provider: MockProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Register the mock for these modes only
    pub fn modes(mut self, modes: &[Mode]) -> Self {
        self.modes = modes.to_vec();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retirement(mut self, retirement: Retirement) -> Self {
        self.retirement = Some(retirement);
        self
    }

    pub fn build(self) -> TestSession {
        let provider = Arc::new(self.provider.unwrap_or_default());
        let platform = Arc::new(RecordingPlatform::default());
        let telemetry = Arc::new(RecordingTelemetry::default());

        let mut registry = ProviderRegistry::new(self.timeout);
        for mode in self.modes {
            registry.register(mode, provider.clone());
        }

        let context =
            InteractionContext::new("test-session", self.retention, FeedbackCollector::default());
        let (input_tx, input_rx) = mpsc::channel::<RuntimeInput>(32);
        let (broadcast_tx, events) = broadcast::channel(128);
        let shutdown = CancellationToken::new();

        let mut runtime = InteractionRuntime::new(
            context,
            Arc::new(registry),
            platform.clone(),
            telemetry.clone(),
            input_rx,
            input_tx.clone(),
            broadcast_tx.clone(),
            shutdown.clone(),
        );
        if let Some(retirement) = self.retirement {
            runtime = runtime.with_retirement(retirement);
        }
        tokio::spawn(async move { runtime.run().await });

        TestSession {
            handle: SessionHandle {
                input_tx,
                broadcast_tx,
            },
            events,
            provider,
            platform,
            telemetry,
            shutdown,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssistantConfig;
    use crate::model::{FeedbackDraft, ModeOptions};
    use crate::runtime::{SessionError, SessionManager};
    use crate::state_machine::{Event, StateView, TransitionError};
    use crate::validator::ValidationError;

    const WAIT: Duration = Duration::from_secs(2);

    fn submit_translate(text: &str) -> Event {
        Event::SubmitForm {
            mode: Mode::Translate,
            source_text: text.to_string(),
            options: ModeOptions::Translate {
                target_language: "es".to_string(),
                glossary: None,
            },
        }
    }

    async fn open_translate_form(session: &TestSession) {
        session
            .handle
            .trigger(Event::SelectMode {
                mode: Mode::Translate,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mock_provider_queue() {
        let mock = MockProvider::new();
        mock.queue_response("Hola");
        let input = crate::validator::validate(
            Mode::Refine,
            "Hello",
            ModeOptions::defaults_for(Mode::Refine),
        )
        .unwrap();

        assert_eq!(mock.transform(&input).await, Ok("Hola".to_string()));
        assert_eq!(mock.transform(&input).await.unwrap_err().kind(), "unavailable");
        assert_eq!(mock.call_count(), 2);
    }

    /// Translate "Hello" to Spanish, copy twice, rate it, and land back in Idle
    #[tokio::test]
    async fn test_translate_scenario() {
        let provider = MockProvider::new();
        provider.queue_response("Hola");
        let mut session = TestSession::builder().provider(provider).build();

        open_translate_form(&session).await;
        let view = session.handle.trigger(submit_translate("Hello")).await.unwrap();
        assert_eq!(view.name(), "dispatching");
        assert!(session.wait_for_state("result_ready", WAIT).await);

        let request_id = match session.handle.snapshot().await.unwrap() {
            StateView::ResultReady {
                request_id: Some(id),
                result: Some(result),
                ..
            } => {
                assert_eq!(result.output_text, "Hola");
                id
            }
            other => panic!("expected ResultReady, got {other:?}"),
        };

        session.handle.trigger(Event::CopyResult).await.unwrap();
        session.handle.trigger(Event::CopyResult).await.unwrap();
        assert_eq!(session.platform.copied(), vec!["Hola".to_string()]);

        session.handle.trigger(Event::OpenFeedback).await.unwrap();
        let view = session
            .handle
            .trigger(Event::SubmitFeedback {
                draft: FeedbackDraft {
                    rating: Some(4),
                    tags: vec!["Accurate".to_string()],
                    comment: Some(String::new()),
                },
            })
            .await
            .unwrap();
        assert_eq!(view, StateView::Idle);

        let records = session.telemetry.recorded();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].request_id, request_id);
        assert_eq!(records[0].rating, 4);
        let json = serde_json::to_string(&records[0]).unwrap();
        assert!(!json.contains("Hello"));
        assert!(!json.contains("Hola"));
    }

    /// Cancel while the provider is still working; its late reply is dropped
    #[tokio::test]
    async fn test_cancel_during_dispatch() {
        let provider = MockProvider::delayed(Duration::from_millis(200));
        provider.queue_response("Hola");
        let mut session = TestSession::builder().provider(provider).build();
        let request_started = session.provider.request_started.clone();

        open_translate_form(&session).await;
        session.handle.trigger(submit_translate("Hello")).await.unwrap();
        tokio::time::timeout(WAIT, request_started.notified())
            .await
            .expect("dispatch should start");

        let start = tokio::time::Instant::now();
        let view = session.handle.trigger(Event::Cancel).await.unwrap();
        assert_eq!(view, StateView::Idle);
        assert!(start.elapsed() < Duration::from_millis(200), "cancel should not wait for the provider");

        // Let the provider finish; the response must not resurrect the result
        assert!(!session.wait_for_state("result_ready", Duration::from_millis(500)).await);
        assert_eq!(session.handle.snapshot().await.unwrap(), StateView::Idle);
        assert_eq!(session.provider.call_count(), 1, "cancelled dispatch is not retried");
    }

    #[tokio::test]
    async fn test_submit_while_dispatching_is_rejected() {
        let provider = MockProvider::delayed(Duration::from_millis(200));
        provider.queue_response("Hola");
        provider.queue_response("Hola otra vez");
        let mut session = TestSession::builder().provider(provider).build();

        open_translate_form(&session).await;
        session.handle.trigger(submit_translate("Hello")).await.unwrap();
        let err = session
            .handle
            .trigger(submit_translate("Hello again"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Transition(TransitionError::Dispatch(ProviderError::AlreadyInFlight))
        ));
        assert!(session.wait_for_error("already_in_flight", WAIT).await);

        assert!(session.wait_for_state("result_ready", WAIT).await);
        assert_eq!(session.provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_insert_fires_once() {
        let provider = MockProvider::new();
        provider.queue_response("Hola");
        let mut session = TestSession::builder().provider(provider).build();

        open_translate_form(&session).await;
        session.handle.trigger(submit_translate("Hello")).await.unwrap();
        assert!(session.wait_for_state("result_ready", WAIT).await);

        for _ in 0..3 {
            session.handle.trigger(Event::InsertResult).await.unwrap();
        }
        assert_eq!(session.platform.inserted(), vec!["Hola".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_input_never_reaches_provider() {
        let session = TestSession::builder().build();
        open_translate_form(&session).await;

        let err = session.handle.trigger(submit_translate(" \n ")).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Transition(TransitionError::Validation(ValidationError::EmptyInput))
        ));
        assert_eq!(session.provider.call_count(), 0);
        assert_eq!(session.handle.snapshot().await.unwrap().name(), "form_open");
    }

    #[tokio::test]
    async fn test_provider_failure_reopens_form_with_input() {
        let provider = MockProvider::new();
        provider.queue_error(ProviderError::Timeout);
        let mut session = TestSession::builder().provider(provider).build();

        open_translate_form(&session).await;
        session.handle.trigger(submit_translate("Hello")).await.unwrap();
        assert!(session.wait_for_state("form_open", WAIT).await);

        match session.handle.snapshot().await.unwrap() {
            StateView::FormOpen {
                mode,
                draft: Some(draft),
                error: Some(error),
            } => {
                assert_eq!(mode, Mode::Translate);
                assert_eq!(draft.source_text, "Hello");
                assert_eq!(error.kind, "timeout");
            }
            other => panic!("expected FormOpen with error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unregistered_mode_fails_as_unavailable() {
        let mut session = TestSession::builder().modes(&[Mode::Refine]).build();

        open_translate_form(&session).await;
        session.handle.trigger(submit_translate("Hello")).await.unwrap();
        assert!(session.wait_for_state("form_open", WAIT).await);

        match session.handle.snapshot().await.unwrap() {
            StateView::FormOpen {
                error: Some(error), ..
            } => assert_eq!(error.kind, "unavailable"),
            other => panic!("expected FormOpen with error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_platform_failure_is_reported() {
        let provider = MockProvider::new();
        provider.queue_response("Hola");
        let mut session = TestSession::builder().provider(provider).build();
        *session.platform.fail_with.lock().unwrap() =
            Some(PlatformError::Unavailable("offline".to_string()));

        open_translate_form(&session).await;
        session.handle.trigger(submit_translate("Hello")).await.unwrap();
        assert!(session.wait_for_state("result_ready", WAIT).await);

        session.handle.trigger(Event::InsertResult).await.unwrap();
        assert!(session.wait_for_error("platform_unavailable", WAIT).await);
        assert!(session.platform.inserted().is_empty());
    }

    #[tokio::test]
    async fn test_session_manager_commands_and_shutdown() {
        let config = AssistantConfig::default();
        let manager = SessionManager::new(
            &config,
            Arc::new(ProviderRegistry::canned(config.dispatch_timeout)),
            Arc::new(RecordingPlatform::default()),
            Arc::new(RecordingTelemetry::default()),
        );

        let view = manager.command("alice", "/sma translate").await.unwrap();
        assert!(matches!(
            view,
            StateView::FormOpen {
                mode: Mode::Translate,
                ..
            }
        ));
        manager.trigger("bob", Event::Cancel).await.unwrap();
        assert_eq!(manager.snapshot("bob").await.unwrap(), StateView::Idle);
        manager.get_or_create("alice").await.unwrap();
        assert_eq!(manager.session_count().await, 2);

        let err = manager.command("alice", "hello").await.unwrap_err();
        assert_eq!(err.kind(), "not_a_command");

        manager.shutdown();
        let err = manager.trigger("alice", Event::Cancel).await.unwrap_err();
        assert!(matches!(err, SessionError::Stopped));
        assert!(wait_for_count(&manager, 0).await, "stopped runtimes leave the map");
    }

    async fn wait_for_count(manager: &SessionManager, expected: usize) -> bool {
        let deadline = tokio::time::Instant::now() + WAIT;
        while tokio::time::Instant::now() < deadline {
            if manager.session_count().await == expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    fn manager_with_idle_timeout(idle: Duration) -> SessionManager {
        let config = AssistantConfig {
            session_idle_timeout: idle,
            ..AssistantConfig::default()
        };
        SessionManager::new(
            &config,
            Arc::new(ProviderRegistry::canned(config.dispatch_timeout)),
            Arc::new(RecordingPlatform::default()),
            Arc::new(RecordingTelemetry::default()),
        )
    }

    #[tokio::test]
    async fn test_reads_do_not_create_sessions() {
        let manager = manager_with_idle_timeout(Duration::from_secs(60));
        for id in ["x1", "x2", "x3"] {
            assert!(matches!(
                manager.snapshot(id).await,
                Err(SessionError::NotFound)
            ));
            assert!(matches!(
                manager.subscribe(id).await,
                Err(SessionError::NotFound)
            ));
        }
        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_idle_unwatched_session_is_retired() {
        let manager = manager_with_idle_timeout(Duration::from_millis(50));
        manager.trigger("dave", Event::Cancel).await.unwrap();
        assert_eq!(manager.session_count().await, 1);

        assert!(wait_for_count(&manager, 0).await, "idle session should retire");
        assert!(matches!(
            manager.snapshot("dave").await,
            Err(SessionError::NotFound)
        ));

        // The next trigger starts a fresh runtime
        let view = manager.trigger("dave", Event::OpenPicker).await.unwrap();
        assert_eq!(view.name(), "picker_open");
    }

    #[tokio::test]
    async fn test_busy_or_watched_session_survives_idle_timeout() {
        let manager = manager_with_idle_timeout(Duration::from_millis(50));
        manager.trigger("erin", Event::OpenPicker).await.unwrap();
        manager.trigger("frank", Event::Cancel).await.unwrap();
        let _events = manager.subscribe("frank").await.unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(manager.session_count().await, 2);
        assert_eq!(manager.snapshot("erin").await.unwrap().name(), "picker_open");
        assert_eq!(manager.snapshot("frank").await.unwrap(), StateView::Idle);
    }

    #[tokio::test]
    async fn test_untouched_session_retires_with_its_result() {
        let provider = MockProvider::new();
        provider.queue_response("Hola");
        let mut session = TestSession::builder()
            .provider(provider)
            .retirement(Retirement {
                idle: Duration::from_secs(3600),
                untouched: Duration::from_millis(200),
            })
            .build();

        open_translate_form(&session).await;
        session.handle.trigger(submit_translate("Hello")).await.unwrap();
        assert!(session.wait_for_state("result_ready", WAIT).await);

        let deadline = tokio::time::Instant::now() + WAIT;
        while !session.handle.is_stopped() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(session.handle.is_stopped(), "subscribers do not keep it alive");
        assert!(matches!(
            session.handle.snapshot().await,
            Err(SessionError::Stopped)
        ));
    }

    #[tokio::test]
    async fn test_session_manager_end_to_end_with_canned_providers() {
        let config = AssistantConfig::default();
        let telemetry = Arc::new(RecordingTelemetry::default());
        let manager = SessionManager::new(
            &config,
            Arc::new(ProviderRegistry::canned(config.dispatch_timeout)),
            Arc::new(RecordingPlatform::default()),
            telemetry.clone(),
        );
        manager.command("carol", "/sma translate").await.unwrap();
        let mut events = manager.subscribe("carol").await.unwrap();

        manager.trigger("carol", submit_translate("Hello team")).await.unwrap();

        let deadline = tokio::time::Instant::now() + WAIT;
        let mut ready = false;
        while tokio::time::Instant::now() < deadline {
            if let Ok(Ok(SessionEvent::StateChange { state })) =
                tokio::time::timeout(Duration::from_millis(50), events.recv()).await
            {
                if let StateView::ResultReady {
                    result: Some(result),
                    ..
                } = state
                {
                    assert!(result.output_text.starts_with("¡Hola equipo!"));
                    ready = true;
                    break;
                }
            }
        }
        assert!(ready, "canned translation should arrive");

        manager.trigger("carol", Event::OpenFeedback).await.unwrap();
        manager.trigger("carol", Event::SkipFeedback).await.unwrap();
        assert_eq!(manager.snapshot("carol").await.unwrap(), StateView::Idle);
        assert!(telemetry.recorded().is_empty(), "skip emits nothing");
    }
}
