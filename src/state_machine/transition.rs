//! Pure state transition function
//!
//! Given the same interaction, context, event and clock reading, `transition`
//! always produces the same next interaction and effects (request ids aside),
//! with no I/O. Triggers outside the legal set leave the interaction unchanged
//! and produce no effects.

use super::{Effect, Event, Interaction, InteractionContext, InteractionState};
use crate::feedback::{check_rating, FeedbackError};
use crate::model::{FormInput, TransformationRequest, TransformationResult};
use crate::provider::ProviderError;
use crate::store::Marked;
use crate::validator::{validate, ValidationError};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub next: Interaction,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(next: Interaction) -> Self {
        Self {
            next,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// User-facing errors raised by a trigger. The interaction is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Dispatch(ProviderError),
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
}

impl TransitionError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransitionError::Validation(e) => e.kind(),
            TransitionError::Dispatch(e) => e.kind(),
            TransitionError::Feedback(e) => e.kind(),
        }
    }
}

fn unchanged(interaction: &Interaction) -> TransitionResult {
    TransitionResult::new(interaction.clone())
}

fn moved(interaction: &Interaction, state: InteractionState) -> TransitionResult {
    let mut next = interaction.clone();
    next.state = state;
    TransitionResult::new(next).with_effect(Effect::NotifyState)
}

/// Back to Idle with the request and result discarded
fn reset(interaction: &Interaction) -> TransitionResult {
    let mut next = interaction.clone();
    next.state = InteractionState::Idle;
    next.request = None;
    next.results.clear();
    TransitionResult::new(next).with_effect(Effect::NotifyState)
}

fn expired(interaction: &Interaction) -> TransitionResult {
    unchanged(interaction).with_effect(Effect::NotifyResultExpired)
}

/// Pure transition function
pub fn transition(
    interaction: &Interaction,
    context: &InteractionContext,
    event: Event,
    now: DateTime<Utc>,
) -> Result<TransitionResult, TransitionError> {
    use InteractionState as S;

    match (&interaction.state, event) {
        // ============================================================
        // Picker and form
        // ============================================================
        (S::Idle, Event::OpenPicker) => Ok(moved(interaction, S::PickerOpen)),

        (S::Idle | S::PickerOpen, Event::SelectMode { mode }) => Ok(moved(
            interaction,
            S::FormOpen {
                mode,
                draft: None,
                last_error: None,
            },
        )),

        (S::FormOpen { .. }, Event::Back) => Ok(moved(interaction, S::PickerOpen)),

        // FormOpen + valid submit -> Dispatching with a fresh request
        (
            S::FormOpen {
                mode: form_mode, ..
            },
            Event::SubmitForm {
                mode,
                source_text,
                options,
            },
        ) => {
            if mode != *form_mode {
                return Err(ValidationError::ModeMismatch {
                    mode: *form_mode,
                    options: mode,
                }
                .into());
            }
            let draft = FormInput {
                source_text,
                options: options.clone(),
            };
            let input = validate(mode, &draft.source_text, options)?;
            let request = TransformationRequest::new(input, draft, now);

            let mut next = interaction.clone();
            next.state = S::Dispatching;
            next.request = Some(request.clone());
            Ok(TransitionResult::new(next)
                .with_effect(Effect::dispatch(request))
                .with_effect(Effect::NotifyState))
        }

        (S::Dispatching, Event::SubmitForm { .. }) => {
            Err(TransitionError::Dispatch(ProviderError::AlreadyInFlight))
        }

        // ============================================================
        // Provider completion
        // ============================================================
        (S::Dispatching, Event::ProviderCompleted { request_id, outcome })
            if interaction.awaits(request_id) =>
        {
            let Some(request) = interaction.request.as_ref() else {
                return Ok(unchanged(interaction));
            };

            let mut next = interaction.clone();
            match outcome {
                Ok(text) => {
                    next.results.put(TransformationResult::new(
                        request_id,
                        text,
                        now,
                        context.retention,
                    ));
                    next.state = S::ResultReady;
                }
                Err(error) => {
                    next.state = S::FormOpen {
                        mode: request.mode(),
                        draft: Some(request.form_input()),
                        last_error: Some(error),
                    };
                    next.request = None;
                }
            }
            Ok(TransitionResult::new(next).with_effect(Effect::NotifyState))
        }

        // ============================================================
        // Cancellation
        // ============================================================
        (S::PickerOpen | S::FormOpen { .. } | S::Dispatching | S::ResultReady, Event::Cancel) => {
            Ok(reset(interaction))
        }

        // ============================================================
        // Result actions
        // ============================================================
        (S::ResultReady, Event::CopyResult) => {
            let mut next = interaction.clone();
            let effect = match next.results.mark_copied(now) {
                Marked::First(result) => Effect::copy(result.request_id, result.output_text.clone()),
                Marked::Repeat => return Ok(unchanged(interaction)),
                Marked::Unavailable => return Ok(expired(interaction)),
            };
            Ok(TransitionResult::new(next)
                .with_effect(effect)
                .with_effect(Effect::NotifyState))
        }

        (S::ResultReady, Event::InsertResult) => {
            let mut next = interaction.clone();
            let effect = match next.results.mark_inserted(now) {
                Marked::First(result) => {
                    Effect::insert(result.request_id, result.output_text.clone())
                }
                Marked::Repeat => return Ok(unchanged(interaction)),
                Marked::Unavailable => return Ok(expired(interaction)),
            };
            Ok(TransitionResult::new(next)
                .with_effect(effect)
                .with_effect(Effect::NotifyState))
        }

        // Regenerate reopens the form; the live result stays until superseded
        (S::ResultReady, Event::Regenerate) => match &interaction.request {
            Some(_) if interaction.results.get(now).is_none() => Ok(expired(interaction)),
            Some(request) => Ok(moved(
                interaction,
                S::FormOpen {
                    mode: request.mode(),
                    draft: Some(request.form_input()),
                    last_error: None,
                },
            )),
            None => Ok(unchanged(interaction)),
        },

        // ============================================================
        // Feedback
        // ============================================================
        (S::ResultReady, Event::OpenFeedback) => {
            if interaction.results.get(now).is_some() {
                Ok(moved(interaction, S::FeedbackOpen))
            } else {
                Ok(expired(interaction))
            }
        }

        (S::FeedbackOpen, Event::DismissFeedback) => Ok(moved(interaction, S::ResultReady)),

        (S::FeedbackOpen, Event::SubmitFeedback { draft }) => {
            check_rating(draft.rating)?;
            let request_id = interaction
                .active_request_id()
                .ok_or(FeedbackError::NoActiveResult)?;
            let record = context
                .feedback
                .submit(&interaction.results, request_id, draft, now)?;
            Ok(TransitionResult::new(Interaction::new())
                .with_effect(Effect::emit_telemetry(record))
                .with_effect(Effect::NotifyState))
        }

        // A live result with the dialog closed: nothing to submit from
        (S::ResultReady, Event::SubmitFeedback { .. })
            if interaction.results.get(now).is_some() =>
        {
            Ok(unchanged(interaction))
        }

        // Feedback outside the dialog has no result to bind to
        (_, Event::SubmitFeedback { draft }) => {
            check_rating(draft.rating)?;
            Err(FeedbackError::NoActiveResult.into())
        }

        (S::FeedbackOpen, Event::SkipFeedback) => Ok(reset(interaction)),

        // ============================================================
        // Everything else is a no-op
        // ============================================================
        _ => Ok(unchanged(interaction)),
    }
}
