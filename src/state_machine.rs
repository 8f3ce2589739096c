//! Interaction state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions. The
//! runtime owns I/O; this module only decides what happens next.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::Event;
pub use state::{
    ErrorView, Interaction, InteractionContext, InteractionState, ResultView, StateView,
};
pub use transition::{transition, TransitionError, TransitionResult};
