//! Smart Message Assistant
//!
//! Turns a chat user's draft into a refined, translated, or re-toned
//! message. Each session runs a small interaction state machine; results
//! are held only in memory and for a bounded retention window.

pub mod api;
pub mod catalog;
pub mod command;
pub mod config;
pub mod feedback;
pub mod model;
pub mod provider;
pub mod runtime;
pub mod state_machine;
pub mod store;
pub mod validator;
