//! Slot-filling dialog core.
//!
//! Submodules:
//! - `session`: per-`dialog_id` mutable conversation state.
//! - `extract`: compiled slot patterns and keyword vocabularies.
//! - `prompts`: user-visible reply text.
//! - `engine`: the state machine consuming decoded user turns.

pub mod engine;
pub mod extract;
pub mod prompts;
pub mod session;
