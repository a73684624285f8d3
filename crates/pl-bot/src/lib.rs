//! PAstaLink bot: library crate for the intent resolution service.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `pl-e2e-tests`) can access internal types like `Pipeline`,
//! `ConversationDispatcher`, and `build_router`.

pub mod commands;
pub mod composer;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod guard;
pub mod i18n;
pub mod language;
pub mod pipeline;
pub mod resolver;
pub mod routes;
pub mod state;
