//! # cwdispatch-std
//!
//! The dispatch engine for cwdispatch.
//!
//! This crate provides:
//! - **Patterns**: exact and trailing-wildcard matching ([`pattern::Pattern`])
//! - **Registration**: typed handlers bound to pattern pairs ([`registry::Registry`])
//! - **Matching**: precedence-aware selection ([`matcher::select`])
//! - **Dispatching**: parse, match, decode, invoke, aggregate ([`dispatcher::Dispatcher`])
//! - **Layers**: timeout and tracing wrappers for handlers
//! - **Testing**: recording/failing handlers and envelope fixtures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use cwdispatch_core;

// Modules
pub mod config;
pub mod dispatcher;
pub mod layers;
pub mod matcher;
pub mod pattern;
pub mod registration;
pub mod registry;
pub mod testing;
