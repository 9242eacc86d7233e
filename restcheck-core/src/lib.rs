//! restcheck-core
//!
//! Core of the restcheck DSL: the immutable request-specification model,
//! the fluent context, the execution abstraction, auth injection, the
//! result context with its assertion engine, and the reporter boundary.
#![deny(unsafe_code)]

pub mod auth;
pub mod client;
pub mod context;
pub mod error;
pub mod execution;
pub mod reporter;
pub mod response;
pub mod spec;
pub mod validation;

pub use error::ApiError;
