//! # restcheck — fluent HTTP request testing
//!
//! restcheck is a fluent DSL for composing, executing, and asserting HTTP
//! requests in test code. Describe what a request should look like, chain
//! the response assertions in the same expression, and let the transport
//! worry about the wire.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use restcheck::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder()
//!         .base_url("http://localhost:8080")
//!         .default_header("Accept", "application/json")
//!         .build();
//!
//!     let response = client.for_endpoint("/users/{id}")?
//!         .with_path_param("id", 1)
//!         .get()
//!         .await?;
//!
//!     response.should_return(
//!         Expectations::<User>::new()
//!             .status(200)
//!             .body("user 1 is Ann", |u| u.id == 1 && u.name == "Ann"),
//!     )?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`client::ApiClient`] — root of the DSL, wired from defaults, a
//!   transport, an optional token provider, and reporters.
//! - [`context::RequestContext`] — chainable builder; every fluent call
//!   returns a fresh context, so branching is free and race-proof.
//! - [`execution::Transport`] — the single seam transports implement.
//! - [`auth::TokenProvider`] — bearer-credential injection with the
//!   reference per-identity caching policy in
//!   [`auth::PasswordTokenProvider`].
//! - [`response::ResultContext`] — assertion and deserialization surface
//!   over one executed response.
#![deny(unsafe_code)]

pub use restcheck_core::{
    ApiError, auth, client, context, error, execution, reporter, response, spec, validation,
};

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use restcheck_core::ApiError;
    pub use restcheck_core::auth::{PasswordTokenProvider, StaticTokenProvider, TokenProvider};
    pub use restcheck_core::client::{ApiClient, ClientDefaults};
    pub use restcheck_core::context::RequestContext;
    pub use restcheck_core::execution::{ReqwestTransport, Transport, TransportResponse};
    pub use restcheck_core::reporter::{Reporter, TracingReporter};
    pub use restcheck_core::response::{Expectations, ResultContext};
    pub use restcheck_core::spec::{HttpMethod, RequestSpec};
}
