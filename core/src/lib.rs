//! Synchronous client for the Neon management API.
//!
//! # Overview
//! Manages projects, branches, compute endpoints, databases and roles of the
//! Neon serverless Postgres service over its REST API. Every operation is a
//! single blocking round-trip through an injectable [`Transport`].
//!
//! # Design
//! - `NeonClient` holds an immutable configuration and is cheap to clone.
//! - Each call is split into `build_request` and `parse_response` so the I/O
//!   boundary stays explicit; `execute` wires them to the transport.
//! - `UreqTransport` talks to the network; `MockTransport` answers from a
//!   fixture table for tests and runs without a token.
//! - Failures are never retried or logged away: every call returns either the
//!   decoded response or an [`Error`].
//!
//! ```no_run
//! use neon_core::{Config, NeonClient};
//!
//! # fn main() -> neon_core::Result<()> {
//! let client = NeonClient::new(Config::default().with_token("my-api-key"))?;
//! let project = client.get_project("quiet-river-711967")?;
//! println!("{}", project.project.name);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod types;

pub use client::{NeonClient, MIN_GET_BODY_LEN, NO_PAYLOAD};
pub use config::{Config, DEFAULT_BASE_URL, TOKEN_ENV_VAR};
pub use error::{ApiError, Error, Result, TransportError, TransportErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport, DEFAULT_TIMEOUT};
pub use mock::{normalize_path, Fixture, Fixtures, MockTransport, NormalizedPath};
