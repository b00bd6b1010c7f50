//! Async HTTP client core for the posts API.
//!
//! # Overview
//! One request per operation, passed through an ordered interceptor chain,
//! handed to a transport, and folded into a uniform `CallResult` by the call
//! wrapper.
//!
//! # Design
//! - `ApiClient` keeps the `build_*` / `parse_*` split, so request building
//!   and response parsing stay pure and testable without a network.
//! - Interceptors are request and response functions composed by
//!   `InterceptorChain`; none of them drives the network call.
//! - `Transport` is the only I/O seam. `UreqTransport` is the default; tests
//!   swap in stubs.
//! - Only `CallWrapper` catches errors.

pub mod call;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod transport;
pub mod types;

pub use call::{CallResult, CallState, CallWrapper, FailureKind, FailureMessages, IdSupplier, RandomIdSupplier};
pub use client::{ApiClient, ApiClientBuilder};
pub use config::{TransportConfig, TransportSettings};
pub use error::{ApiError, ConfigError, NetworkErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use interceptor::{
    HeaderInjectionInterceptor, Interceptor, InterceptorChain, LogLevel, LogSink, LoggingInterceptor,
    ResponseInspectionInterceptor, tracing_sink,
};
pub use transport::{Transport, UreqTransport};
pub use types::Post;
