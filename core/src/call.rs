//! Call wrapper: runs exactly one API operation and folds its outcome into a
//! `CallResult`.
//!
//! # Design
//! This is the only place errors are caught. Whatever the client returns is
//! turned into `Success` or `Failure` here, with the message taken from the
//! error or, when it has none, from a `FailureMessages` table. Each call walks
//! `Idle -> InFlight -> Succeeded | Failed` once; there is no way back to
//! `InFlight`.

use std::future::Future;
use std::ops::RangeInclusive;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::Post;

/// Ids the random-post call draws from.
pub const RANDOM_ID_RANGE: RangeInclusive<i64> = 1..=100;

pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Coarse cause of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Protocol,
    Decode,
    Interceptor,
    Cancelled,
}

impl From<&ApiError> for FailureKind {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Network { .. } => FailureKind::Network,
            ApiError::NotFound | ApiError::HttpError { .. } => FailureKind::Protocol,
            ApiError::DeserializationError(_) => FailureKind::Decode,
            ApiError::Interceptor { .. } => FailureKind::Interceptor,
        }
    }
}

/// Outcome of one wrapped call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResult<T> {
    Success(T),
    Failure { message: String, kind: FailureKind },
}

impl<T> CallResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            CallResult::Success(v) => Some(v),
            CallResult::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            CallResult::Success(_) => None,
            CallResult::Failure { message, .. } => Some(message),
        }
    }

    pub fn state(&self) -> CallState {
        match self {
            CallResult::Success(_) => CallState::Succeeded,
            CallResult::Failure { .. } => CallState::Failed,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallResult<U> {
        match self {
            CallResult::Success(v) => CallResult::Success(f(v)),
            CallResult::Failure { message, kind } => CallResult::Failure { message, kind },
        }
    }

    /// Collapse into one value, choosing a branch by outcome.
    pub fn fold<R>(self, on_success: impl FnOnce(T) -> R, on_failure: impl FnOnce(&str) -> R) -> R {
        match self {
            CallResult::Success(v) => on_success(v),
            CallResult::Failure { message, .. } => on_failure(&message),
        }
    }
}

/// Per-call lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Fallback messages for errors that carry none, by failure kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureMessages {
    pub network: String,
    pub protocol: String,
    pub decode: String,
    pub interceptor: String,
    pub cancelled: String,
}

impl Default for FailureMessages {
    fn default() -> Self {
        Self {
            network: UNKNOWN_ERROR_MESSAGE.to_string(),
            protocol: UNKNOWN_ERROR_MESSAGE.to_string(),
            decode: UNKNOWN_ERROR_MESSAGE.to_string(),
            interceptor: UNKNOWN_ERROR_MESSAGE.to_string(),
            cancelled: "Call cancelled".to_string(),
        }
    }
}

impl FailureMessages {
    pub fn fallback(&self, kind: FailureKind) -> &str {
        match kind {
            FailureKind::Network => &self.network,
            FailureKind::Protocol => &self.protocol,
            FailureKind::Decode => &self.decode,
            FailureKind::Interceptor => &self.interceptor,
            FailureKind::Cancelled => &self.cancelled,
        }
    }
}

/// Source of post ids for the random-post call.
pub trait IdSupplier: Send + Sync {
    fn next_id(&self) -> i64;
}

/// Uniform draw from a closed range, fresh on every call.
#[derive(Debug, Clone)]
pub struct RandomIdSupplier {
    range: RangeInclusive<i64>,
}

impl Default for RandomIdSupplier {
    fn default() -> Self {
        Self {
            range: RANDOM_ID_RANGE,
        }
    }
}

impl RandomIdSupplier {
    pub fn new(range: RangeInclusive<i64>) -> Self {
        Self { range }
    }
}

impl IdSupplier for RandomIdSupplier {
    fn next_id(&self) -> i64 {
        rand::thread_rng().gen_range(self.range.clone())
    }
}

impl<F> IdSupplier for F
where
    F: Fn() -> i64 + Send + Sync,
{
    fn next_id(&self) -> i64 {
        self()
    }
}

pub struct CallWrapper {
    client: ApiClient,
    ids: Box<dyn IdSupplier>,
    messages: FailureMessages,
}

impl CallWrapper {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            ids: Box::new(RandomIdSupplier::default()),
            messages: FailureMessages::default(),
        }
    }

    pub fn with_id_supplier(mut self, ids: impl IdSupplier + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_messages(mut self, messages: FailureMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fetch the post with an id drawn from the supplier.
    pub async fn fetch_random_post(&self) -> CallResult<Post> {
        let id = self.ids.next_id();
        self.fetch_post(id).await
    }

    /// Like [`CallWrapper::fetch_random_post`], but resolves to a `Cancelled`
    /// failure as soon as `cancel` fires. The blocking socket exchange itself
    /// keeps running until its own timeout.
    pub async fn fetch_random_post_until(&self, cancel: &CancellationToken) -> CallResult<Post> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("call cancelled");
                CallResult::Failure {
                    message: self.messages.fallback(FailureKind::Cancelled).to_string(),
                    kind: FailureKind::Cancelled,
                }
            }
            result = self.fetch_random_post() => result,
        }
    }

    pub async fn fetch_post(&self, id: i64) -> CallResult<Post> {
        self.run(self.client.fetch_by_id(id)).await
    }

    pub async fn fetch_all_posts(&self) -> CallResult<Vec<Post>> {
        self.run(self.client.fetch_all()).await
    }

    /// Await one operation and classify its outcome.
    pub async fn run<T, F>(&self, operation: F) -> CallResult<T>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        debug!(from = ?CallState::Idle, to = ?CallState::InFlight, "call started");
        let result = match operation.await {
            Ok(value) => CallResult::Success(value),
            Err(err) => self.failure(&err),
        };
        debug!(state = ?result.state(), "call finished");
        result
    }

    fn failure<T>(&self, err: &ApiError) -> CallResult<T> {
        let kind = FailureKind::from(err);
        let message = err
            .message()
            .unwrap_or_else(|| self.messages.fallback(kind).to_string());
        warn!(?kind, %message, "call failed");
        CallResult::Failure { message, kind }
    }
}
