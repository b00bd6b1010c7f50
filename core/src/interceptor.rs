//! Request and response interceptors.
//!
//! # Design
//! An interceptor is a pair of plain functions: `on_request` rewrites the
//! outgoing request, `on_response` inspects the incoming one. The chain folds
//! every `on_request` in order, hands the final request to the transport
//! exactly once, then folds every `on_response` in reverse order. No stage
//! calls the next one itself, so a stage can neither skip the network call
//! nor issue it twice.
//!
//! Errors stop the fold where they occur and reach the caller untouched.
//! `on_error` lets stages observe the failure; it gets a shared reference and
//! cannot replace or swallow it.

use std::fmt;
use std::sync::Arc;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// One stage of the interceptor chain.
pub trait Interceptor: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    fn on_request(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        Ok(request)
    }

    fn on_response(&self, response: HttpResponse) -> Result<HttpResponse, ApiError> {
        Ok(response)
    }

    fn on_error(&self, _request: &HttpRequest, _error: &ApiError) {}
}

/// Destination for the text lines interceptors emit.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Sink that forwards every line to `tracing` at debug level.
pub fn tracing_sink() -> LogSink {
    Arc::new(|line: &str| tracing::debug!(target: "post_client::http", "{line}"))
}

/// Ordered, immutable sequence of interceptors.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    stages: Vec<Arc<dyn Interceptor>>,
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.name()))
            .finish()
    }
}

impl InterceptorChain {
    pub fn builder() -> InterceptorChainBuilder {
        InterceptorChainBuilder::default()
    }

    /// Logging (innermost), header injection and response inspection, wired
    /// as the demo client does it.
    pub fn standard(sink: LogSink) -> Self {
        Self::builder()
            .with(ResponseInspectionInterceptor::new(sink.clone()))
            .with(HeaderInjectionInterceptor::default())
            .with(LoggingInterceptor::new(sink))
            .build()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Request leg: first stage to last.
    pub fn apply_request(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        self.stages
            .iter()
            .try_fold(request, |req, stage| stage.on_request(req))
    }

    /// Response leg: last stage to first.
    pub fn apply_response(&self, response: HttpResponse) -> Result<HttpResponse, ApiError> {
        self.stages
            .iter()
            .rev()
            .try_fold(response, |resp, stage| stage.on_response(resp))
    }

    /// Let every stage observe a failure, last stage first.
    pub fn notify_error(&self, request: &HttpRequest, error: &ApiError) {
        for stage in self.stages.iter().rev() {
            stage.on_error(request, error);
        }
    }
}

#[derive(Default)]
pub struct InterceptorChainBuilder {
    stages: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChainBuilder {
    /// Append a stage. Stages added later sit closer to the network.
    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.stages.push(Arc::new(interceptor));
        self
    }

    pub fn build(self) -> InterceptorChain {
        InterceptorChain {
            stages: self.stages,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// How much of each exchange the logging interceptor writes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    None,
    /// Request line and response status.
    Basic,
    /// `Basic` plus headers.
    Headers,
    /// `Headers` plus bodies.
    Body,
}

/// Writes each exchange to a sink without altering it.
pub struct LoggingInterceptor {
    sink: LogSink,
    level: LogLevel,
}

impl LoggingInterceptor {
    pub fn new(sink: LogSink) -> Self {
        Self {
            sink,
            level: LogLevel::Body,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    fn emit(&self, line: &str) {
        (self.sink)(line);
    }

    fn emit_headers(&self, headers: &[(String, String)]) {
        for (name, value) in headers {
            self.emit(&format!("{name}: {value}"));
        }
    }
}

impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn on_request(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        if self.level == LogLevel::None {
            return Ok(request);
        }
        self.emit(&format!("--> {} {}", request.method, request.path));
        if self.level >= LogLevel::Headers {
            self.emit_headers(&request.headers);
        }
        if self.level >= LogLevel::Body {
            if let Some(body) = &request.body {
                self.emit("");
                self.emit(body);
            }
        }
        self.emit(&format!("--> END {}", request.method));
        Ok(request)
    }

    fn on_response(&self, response: HttpResponse) -> Result<HttpResponse, ApiError> {
        if self.level == LogLevel::None {
            return Ok(response);
        }
        self.emit(&format!("<-- {}", response.status));
        if self.level >= LogLevel::Headers {
            self.emit_headers(&response.headers);
        }
        if self.level >= LogLevel::Body && !response.body.is_empty() {
            self.emit("");
            self.emit(&response.body);
        }
        self.emit(&format!("<-- END HTTP ({}-byte body)", response.body.len()));
        Ok(response)
    }

    fn on_error(&self, _request: &HttpRequest, error: &ApiError) {
        if self.level != LogLevel::None {
            self.emit(&format!("<-- HTTP FAILED: {error}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Header injection
// ---------------------------------------------------------------------------

/// Appends a fixed set of identifying headers to every request.
#[derive(Debug, Clone)]
pub struct HeaderInjectionInterceptor {
    headers: Vec<(String, String)>,
}

impl Default for HeaderInjectionInterceptor {
    /// Client tag plus two version markers.
    fn default() -> Self {
        let version = env!("CARGO_PKG_VERSION");
        Self::new(vec![
            ("User-Agent".to_string(), format!("post-client/{version}")),
            ("X-Client-Version".to_string(), version.to_string()),
            ("X-Api-Version".to_string(), "1".to_string()),
        ])
    }
}

impl HeaderInjectionInterceptor {
    pub fn new(headers: Vec<(String, String)>) -> Self {
        Self { headers }
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

impl Interceptor for HeaderInjectionInterceptor {
    fn name(&self) -> &'static str {
        "header-injection"
    }

    fn on_request(&self, mut request: HttpRequest) -> Result<HttpRequest, ApiError> {
        request.headers.extend(self.headers.iter().cloned());
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// Response inspection
// ---------------------------------------------------------------------------

/// Reports status, headers, body length and content type of each response.
///
/// The body is already buffered by the transport, so reading its length here
/// leaves it intact for the decoder.
pub struct ResponseInspectionInterceptor {
    sink: LogSink,
}

impl ResponseInspectionInterceptor {
    pub fn new(sink: LogSink) -> Self {
        Self { sink }
    }
}

impl Interceptor for ResponseInspectionInterceptor {
    fn name(&self) -> &'static str {
        "response-inspection"
    }

    fn on_request(&self, request: HttpRequest) -> Result<HttpRequest, ApiError> {
        (self.sink)(&format!("making API call: {} {}", request.method, request.path));
        Ok(request)
    }

    fn on_response(&self, response: HttpResponse) -> Result<HttpResponse, ApiError> {
        let headers = response
            .headers
            .iter()
            .map(|(n, v)| format!("{n}: {v}"))
            .collect::<Vec<_>>()
            .join(", ");
        (self.sink)(&format!("response code: {}", response.status));
        (self.sink)(&format!("response headers: {headers}"));
        (self.sink)(&format!(
            "response body: length={}, type={}",
            response.content_length(),
            response.content_type().unwrap_or("unknown")
        ));
        Ok(response)
    }

    fn on_error(&self, _request: &HttpRequest, error: &ApiError) {
        (self.sink)(&format!("API call failed: {error}"));
    }
}
