//! Typed client for the posts API.
//!
//! # Design
//! Every operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`; both
//! are pure and usable without a network. The async `fetch_*` methods glue
//! them together: build, request leg of the chain, one transport round trip,
//! response leg, parse. The client holds no mutable state, so one instance can
//! serve any number of concurrent calls.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::TransportConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::interceptor::InterceptorChain;
use crate::transport::{Transport, UreqTransport};
use crate::types::Post;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    chain: Arc<InterceptorChain>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn builder(config: TransportConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            chain: InterceptorChain::default(),
            transport: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn chain(&self) -> &InterceptorChain {
        &self.chain
    }

    pub fn build_get_post(&self, id: i64) -> HttpRequest {
        HttpRequest::get(format!("{}/posts/{id}", self.base_url))
    }

    pub fn build_list_posts(&self) -> HttpRequest {
        HttpRequest::get(format!("{}/posts", self.base_url))
    }

    pub fn parse_get_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        decode(response)
    }

    pub fn parse_list_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        decode(response)
    }

    /// `GET {base}/posts/{id}`. The id is not range-checked; an unknown id
    /// comes back as `ApiError::NotFound`.
    pub async fn fetch_by_id(&self, id: i64) -> Result<Post, ApiError> {
        let response = self.exchange(self.build_get_post(id)).await?;
        self.parse_get_post(response)
    }

    /// `GET {base}/posts`, in server order.
    pub async fn fetch_all(&self) -> Result<Vec<Post>, ApiError> {
        let response = self.exchange(self.build_list_posts()).await?;
        self.parse_list_posts(response)
    }

    /// Run one request through the chain and the transport.
    pub async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let request = match self.chain.apply_request(request.clone()) {
            Ok(request) => request,
            Err(e) => {
                self.chain.notify_error(&request, &e);
                return Err(e);
            }
        };
        // Kept for error observation only; the transport owns the original.
        let sent = request.clone();
        debug!(method = %sent.method, url = %sent.path, "sending request");

        let result = match self.transport.execute(request).await {
            Ok(response) => self.chain.apply_response(response),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            self.chain.notify_error(&sent, e);
        }
        result
    }
}

pub struct ApiClientBuilder {
    config: TransportConfig,
    chain: InterceptorChain,
    transport: Option<Arc<dyn Transport>>,
}

impl ApiClientBuilder {
    pub fn chain(mut self, chain: InterceptorChain) -> Self {
        self.chain = chain;
        self
    }

    /// Replace the default ureq transport, e.g. with a stub in tests.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> ApiClient {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(UreqTransport::new(&self.config)));
        ApiClient {
            base_url: self.config.base_url().trim_end_matches('/').to_string(),
            chain: Arc::new(self.chain),
            transport,
        }
    }
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
