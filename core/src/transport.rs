//! The network exchange itself.
//!
//! `Transport` is the seam between the client and the wire: it takes a
//! finished `HttpRequest` by value and returns a fully buffered
//! `HttpResponse`. Non-2xx statuses are data here, not errors; the client
//! decides what they mean.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::config::TransportConfig;
use crate::error::{ApiError, NetworkErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking ureq agent driven from a `spawn_blocking` task, so only the
/// calling task waits on the socket.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(deadline(config.connect_timeout()))
            .timeout_send_request(deadline(config.write_timeout()))
            .timeout_send_body(deadline(config.write_timeout()))
            .timeout_recv_response(deadline(config.read_timeout()))
            .timeout_recv_body(deadline(config.read_timeout()))
            .build()
            .new_agent();
        Self { agent }
    }
}

/// A zero timeout means "no timeout", as in OkHttp; ureq would treat it as an
/// already expired deadline.
fn deadline(timeout: Duration) -> Option<Duration> {
    (!timeout.is_zero()).then_some(timeout)
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| ApiError::network(NetworkErrorKind::Other, e.to_string()))?
    }
}

fn execute_blocking(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, ApiError> {
    trace!(method = %request.method, url = %request.path, "executing request");

    let HttpRequest {
        method,
        path,
        headers,
        body,
    } = request;

    let result = match method {
        HttpMethod::Get => {
            let builder = with_headers(agent.get(&path), &headers);
            match body {
                Some(body) => builder.force_send_body().send(body.as_bytes()),
                None => builder.call(),
            }
        }
    };
    let mut response = result.map_err(classify)?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = response.body_mut().read_to_string().map_err(classify)?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn classify(err: ureq::Error) -> ApiError {
    let kind = match &err {
        ureq::Error::Timeout(_) => NetworkErrorKind::Timeout,
        ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => NetworkErrorKind::Connect,
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => NetworkErrorKind::Timeout,
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::ConnectionRefused => {
            NetworkErrorKind::Connect
        }
        ureq::Error::Io(_) => NetworkErrorKind::Io,
        _ => NetworkErrorKind::Other,
    };
    ApiError::network(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_disables_the_deadline() {
        assert_eq!(deadline(Duration::ZERO), None);
        assert_eq!(deadline(Duration::from_millis(250)), Some(Duration::from_millis(250)));
    }

    #[test]
    fn io_timeout_maps_to_timeout_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        let err = classify(ureq::Error::Io(io));
        assert!(err.is_timeout());
        assert!(err.message().is_some());
    }

    #[test]
    fn unknown_host_maps_to_connect_kind() {
        let err = classify(ureq::Error::HostNotFound);
        assert!(matches!(
            err,
            ApiError::Network {
                kind: NetworkErrorKind::Connect,
                ..
            }
        ));
    }

    #[test]
    fn connection_failure_maps_to_connect_kind() {
        let err = classify(ureq::Error::ConnectionFailed);
        assert!(matches!(
            err,
            ApiError::Network {
                kind: NetworkErrorKind::Connect,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn refused_connection_surfaces_as_network_error() {
        // Bind then drop to get a port with nothing listening.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let config = TransportConfig::builder()
            .connect_timeout(Duration::from_secs(2))
            .build();
        let transport = UreqTransport::new(&config);

        let err = transport
            .execute(HttpRequest::get(format!("http://{addr}/posts")))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Network { .. }));
    }

    async fn serve_posts() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(mock_server::run(listener));
        format!("http://{addr}")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_with_body_is_sent() {
        let base = serve_posts().await;
        let transport = UreqTransport::new(&TransportConfig::default());
        let mut request = HttpRequest::get(format!("{base}/posts/1"));
        request.body = Some("{}".to_string());

        let response = transport.execute(request).await.unwrap();

        assert_eq!(response.status, 200);
        assert!(response.body.contains("\"id\":1"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn zero_timeouts_do_not_expire_calls() {
        let base = serve_posts().await;
        let config = TransportConfig::builder()
            .connect_timeout(Duration::ZERO)
            .read_timeout(Duration::ZERO)
            .write_timeout(Duration::ZERO)
            .build();
        let transport = UreqTransport::new(&config);

        let response = transport
            .execute(HttpRequest::get(format!("{base}/posts/1")))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type(), Some("application/json"));
    }
}
