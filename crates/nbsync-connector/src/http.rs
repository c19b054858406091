//! JSON-over-HTTP transport
//!
//! Thin wrapper around `reqwest` that applies the configured timeouts and
//! credentials, logs each request, and maps HTTP failures onto
//! [`ConnectorError`]. Requests are never retried here.

use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

use crate::config::HttpConfig;
use crate::error::{ConnectorError, ConnectorResult};

/// HTTP method for API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// HTTP session for one inventory system.
pub struct HttpTransport {
    config: HttpConfig,
    client: Client,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config.redacted())
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport, validating the configuration.
    pub fn new(config: HttpConfig) -> ConnectorResult<Self> {
        config.validate()?;
        let client = Self::build_client(&config)?;
        Ok(Self { config, client })
    }

    fn build_client(config: &HttpConfig) -> ConnectorResult<Client> {
        Client::builder()
            .timeout(Duration::from_secs(config.connection.request_timeout_secs))
            .connect_timeout(Duration::from_secs(
                config.connection.connection_timeout_secs,
            ))
            .build()
            .map_err(|e| ConnectorError::InvalidConfiguration {
                message: format!("Failed to build HTTP client: {e}"),
            })
    }

    /// Build the full URL for an endpoint path.
    pub fn url(&self, path: &str) -> String {
        self.config.url(path)
    }

    /// GET a URL and parse the JSON body.
    pub async fn get_json(&self, url: &str) -> ConnectorResult<Value> {
        self.send_json(HttpMethod::Get, url, None).await
    }

    /// Send a request and parse the JSON body.
    ///
    /// An empty body parses as `Value::Null`.
    pub async fn send_json(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> ConnectorResult<Value> {
        let mut request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Patch => self.client.patch(url),
        }
        .header(header::ACCEPT, "application/json")
        .header(header::CONTENT_TYPE, "application/json");

        if let Some(auth_value) = self.config.auth.header_value() {
            request = request.header(header::AUTHORIZATION, auth_value);
        }
        if let Some(json_body) = body {
            trace!(body = %json_body, "Request body");
            request = request.json(json_body);
        }

        debug!(url = %url, method = %method.as_str(), "Sending request");

        let response = request.send().await.map_err(|e| self.map_send_error(url, e))?;
        let status = response.status();

        debug!(url = %url, status = %status, "Received response");

        let text = response
            .text()
            .await
            .map_err(|e| self.map_send_error(url, e))?;

        if !status.is_success() {
            return Err(Self::handle_response_error(url, method, status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| ConnectorError::unexpected(url, format!("invalid JSON body: {e}")))
    }

    fn map_send_error(&self, url: &str, e: reqwest::Error) -> ConnectorError {
        if e.is_timeout() {
            ConnectorError::ConnectionTimeout {
                timeout_secs: self.config.connection.request_timeout_secs,
            }
        } else if e.is_connect() {
            ConnectorError::connection_failed_with_source(format!("cannot connect to {url}"), e)
        } else {
            ConnectorError::network_with_source(format!("request to {url} failed"), e)
        }
    }

    /// Map a non-success status onto the error taxonomy.
    fn handle_response_error(
        url: &str,
        method: HttpMethod,
        status: StatusCode,
        body: &str,
    ) -> ConnectorError {
        let error_message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .or_else(|| json.get("detail"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string());

        match status {
            StatusCode::UNAUTHORIZED => ConnectorError::AuthenticationFailed,
            StatusCode::FORBIDDEN => ConnectorError::AuthorizationFailed {
                operation: format!("{} {url}", method.as_str()),
            },
            StatusCode::NOT_FOUND => ConnectorError::ObjectNotFound {
                identifier: url.to_string(),
            },
            StatusCode::TOO_MANY_REQUESTS => ConnectorError::TargetUnavailable {
                message: format!("Rate limited: {error_message}"),
            },
            s if s.is_server_error() => ConnectorError::TargetUnavailable {
                message: format!("HTTP {s}: {error_message}"),
            },
            _ => ConnectorError::ApiError {
                endpoint: url.to_string(),
                message: format!("HTTP {status}: {error_message}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(server: &MockServer) -> HttpTransport {
        HttpTransport::new(HttpConfig::new(server.uri()).with_auth(AuthConfig::bearer("t0k3n")))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_json_sends_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/devices"))
            .and(header_eq("Authorization", "Bearer t0k3n"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0})))
            .mount(&server)
            .await;

        let transport = transport(&server);
        let body = transport.get_json(&transport.url("/devices")).await.unwrap();
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_send_json_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/devices/4"))
            .and(body_json(json!({"field": "disabled", "data": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport(&server);
        let body = transport
            .send_json(
                HttpMethod::Patch,
                &transport.url("/devices/4"),
                Some(&json!({"field": "disabled", "data": 1})),
            )
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/devices/4/rename/sw1.example.com"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let transport = transport(&server);
        let body = transport
            .send_json(
                HttpMethod::Patch,
                &transport.url("/devices/4/rename/sw1.example.com"),
                None,
            )
            .await
            .unwrap();
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/unauthorized"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bad"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "hostname invalid"})),
            )
            .mount(&server)
            .await;

        let transport = transport(&server);

        let err = transport
            .get_json(&transport.url("/unauthorized"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::AuthenticationFailed));

        let err = transport.get_json(&transport.url("/down")).await.unwrap_err();
        assert!(err.is_transient());

        let err = transport.get_json(&transport.url("/bad")).await.unwrap_err();
        assert!(matches!(err, ConnectorError::ApiError { .. }));
        assert!(err.to_string().contains("hostname invalid"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_unexpected_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/devices"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let transport = transport(&server);
        let err = transport
            .get_json(&transport.url("/devices"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "UNEXPECTED_RESPONSE");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        // Port 9 (discard) is not expected to be listening in test environments.
        let transport = HttpTransport::new(HttpConfig::new("http://127.0.0.1:9")).unwrap();
        let err = transport
            .get_json(&transport.url("/devices"))
            .await
            .unwrap_err();
        assert!(err.is_transient(), "got {err:?}");
    }
}
