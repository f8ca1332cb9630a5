//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. Paths are resolved
//! against the configured API base URL and every status code comes back as
//! a response; only failures to get one are errors.

use std::time::Duration;

use async_trait::async_trait;
use bankline_application::ports::{HttpTransport, PreparedRequest, TransportError};
use bankline_domain::{ApiResponse, Headers, HttpMethod, RequestBody};
use reqwest::{Client, Method};
use tracing::debug;
use url::Url;

use crate::http::build_form;
use crate::settings::GatewayConfig;

/// HTTP transport over `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport for `base_url`.
    ///
    /// The timeout applies to every call, refresh calls included.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(base_url: Url, timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Creates a transport from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be
    /// created.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, TransportError> {
        let base_url = config
            .base_url()
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        Self::new(base_url, config.timeout(), &config.api.user_agent)
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Joins `path` and `query` onto the base URL, keeping any base path
    /// prefix such as `/v1`.
    fn resolve(&self, path: &str, query: &[(String, String)]) -> Result<Url, TransportError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }

        let mut url = base
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {path}")))?;

        if !query.is_empty() {
            let encoded = serde_urlencoded::to_string(query)
                .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
            url.set_query(Some(&encoded));
        }

        Ok(url)
    }

    /// Builds the wire request without sending it.
    fn build(&self, request: &PreparedRequest) -> Result<reqwest::Request, TransportError> {
        let url = self.resolve(&request.path, &request.query)?;
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);

        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }

        builder = match &request.body {
            RequestBody::None => builder,
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| TransportError::InvalidBody(format!("invalid JSON: {e}")))?;
                builder.body(bytes)
            }
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        builder
            .build()
            .map_err(|e| TransportError::InvalidBody(e.to_string()))
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(&self, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            return TransportError::ConnectionFailed(error.to_string());
        }

        if error.is_builder() {
            return TransportError::InvalidUrl(error.to_string());
        }

        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<ApiResponse, TransportError> {
        let wire = self.build(&request)?;
        debug!(method = %wire.method(), url = %wire.url(), "sending request");

        let response = self
            .client
            .execute(wire)
            .await
            .map_err(|e| self.map_error(&e))?;

        let status = response.status().as_u16();

        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            headers.set(name.as_str(), value.to_str().unwrap_or("<binary>"));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?
            .to_vec();

        Ok(ApiResponse::new(status, headers, body))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bankline_domain::FormPart;
    use pretty_assertions::assert_eq;
    use reqwest::header::CONTENT_TYPE;
    use serde_json::json;

    fn transport(base: &str) -> ReqwestTransport {
        ReqwestTransport::new(
            Url::parse(base).unwrap(),
            Duration::from_secs(5),
            "bankline-test",
        )
        .unwrap()
    }

    fn prepared(body: RequestBody, headers: Headers) -> PreparedRequest {
        PreparedRequest {
            method: HttpMethod::Post,
            path: "/documents".to_string(),
            query: Vec::new(),
            headers,
            body,
        }
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Patch),
            Method::PATCH
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_resolve_keeps_base_path_and_encodes_query() {
        let transport = transport("https://api.bank.test/v1");

        let url = transport
            .resolve(
                "/accounts/42/transactions",
                &[
                    ("from".to_string(), "2030-01-01".to_string()),
                    ("q".to_string(), "coffee & cake".to_string()),
                ],
            )
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.bank.test/v1/accounts/42/transactions?from=2030-01-01&q=coffee+%26+cake"
        );
    }

    #[test]
    fn test_json_body_is_sent_as_is() {
        let transport = transport("https://api.bank.test");
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json");
        headers.set("Authorization", "Bearer abc");

        let wire = transport
            .build(&prepared(RequestBody::Json(json!({"amount": 10})), headers))
            .unwrap();

        assert_eq!(wire.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(wire.headers()["authorization"], "Bearer abc");
        assert_eq!(
            wire.body().and_then(reqwest::Body::as_bytes),
            Some(br#"{"amount":10}"#.as_slice())
        );
    }

    #[test]
    fn test_multipart_body_gets_boundary_content_type() {
        let transport = transport("https://api.bank.test");
        let body = RequestBody::Multipart(vec![
            FormPart::text("description", "March statement"),
            FormPart::file("document", "march.pdf", b"%PDF-1.7".to_vec()),
        ]);

        let wire = transport.build(&prepared(body, Headers::new())).unwrap();

        let content_types: Vec<_> = wire
            .headers()
            .get_all(CONTENT_TYPE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(content_types.len(), 1);
        assert!(content_types[0].starts_with("multipart/form-data; boundary="));
        assert!(!content_types[0].contains("application/json"));
    }
}
