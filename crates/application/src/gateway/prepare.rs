//! Header assembly for outgoing requests.

use bankline_domain::ApiRequest;

use crate::ports::PreparedRequest;

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";
const IDEMPOTENCY_KEY: &str = "Idempotency-Key";

/// Builds the wire form of `request` for one attempt.
///
/// - The bearer token, when given, replaces any caller `Authorization`.
/// - JSON bodies get `Content-Type: application/json` unless the caller set
///   a content type of their own.
/// - Multipart bodies never carry a content type here; the transport sets
///   `multipart/form-data` with its boundary.
/// - The idempotency key, when present, is sent as `Idempotency-Key`.
#[must_use]
pub fn prepare(request: &ApiRequest, access_token: Option<&str>) -> PreparedRequest {
    let mut headers = request.headers.clone();

    if request.body.is_multipart() {
        headers.remove(CONTENT_TYPE);
    } else if let Some(content_type) = request.body.content_type()
        && !headers.contains(CONTENT_TYPE)
    {
        headers.set(CONTENT_TYPE, content_type);
    }

    if let Some(key) = &request.idempotency_key {
        headers.set(IDEMPOTENCY_KEY, key.as_str());
    }

    if let Some(token) = access_token {
        headers.set(AUTHORIZATION, format!("Bearer {token}"));
    }

    PreparedRequest {
        method: request.method,
        path: request.path.clone(),
        query: request.query.clone(),
        headers,
        body: request.body.clone(),
    }
}
