//! Per-call retry marker.

use bankline_domain::ApiRequest;

/// One logical call and whether it has already been replayed after a
/// refresh.
///
/// Built once per call and threaded through the retry path. A request that
/// still gets `401` after its replay is not refreshed again.
#[derive(Debug, Clone)]
pub struct RequestAttempt {
    request: ApiRequest,
    already_retried: bool,
}

impl RequestAttempt {
    /// Wraps a fresh request.
    #[must_use]
    pub const fn new(request: ApiRequest) -> Self {
        Self {
            request,
            already_retried: false,
        }
    }

    /// The wrapped request.
    #[must_use]
    pub const fn request(&self) -> &ApiRequest {
        &self.request
    }

    /// Whether the request has been replayed once.
    #[must_use]
    pub const fn already_retried(&self) -> bool {
        self.already_retried
    }

    /// Marks the request as replayed.
    pub const fn mark_retried(&mut self) {
        self.already_retried = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_marker() {
        let mut attempt = RequestAttempt::new(ApiRequest::get("/accounts"));
        assert!(!attempt.already_retried());

        attempt.mark_retried();
        assert!(attempt.already_retried());
        assert_eq!(attempt.request().path, "/accounts");
    }
}
