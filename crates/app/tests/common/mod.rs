//! Scripted banking API shared by the integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bankline_application::{
    AuthService, AuthenticatedGateway, HttpTransport, PreparedRequest, TokenStore, TransportError,
};
use bankline_domain::{ApiResponse, RequestBody};
use bankline_infrastructure::{SessionSignal, SystemClock};
use parking_lot::Mutex;
use serde_json::{Value, json};

pub const PASSWORD: &str = "s3cret";

/// In-memory banking API.
///
/// Login and refresh issue `access-N` / `refresh-N`. Business endpoints
/// accept only the latest access token and echo back the bearer they saw.
pub struct ScriptedBank {
    current: Mutex<Option<String>>,
    issued: AtomicUsize,
    refresh_calls: AtomicUsize,
    refresh_fails: bool,
    refresh_delay: Duration,
    log: Mutex<Vec<PreparedRequest>>,
}

impl ScriptedBank {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            issued: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            refresh_fails: false,
            refresh_delay: Duration::from_millis(25),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Makes the refresh endpoint answer 401.
    pub fn failing_refresh(mut self) -> Self {
        self.refresh_fails = true;
        self
    }

    /// Continues numbering after `n` already issued tokens.
    pub fn with_issued(self, n: usize) -> Self {
        self.issued.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Invalidates the current access token, as if it expired server side.
    pub fn expire_access_token(&self) {
        *self.current.lock() = None;
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.log.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<PreparedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    fn issue(&self) -> Value {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        *self.current.lock() = Some(format!("access-{n}"));
        json!({
            "token": format!("access-{n}"),
            "refreshToken": format!("refresh-{n}"),
            "tokenExpiresAt": "2099-01-01T00:15:00Z",
            "refreshTokenExpiresAt": "2099-01-08T00:00:00Z",
        })
    }

    fn login(&self, request: &PreparedRequest) -> ApiResponse {
        let password = match &request.body {
            RequestBody::Json(body) => body["password"].as_str().map(str::to_string),
            _ => None,
        };
        if password.as_deref() != Some(PASSWORD) {
            return ApiResponse::json(
                401,
                &json!({ "success": false, "message": "Invalid credentials" }),
            );
        }

        let mut data = self.issue();
        data["role"] = json!("user");
        ApiResponse::json(200, &json!({ "success": true, "data": data }))
    }

    async fn refresh(&self) -> ApiResponse {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.refresh_delay).await;

        if self.refresh_fails {
            return ApiResponse::json(
                401,
                &json!({ "success": false, "message": "Refresh token revoked" }),
            );
        }
        ApiResponse::json(200, &json!({ "success": true, "data": self.issue() }))
    }

    fn business(&self, request: &PreparedRequest) -> ApiResponse {
        let current = self.current.lock().clone();
        let bearer = request.bearer_token().map(str::to_string);

        if current.is_none() || bearer != current {
            return ApiResponse::json(401, &json!({ "success": false, "message": "Unauthorized" }));
        }

        let multipart_fields = match &request.body {
            RequestBody::Multipart(parts) => parts.iter().map(|p| p.name().to_string()).collect(),
            _ => Vec::new(),
        };

        ApiResponse::json(
            200,
            &json!({
                "success": true,
                "data": { "path": request.path, "token": bearer, "fields": multipart_fields },
            }),
        )
    }
}

#[async_trait]
impl HttpTransport for ScriptedBank {
    async fn execute(&self, request: PreparedRequest) -> Result<ApiResponse, TransportError> {
        self.log.lock().push(request.clone());

        Ok(match request.path.as_str() {
            "/auth/login" => self.login(&request),
            "/auth/refresh" => self.refresh().await,
            "/auth/logout" => ApiResponse::json(200, &json!({ "success": true })),
            _ => self.business(&request),
        })
    }
}

/// A gateway, auth service and session signal over `bank` and `store`.
pub struct Harness {
    pub bank: Arc<ScriptedBank>,
    pub signal: Arc<SessionSignal>,
    pub gateway: Arc<AuthenticatedGateway>,
    pub auth: AuthService,
}

pub fn harness(bank: ScriptedBank, store: Arc<dyn TokenStore>) -> Harness {
    let bank = Arc::new(bank);
    let signal = Arc::new(SessionSignal::new("/login"));
    let gateway = Arc::new(AuthenticatedGateway::new(
        bank.clone(),
        store,
        signal.clone(),
    ));
    let auth = AuthService::new(gateway.clone(), Arc::new(SystemClock::new()));

    Harness {
        bank,
        signal,
        gateway,
        auth,
    }
}

/// The `data.token` echoed by a business endpoint.
pub fn echoed_token(response: &ApiResponse) -> String {
    let body: Value = response.decode().unwrap();
    body["data"]["token"].as_str().unwrap().to_string()
}
