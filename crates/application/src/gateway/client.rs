//! The authenticated gateway.

use std::sync::Arc;

use bankline_domain::{
    ApiEnvelope, ApiRequest, ApiResponse, CredentialPair, RefreshRequest, TokenGrant,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::attempt::RequestAttempt;
use super::coordinator::{RefreshCoordinator, RefreshOutcome, Ticket};
use super::prepare::prepare;
use crate::error::{GatewayError, GatewayResult};
use crate::ports::{HttpTransport, LoginRedirect, TokenStore};

/// Paths of the auth endpoints on the banking API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRoutes {
    /// Token refresh endpoint.
    pub refresh: String,
    /// Login endpoint.
    pub login: String,
    /// Logout endpoint.
    pub logout: String,
}

impl Default for AuthRoutes {
    fn default() -> Self {
        Self {
            refresh: "/auth/refresh".to_string(),
            login: "/auth/login".to_string(),
            logout: "/auth/logout".to_string(),
        }
    }
}

/// Mediates every call to the banking API.
///
/// Attaches the stored access token, and on `401` runs at most one refresh
/// per episode. Requests that fail while a refresh is in flight are queued
/// and replayed with the new token, or rejected together if the refresh
/// fails. A session that cannot be recovered is cleared from the store and
/// ends with a login redirect.
pub struct AuthenticatedGateway {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn TokenStore>,
    redirect: Arc<dyn LoginRedirect>,
    routes: AuthRoutes,
    coordinator: RefreshCoordinator,
}

impl AuthenticatedGateway {
    /// Creates a gateway with the default auth routes.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        Self {
            transport,
            store,
            redirect,
            routes: AuthRoutes::default(),
            coordinator: RefreshCoordinator::new(),
        }
    }

    /// Overrides the auth routes.
    #[must_use]
    pub fn with_routes(mut self, routes: AuthRoutes) -> Self {
        self.routes = routes;
        self
    }

    /// The auth routes in use.
    #[must_use]
    pub const fn routes(&self) -> &AuthRoutes {
        &self.routes
    }

    /// The token store backing this gateway.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// The login redirect used for session-terminal failures.
    #[must_use]
    pub fn redirect(&self) -> &Arc<dyn LoginRedirect> {
        &self.redirect
    }

    /// Returns true while a refresh episode is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.coordinator.is_refreshing()
    }

    /// Sends a request with the stored access token.
    ///
    /// 2xx responses are returned as is. A `401` triggers (or joins) a
    /// refresh and the request is replayed once with the new token. If the
    /// stored token already changed while the request was in flight, the
    /// replay uses it directly without starting another refresh.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Status`] for any other non-2xx response, including a
    ///   `401` on the replay.
    /// - [`GatewayError::NoRefreshToken`], [`GatewayError::RefreshFailed`] or
    ///   [`GatewayError::RefreshAbandoned`] when the session cannot be
    ///   recovered.
    /// - [`GatewayError::Transport`] when no response was received.
    pub async fn send(&self, request: ApiRequest) -> GatewayResult<ApiResponse> {
        let mut attempt = RequestAttempt::new(request);
        let mut token = self.store.access_token();

        loop {
            let response = self.dispatch(&attempt, token.as_deref()).await?;

            if !response.is_unauthorized() {
                return into_result(response);
            }

            if attempt.already_retried() {
                debug!(
                    path = %attempt.request().path,
                    "replayed request still unauthorized"
                );
                return Err(status_error(response));
            }

            attempt.mark_retried();
            token = match self.store.access_token() {
                Some(current) if token.as_deref() != Some(current.as_str()) => {
                    debug!(
                        path = %attempt.request().path,
                        "token rotated while request was in flight, replaying"
                    );
                    Some(current)
                }
                _ => Some(self.recover(Some(&response)).await?),
            };
        }
    }

    /// Sends a request without a token and without refresh handling.
    ///
    /// Used for endpoints that are reachable before sign-in, such as login.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Status`] for non-2xx responses and
    /// [`GatewayError::Transport`] when no response was received.
    pub async fn send_public(&self, request: ApiRequest) -> GatewayResult<ApiResponse> {
        let response = self.transport.execute(prepare(&request, None)).await?;
        into_result(response)
    }

    /// Sends a request and unwraps the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Everything [`send`](Self::send) returns, plus [`GatewayError::Api`]
    /// when the envelope reports failure and [`GatewayError::Domain`] when
    /// the payload does not decode.
    pub async fn request_data<T: DeserializeOwned>(&self, request: ApiRequest) -> GatewayResult<T> {
        let response = self.send(request).await?;
        let envelope: ApiEnvelope<T> = response.envelope()?;

        if !envelope.success {
            return Err(GatewayError::Api {
                message: envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }

        envelope.into_data().ok_or_else(|| GatewayError::Api {
            message: "response carried no data".to_string(),
        })
    }

    /// Refreshes the session now, joining an episode already in flight.
    ///
    /// # Errors
    ///
    /// The same session-terminal errors as [`send`](Self::send).
    pub async fn refresh_now(&self) -> GatewayResult<String> {
        self.recover(None).await
    }

    async fn dispatch(
        &self,
        attempt: &RequestAttempt,
        token: Option<&str>,
    ) -> GatewayResult<ApiResponse> {
        let prepared = prepare(attempt.request(), token);
        debug!(
            method = %prepared.method,
            path = %prepared.path,
            authenticated = token.is_some(),
            retried = attempt.already_retried(),
            "dispatching request"
        );
        Ok(self.transport.execute(prepared).await?)
    }

    /// Gets a fresh access token, either by owning a new episode or by
    /// waiting for the running one.
    async fn recover(&self, unauthorized: Option<&ApiResponse>) -> RefreshOutcome {
        match self.coordinator.join() {
            Ticket::Waiter(receiver) => {
                debug!("refresh in flight, queueing request");
                receiver
                    .await
                    .unwrap_or(Err(GatewayError::RefreshAbandoned))
            }
            Ticket::Owner(episode) => {
                info!("starting token refresh");
                let outcome = self.run_episode(unauthorized).await;

                if let Err(error) = &outcome {
                    warn!(%error, "session could not be recovered");
                    self.end_session();
                }

                let released = episode.finish(&outcome);
                info!(
                    released,
                    success = outcome.is_ok(),
                    "token refresh settled"
                );

                if outcome.is_err() {
                    self.redirect.redirect_to_login();
                }
                outcome
            }
        }
    }

    async fn run_episode(&self, unauthorized: Option<&ApiResponse>) -> RefreshOutcome {
        let Some(refresh_token) = self.store.refresh_token() else {
            let message = unauthorized
                .and_then(ApiResponse::envelope_message)
                .unwrap_or_else(|| "no refresh token available".to_string());
            return Err(GatewayError::NoRefreshToken { message });
        };

        let pair = self.exchange(refresh_token).await?;
        self.store
            .replace_credentials(&pair)
            .map_err(|e| GatewayError::Store(e.to_string()))?;

        debug!(
            token = %token_preview(&pair.access_token),
            expires_at = %pair.access_token_expires_at,
            "stored refreshed credentials"
        );
        Ok(pair.access_token)
    }

    /// Calls the refresh endpoint. Success requires a 2xx status, an
    /// envelope with `success: true`, and a payload.
    async fn exchange(&self, refresh_token: String) -> GatewayResult<CredentialPair> {
        let request = ApiRequest::post(self.routes.refresh.as_str())
            .with_json(&RefreshRequest { refresh_token })?;

        let response = self
            .transport
            .execute(prepare(&request, None))
            .await
            .map_err(|e| GatewayError::RefreshFailed {
                reason: e.to_string(),
            })?;

        let status = response.status;
        let envelope: ApiEnvelope<TokenGrant> =
            response.envelope().map_err(|e| GatewayError::RefreshFailed {
                reason: format!("status {status}: {e}"),
            })?;

        if !envelope.is_success_for(status) {
            return Err(GatewayError::RefreshFailed {
                reason: envelope
                    .message
                    .unwrap_or_else(|| format!("refresh rejected with status {status}")),
            });
        }

        envelope
            .into_data()
            .map(TokenGrant::into_credentials)
            .ok_or_else(|| GatewayError::RefreshFailed {
                reason: "refresh response carried no tokens".to_string(),
            })
    }

    fn end_session(&self) {
        if let Err(error) = self.store.clear_credentials() {
            warn!(%error, "failed to clear stored credentials");
        }
    }
}

fn into_result(response: ApiResponse) -> GatewayResult<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(status_error(response))
    }
}

fn status_error(response: ApiResponse) -> GatewayError {
    let message = response
        .envelope_message()
        .unwrap_or_else(|| format!("HTTP {}", response.status));
    GatewayError::Status {
        status: response.status,
        message,
        body: response.body,
    }
}

/// First eight characters of a token followed by `...`, for logs.
///
/// Tokens of 12 characters or fewer are fully masked as `***`.
pub(crate) fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        format!("{}...", token.chars().take(8).collect::<String>())
    } else {
        "***".to_string()
    }
}
