//! The auth service.

use std::sync::Arc;

use bankline_domain::{
    ApiEnvelope, ApiRequest, LoginGrant, LoginRequest, LogoutRequest, SessionStatus, StorageKey,
    UserRole,
};
use tracing::{debug, info, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::AuthenticatedGateway;
use crate::ports::{Clock, StoreError};

/// Default number of seconds before expiry a token counts as expiring.
pub const DEFAULT_EXPIRY_BUFFER_SECS: i64 = 60;

/// Login, logout and session queries for the signed-in user.
///
/// Every call goes through the shared [`AuthenticatedGateway`], so a
/// refresh triggered here joins the same single-flight episode as business
/// requests.
pub struct AuthService {
    gateway: Arc<AuthenticatedGateway>,
    clock: Arc<dyn Clock>,
    expiry_buffer_secs: i64,
}

impl AuthService {
    /// Creates a service over `gateway`.
    #[must_use]
    pub fn new(gateway: Arc<AuthenticatedGateway>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            clock,
            expiry_buffer_secs: DEFAULT_EXPIRY_BUFFER_SECS,
        }
    }

    /// Sets how close to expiry a token counts as expiring.
    #[must_use]
    pub const fn with_expiry_buffer(mut self, secs: i64) -> Self {
        self.expiry_buffer_secs = secs;
        self
    }

    /// The gateway this service sends through.
    #[must_use]
    pub const fn gateway(&self) -> &Arc<AuthenticatedGateway> {
        &self.gateway
    }

    /// Signs in and stores the issued credential pair and role.
    ///
    /// The store is only written when the response passes the same success
    /// check the refresh path uses.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Status`] when the server rejects the credentials,
    /// [`GatewayError::Api`] when the envelope reports failure, and
    /// [`GatewayError::Store`] when the pair cannot be persisted.
    pub async fn login(&self, email: &str, password: &str) -> GatewayResult<Option<UserRole>> {
        let request = ApiRequest::post(self.gateway.routes().login.as_str()).with_json(
            &LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )?;

        let response = self.gateway.send_public(request).await?;
        let envelope: ApiEnvelope<LoginGrant> = response.envelope()?;

        if !envelope.is_success_for(response.status) {
            return Err(GatewayError::Api {
                message: envelope
                    .message
                    .unwrap_or_else(|| "login was not successful".to_string()),
            });
        }

        let Some(LoginGrant { grant, role }) = envelope.into_data() else {
            return Err(GatewayError::Api {
                message: "login response carried no tokens".to_string(),
            });
        };

        let store = self.gateway.store();
        store.replace_credentials(&grant.into_credentials()).map_err(store_error)?;
        match role {
            Some(role) => store.set_user_role(role),
            None => store.remove_all(&[StorageKey::UserRole]),
        }
        .map_err(store_error)?;

        info!(role = role.map(UserRole::as_str), "signed in");
        Ok(role)
    }

    /// Signs out locally, telling the server first when possible.
    ///
    /// The server call is best effort. An expired or expiring access token is
    /// refreshed first so the revoked refresh token is the one the server
    /// currently holds. Stored credentials and the role are always removed
    /// and the login redirect always fires.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Store`] when the local session cannot be cleared.
    pub async fn logout(&self) -> GatewayResult<()> {
        let store = self.gateway.store();

        if store.refresh_token().is_some()
            && let Err(error) = self.revoke_on_server().await
        {
            warn!(%error, "server logout failed, clearing local session anyway");
        }

        let mut keys = StorageKey::CREDENTIALS.to_vec();
        keys.push(StorageKey::UserRole);
        let cleared = store.remove_all(&keys).map_err(store_error);

        self.gateway.redirect().redirect_to_login();
        info!("signed out");
        cleared
    }

    /// Revokes the current refresh token on the server.
    ///
    /// A refresh can still happen inside the logout call itself, when the
    /// server answers `401`. The replayed body then carries the old token, so
    /// the rotated one is revoked with a second call.
    async fn revoke_on_server(&self) -> GatewayResult<()> {
        if matches!(
            self.session_status(),
            SessionStatus::Expired { can_refresh: true }
                | SessionStatus::Expiring {
                    can_refresh: true,
                    ..
                }
        ) {
            self.gateway.refresh_now().await?;
        }

        let store = self.gateway.store();
        let Some(refresh_token) = store.refresh_token() else {
            return Ok(());
        };

        let sent = self.send_logout(refresh_token.clone()).await;
        match store.refresh_token() {
            Some(rotated) if rotated != refresh_token => {
                debug!("refresh token rotated during logout, revoking the new one");
                self.send_logout(rotated).await
            }
            _ => sent,
        }
    }

    async fn send_logout(&self, refresh_token: String) -> GatewayResult<()> {
        let request = ApiRequest::post(self.gateway.routes().logout.as_str())
            .with_json(&LogoutRequest { refresh_token })?;
        self.gateway.send(request).await.map(drop)
    }

    /// Refreshes the session now, joining a refresh already in flight.
    ///
    /// # Errors
    ///
    /// The session-terminal errors of [`AuthenticatedGateway::send`].
    pub async fn refresh(&self) -> GatewayResult<String> {
        self.gateway.refresh_now().await
    }

    /// Status of the stored session at the current time.
    ///
    /// A store holding malformed expiries counts as signed out.
    #[must_use]
    pub fn session_status(&self) -> SessionStatus {
        let credentials = match self.gateway.store().credentials() {
            Ok(credentials) => credentials,
            Err(error) => {
                warn!(%error, "stored credentials are unreadable");
                None
            }
        };

        SessionStatus::evaluate(
            credentials.as_ref(),
            self.clock.now(),
            self.expiry_buffer_secs,
        )
    }

    /// Returns true if the session is valid or can still be refreshed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session_status().is_recoverable()
    }

    /// The role stored at login.
    #[must_use]
    pub fn current_role(&self) -> Option<UserRole> {
        self.gateway.store().user_role()
    }
}

fn store_error(error: StoreError) -> GatewayError {
    GatewayError::Store(error.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::TokenStore;
    use crate::tests::mocks::{
        CountingRedirect, FakeBank, FixedClock, GOOD_PASSWORD, LOGOUT_PATH, MapStore,
        RefreshBehavior, epoch, stale_credentials,
    };
    use bankline_domain::RequestBody;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    struct Harness {
        bank: Arc<FakeBank>,
        store: Arc<MapStore>,
        redirect: Arc<CountingRedirect>,
        service: AuthService,
    }

    fn harness_at(bank: FakeBank, store: MapStore, now: chrono::DateTime<chrono::Utc>) -> Harness {
        let bank = Arc::new(bank);
        let store = Arc::new(store);
        let redirect = Arc::new(CountingRedirect::default());
        let gateway = Arc::new(AuthenticatedGateway::new(
            bank.clone(),
            store.clone(),
            redirect.clone(),
        ));
        Harness {
            bank,
            store,
            redirect,
            service: AuthService::new(gateway, Arc::new(FixedClock(now))),
        }
    }

    fn harness(bank: FakeBank, store: MapStore) -> Harness {
        harness_at(bank, store, epoch())
    }

    #[tokio::test]
    async fn test_login_stores_pair_and_role() {
        let h = harness(FakeBank::accepting("nobody"), MapStore::default());

        let role = h
            .service
            .login("ana@bank.test", GOOD_PASSWORD)
            .await
            .unwrap();

        assert_eq!(role, Some(UserRole::Admin));
        assert_eq!(h.store.access_token().as_deref(), Some("fresh-access-1"));
        assert_eq!(h.store.refresh_token().as_deref(), Some("fresh-refresh-1"));
        assert_eq!(h.service.current_role(), Some(UserRole::Admin));
        assert!(h.service.is_authenticated());

        let login = &h.bank.seen()[0];
        assert_eq!(login.bearer_token(), None);
        match &login.body {
            RequestBody::Json(body) => assert_eq!(body["email"], "ana@bank.test"),
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_with_bad_password_leaves_store_untouched() {
        let h = harness(FakeBank::accepting("nobody"), MapStore::default());

        let error = h
            .service
            .login("ana@bank.test", "hunter2")
            .await
            .expect_err("wrong password");

        assert_eq!(error.status(), Some(401));
        assert!(error.to_string().contains("Invalid credentials"));
        assert!(h.store.is_empty());
        assert_eq!(h.bank.refresh_calls(), 0);
        assert_eq!(h.redirect.calls(), 0);
    }

    #[tokio::test]
    async fn test_logout_revokes_and_clears_everything() {
        let h = harness_at(
            FakeBank::accepting("stale-access"),
            MapStore::with_credentials(&stale_credentials()),
            epoch() - Duration::hours(1),
        );
        h.store.set_user_role(UserRole::User).unwrap();

        h.service.logout().await.unwrap();

        assert_eq!(h.bank.logout_calls(), 1);
        let logout = h
            .bank
            .seen()
            .into_iter()
            .find(|r| r.path == LOGOUT_PATH)
            .unwrap();
        match &logout.body {
            RequestBody::Json(body) => assert_eq!(body["refreshToken"], "stale-refresh"),
            other => panic!("expected JSON body, got {other:?}"),
        }
        assert_eq!(h.bank.revoked(), vec!["stale-refresh".to_string()]);
        assert_eq!(h.bank.refresh_calls(), 0);
        assert!(h.store.is_empty());
        assert_eq!(h.redirect.calls(), 1);
        assert!(!h.service.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_with_expired_access_token_revokes_fresh_refresh_token() {
        let h = harness(
            FakeBank::accepting("not-yet-issued"),
            MapStore::with_credentials(&stale_credentials()),
        );

        h.service.logout().await.unwrap();

        assert_eq!(h.bank.refresh_calls(), 1);
        assert_eq!(h.bank.logout_calls(), 1);
        assert_eq!(h.bank.revoked(), vec!["fresh-refresh-1".to_string()]);
        assert!(h.store.is_empty());
        assert_eq!(h.redirect.calls(), 1);
    }

    #[tokio::test]
    async fn test_logout_revokes_token_rotated_by_its_own_refresh() {
        // Locally valid, but the server already rejects the access token.
        let h = harness_at(
            FakeBank::accepting("not-yet-issued"),
            MapStore::with_credentials(&stale_credentials()),
            epoch() - Duration::hours(1),
        );

        h.service.logout().await.unwrap();

        assert_eq!(h.bank.refresh_calls(), 1);
        assert_eq!(
            h.bank.revoked().last().map(String::as_str),
            Some("fresh-refresh-1")
        );
        assert!(h.store.is_empty());
        assert_eq!(h.redirect.calls(), 1);
    }

    #[tokio::test]
    async fn test_logout_completes_locally_when_server_call_fails() {
        let h = harness(
            FakeBank::accepting("not-yet-issued").with_refresh(RefreshBehavior::NetworkDown),
            MapStore::with_credentials(&stale_credentials()),
        );
        h.store.set_user_role(UserRole::Admin).unwrap();

        h.service.logout().await.unwrap();

        assert!(h.store.is_empty());
        assert!(h.redirect.calls() >= 1);
        assert_eq!(h.service.current_role(), None);
    }

    #[tokio::test]
    async fn test_logout_without_session_skips_server() {
        let h = harness(FakeBank::accepting("nobody"), MapStore::default());

        h.service.logout().await.unwrap();

        assert_eq!(h.bank.logout_calls(), 0);
        assert_eq!(h.redirect.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_delegates_to_gateway() {
        let h = harness(
            FakeBank::accepting("not-yet-issued"),
            MapStore::with_credentials(&stale_credentials()),
        );

        let token = h.service.refresh().await.unwrap();

        assert_eq!(token, "fresh-access-1");
        assert_eq!(h.bank.refresh_calls(), 1);
    }

    #[test]
    fn test_session_status_follows_clock() {
        let now = epoch();
        let fresh = bankline_domain::CredentialPair::new(
            "a",
            "r",
            now + Duration::minutes(15),
            now + Duration::days(7),
        );

        let h = harness_at(
            FakeBank::accepting("a"),
            MapStore::with_credentials(&fresh),
            now,
        );
        assert_eq!(
            h.service.session_status(),
            SessionStatus::Valid {
                seconds_remaining: 900
            }
        );

        let later = harness_at(
            FakeBank::accepting("a"),
            MapStore::with_credentials(&fresh),
            now + Duration::minutes(20),
        );
        assert_eq!(
            later.service.session_status(),
            SessionStatus::Expired { can_refresh: true }
        );
        assert!(later.service.is_authenticated());

        let empty = harness(FakeBank::accepting("a"), MapStore::default());
        assert_eq!(
            empty.service.session_status(),
            SessionStatus::NotAuthenticated
        );
    }

    #[test]
    fn test_corrupt_expiry_counts_as_signed_out() {
        let store = MapStore::with_credentials(&stale_credentials());
        store
            .write_all(&[(StorageKey::TokenExpiresAt, "yesterday".to_string())])
            .unwrap();
        let h = harness(FakeBank::accepting("a"), store);

        assert_eq!(h.service.session_status(), SessionStatus::NotAuthenticated);
        assert!(!h.service.is_authenticated());
    }
}
