//! Wiring of the gateway, auth service and session signal.

use std::sync::Arc;

use bankline_application::{AuthService, AuthenticatedGateway, HttpTransport, TokenStore};
use bankline_infrastructure::{
    FileTokenStore, GatewayConfig, ReqwestTransport, SessionSignal, SystemClock,
};

use crate::error::CliError;

/// Everything a command needs.
pub struct Client {
    /// Shared gateway for business calls.
    pub gateway: Arc<AuthenticatedGateway>,
    /// Login, logout and session queries.
    pub auth: AuthService,
    /// Flips when the session ends.
    pub signal: Arc<SessionSignal>,
}

impl Client {
    /// Connects to the configured API with the file token store.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport or the store cannot be opened.
    pub fn connect(config: &GatewayConfig) -> Result<Self, CliError> {
        let transport = Arc::new(ReqwestTransport::from_config(config)?);
        let store = Arc::new(FileTokenStore::open(&config.store.path)?);
        Ok(Self::assemble(config, transport, store))
    }

    /// Builds a client over the given transport and store.
    pub fn assemble(
        config: &GatewayConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        let signal = Arc::new(SessionSignal::new(config.auth.login_location.clone()));
        let gateway = Arc::new(
            AuthenticatedGateway::new(transport, store, signal.clone())
                .with_routes(config.routes()),
        );
        let auth = AuthService::new(gateway.clone(), Arc::new(SystemClock::new()))
            .with_expiry_buffer(config.auth.expiry_buffer_secs);

        Self {
            gateway,
            auth,
            signal,
        }
    }
}
