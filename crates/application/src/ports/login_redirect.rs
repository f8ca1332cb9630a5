//! Login redirect port

/// Terminal action taken when a session cannot be recovered.
///
/// Implementations must be idempotent: concurrent requests failing in the
/// same episode may each end up here.
pub trait LoginRedirect: Send + Sync {
    /// Sends the user to the login entry point.
    fn redirect_to_login(&self);
}
