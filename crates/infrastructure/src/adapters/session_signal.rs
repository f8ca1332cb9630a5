//! Login redirect over a watch channel.

use bankline_application::ports::LoginRedirect;
use tokio::sync::watch;
use tracing::info;

/// What the hosting shell should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has ended the session.
    Active,
    /// The session ended; the user must sign in at `location`.
    LoginRequired {
        /// Login entry point.
        location: String,
    },
}

/// `LoginRedirect` that flips a watch channel to
/// [`SessionState::LoginRequired`].
///
/// The first redirect notifies subscribers; repeated redirects are no-ops.
pub struct SessionSignal {
    location: String,
    sender: watch::Sender<SessionState>,
}

impl SessionSignal {
    /// Creates a signal redirecting to `location`.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        let (sender, _) = watch::channel(SessionState::Active);
        Self {
            location: location.into(),
            sender,
        }
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.sender.subscribe()
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.sender.borrow().clone()
    }

    /// Returns true once a redirect happened.
    #[must_use]
    pub fn login_required(&self) -> bool {
        matches!(*self.sender.borrow(), SessionState::LoginRequired { .. })
    }

    /// Returns the signal to `Active`, e.g. after a new login.
    pub fn reset(&self) {
        self.sender.send_if_modified(|state| {
            let changed = *state != SessionState::Active;
            *state = SessionState::Active;
            changed
        });
    }
}

impl LoginRedirect for SessionSignal {
    fn redirect_to_login(&self) {
        let location = &self.location;
        let flipped = self.sender.send_if_modified(|state| {
            if matches!(state, SessionState::LoginRequired { .. }) {
                return false;
            }
            *state = SessionState::LoginRequired {
                location: location.clone(),
            };
            true
        });

        if flipped {
            info!(location = %self.location, "login required");
        }
    }
}
