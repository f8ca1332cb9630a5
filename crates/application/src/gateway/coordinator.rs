//! Single-flight coordination of token refreshes.

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::GatewayError;

/// Outcome handed to every request of an episode: the new access token, or
/// the error that ended the session.
pub(crate) type RefreshOutcome = Result<String, GatewayError>;

enum RefreshState {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    },
}

/// What a request that hit `401` must do next.
pub(crate) enum Ticket<'a> {
    /// Run the refresh and settle the episode.
    Owner(RefreshEpisode<'a>),
    /// Wait for the running episode.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Refresh state owned by one gateway.
///
/// The idle check and the switch to refreshing happen under one lock with
/// no await in between, so exactly one request owns each episode.
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub(crate) const fn new() -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
        }
    }

    /// Starts an episode, or queues behind the one in flight.
    pub(crate) fn join(&self) -> Ticket<'_> {
        let mut state = self.state.lock();
        if let RefreshState::Refreshing { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            return Ticket::Waiter(rx);
        }

        *state = RefreshState::Refreshing {
            waiters: Vec::new(),
        };
        Ticket::Owner(RefreshEpisode {
            coordinator: self,
            settled: false,
        })
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), RefreshState::Refreshing { .. })
    }

    /// Returns to idle and releases every waiter, in arrival order, with
    /// the same outcome. Returns how many were released.
    fn settle(&self, outcome: &RefreshOutcome) -> usize {
        let previous = std::mem::replace(&mut *self.state.lock(), RefreshState::Idle);
        let RefreshState::Refreshing { waiters } = previous else {
            return 0;
        };

        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose caller stopped listening is simply skipped.
            let _ = waiter.send(outcome.clone());
        }
        released
    }
}

/// Ownership of the running episode.
///
/// Dropping it unsettled (the owning request was cancelled) releases every
/// waiter with [`GatewayError::RefreshAbandoned`].
pub(crate) struct RefreshEpisode<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshEpisode<'_> {
    /// Ends the episode with `outcome`.
    pub(crate) fn finish(mut self, outcome: &RefreshOutcome) -> usize {
        self.settled = true;
        self.coordinator.settle(outcome)
    }
}

impl Drop for RefreshEpisode<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let released = self
                .coordinator
                .settle(&Err(GatewayError::RefreshAbandoned));
            tracing::warn!(released, "refresh owner dropped, waiters released");
        }
    }
}
