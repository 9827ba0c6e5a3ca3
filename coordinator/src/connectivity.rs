use bookstack_client::ApiError;
use serde::{
    Deserialize,
    Serialize,
};
use strum::Display;

/// Reachability of the BookStack instance as of the last cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectivityState {
    /// The last cycle completed without any failure.
    Up,
    /// The last cycle published, but some part of it failed.
    Degraded,
    /// Base statistics could not be read. Also the state before the first cycle.
    #[default]
    Down,
}

impl ConnectivityState {
    pub fn is_available(&self) -> bool {
        !matches!(self, ConnectivityState::Down)
    }
}

/// Why a cycle could not publish.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CycleFailure {
    /// Credentials were rejected; needs new tokens rather than waiting.
    #[error("authentication failed")]
    Auth,
    #[error("BookStack unreachable: {0}")]
    Unreachable(String),
    #[error("cycle ran out of time")]
    BudgetExceeded,
}

impl From<&ApiError> for CycleFailure {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Auth { .. } => CycleFailure::Auth,
            ApiError::BudgetExceeded => CycleFailure::BudgetExceeded,
            other => CycleFailure::Unreachable(other.to_string()),
        }
    }
}

/// Connectivity state machine. Logs each edge exactly once.
#[derive(Debug, Default)]
pub(crate) struct Connectivity {
    state: ConnectivityState,
}

impl Connectivity {
    pub(crate) fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Moves to `next`, returning the previous state if it changed.
    pub(crate) fn transition(
        &mut self,
        next: ConnectivityState,
        failure: Option<&CycleFailure>,
    ) -> Option<ConnectivityState> {
        let previous = std::mem::replace(&mut self.state, next);
        if previous == next {
            return None;
        }

        match next {
            ConnectivityState::Up => info!(%previous, "BookStack is back online"),
            ConnectivityState::Degraded => warn!(%previous, "BookStack is reachable, but some statistics are missing"),
            ConnectivityState::Down => match failure {
                Some(CycleFailure::Auth) => error!(%previous, "BookStack rejected the API token, check the credentials"),
                Some(failure) => error!(%previous, %failure, "BookStack is unavailable"),
                None => error!(%previous, "BookStack is unavailable"),
            },
        }
        Some(previous)
    }
}
