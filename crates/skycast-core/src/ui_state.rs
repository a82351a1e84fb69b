//! Screen state machine for weather fetch and save actions.
//!
//! There is no terminal state: every new fetch or save re-enters `Loading`.

use serde::Serialize;

/// UI state shown around repository calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Error,
}

impl UiState {
    /// State after a fetch or save has been launched.
    pub fn on_request_started(self) -> Self {
        UiState::Loading
    }

    /// State after a fetch or save completed successfully.
    ///
    /// Only `Loading` moves. A completion that arrives in any other state is stale.
    pub fn on_success(self) -> Self {
        match self {
            UiState::Loading => UiState::Idle,
            other => other,
        }
    }

    /// State after a fetch failed. Remote and mapping failures look the same here.
    pub fn on_failure(self) -> Self {
        match self {
            UiState::Loading => UiState::Error,
            other => other,
        }
    }

    pub fn is_loading(self) -> bool {
        matches!(self, UiState::Loading)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UiState::Idle => "IDLE",
            UiState::Loading => "LOADING",
            UiState::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for UiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
