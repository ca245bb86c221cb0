//! Remote session and player state machines

use serde::{Deserialize, Serialize};

use crate::vendor::{ConnectionState, PlayerEvent};

/// Lifecycle of a publish/subscribe Remote Session
///
/// `Failed` and `Disconnected` are terminal for the session instance; a new
/// `connect` builds a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Connecting,
    Active,
    Reconnecting,
    Disconnected,
    Failed,
}

impl SessionState {
    /// A vendor session object exists and may push events
    pub fn is_live(self) -> bool {
        matches!(
            self,
            SessionState::Connecting | SessionState::Active | SessionState::Reconnecting
        )
    }

    /// Media is flowing or the vendor is restoring it
    pub fn is_on_air(self) -> bool {
        matches!(self, SessionState::Active | SessionState::Reconnecting)
    }

    /// Apply a vendor connection-state change
    ///
    /// Events reaching a session that is not live are dropped.
    pub fn on_connection(self, event: ConnectionState) -> SessionState {
        use ConnectionState as C;
        use SessionState as S;

        match (self, event) {
            (S::Connecting, C::Active) => S::Active,
            (S::Connecting, C::Connecting) => S::Connecting,
            (S::Connecting, C::Reconnecting) => S::Connecting,
            (S::Connecting, C::Disconnected) => S::Failed,

            (S::Active, C::Reconnecting) => S::Reconnecting,
            (S::Active, C::Disconnected) => S::Disconnected,
            (S::Active, C::Active | C::Connecting) => S::Active,

            (S::Reconnecting, C::Active) => S::Active,
            (S::Reconnecting, C::Disconnected) => S::Disconnected,
            (S::Reconnecting, C::Reconnecting | C::Connecting) => S::Reconnecting,

            (other, _) => other,
        }
    }

    /// Apply a vendor error; only fatal errors or errors while connecting end the session
    pub fn on_error(self, fatal: bool) -> SessionState {
        match self {
            SessionState::Connecting => SessionState::Failed,
            SessionState::Active | SessionState::Reconnecting if fatal => SessionState::Failed,
            other => other,
        }
    }
}

/// Lifecycle of the playback-only player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Idle,
    Ready,
    Playing,
    Buffering,
    Ended,
    Error,
}

impl PlayerState {
    pub fn is_playing(self) -> bool {
        matches!(self, PlayerState::Playing | PlayerState::Buffering)
    }

    pub fn on_event(self, event: &PlayerEvent) -> PlayerState {
        use PlayerState as P;

        match (self, event) {
            (_, PlayerEvent::Error(_)) => P::Error,
            (current, PlayerEvent::Initialized) => current,
            (_, PlayerEvent::Idle) => P::Idle,
            (_, PlayerEvent::Ready) => P::Ready,
            // An ended stream has to be loaded again before it plays
            (P::Ended, PlayerEvent::Playing) => P::Ended,
            (_, PlayerEvent::Playing) => P::Playing,
            (P::Playing | P::Ready | P::Buffering, PlayerEvent::Buffering) => P::Buffering,
            (P::Playing | P::Buffering, PlayerEvent::Ended) => P::Ended,
            (current, _) => current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_session_path() {
        let state = SessionState::Connecting.on_connection(ConnectionState::Active);
        assert_eq!(state, SessionState::Active);

        let state = state.on_connection(ConnectionState::Reconnecting);
        assert_eq!(state, SessionState::Reconnecting);
        assert!(state.is_on_air());

        let state = state.on_connection(ConnectionState::Active);
        assert_eq!(state, SessionState::Active);

        let state = state.on_connection(ConnectionState::Reconnecting);
        let state = state.on_connection(ConnectionState::Disconnected);
        assert_eq!(state, SessionState::Disconnected);
    }

    #[test]
    fn test_disconnect_while_connecting_fails() {
        assert_eq!(
            SessionState::Connecting.on_connection(ConnectionState::Disconnected),
            SessionState::Failed
        );
        assert_eq!(SessionState::Connecting.on_error(false), SessionState::Failed);
    }

    #[test]
    fn test_terminal_states_ignore_vendor_events() {
        for terminal in [SessionState::Idle, SessionState::Disconnected, SessionState::Failed] {
            for event in [
                ConnectionState::Connecting,
                ConnectionState::Active,
                ConnectionState::Reconnecting,
                ConnectionState::Disconnected,
            ] {
                assert_eq!(terminal.on_connection(event), terminal);
            }
            assert_eq!(terminal.on_error(true), terminal);
        }
    }

    #[test]
    fn test_non_fatal_error_keeps_active_session() {
        assert_eq!(SessionState::Active.on_error(false), SessionState::Active);
        assert_eq!(SessionState::Active.on_error(true), SessionState::Failed);
    }

    #[test]
    fn test_player_transitions() {
        let state = PlayerState::Idle
            .on_event(&PlayerEvent::Initialized)
            .on_event(&PlayerEvent::Ready)
            .on_event(&PlayerEvent::Playing);
        assert_eq!(state, PlayerState::Playing);

        let state = state.on_event(&PlayerEvent::Buffering);
        assert_eq!(state, PlayerState::Buffering);
        assert!(state.is_playing());

        let state = state.on_event(&PlayerEvent::Playing).on_event(&PlayerEvent::Ended);
        assert_eq!(state, PlayerState::Ended);
        assert_eq!(state.on_event(&PlayerEvent::Playing), PlayerState::Ended);
        assert_eq!(state.on_event(&PlayerEvent::Ready), PlayerState::Ready);
    }

    #[test]
    fn test_player_error_from_any_state() {
        for state in [
            PlayerState::Idle,
            PlayerState::Ready,
            PlayerState::Playing,
            PlayerState::Buffering,
            PlayerState::Ended,
        ] {
            assert_eq!(
                state.on_event(&PlayerEvent::Error(json!({"message": "network"}))),
                PlayerState::Error
            );
        }
        assert_eq!(PlayerState::Idle.on_event(&PlayerEvent::Buffering), PlayerState::Idle);
    }
}
