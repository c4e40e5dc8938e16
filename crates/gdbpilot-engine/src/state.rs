use std::fmt;

/// Phase of a debugging session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebuggerState {
    /// Nothing was requested yet.
    NotReady,

    /// The debugger process is being started.
    EngineSetupRequested,

    /// The inferior is being attached or loaded.
    InferiorSetupRequested,

    /// The inferior is prepared, and is being started (or resumed).
    EngineRunRequested,

    /// A resume of the stopped inferior was requested.
    InferiorRunRequested,

    /// The inferior is running.
    InferiorRunOk,

    /// An interrupt of the running inferior was requested.
    InferiorStopRequested,

    /// The inferior is stopped.
    InferiorStopOk,

    /// The inferior has exited.
    InferiorExited,

    /// The session is being shut down.
    ShutdownRequested,

    /// The session was shut down (terminal).
    ShutdownOk,

    /// The session failed (terminal).
    Failed,
}

impl DebuggerState {
    /// Returns whether no transition can leave this state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ShutdownOk | Self::Failed)
    }

    /// Returns whether the state machine allows going from `self` to `to`.
    pub const fn can_transition_to(self, to: Self) -> bool {
        use DebuggerState::*;

        if self.is_terminal() {
            return false;
        }

        match (self, to) {
            (ShutdownRequested, ShutdownOk) => true,
            (ShutdownRequested, _) => matches!(to, Failed),
            (_, ShutdownRequested | Failed) => true,

            (NotReady, EngineSetupRequested)
            | (EngineSetupRequested, InferiorSetupRequested)
            | (InferiorSetupRequested, EngineRunRequested)
            | (EngineRunRequested, InferiorRunOk | InferiorStopOk)
            | (InferiorRunRequested, InferiorRunOk | InferiorStopOk | InferiorExited)
            | (InferiorRunOk, InferiorStopRequested | InferiorStopOk | InferiorExited)
            | (InferiorStopRequested, InferiorStopOk | InferiorRunOk | InferiorExited)
            | (InferiorStopOk, InferiorRunRequested | InferiorRunOk) => true,

            _ => false,
        }
    }
}

impl fmt::Display for DebuggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::DebuggerState::{self, *};

    const ALL: [DebuggerState; 12] = [
        NotReady,
        EngineSetupRequested,
        InferiorSetupRequested,
        EngineRunRequested,
        InferiorRunRequested,
        InferiorRunOk,
        InferiorStopRequested,
        InferiorStopOk,
        InferiorExited,
        ShutdownRequested,
        ShutdownOk,
        Failed,
    ];

    #[test]
    fn setup_sequence_is_linear() {
        assert!(NotReady.can_transition_to(EngineSetupRequested));
        assert!(EngineSetupRequested.can_transition_to(InferiorSetupRequested));
        assert!(InferiorSetupRequested.can_transition_to(EngineRunRequested));
        assert!(EngineRunRequested.can_transition_to(InferiorRunOk));
        assert!(EngineRunRequested.can_transition_to(InferiorStopOk));

        assert!(!NotReady.can_transition_to(InferiorSetupRequested));
        assert!(!EngineSetupRequested.can_transition_to(EngineRunRequested));
        assert!(!InferiorSetupRequested.can_transition_to(InferiorRunOk));
    }

    #[test]
    fn terminal_states_are_final() {
        for to in ALL {
            assert!(!ShutdownOk.can_transition_to(to), "ShutdownOk -> {to}");
            assert!(!Failed.can_transition_to(to), "Failed -> {to}");
        }
    }

    #[test]
    fn failure_and_shutdown_reachable_from_non_terminal() {
        for from in ALL.into_iter().filter(|s| !s.is_terminal()) {
            assert!(from.can_transition_to(Failed), "{from} -> Failed");
            assert!(
                from == ShutdownRequested || from.can_transition_to(ShutdownRequested),
                "{from} -> ShutdownRequested"
            );
        }
    }

    #[test]
    fn shutdown_only_completes() {
        for to in ALL {
            let allowed = matches!(to, ShutdownOk | Failed);
            assert_eq!(ShutdownRequested.can_transition_to(to), allowed, "-> {to}");
        }
    }
}
