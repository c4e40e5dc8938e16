use std::collections::BTreeMap;

use crate::error::{SessionError, SessionResult};
use crate::mi::Response;

/// Function invoked with the response of the command it was registered for.
pub type Continuation<T> = fn(&mut T, Response) -> SessionResult<()>;

/// Command to send to the debugger.
pub struct Command<T> {
    /// Command line (without token).
    pub text: String,

    /// Continuation to invoke on the matching response.
    pub callback: Option<Callback<T>>,
}

impl<T> Command<T> {
    /// Creates a command whose response is only acknowledged.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback: None,
        }
    }

    /// Registers a continuation for the response of this command.
    ///
    /// `name` is only used for diagnostics.
    pub fn with_callback(mut self, name: &'static str, func: Continuation<T>) -> Self {
        self.callback = Some(Callback { name, func });
        self
    }
}

/// Named continuation.
pub struct Callback<T> {
    /// Name of the continuation.
    pub name: &'static str,

    /// Function to invoke.
    pub func: Continuation<T>,
}

/// Command waiting for its response.
pub struct PendingCommand<T> {
    /// Token the command was issued with.
    pub token: u64,

    /// Command line (without token).
    pub text: String,

    callback: Option<Callback<T>>,
}

impl<T> PendingCommand<T> {
    /// Returns the name of the registered continuation, if any.
    pub fn callback_name(&self) -> Option<&'static str> {
        self.callback.as_ref().map(|cb| cb.name)
    }

    /// Consumes the pending command by invoking its continuation (if any).
    pub fn complete(self, target: &mut T, response: Response) -> SessionResult<()> {
        match self.callback {
            Some(cb) => (cb.func)(target, response),
            None => Ok(()),
        }
    }
}

/// Token-based matcher of responses with their commands.
///
/// Tokens are allocated in increasing order, starting at 1. Several commands
/// may be pending at the same time, and their responses may arrive in any
/// order.
pub struct Dispatcher<T> {
    next_token: u64,
    pending: BTreeMap<u64, PendingCommand<T>>,
}

impl<T> Dispatcher<T> {
    /// Creates an empty dispatcher.
    pub const fn new() -> Self {
        Self {
            next_token: 1,
            pending: BTreeMap::new(),
        }
    }

    /// Registers the given command, and returns its wire representation.
    pub fn register(&mut self, command: Command<T>) -> (u64, String) {
        let token = self.next_token;
        self.next_token += 1;

        let line = format!("{token}{}", command.text);

        self.pending.insert(
            token,
            PendingCommand {
                token,
                text: command.text,
                callback: command.callback,
            },
        );

        (token, line)
    }

    /// Removes and returns the command registered with `token`.
    ///
    /// A token can only be resolved once.
    pub fn resolve(&mut self, token: u64) -> SessionResult<PendingCommand<T>> {
        self.pending
            .remove(&token)
            .ok_or(SessionError::UnmatchedToken(token))
    }

    /// Returns the number of commands waiting for their response.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns whether the command registered with `token` is still pending.
    pub fn is_pending(&self, token: u64) -> bool {
        self.pending.contains_key(&token)
    }
}

impl<T> Default for Dispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, Dispatcher};
    use crate::error::{SessionError, SessionResult};
    use crate::mi::{Response, ResultClass};

    #[derive(Default)]
    struct Log {
        calls: Vec<(&'static str, String)>,
    }

    fn on_first(log: &mut Log, response: Response) -> SessionResult<()> {
        log.calls.push(("first", response.msg().to_owned()));
        Ok(())
    }

    fn on_other(log: &mut Log, response: Response) -> SessionResult<()> {
        log.calls.push(("other", response.msg().to_owned()));
        Ok(())
    }

    #[test]
    fn tokens_are_unique_and_prefixed() {
        let mut dispatcher = Dispatcher::<Log>::new();

        let (t1, l1) = dispatcher.register(Command::new("attach 4242"));
        let (t2, l2) = dispatcher.register(Command::new("-exec-run"));

        assert_eq!((t1, l1.as_str()), (1, "1attach 4242"));
        assert_eq!((t2, l2.as_str()), (2, "2-exec-run"));
        assert_eq!(dispatcher.pending_count(), 2);
    }

    #[test]
    fn reverse_order_responses_match_their_command() {
        const N: u64 = 8;

        let mut dispatcher = Dispatcher::<Log>::new();
        let mut log = Log::default();

        let tokens = (0..N)
            .map(|i| {
                let cmd = Command::new(format!("-cmd-{i}"));
                let cmd = if i == 0 {
                    cmd.with_callback("on_first", on_first)
                } else {
                    cmd.with_callback("on_other", on_other)
                };
                dispatcher.register(cmd).0
            })
            .collect::<Vec<_>>();

        for &token in tokens.iter().rev() {
            let pending = dispatcher.resolve(token).expect("resolve");
            let text = pending.text.clone();
            pending
                .complete(&mut log, Response::new(ResultClass::Done).with_field("msg", text))
                .expect("complete");
        }

        assert_eq!(dispatcher.pending_count(), 0);
        assert_eq!(log.calls.len(), N as usize);

        // completed in reverse issue order, each with its own response
        for (i, (name, msg)) in log.calls.iter().rev().enumerate() {
            assert_eq!(msg, &format!("-cmd-{i}"));
            assert_eq!(*name, if i == 0 { "on_first" } else { "on_other" });
        }
    }

    #[test]
    fn token_resolves_only_once() {
        let mut dispatcher = Dispatcher::<Log>::new();
        let (token, _) = dispatcher.register(Command::new("-exec-run"));

        assert!(dispatcher.resolve(token).is_ok());
        assert!(!dispatcher.is_pending(token));
        assert_eq!(
            dispatcher.resolve(token).err(),
            Some(SessionError::UnmatchedToken(token))
        );
        assert_eq!(
            dispatcher.resolve(99).err(),
            Some(SessionError::UnmatchedToken(99))
        );
    }

    #[test]
    fn command_without_callback_is_acknowledged() {
        let mut dispatcher = Dispatcher::<Log>::new();
        let mut log = Log::default();

        let (token, _) = dispatcher.register(Command::new("target record"));
        let pending = dispatcher.resolve(token).expect("resolve");

        assert_eq!(pending.callback_name(), None);
        pending
            .complete(&mut log, Response::new(ResultClass::Done))
            .expect("complete");
        assert!(log.calls.is_empty());
    }
}
