use std::path::PathBuf;

use super::Controller;
use crate::engine::GdbEngine;
use crate::handler::EventHandler;
use crate::launcher::Launcher;
use crate::params::StartParameters;

/// Builder for [Controller].
///
/// It is usually created by calling [Controller::builder], and allows to
/// specify which launcher, event handler and target to use for a debugging
/// session.
pub struct Builder<S> {
    state: S,
}

impl Builder<NeedsLauncher> {
    pub(super) const fn new() -> Self {
        Self {
            state: NeedsLauncher,
        }
    }

    /// Specifies the launcher of the debugger process.
    pub const fn with_launcher<L: Launcher>(self, launcher: L) -> Builder<NeedsHandler<L>> {
        Builder {
            state: NeedsHandler { launcher },
        }
    }
}

impl<L: Launcher> Builder<NeedsHandler<L>> {
    /// Specifies the consumer of session events.
    pub fn with_event_handler<H: EventHandler>(self, handler: H) -> Builder<NeedsTarget<L, H>> {
        Builder {
            state: NeedsTarget {
                launcher: self.state.launcher,
                handler,
            },
        }
    }
}

impl<L, H> Builder<NeedsTarget<L, H>> {
    /// Specifies to attach to the running process `pid`.
    pub fn attach(self, pid: u64) -> Builder<Ready<L, H>> {
        self.with_start_parameters(StartParameters::attach(pid))
    }

    /// Specifies to launch the executable at path `executable`.
    pub fn launch(self, executable: impl Into<PathBuf>) -> Builder<Ready<L, H>> {
        self.with_start_parameters(StartParameters::launch(executable))
    }

    /// Specifies the full start configuration.
    pub fn with_start_parameters(self, params: StartParameters) -> Builder<Ready<L, H>> {
        Builder {
            state: Ready {
                launcher: self.state.launcher,
                handler: self.state.handler,
                params,
            },
        }
    }
}

impl<L, H> Builder<Ready<L, H>> {
    /// Adjusts the start configuration.
    ///
    /// ```
    /// # use gdbpilot_engine::Controller;
    /// # fn f<L: gdbpilot_engine::launcher::Launcher>(launcher: L) {
    /// let controller = Controller::builder()
    ///     .with_launcher(launcher)
    ///     .with_event_handler(())
    ///     .launch("/bin/ls")
    ///     .configure(|params| params.arg("-l").reverse_debugging(true))
    ///     .build();
    /// # }
    /// ```
    pub fn configure(mut self, f: impl FnOnce(StartParameters) -> StartParameters) -> Self {
        self.state.params = f(self.state.params);
        self
    }
}

impl<L: Launcher, H: EventHandler> Builder<Ready<L, H>> {
    /// Builds the controller.
    pub fn build(self) -> Controller<L, GdbEngine<H>> {
        let Ready {
            launcher,
            handler,
            params,
        } = self.state;

        Controller::new(launcher, GdbEngine::new(params, handler))
    }
}

/// Builder state: the launcher is missing.
pub struct NeedsLauncher;

/// Builder state: the event handler is missing.
pub struct NeedsHandler<L> {
    launcher: L,
}

/// Builder state: the target is missing.
pub struct NeedsTarget<L, H> {
    launcher: L,
    handler: H,
}

/// Builder state: ready to build.
pub struct Ready<L, H> {
    launcher: L,
    handler: H,
    params: StartParameters,
}
