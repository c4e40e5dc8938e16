use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Arguments always passed to the debugger, before any user-specified one.
pub const DEFAULT_DEBUGGER_ARGS: [&str; 3] = ["--interpreter=mi2", "--nx", "--quiet"];

/// Process to debug.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Attach to an already running process.
    Attach {
        /// ID of the process to attach.
        pid: u64,
    },

    /// Load an executable and start it.
    Launch {
        /// Path of the executable.
        executable: PathBuf,
    },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attach { pid } => write!(f, "pid {pid}"),
            Self::Launch { executable } => write!(f, "{}", executable.display()),
        }
    }
}

/// How the session was started, which affects the wording of diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartMode {
    /// Process started by the debugger itself.
    #[default]
    StartInternal,

    /// Process started outside of the debugger.
    AttachExternal,
}

/// Start configuration of a debugging session.
#[derive(Clone, Debug)]
pub struct StartParameters {
    /// Process to debug.
    pub target: Target,

    /// Program arguments of the inferior (ignored when attaching).
    pub args: Vec<String>,

    /// Environment variables of the debugger process.
    pub env: CommandEnv,

    /// Working directory of the debugger process.
    pub current_dir: Option<PathBuf>,

    /// How the session was started.
    pub start_mode: StartMode,

    /// Start the inferior with `-exec-continue` rather than `-exec-run`.
    pub use_continue_instead_of_run: bool,

    /// Enable process recording once the inferior runs.
    pub reverse_debugging: bool,

    /// Debugger program.
    pub debugger: PathBuf,

    /// Additional debugger arguments.
    pub debugger_args: Vec<String>,
}

impl StartParameters {
    /// Creates parameters for attaching to the running process `pid`.
    pub fn attach(pid: u64) -> Self {
        Self::new(Target::Attach { pid }).start_mode(StartMode::AttachExternal)
    }

    /// Creates parameters for launching the executable at path `executable`.
    ///
    /// By default, no argument is passed to the executable and the debugger
    /// inherits the current process's environment and working directory.
    pub fn launch(executable: impl Into<PathBuf>) -> Self {
        Self::new(Target::Launch {
            executable: executable.into(),
        })
    }

    fn new(target: Target) -> Self {
        Self {
            target,
            args: Vec::new(),
            env: CommandEnv::Inherit(BTreeMap::new()),
            current_dir: None,
            start_mode: StartMode::default(),
            use_continue_instead_of_run: false,
            reverse_debugging: false,
            debugger: "gdb".into(),
            debugger_args: Vec::new(),
        }
    }

    /// Adds an argument to pass to the inferior.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments to pass to the inferior.
    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        args.into_iter().fold(self, |params, arg| params.arg(arg))
    }

    /// Inserts or updates an explicit environment variable mapping of the
    /// debugger process.
    ///
    /// Variables explicitly set take precedence over inherited ones.
    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        match self.env {
            CommandEnv::Inherit(ref mut env) => {
                env.insert(key.into(), Some(val.into()));
            }
            CommandEnv::NoInherit(ref mut env) => {
                env.insert(key.into(), val.into());
            }
        }

        self
    }

    /// Inserts or updates multiple explicit environment variable mappings.
    pub fn envs<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        vars.into_iter().fold(self, |params, (k, v)| params.env(k, v))
    }

    /// Removes an explicitly set environment variable and prevents inheriting
    /// it from the current process.
    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        match self.env {
            CommandEnv::Inherit(ref mut env) => {
                env.insert(key.into(), None);
            }
            CommandEnv::NoInherit(ref mut env) => {
                env.remove(&key.into());
            }
        }

        self
    }

    /// Clears all explicitly set environment variables and prevents inheriting
    /// any of the current process.
    pub fn env_clear(mut self) -> Self {
        self.env = CommandEnv::NoInherit(BTreeMap::new());
        self
    }

    /// Sets the working directory of the debugger process.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Sets the start mode.
    pub fn start_mode(mut self, mode: StartMode) -> Self {
        self.start_mode = mode;
        self
    }

    /// Starts the inferior with `-exec-continue` rather than `-exec-run`.
    pub fn use_continue_instead_of_run(mut self, enable: bool) -> Self {
        self.use_continue_instead_of_run = enable;
        self
    }

    /// Enables process recording once the inferior runs.
    pub fn reverse_debugging(mut self, enable: bool) -> Self {
        self.reverse_debugging = enable;
        self
    }

    /// Sets the debugger program (`gdb` by default).
    pub fn debugger(mut self, program: impl Into<PathBuf>) -> Self {
        self.debugger = program.into();
        self
    }

    /// Adds an argument to pass to the debugger.
    pub fn debugger_arg(mut self, arg: impl Into<String>) -> Self {
        self.debugger_args.push(arg.into());
        self
    }

    /// Returns how to start the debugger process.
    pub fn launch_spec(&self) -> LaunchSpec {
        let args = DEFAULT_DEBUGGER_ARGS
            .iter()
            .map(|arg| (*arg).to_owned())
            .chain(self.debugger_args.iter().cloned())
            .collect();

        LaunchSpec {
            program: self.debugger.clone(),
            args,
            env: self.env.captured(),
            current_dir: self.current_dir.clone(),
            inferior_tty: matches!(self.target, Target::Launch { .. }),
        }
    }
}

/// Environment variables attached to [StartParameters].
#[derive(Clone, Debug)]
pub enum CommandEnv {
    /// Environment variables the debugger will have, in addition to the ones
    /// inherited from the current process.
    ///
    /// A `None` value indicates that the environment variable will be removed
    /// from the debugger process, even if it was inherited.
    Inherit(BTreeMap<String, Option<String>>),

    /// Environment variables the debugger will have, without inheriting any
    /// from the current process.
    NoInherit(BTreeMap<String, String>),
}

impl CommandEnv {
    /// Captures the current environment with the specified changes applied.
    ///
    /// `None` means the environment is inherited unchanged.
    pub fn captured(&self) -> Option<BTreeMap<String, String>> {
        let mut captured_env = BTreeMap::new();

        match self {
            Self::Inherit(env) if env.is_empty() => return None,
            Self::Inherit(env) => {
                captured_env.extend(std::env::vars());
                for (k, v) in env {
                    if let Some(v) = v {
                        captured_env.insert(k.clone(), v.clone());
                    } else {
                        captured_env.remove(k);
                    }
                }
            }
            Self::NoInherit(env) => {
                captured_env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        Some(captured_env)
    }
}

/// Specification of the debugger process to start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Debugger program.
    pub program: PathBuf,

    /// Debugger arguments.
    pub args: Vec<String>,

    /// Full environment of the debugger (`None` to inherit).
    pub env: Option<BTreeMap<String, String>>,

    /// Working directory of the debugger (`None` to inherit).
    pub current_dir: Option<PathBuf>,

    /// Whether the inferior started by the debugger needs a terminal of its
    /// own, so that its I/O doesn't mix with the GDB/MI dialog.
    pub inferior_tty: bool,
}

#[cfg(test)]
mod tests {
    use super::{StartMode, StartParameters, Target};

    #[test]
    fn attach_defaults() {
        let params = StartParameters::attach(4242);

        assert_eq!(params.target, Target::Attach { pid: 4242 });
        assert_eq!(params.start_mode, StartMode::AttachExternal);
        assert!(!params.use_continue_instead_of_run);

        let spec = params.launch_spec();
        assert_eq!(spec.program.to_str(), Some("gdb"));
        assert_eq!(spec.args, ["--interpreter=mi2", "--nx", "--quiet"]);
        assert_eq!(spec.env, None);
        assert_eq!(spec.current_dir, None);
        assert!(!spec.inferior_tty);
    }

    #[test]
    fn launch_spec_applies_overrides() {
        let spec = StartParameters::launch("/bin/true")
            .args(["a", "b c"])
            .env_clear()
            .env("FOO", "1")
            .envs([("BAR", "2"), ("BAZ", "3")])
            .env_remove("BAZ")
            .current_dir("/tmp")
            .debugger("/opt/gdb")
            .debugger_arg("--batch-silent")
            .launch_spec();

        assert_eq!(spec.program.to_str(), Some("/opt/gdb"));
        assert_eq!(spec.args.last().map(String::as_str), Some("--batch-silent"));

        let env = spec.env.expect("captured env");
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("FOO").map(String::as_str), Some("1"));
        assert_eq!(env.get("BAR").map(String::as_str), Some("2"));

        assert_eq!(spec.current_dir.as_deref().and_then(|p| p.to_str()), Some("/tmp"));
        assert!(spec.inferior_tty);
    }

    #[test]
    fn inherited_env_removal() {
        let env = StartParameters::launch("a.out")
            .env("GDBPILOT_TEST_SET", "x")
            .env_remove("PATH")
            .launch_spec()
            .env
            .expect("captured env");

        assert_eq!(env.get("GDBPILOT_TEST_SET").map(String::as_str), Some("x"));
        assert!(!env.contains_key("PATH"));
    }
}
