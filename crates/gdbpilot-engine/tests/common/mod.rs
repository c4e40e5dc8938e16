mod handler;
mod launcher;

pub use self::handler::{Event, RecordingHandler};
pub use self::launcher::{Error as LaunchError, ScriptedLauncher};
