use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use gdbpilot_engine::LaunchSpec;
use gdbpilot_engine::launcher::{Channel, Launcher, Output};

/// Answers a command (token, command line) with debugger output lines.
type Responder = Box<dyn FnMut(u64, &str) -> Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("launch refused")]
    LaunchRefused,

    #[error("no such process: {0}")]
    NoSuchProcess(u64),
}

/// Everything the session did with the scripted debugger.
#[derive(Debug, Default)]
pub struct Transcript {
    pub spec: Option<LaunchSpec>,
    pub sent: Vec<String>,
    pub interrupted: Vec<u64>,
    pub terminated: bool,
}

pub struct ScriptedLauncher {
    responder: Option<Responder>,
    greeting: Vec<String>,
    close_when_idle: bool,
    inferior_gone: bool,
    transcript: Arc<Mutex<Transcript>>,
}

impl ScriptedLauncher {
    pub fn new(responder: impl FnMut(u64, &str) -> Vec<String> + 'static) -> Self {
        Self {
            responder: Some(Box::new(responder)),
            greeting: Vec::new(),
            close_when_idle: false,
            inferior_gone: false,
            transcript: Arc::default(),
        }
    }

    /// Launcher failing to start the debugger.
    pub fn refusing() -> Self {
        Self {
            responder: None,
            ..Self::new(|_, _| Vec::new())
        }
    }

    /// Output available right after the launch.
    pub fn with_greeting(mut self, lines: &[&str]) -> Self {
        self.greeting = lines.iter().map(|line| (*line).to_owned()).collect();
        self
    }

    /// Closes the output stream once every line was received.
    pub fn close_when_idle(mut self) -> Self {
        self.close_when_idle = true;
        self
    }

    /// The inferior exits right before any interrupt, so signals fail.
    pub fn with_inferior_gone(mut self) -> Self {
        self.inferior_gone = true;
        self
    }

    pub fn transcript(&self) -> Arc<Mutex<Transcript>> {
        Arc::clone(&self.transcript)
    }
}

impl Launcher for ScriptedLauncher {
    type Channel = ScriptedChannel;
    type Error = Error;

    async fn launch(&mut self, spec: LaunchSpec) -> Result<Self::Channel, Self::Error> {
        self.transcript.lock().unwrap().spec = Some(spec);

        let responder = self.responder.take().ok_or(Error::LaunchRefused)?;

        Ok(ScriptedChannel {
            responder,
            queue: self.greeting.drain(..).collect(),
            close_when_idle: self.close_when_idle,
            inferior_gone: self.inferior_gone,
            transcript: Arc::clone(&self.transcript),
        })
    }
}

pub struct ScriptedChannel {
    responder: Responder,
    queue: VecDeque<String>,
    close_when_idle: bool,
    inferior_gone: bool,
    transcript: Arc<Mutex<Transcript>>,
}

impl Channel for ScriptedChannel {
    type Error = Error;

    async fn send(&mut self, line: &str) -> Result<(), Self::Error> {
        self.transcript.lock().unwrap().sent.push(line.to_owned());

        let digits = line
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(line.len());
        let token = line[..digits].parse().unwrap_or(0);

        let output = (self.responder)(token, &line[digits..]);
        self.queue.extend(output);

        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Output>, Self::Error> {
        if let Some(line) = self.queue.pop_front() {
            return Ok(Some(Output::Debugger(line)));
        }

        if self.close_when_idle {
            return Ok(None);
        }

        std::future::pending().await
    }

    fn interrupt(&mut self, pid: u64) -> Result<(), Self::Error> {
        if self.inferior_gone {
            self.queue
                .push_back(r#"*stopped,reason="exited",exit-code="01""#.to_owned());
            return Err(Error::NoSuchProcess(pid));
        }

        self.transcript.lock().unwrap().interrupted.push(pid);

        self.queue.push_back(
            r#"*stopped,reason="signal-received",signal-name="SIGINT",thread-id="1""#.to_owned(),
        );

        Ok(())
    }

    async fn terminate(&mut self) -> Result<(), Self::Error> {
        self.transcript.lock().unwrap().terminated = true;
        Ok(())
    }
}
