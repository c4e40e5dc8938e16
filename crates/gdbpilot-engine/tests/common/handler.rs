use gdbpilot_engine::{EventHandler, MessageChannel, SessionError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Status(String),
    Prepared,
    Started,
    Stopped(Option<String>),
    Exited(Option<i32>),
    Failed(SessionError),
}

#[derive(Default)]
pub struct RecordingHandler {
    pub events: Vec<Event>,
    pub messages: Vec<(String, MessageChannel)>,
}

impl RecordingHandler {
    pub fn count(&self, event: &Event) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl EventHandler for RecordingHandler {
    fn show_message(&mut self, text: &str, channel: MessageChannel) {
        self.messages.push((text.to_owned(), channel));
    }

    fn show_status(&mut self, text: &str) {
        self.events.push(Event::Status(text.to_owned()));
    }

    fn inferior_prepared(&mut self) {
        self.events.push(Event::Prepared);
    }

    fn inferior_started(&mut self) {
        self.events.push(Event::Started);
    }

    fn inferior_stopped(&mut self, reason: Option<&str>) {
        self.events.push(Event::Stopped(reason.map(str::to_owned)));
    }

    fn inferior_exited(&mut self, exit_code: Option<i32>) {
        self.events.push(Event::Exited(exit_code));
    }

    fn session_failed(&mut self, error: &SessionError) {
        self.events.push(Event::Failed(error.clone()));
    }
}
