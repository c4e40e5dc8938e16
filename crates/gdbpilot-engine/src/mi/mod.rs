mod parser;

use std::fmt;

use indexmap::IndexMap;

pub use self::parser::{ParseError, parse_record};

/// Named fields of a result or async record, in emission order.
pub type MiFields = IndexMap<String, MiValue>;

/// Value of a GDB/MI result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MiValue {
    /// C-string constant (already unescaped).
    Const(String),

    /// `{name=value,...}`
    Tuple(MiFields),

    /// `[value,...]`
    ///
    /// A list of `name=value` results is stored as a list of single-entry
    /// tuples.
    List(Vec<MiValue>),
}

impl MiValue {
    /// Returns the constant held by this value, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Const(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the field `name` of this tuple, if any.
    pub fn get(&self, name: &str) -> Option<&MiValue> {
        match self {
            Self::Tuple(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Returns the elements of this list (or an empty slice).
    pub fn as_list(&self) -> &[MiValue] {
        match self {
            Self::List(values) => values,
            _ => &[],
        }
    }
}

/// Categorical outcome of a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultClass {
    /// `^done`
    Done,

    /// `^running`
    Running,

    /// `^connected`
    Connected,

    /// `^error`
    Error,

    /// `^exit`
    Exit,
}

impl ResultClass {
    fn from_class(class: &str) -> Option<Self> {
        let class = match class {
            "done" => Self::Done,
            "running" => Self::Running,
            "connected" => Self::Connected,
            "error" => Self::Error,
            "exit" => Self::Exit,
            _ => return None,
        };

        Some(class)
    }
}

impl fmt::Display for ResultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Done => "done",
            Self::Running => "running",
            Self::Connected => "connected",
            Self::Error => "error",
            Self::Exit => "exit",
        };

        f.write_str(s)
    }
}

/// Parsed response to a single command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    /// Result classification.
    pub class: ResultClass,

    /// Named fields attached to the result.
    pub data: MiFields,
}

impl Response {
    /// Creates a response without any field.
    pub fn new(class: ResultClass) -> Self {
        Self {
            class,
            data: MiFields::new(),
        }
    }

    /// Adds a constant field to this response.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(name.into(), MiValue::Const(value.into()));
        self
    }

    /// Returns the constant field `name`, if any.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(MiValue::as_str)
    }

    /// Returns the `msg` field, or an empty string.
    pub fn msg(&self) -> &str {
        self.field("msg").unwrap_or_default()
    }
}

/// Kind of an asynchronous record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsyncKind {
    /// `*`: execution state changes of the inferior.
    Exec,

    /// `+`: progress of slow operations.
    Status,

    /// `=`: supplementary information (threads, libraries, ...).
    Notify,
}

/// Kind of a stream record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    /// `~`: CLI console output.
    Console,

    /// `@`: output of the inferior.
    Target,

    /// `&`: internal debugger log.
    Log,
}

/// Single line of GDB/MI output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    /// Result of a previously issued command.
    Result {
        /// Token of the originating command.
        token: Option<u64>,

        /// Parsed response.
        response: Response,
    },

    /// Asynchronous notification.
    Async {
        /// Token of the command responsible for the notification, if any.
        token: Option<u64>,

        /// Kind of notification.
        kind: AsyncKind,

        /// Notification class (e.g., `stopped`).
        class: String,

        /// Named fields attached to the notification.
        data: MiFields,
    },

    /// Textual output.
    Stream {
        /// Output channel.
        kind: StreamKind,

        /// Unescaped text.
        text: String,
    },

    /// The `(gdb)` prompt.
    Prompt,
}

/// Quotes `s` as a C-string, for use within a command line.
pub fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');

    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}
