use super::{AsyncKind, MiFields, MiValue, Record, Response, ResultClass, StreamKind};

/// Malformed GDB/MI output line.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("malformed MI record at column {column}: {reason}")]
pub struct ParseError {
    /// Byte offset where parsing failed.
    pub column: usize,

    /// What was expected at that offset.
    pub reason: &'static str,
}

/// Parses a single line of GDB/MI output.
///
/// The trailing newline (if any) is ignored.
pub fn parse_record(line: &str) -> Result<Record, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim_end() == "(gdb)" {
        return Ok(Record::Prompt);
    }

    let mut cursor = Cursor::new(line);
    let record = cursor.record()?;

    if !cursor.at_end() {
        return Err(cursor.error("trailing characters"));
    }

    Ok(record)
}

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: u8, reason: &'static str) -> Result<(), ParseError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(reason))
        }
    }

    const fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    const fn error(&self, reason: &'static str) -> ParseError {
        ParseError {
            column: self.pos,
            reason,
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;

        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }

        // only ASCII bytes were consumed
        std::str::from_utf8(&self.input[start..self.pos]).unwrap_or_default()
    }

    fn record(&mut self) -> Result<Record, ParseError> {
        let token = self.token()?;

        let Some(prefix) = self.bump() else {
            return Err(self.error("expected record prefix"));
        };

        let record = match prefix {
            b'^' => {
                let class_pos = self.pos;
                let class = self.class()?;
                let class = ResultClass::from_class(class).ok_or(ParseError {
                    column: class_pos,
                    reason: "unknown result class",
                })?;

                Record::Result {
                    token,
                    response: Response {
                        class,
                        data: self.trailing_results()?,
                    },
                }
            }
            b'*' | b'+' | b'=' => {
                let kind = match prefix {
                    b'*' => AsyncKind::Exec,
                    b'+' => AsyncKind::Status,
                    _ => AsyncKind::Notify,
                };

                Record::Async {
                    token,
                    kind,
                    class: self.class()?.to_owned(),
                    data: self.trailing_results()?,
                }
            }
            b'~' | b'@' | b'&' if token.is_none() => {
                let kind = match prefix {
                    b'~' => StreamKind::Console,
                    b'@' => StreamKind::Target,
                    _ => StreamKind::Log,
                };

                Record::Stream {
                    kind,
                    text: self.c_string()?,
                }
            }
            _ => {
                self.pos -= 1;
                return Err(self.error("expected record prefix"));
            }
        };

        Ok(record)
    }

    fn token(&mut self) -> Result<Option<u64>, ParseError> {
        let start = self.pos;
        let digits = self.take_while(|b| b.is_ascii_digit());

        if digits.is_empty() {
            return Ok(None);
        }

        digits.parse().map(Some).map_err(|_| ParseError {
            column: start,
            reason: "token out of range",
        })
    }

    fn class(&mut self) -> Result<&'a str, ParseError> {
        let class = self.take_while(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        if class.is_empty() {
            Err(self.error("expected record class"))
        } else {
            Ok(class)
        }
    }

    fn trailing_results(&mut self) -> Result<MiFields, ParseError> {
        let mut fields = Fields::default();
        let mut last_name: Option<String> = None;

        while self.eat(b',') {
            let (name, value) = match (self.peek(), last_name.take()) {
                // `bkpt={..},{..}`: extra tuples of a multiple-location breakpoint
                (Some(b'{'), Some(name)) => (name, self.tuple()?),
                _ => self.result()?,
            };

            last_name = Some(name.clone());
            fields.insert(name, value);
        }

        Ok(fields.into_inner())
    }

    fn result(&mut self) -> Result<(String, MiValue), ParseError> {
        let name = self.take_while(|b| !matches!(b, b'=' | b',' | b'{' | b'}' | b'[' | b']' | b'"'));

        if name.is_empty() {
            return Err(self.error("expected variable name"));
        }

        self.expect(b'=', "expected '='")?;

        Ok((name.to_owned(), self.value()?))
    }

    fn value(&mut self) -> Result<MiValue, ParseError> {
        match self.peek() {
            Some(b'"') => self.c_string().map(MiValue::Const),
            Some(b'{') => self.tuple(),
            Some(b'[') => self.list(),
            _ => Err(self.error("expected value")),
        }
    }

    fn tuple(&mut self) -> Result<MiValue, ParseError> {
        self.expect(b'{', "expected '{'")?;

        let mut fields = Fields::default();

        if self.eat(b'}') {
            return Ok(MiValue::Tuple(fields.into_inner()));
        }

        loop {
            let (name, value) = self.result()?;
            fields.insert(name, value);

            if self.eat(b'}') {
                return Ok(MiValue::Tuple(fields.into_inner()));
            }

            self.expect(b',', "expected ',' or '}'")?;
        }
    }

    fn list(&mut self) -> Result<MiValue, ParseError> {
        self.expect(b'[', "expected '['")?;

        let mut values = Vec::new();

        if self.eat(b']') {
            return Ok(MiValue::List(values));
        }

        loop {
            let value = if matches!(self.peek(), Some(b'"' | b'{' | b'[')) {
                self.value()?
            } else {
                let (name, value) = self.result()?;
                MiValue::Tuple(MiFields::from([(name, value)]))
            };

            values.push(value);

            if self.eat(b']') {
                return Ok(MiValue::List(values));
            }

            self.expect(b',', "expected ',' or ']'")?;
        }
    }

    fn c_string(&mut self) -> Result<String, ParseError> {
        self.expect(b'"', "expected '\"'")?;

        let mut buf = Vec::new();

        loop {
            let Some(b) = self.bump() else {
                return Err(self.error("unterminated string"));
            };

            match b {
                b'"' => break,
                b'\\' => {
                    let Some(escaped) = self.bump() else {
                        return Err(self.error("unterminated escape"));
                    };

                    let unescaped = match escaped {
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'r' => b'\r',
                        b'a' => 0x07,
                        b'b' => 0x08,
                        b'f' => 0x0c,
                        b'v' => 0x0b,
                        b'e' => 0x1b,
                        b'0'..=b'7' => self.octal_escape(escaped),
                        other => other,
                    };

                    buf.push(unescaped);
                }
                b => buf.push(b),
            }
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Decodes up to three octal digits, the first one being already consumed.
    fn octal_escape(&mut self, first: u8) -> u8 {
        let mut value = u32::from(first - b'0');

        for _ in 0..2 {
            match self.peek() {
                Some(d @ b'0'..=b'7') => {
                    self.pos += 1;
                    value = value * 8 + u32::from(d - b'0');
                }
                _ => break,
            }
        }

        (value & 0xff) as u8
    }
}

/// Fields being parsed, where a repeated name gathers all of its values into
/// a list rather than keeping the last one.
#[derive(Default)]
struct Fields {
    fields: MiFields,

    /// Names whose value is a list of repeated values.
    repeated: Vec<String>,
}

impl Fields {
    fn insert(&mut self, name: String, value: MiValue) {
        let Some(existing) = self.fields.get_mut(&name) else {
            self.fields.insert(name, value);
            return;
        };

        if self.repeated.contains(&name) {
            if let MiValue::List(values) = existing {
                values.push(value);
            }
        } else {
            let first = std::mem::replace(existing, MiValue::List(Vec::new()));
            *existing = MiValue::List(vec![first, value]);
            self.repeated.push(name);
        }
    }

    fn into_inner(self) -> MiFields {
        self.fields
    }
}
