use crate::dialect::EscapeStyle;
use crate::error::{DbHelperError, Result};
use crate::types::{SqlValue, StatementWriter};

/// A WHERE clause template (without the `WHERE` keyword) with positional
/// `?` placeholders and the arguments that fill them, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    template: String,
    args: Vec<SqlValue>,
}

#[derive(Clone, Copy)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backtick,
    LineComment,
    BlockComment,
}

impl WhereClause {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, value: impl Into<SqlValue>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn arguments(&self) -> &[SqlValue] {
        &self.args
    }

    /// Writes ` WHERE <template>` with every placeholder bound to its
    /// argument. Fails without writing anything when the number of
    /// placeholders and arguments differ.
    pub(crate) fn write(&self, w: &mut StatementWriter<'_>) -> Result<()> {
        let positions = placeholder_positions(&self.template, w.dialect().escaping);
        if positions.len() != self.args.len() {
            return Err(DbHelperError::PlaceholderMismatch {
                expected: positions.len(),
                actual: self.args.len(),
            });
        }

        w.push_str(" WHERE ");
        let mut last = 0;
        for (pos, arg) in positions.iter().zip(&self.args) {
            w.push_str(&self.template[last..*pos]);
            w.push_param(arg);
            last = pos + 1;
        }
        w.push_str(&self.template[last..]);
        Ok(())
    }
}

/// Writes an optional WHERE clause built from a template and its arguments.
/// A missing template writes nothing and ignores the arguments.
pub(crate) fn write_where(
    w: &mut StatementWriter<'_>,
    template: Option<&str>,
    args: &[SqlValue],
) -> Result<()> {
    match template {
        Some(t) => WhereClause::new(t).args(args.iter().cloned()).write(w),
        None => Ok(()),
    }
}

/// Byte offsets of every `?` that is a placeholder, skipping quoted spans
/// and comments.
fn placeholder_positions(template: &str, escaping: EscapeStyle) -> Vec<usize> {
    let bytes = template.as_bytes();
    let mut positions = Vec::new();
    let mut state = State::Normal;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Normal => match b {
                b'?' => positions.push(i),
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::Backtick,
                b'-' if next == Some(b'-') => {
                    state = State::LineComment;
                    i += 1;
                }
                b'/' if next == Some(b'*') => {
                    state = State::BlockComment;
                    i += 1;
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted => {
                let quote = if matches!(state, State::SingleQuoted) {
                    b'\''
                } else {
                    b'"'
                };
                if b == b'\\' && escaping == EscapeStyle::Backslash {
                    i += 1;
                } else if b == quote {
                    state = State::Normal;
                }
            }
            State::Backtick => {
                if b == b'`' {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    state = State::Normal;
                    i += 1;
                }
            }
        }
        i += 1;
    }

    positions
}
