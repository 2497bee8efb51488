use crate::types::SqlValue;

/// How bound parameters are written into a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// Anonymous `?` placeholders (MySQL, SQLite).
    Question,
    /// Numbered `$1`, `$2` placeholders (PostgreSQL).
    Numbered,
}

/// How string contents are escaped inside a single-quoted literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeStyle {
    /// MySQL `real_escape_string` rules: backslash-escape NUL, newline,
    /// carriage return, backslash, both quotes and Ctrl-Z.
    Backslash,
    /// SQL standard: double the single quote, nothing else.
    Standard,
}

/// The SQL flavor a driver speaks: placeholders, identifier quoting and
/// literal escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub placeholders: PlaceholderStyle,
    pub identifier_quote: char,
    pub escaping: EscapeStyle,
}

impl Dialect {
    pub const fn mysql() -> Self {
        Self {
            placeholders: PlaceholderStyle::Question,
            identifier_quote: '`',
            escaping: EscapeStyle::Backslash,
        }
    }

    pub const fn postgres() -> Self {
        Self {
            placeholders: PlaceholderStyle::Numbered,
            identifier_quote: '"',
            escaping: EscapeStyle::Standard,
        }
    }

    pub const fn sqlite() -> Self {
        Self {
            placeholders: PlaceholderStyle::Question,
            identifier_quote: '"',
            escaping: EscapeStyle::Standard,
        }
    }

    /// Escape `value` for use between single quotes.
    pub fn escape(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 8);
        match self.escaping {
            EscapeStyle::Backslash => {
                for ch in value.chars() {
                    match ch {
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        '\x1a' => out.push_str("\\Z"),
                        c => out.push(c),
                    }
                }
            }
            EscapeStyle::Standard => {
                for ch in value.chars() {
                    if ch == '\'' {
                        out.push('\'');
                    }
                    out.push(ch);
                }
            }
        }
        out
    }

    /// Quote a column name, doubling any embedded quote character.
    pub fn quote_identifier(&self, name: &str) -> String {
        let q = self.identifier_quote;
        let mut out = String::with_capacity(name.len() + 2);
        out.push(q);
        for ch in name.chars() {
            if ch == q {
                out.push(q);
            }
            out.push(ch);
        }
        out.push(q);
        out
    }

    /// Render a value as a literal: `NULL`, or the escaped text in single
    /// quotes (numbers and booleans included).
    pub fn literal(&self, value: &SqlValue) -> String {
        literal_with(value, &|s: &str| self.escape(s))
    }

    /// Placeholder text for the parameter at 1-based position `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self.placeholders {
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Numbered => format!("${}", index),
        }
    }
}

/// Render a value as a literal using `escape` for the quoted text.
pub fn literal_with(value: &SqlValue, escape: &dyn Fn(&str) -> String) -> String {
    match value.as_literal_text() {
        Some(text) => format!("'{}'", escape(&text)),
        None => "NULL".to_string(),
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::mysql()
    }
}
