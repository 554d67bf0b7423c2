//! Value-to-source serialization.
//!
//! The assembly plugin only needs "turn this value into an expression"; the
//! [`Serializer`] trait keeps the chosen textual form out of the plugin.
//! [`JsSerializer`] emits JSON, which is a valid JavaScript expression, with
//! the characters that are unsafe inside inline scripts escaped.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};

use crate::error::{Error, Result};

/// Turns configuration values into source text.
pub trait Serializer: Send + Sync {
    /// Serialize `value` into an expression.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` when the value has no textual form.
    fn serialize(&self, value: &Value) -> Result<String>;
}

/// JSON-flavoured JavaScript serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsSerializer {
    indent: usize,
}

impl Default for JsSerializer {
    fn default() -> Self {
        Self::pretty(2)
    }
}

impl JsSerializer {
    /// Multi-line output indented by `indent` spaces.
    pub fn pretty(indent: usize) -> Self {
        Self { indent }
    }

    /// Single-line output.
    pub fn compact() -> Self {
        Self { indent: 0 }
    }

    fn write_with<F: Formatter>(value: &Value, formatter: F) -> Result<String> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value
            .serialize(&mut ser)
            .map_err(|e| Error::serialization("value", e))?;
        String::from_utf8(buf).map_err(|e| Error::serialization("value", e))
    }
}

impl Serializer for JsSerializer {
    fn serialize(&self, value: &Value) -> Result<String> {
        let text = if self.indent == 0 {
            Self::write_with(value, CompactFormatter)?
        } else {
            let indent = " ".repeat(self.indent);
            Self::write_with(value, PrettyFormatter::with_indent(indent.as_bytes()))?
        };
        Ok(escape_unsafe_chars(&text))
    }
}

/// Escape characters that would end an inline `<script>` or break a line.
///
/// In JSON output these can only occur inside string literals, where the
/// `\uXXXX` form is equivalent.
pub fn escape_unsafe_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(ch),
        }
    }
    out
}

/// Convert any serializable value, naming `what` in the error.
pub fn to_value<T: Serialize + ?Sized>(what: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::serialization(what, e))
}
