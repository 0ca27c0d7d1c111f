//! Types for value formatters.
//!
//! Value formatters decide how a property is written when it is emitted with
//! `{{ ... }}`. They can be configured on the engine using
//! [`set_default_formatter`][crate::Engine::set_default_formatter] or
//! [`add_formatter`][crate::Engine::add_formatter].
//!
//! Slot content is never passed through a formatter. A slot holds markup that
//! was already rendered by the caller, so it is always emitted verbatim.
//!
//! All formatter functions must have the following signature.
//!
//! ```text
//! use slotted::{Value, fmt};
//! Fn(&mut fmt::Formatter<'_>, &Value) -> fmt::Result;
//! ```
//!
//! # Examples
//!
//! ### Escape HTML
//!
//! Components usually produce HTML, so a common setup is to escape every
//! property by default while slots pass through untouched.
//!
//! ```
//! use std::fmt::Write;
//! use slotted::{fmt, Engine, Value};
//!
//! fn escape_html(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
//!     match value {
//!         Value::String(s) => {
//!             for c in s.chars() {
//!                 match c {
//!                     '<' => f.write_str("&lt;")?,
//!                     '>' => f.write_str("&gt;")?,
//!                     '&' => f.write_str("&amp;")?,
//!                     '"' => f.write_str("&quot;")?,
//!                     c => f.write_char(c)?,
//!                 }
//!             }
//!             Ok(())
//!         }
//!         v => fmt::default(f, v),
//!     }
//! }
//!
//! let mut engine = Engine::new();
//! engine.set_default_formatter(&escape_html);
//! engine.add_template("greeting", "<p>{{ name }}</p>{{ slot }}");
//!
//! let result = engine.render_source(
//!     r#"{% component "greeting" name: "<Ann>" %}<b>hi</b>{% endcomponent "greeting" %}"#,
//!     slotted::value! {},
//! )?;
//! assert_eq!(result, "<p>&lt;Ann&gt;</p><b>hi</b>");
//! # Ok::<(), slotted::Error>(())
//! ```

use std::fmt;
use std::fmt::Write;

use crate::Value;

/// A formatter function or closure.
pub(crate) type FormatFn = dyn Fn(&mut Formatter<'_>, &Value) -> Result + Sync + Send + 'static;

/// A [`std::fmt::Write`] façade.
pub struct Formatter<'a> {
    buf: &'a mut (dyn fmt::Write + 'a),
}

/// The result type returned from a formatter function.
pub type Result = std::result::Result<(), Error>;

/// The error type returned from a formatter function.
#[derive(Debug, Clone)]
pub struct Error(Option<String>);

impl<'a> Formatter<'a> {
    pub(crate) fn with_string(buf: &'a mut String) -> Self {
        Self { buf }
    }
}

impl fmt::Write for Formatter<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        fmt::Write::write_str(self.buf, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> fmt::Result {
        fmt::Write::write_char(self.buf, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        fmt::Write::write_fmt(self.buf, args)
    }
}

impl Error {
    pub(crate) fn message(self) -> Option<String> {
        self.0
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(msg) => write!(f, "{msg}"),
            None => write!(f, "format error"),
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Self(Some(msg.to_owned()))
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Self(Some(msg))
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Self(None)
    }
}

/// The default value formatter.
///
/// Values are formatted as follows:
/// - [`Value::None`]: empty string
/// - [`Value::Bool`]: `true` or `false`
/// - [`Value::Integer`]: the integer formatted using [`Display`][std::fmt::Display]
/// - [`Value::Float`]: the float formatted using [`Display`][std::fmt::Display]
/// - [`Value::String`]: the string, unescaped
///
/// Errors if the value is a [`Value::List`] or [`Value::Map`].
#[inline]
pub fn default(f: &mut Formatter<'_>, value: &Value) -> Result {
    match value {
        Value::None => {}
        Value::Bool(b) => write!(f, "{b}")?,
        Value::Integer(n) => write!(f, "{n}")?,
        Value::Float(n) => write!(f, "{n}")?,
        Value::String(s) => f.write_str(s)?,
        value => {
            return Err(Error::from(format!(
                "expression evaluated to unformattable type {}",
                value.human()
            )));
        }
    }
    Ok(())
}
