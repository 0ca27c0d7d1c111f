use std::cmp::max;
use std::fmt;
use std::io;

use crate::types::span::Span;

/// An error that can occur while driving components or evaluating markup.
///
/// Use [`.kind()`][Error::kind] to inspect what went wrong, for example to
/// recover the names involved in a nesting violation.
///
/// The [`Display`][fmt::Display] implementation prints a one line summary.
/// The alternate form (`{:#}`) additionally prints the offending markup with
/// the problem underlined, if the error came from markup.
pub struct Error {
    kind: ErrorKind,
    component: Option<String>,
    reason: Option<String>,
    pretty: Option<Pretty>,
}

/// The category of an [`Error`].
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A component was closed that is not the innermost open component.
    StackMismatch {
        /// The innermost open component.
        open: String,
        /// The component the caller tried to close.
        close: String,
    },

    /// A slot was closed that is not the innermost open slot.
    SlotMismatch {
        /// The innermost open slot.
        open: String,
        /// The slot the caller tried to close.
        close: String,
    },

    /// A component was closed, or a slot opened, with no component open.
    NoOpenComponent,

    /// A slot was closed with no slot open in the current component.
    NoOpenSlot,

    /// A component was closed while one of its slots was still open.
    UnclosedSlot {
        /// The component being closed.
        component: String,
        /// The slot left open.
        slot: String,
    },

    /// A render or component body finished with a component still open.
    UnclosedComponent {
        /// The outermost component left open.
        name: String,
    },

    /// A slot name clashes with a property name or the default slot name.
    NameCollision {
        /// The clashing name.
        name: String,
    },

    /// The resolver does not know the component.
    UnknownComponent {
        /// The requested component.
        name: String,
    },

    /// An empty name or a non-map property bag was given.
    InvalidArgument,

    /// Component bodies rendered other components too deeply.
    MaxDepth(usize),

    /// The markup could not be parsed.
    Syntax,

    /// The markup could not be evaluated.
    Render,

    /// A value formatter failed.
    Format,

    /// Converting data into a [`Value`][crate::Value] failed.
    #[cfg(feature = "serde")]
    Serialize,

    /// Reading a template or writing output failed.
    Io(io::Error),
}

struct Pretty {
    source: String,
    span: Span,
}

impl Error {
    fn new(kind: ErrorKind, reason: impl Into<Option<String>>) -> Self {
        Self {
            kind,
            component: None,
            reason: reason.into(),
            pretty: None,
        }
    }

    pub(crate) fn stack_mismatch(open: &str, close: &str) -> Self {
        let reason =
            format!("trying to close `{close}` but `{open}` is the innermost open component");
        let kind = ErrorKind::StackMismatch {
            open: open.to_owned(),
            close: close.to_owned(),
        };
        Self::new(kind, reason)
    }

    pub(crate) fn slot_mismatch(open: &str, close: &str) -> Self {
        let reason =
            format!("trying to end slot `{close}` but `{open}` is the innermost open slot");
        let kind = ErrorKind::SlotMismatch {
            open: open.to_owned(),
            close: close.to_owned(),
        };
        Self::new(kind, reason)
    }

    pub(crate) fn no_open_component(action: &str, name: &str) -> Self {
        let reason = format!("cannot {action} `{name}`, no component is open");
        Self::new(ErrorKind::NoOpenComponent, reason)
    }

    pub(crate) fn no_open_slot(name: &str) -> Self {
        let reason = format!("cannot end slot `{name}`, no slot is open");
        Self::new(ErrorKind::NoOpenSlot, reason)
    }

    pub(crate) fn unclosed_slot(component: &str, slot: &str) -> Self {
        let reason = format!("slot `{slot}` is still open");
        let kind = ErrorKind::UnclosedSlot {
            component: component.to_owned(),
            slot: slot.to_owned(),
        };
        Self::new(kind, reason).with_component(component)
    }

    pub(crate) fn unclosed_component(name: &str) -> Self {
        let reason = format!("component `{name}` was never closed");
        let kind = ErrorKind::UnclosedComponent {
            name: name.to_owned(),
        };
        Self::new(kind, reason)
    }

    pub(crate) fn name_collision(component: &str, name: &str) -> Self {
        let reason =
            format!("`{name}` is bound both as a slot and as a property or the default slot");
        let kind = ErrorKind::NameCollision {
            name: name.to_owned(),
        };
        Self::new(kind, reason).with_component(component)
    }

    pub(crate) fn unknown_component(name: &str) -> Self {
        let kind = ErrorKind::UnknownComponent {
            name: name.to_owned(),
        };
        Self::new(kind, format!("unknown component `{name}`"))
    }

    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, reason.into())
    }

    pub(crate) fn max_depth(max: usize) -> Self {
        let reason = format!("reached maximum render depth ({max})");
        Self::new(ErrorKind::MaxDepth(max), reason)
    }

    /// Construct a syntax error pointing at a region of the markup.
    pub(crate) fn syntax(reason: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::new(ErrorKind::Syntax, reason.into()).with_span(source, span)
    }

    /// Construct an evaluation error pointing at a region of the markup.
    pub(crate) fn render(reason: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::new(ErrorKind::Render, reason.into()).with_span(source, span)
    }

    pub(crate) fn format(err: crate::fmt::Error, source: &str, span: impl Into<Span>) -> Self {
        Self::new(ErrorKind::Format, err.message()).with_span(source, span)
    }

    /// Attach the markup location, unless a more precise one is already
    /// known.
    pub(crate) fn with_span(mut self, source: &str, span: impl Into<Span>) -> Self {
        if self.pretty.is_none() {
            self.pretty = Some(Pretty {
                source: source.to_owned(),
                span: span.into(),
            });
        }
        self
    }

    /// Attach the component the error occurred in, unless an inner component
    /// is already recorded.
    pub(crate) fn with_component(mut self, name: &str) -> Self {
        if self.component.is_none() {
            self.component = Some(name.to_owned());
        }
        self
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the name of the innermost component being rendered when the
    /// error occurred, if any.
    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    /// Returns the error message without any context.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns `true` if this is a [`StackMismatch`][ErrorKind::StackMismatch]
    /// or a [`SlotMismatch`][ErrorKind::SlotMismatch].
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::StackMismatch { .. } | ErrorKind::SlotMismatch { .. }
        )
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        let reason = err.to_string();
        Self::new(ErrorKind::Io(err), reason)
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Self::new(ErrorKind::Format, None)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Self::new(ErrorKind::Serialize, msg.to_string())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl ErrorKind {
    fn human(&self) -> &'static str {
        match self {
            Self::StackMismatch { .. } => "stack mismatch error",
            Self::SlotMismatch { .. } => "slot mismatch error",
            Self::NoOpenComponent | Self::NoOpenSlot => "nesting error",
            Self::UnclosedSlot { .. } => "unclosed slot error",
            Self::UnclosedComponent { .. } => "unclosed component error",
            Self::NameCollision { .. } => "name collision error",
            Self::UnknownComponent { .. } => "unknown component error",
            Self::InvalidArgument => "invalid argument error",
            Self::MaxDepth(_) => "max depth error",
            Self::Syntax => "syntax error",
            Self::Render => "render error",
            Self::Format => "format error",
            #[cfg(feature = "serde")]
            Self::Serialize => "serialize error",
            Self::Io(_) => "io error",
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f
                .debug_struct("Error")
                .field("kind", &self.kind)
                .field("component", &self.component)
                .field("reason", &self.reason)
                .finish_non_exhaustive();
        }
        write!(f, "{self:#}")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.human())?;
        if let Some(name) = &self.component {
            write!(f, " in component `{name}`")?;
        }
        if let Some(reason) = &self.reason {
            write!(f, ": {reason}")?;
        }
        if f.alternate() {
            if let Some(Pretty { source, span }) = &self.pretty {
                fmt_pretty(source, *span, f)?;
            }
        }
        Ok(())
    }
}

fn fmt_pretty(source: &str, span: Span, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let lines: Vec<_> = source.split_terminator('\n').collect();
    let (line, col) = to_line_col(&lines, span.m);
    let width = max(1, width(&source[span]));
    let code = lines
        .get(line)
        .or_else(|| lines.last())
        .copied()
        .unwrap_or_default();

    let num = (line + 1).to_string();
    let pad = num.len();
    let pipe = "|";
    let underline = "^".repeat(width);

    write!(
        f,
        "\n\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + width,
    )
}

fn to_line_col(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            return (i, width(&line[..offset - n]));
        }
        n += len;
    }
    (
        lines.len().saturating_sub(1),
        lines.last().map(|l| width(l)).unwrap_or(0),
    )
}

#[cfg(feature = "unicode")]
fn width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn width(s: &str) -> usize {
    s.chars().count()
}
