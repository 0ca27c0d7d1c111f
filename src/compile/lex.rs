use crate::compile::search::Searcher;
use crate::types::span::Span;
use crate::types::syntax::Kind;
use crate::{Error, Result};

/// Splits markup source into tokens.
///
/// Call [`.next()?`][Lexer::next] until it returns [`None`]. Whitespace
/// inside tags is skipped, raw text between tags is returned as a single
/// [`Token::Raw`].
#[cfg_attr(test, derive(Debug))]
pub struct Lexer<'a> {
    searcher: &'a Searcher,

    /// The markup source.
    pub source: &'a str,

    /// Byte offset of the next token.
    cursor: usize,

    mode: Mode,

    /// Set when the previous tag ended with a trim marker, so the next raw
    /// token loses its leading whitespace.
    trim_next: bool,

    /// A tag token found while scanning raw text, returned on the next call.
    pending: Option<(Token, Span)>,
}

/// What the lexer is currently looking at.
///
/// Digits mean an index directly after an identifier (`items.0`) but a
/// number anywhere else, hence the separate path mode.
#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug))]
enum Mode {
    Text,
    Tag { open: Span, close: Token },
    Path { open: Span, close: Token },
    Comment { open: Span, close: Token },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Raw markup
    Raw,
    /// e.g. `{{`
    BeginExpr,
    /// e.g. `}}`
    EndExpr,
    /// e.g. `{%`
    BeginBlock,
    /// e.g. `%}`
    EndBlock,
    /// e.g. `{#`
    BeginComment,
    /// e.g. `#}`
    EndComment,
    /// `.`
    Dot,
    /// `|`
    Pipe,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// Tabs and spaces
    Whitespace,
    /// A keyword, property key or variable
    Ident,
    /// A list index in a path, e.g. the `0` in `items.0`
    Index,
    /// e.g. `19`, `-0x7f`, `1.5e3`
    Number,
    /// e.g. `"Hello\n"`
    String,
}

impl<'a> Lexer<'a> {
    pub fn new(searcher: &'a Searcher, source: &'a str) -> Self {
        Self {
            searcher,
            source,
            cursor: 0,
            mode: Mode::Text,
            trim_next: false,
            pending: None,
        }
    }

    /// Returns the next token that is not whitespace.
    pub fn next(&mut self) -> Result<Option<(Token, Span)>> {
        loop {
            match self.lex()? {
                Some((Token::Whitespace, _)) => continue,
                next => return Ok(next),
            }
        }
    }

    fn lex(&mut self) -> Result<Option<(Token, Span)>> {
        if let Some(pending) = self.pending.take() {
            return Ok(Some(pending));
        }
        let i = self.cursor;
        if i >= self.source.len() {
            return Ok(None);
        }
        match self.mode {
            Mode::Text => self.lex_text(i),
            Mode::Tag { open, close } => self.lex_tag(false, open, close, i),
            Mode::Path { open, close } => self.lex_tag(true, open, close, i),
            Mode::Comment { open, close } => self.lex_comment(open, close, i),
        }
    }

    //   raw text{{ ...
    //   ^       ^ ^
    //   i       j k
    fn lex_text(&mut self, i: usize) -> Result<Option<(Token, Span)>> {
        let Some((kind, j, k)) = self.searcher.find_at(self.source, i) else {
            self.cursor = self.source.len();
            return Ok(Some(self.raw(i, self.source.len(), false)));
        };

        let (tk, trim_before) = Token::from_kind(kind);
        if !tk.is_begin_tag() {
            return Err(self.err_unexpected_token(tk, j..k));
        }

        let open = Span::from(j..k);
        let close = tk.closing();
        self.cursor = k;
        self.mode = match tk {
            Token::BeginComment => Mode::Comment { open, close },
            _ => Mode::Tag { open, close },
        };

        if i == j {
            Ok(Some((tk, open)))
        } else {
            let raw = self.raw(i, j, trim_before);
            self.pending = Some((tk, open));
            Ok(Some(raw))
        }
    }

    /// Builds a raw token, applying any pending trims.
    fn raw(&mut self, mut i: usize, mut j: usize, trim_end: bool) -> (Token, Span) {
        if trim_end {
            j = self.source[..j].trim_end().len().max(i);
        }
        if std::mem::take(&mut self.trim_next) {
            let s = &self.source[i..j];
            i += s.len() - s.trim_start().len();
        }
        (Token::Raw, Span::from(i..j))
    }

    fn lex_tag(
        &mut self,
        in_path: bool,
        open: Span,
        close: Token,
        i: usize,
    ) -> Result<Option<(Token, Span)>> {
        if let Some((kind, j)) = self.searcher.starts_with(self.source, i) {
            let (tk, trim_after) = Token::from_kind(kind);
            if tk.is_begin_tag() {
                return Err(self.err_unclosed(open, close));
            }
            if tk != close {
                return Err(self.err_unexpected_token(tk, i..j));
            }
            self.mode = Mode::Text;
            self.trim_next = trim_after;
            self.cursor = j;
            return Ok(Some((tk, Span::from(i..j))));
        }

        let mut chars = self.source[i..].char_indices().map(|(d, c)| (i + d, c));
        let Some((_, c)) = chars.next() else {
            return Ok(None);
        };

        let (tk, j) = match c {
            '.' => (Token::Dot, i + 1),
            '|' => (Token::Pipe, i + 1),
            ',' => (Token::Comma, i + 1),
            ':' => (Token::Colon, i + 1),
            '+' => (Token::Plus, i + 1),
            '-' => (Token::Minus, i + 1),
            '"' => (Token::String, self.lex_string(chars, i)?),
            c if c.is_ascii_digit() && in_path => (Token::Index, self.eat_while(chars, is_index)),
            c if c.is_ascii_digit() => (Token::Number, self.eat_while(chars, is_number)),
            c if is_whitespace(c) => (Token::Whitespace, self.eat_while(chars, is_whitespace)),
            c if is_ident_start(c) => (Token::Ident, self.eat_while(chars, is_ident)),
            c => return Err(self.err_unexpected_character(i..i + c.len_utf8())),
        };

        self.mode = match (in_path, tk) {
            (false, Token::Ident) => Mode::Path { open, close },
            (true, Token::Pipe | Token::Comma | Token::Colon) => Mode::Tag { open, close },
            (true, _) => Mode::Path { open, close },
            (false, _) => Mode::Tag { open, close },
        };
        self.cursor = j;
        Ok(Some((tk, Span::from(i..j))))
    }

    //   {# anything #}
    //     ^         ^ ^
    //     i         j k
    fn lex_comment(&mut self, open: Span, close: Token, i: usize) -> Result<Option<(Token, Span)>> {
        let Some((kind, j, k)) = self.searcher.find_at(self.source, i) else {
            self.cursor = self.source.len();
            return Ok(Some((Token::Raw, Span::from(i..self.source.len()))));
        };

        let (tk, trim_after) = Token::from_kind(kind);
        if tk.is_begin_tag() {
            return Err(self.err_unclosed(open, close));
        }
        if tk != close {
            return Err(self.err_unexpected_token(tk, j..k));
        }

        let end = (tk, Span::from(j..k));
        self.mode = Mode::Text;
        self.trim_next = trim_after;
        self.cursor = k;

        if i == j {
            Ok(Some(end))
        } else {
            self.pending = Some(end);
            Ok(Some((Token::Raw, Span::from(i..j))))
        }
    }

    fn lex_string<I>(&self, chars: I, i: usize) -> Result<usize>
    where
        I: Iterator<Item = (usize, char)>,
    {
        let mut escaped = false;
        for (j, c) in chars {
            match c {
                '\r' | '\n' => return Err(self.err_undelimited_string(i..j)),
                '"' if !escaped => return Ok(j + 1),
                '\\' => escaped = !escaped,
                _ => escaped = false,
            }
        }
        Err(self.err_undelimited_string(i..self.source.len()))
    }

    fn eat_while<I, P>(&self, chars: I, pred: P) -> usize
    where
        I: Iterator<Item = (usize, char)>,
        P: Fn(char) -> bool,
    {
        let mut chars = chars.skip_while(|&(_, c)| pred(c));
        chars.next().map_or(self.source.len(), |(j, _)| j)
    }

    fn err_unclosed(&self, open: Span, close: Token) -> Error {
        let what = close.opening().human();
        Error::syntax(format!("unclosed {what}"), self.source, open)
    }

    fn err_unexpected_token(&self, tk: Token, span: impl Into<Span>) -> Error {
        let tk = tk.human();
        Error::syntax(format!("unexpected {tk}"), self.source, span)
    }

    fn err_unexpected_character(&self, span: impl Into<Span>) -> Error {
        Error::syntax("unexpected character", self.source, span)
    }

    fn err_undelimited_string(&self, span: impl Into<Span>) -> Error {
        Error::syntax("undelimited string", self.source, span)
    }
}

impl Token {
    pub fn human(&self) -> &'static str {
        match self {
            Self::Raw => "raw markup",
            Self::BeginExpr => "begin expression",
            Self::EndExpr => "end expression",
            Self::BeginBlock => "begin block",
            Self::EndBlock => "end block",
            Self::BeginComment => "begin comment",
            Self::EndComment => "end comment",
            Self::Dot => "member access operator",
            Self::Pipe => "pipe",
            Self::Comma => "comma",
            Self::Colon => "colon",
            Self::Plus => "plus",
            Self::Minus => "minus",
            Self::Whitespace => "whitespace",
            Self::Ident => "identifier",
            Self::Index => "index",
            Self::Number => "number",
            Self::String => "string",
        }
    }

    fn is_begin_tag(&self) -> bool {
        matches!(
            self,
            Self::BeginExpr | Self::BeginBlock | Self::BeginComment
        )
    }

    /// The end tag expected after this begin tag.
    fn closing(&self) -> Self {
        match self {
            Self::BeginExpr => Self::EndExpr,
            Self::BeginBlock => Self::EndBlock,
            _ => Self::EndComment,
        }
    }

    /// The begin tag that this end tag closes.
    fn opening(&self) -> Self {
        match self {
            Self::EndExpr => Self::BeginExpr,
            Self::EndBlock => Self::BeginBlock,
            _ => Self::BeginComment,
        }
    }

    /// Maps a delimiter to its token and whether it carries a trim marker.
    fn from_kind(kind: Kind) -> (Self, bool) {
        match kind {
            Kind::BeginExpr => (Self::BeginExpr, false),
            Kind::EndExpr => (Self::EndExpr, false),
            Kind::BeginExprTrim => (Self::BeginExpr, true),
            Kind::EndExprTrim => (Self::EndExpr, true),
            Kind::BeginBlock => (Self::BeginBlock, false),
            Kind::EndBlock => (Self::EndBlock, false),
            Kind::BeginBlockTrim => (Self::BeginBlock, true),
            Kind::EndBlockTrim => (Self::EndBlock, true),
            Kind::BeginComment => (Self::BeginComment, false),
            Kind::EndComment => (Self::EndComment, false),
            Kind::BeginCommentTrim => (Self::BeginComment, true),
            Kind::EndCommentTrim => (Self::EndComment, true),
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | ' ' | '\r' | '\n')
}

#[cfg(feature = "unicode")]
fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

#[cfg(feature = "unicode")]
fn is_ident(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[cfg(not(feature = "unicode"))]
fn is_ident_start(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '_')
}

#[cfg(not(feature = "unicode"))]
fn is_ident(c: char) -> bool {
    matches!(c, '0'..='9' | 'A'..='Z' | 'a'..='z' | '_')
}

fn is_index(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_number(c: char) -> bool {
    matches!(c, '0'..='9' | 'A'..='Z' | 'a'..='z' | '_' | '.')
}
