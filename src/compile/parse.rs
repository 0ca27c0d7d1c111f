use std::fmt::Display;

use crate::compile::lex::{Lexer, Token};
use crate::compile::search::Searcher;
use crate::types::markup::{
    Call, Emit, Expr, Ident, Index, Literal, Markup, Member, Name, Node, Prop, Var,
};
use crate::types::span::Span;
use crate::{Error, Result, Value};

/// A hand written parser that turns a token stream into a flat list of
/// markup nodes.
///
/// The parser never matches open tags with close tags. It only checks that
/// each tag is well formed on its own.
pub struct Parser<'a> {
    tokens: Lexer<'a>,

    /// Remember a peeked value, even if it was `None`
    peeked: Option<Option<(Token, Span)>>,
}

/// The word that starts a block tag, e.g. `component` in
/// `{% component "card" %}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Component,
    EndComponent,
    Slot,
    EndSlot,
    Include,
}

#[derive(Clone, Copy)]
enum Sign {
    Neg,
    Pos,
}

impl<'a> Parser<'a> {
    pub fn new(searcher: &'a Searcher, source: &'a str) -> Self {
        Self {
            tokens: Lexer::new(searcher, source),
            peeked: None,
        }
    }

    pub fn parse_markup(mut self) -> Result<Markup<'a>> {
        let mut nodes = Vec::new();

        while let Some((tk, span)) = self.next()? {
            let node = match tk {
                Token::Raw if span.is_empty() => continue,
                Token::Raw => Node::Raw(span),

                Token::BeginComment => {
                    if self.is_next(Token::Raw)? {
                        self.expect(Token::Raw)?;
                    }
                    self.expect(Token::EndComment)?;
                    continue;
                }

                Token::BeginExpr => {
                    let emit = self.parse_emit(span)?;
                    Node::Emit(emit)
                }

                Token::BeginBlock => self.parse_block(span)?,

                tk => {
                    return Err(self.err_unexpected_token("raw markup or a tag", tk, span));
                }
            };
            nodes.push(node);
        }

        Ok(Markup {
            source: self.source(),
            nodes,
        })
    }

    /// Parses the inside of an expression tag.
    ///
    ///   user.name
    ///
    ///   title | upper
    ///
    fn parse_emit(&mut self, begin: Span) -> Result<Emit> {
        let first = self.parse_ident()?;
        let var = self.parse_var(first)?;
        let formatter = if self.is_next(Token::Pipe)? {
            self.expect(Token::Pipe)?;
            Some(self.parse_ident()?)
        } else {
            None
        };
        let end = self.expect(Token::EndExpr)?;
        Ok(Emit {
            var,
            formatter,
            span: begin.combine(end),
        })
    }

    /// Parses the inside of a block tag.
    ///
    ///   component "card" title: "Hello", user: user
    ///
    ///   endslot "footer"
    ///
    fn parse_block(&mut self, begin: Span) -> Result<Node> {
        let kw = self.parse_keyword()?;
        let name = self.parse_name()?;
        let node = match kw {
            Keyword::Component | Keyword::Include => {
                let props = self.parse_props()?;
                let end = self.expect(Token::EndBlock)?;
                let call = Call {
                    name,
                    props,
                    span: begin.combine(end),
                };
                match kw {
                    Keyword::Component => Node::Open(call),
                    _ => Node::Include(call),
                }
            }
            Keyword::EndComponent => self.end_block(Node::Close, name, begin)?,
            Keyword::Slot => self.end_block(Node::OpenSlot, name, begin)?,
            Keyword::EndSlot => self.end_block(Node::CloseSlot, name, begin)?,
        };
        Ok(node)
    }

    /// Finishes a block that only takes a name, widening the name span to
    /// cover the whole tag so errors underline all of it.
    fn end_block(&mut self, f: fn(Name) -> Node, name: Name, begin: Span) -> Result<Node> {
        let end = self.expect(Token::EndBlock)?;
        Ok(f(Name {
            value: name.value,
            span: begin.combine(end),
        }))
    }

    /// Parses a component or slot name. Names are always string literals.
    fn parse_name(&mut self) -> Result<Name> {
        let span = self.expect(Token::String)?;
        let value = self.parse_string(span)?;
        if value.is_empty() {
            return Err(Error::syntax("name cannot be empty", self.source(), span));
        }
        Ok(Name { value, span })
    }

    /// Parses comma separated properties up to the end of the tag.
    ///
    ///   title: "Hello", count: 3, user: page.user,
    ///
    fn parse_props(&mut self) -> Result<Vec<Prop>> {
        let mut props: Vec<Prop> = Vec::new();
        while !self.is_next(Token::EndBlock)? {
            let key = self.parse_ident()?;
            let name = &self.source()[key.span];
            if props.iter().any(|p| &self.source()[p.key.span] == name) {
                return Err(Error::syntax(
                    format!("duplicate property `{name}`"),
                    self.source(),
                    key.span,
                ));
            }
            self.expect(Token::Colon)?;
            let value = self.parse_expr()?;
            props.push(Prop { key, value });
            if !self.is_next(Token::Comma)? {
                break;
            }
            self.expect(Token::Comma)?;
        }
        Ok(props)
    }

    /// Parses a variable or literal.
    ///
    ///   users.2.name
    ///
    ///   "Hello"
    ///
    ///   -0x7f
    ///
    fn parse_expr(&mut self) -> Result<Expr> {
        let expr = match self.parse()? {
            (Token::Minus, sign) => {
                let span = self.expect(Token::Number)?;
                Expr::Literal(self.parse_literal_number(span, sign.combine(span), Sign::Neg)?)
            }
            (Token::Plus, sign) => {
                let span = self.expect(Token::Number)?;
                Expr::Literal(self.parse_literal_number(span, sign.combine(span), Sign::Pos)?)
            }
            (Token::Number, span) => {
                Expr::Literal(self.parse_literal_number(span, span, Sign::Pos)?)
            }
            (Token::String, span) => {
                let value = Value::String(self.parse_string(span)?);
                Expr::Literal(Literal { value })
            }
            (Token::Ident, span) => {
                let value = match &self.source()[span] {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    "none" => Some(Value::None),
                    _ => None,
                };
                match value {
                    Some(value) if !self.is_next(Token::Dot)? => {
                        Expr::Literal(Literal { value })
                    }
                    _ => Expr::Var(self.parse_var(Ident { span })?),
                }
            }
            (tk, span) => {
                return Err(self.err_unexpected_token("expression", tk, span));
            }
        };
        Ok(expr)
    }

    /// Parses the rest of a path after its first identifier.
    fn parse_var(&mut self, first: Ident) -> Result<Var> {
        let mut path = vec![Member::Key(first)];
        while self.is_next(Token::Dot)? {
            self.expect(Token::Dot)?;
            let member = match self.parse()? {
                (Token::Ident, span) => Member::Key(Ident { span }),
                (Token::Index, span) => {
                    let value = self.source()[span].parse().map_err(|_| {
                        Error::syntax(
                            format!(
                                "base 10 literal out of range for unsigned {}-bit integer",
                                usize::BITS
                            ),
                            self.source(),
                            span,
                        )
                    })?;
                    Member::Index(Index { value, span })
                }
                (tk, span) => {
                    return Err(self.err_unexpected_token("identifier or index", tk, span));
                }
            };
            path.push(member);
        }
        Ok(Var { path })
    }

    /// Parses an integer, falling back to a float.
    fn parse_literal_number(&self, raw: Span, span: Span, sign: Sign) -> Result<Literal> {
        let text = &self.source()[raw];
        let value = match self.parse_integer(text, raw, sign) {
            Ok(int) => Value::Integer(int),
            Err(err) => match text.parse::<f64>() {
                Ok(float) => match sign {
                    Sign::Neg => Value::Float(-float),
                    Sign::Pos => Value::Float(float),
                },
                Err(_) if text.contains('.') => {
                    return Err(Error::syntax("invalid float literal", self.source(), span));
                }
                Err(_) => return Err(err),
            },
        };
        Ok(Literal { value })
    }

    /// Parses an integer in base 2, 8, 10 or 16, allowing `_` separators.
    fn parse_integer(&self, text: &str, span: Span, sign: Sign) -> Result<i64> {
        let (skip, radix) = match text.as_bytes() {
            [b'0', b'b', ..] => (2, 2),
            [b'0', b'o', ..] => (2, 8),
            [b'0', b'x', ..] => (2, 16),
            _ => (0, 10),
        };
        let out_of_range = || {
            Error::syntax(
                format!("base {radix} literal out of range for 64-bit integer"),
                self.source(),
                span,
            )
        };
        let mut acc: i64 = 0;
        for (j, c) in text.char_indices().skip(skip) {
            if c == '_' {
                continue;
            }
            let digit = c.to_digit(radix).ok_or_else(|| {
                let m = span.m + j;
                Error::syntax(
                    format!("invalid digit for base {radix} literal"),
                    self.source(),
                    m..m + c.len_utf8(),
                )
            })?;
            acc = acc.checked_mul(radix.into()).ok_or_else(out_of_range)?;
            acc = match sign {
                Sign::Pos => acc.checked_add(digit.into()),
                Sign::Neg => acc.checked_sub(digit.into()),
            }
            .ok_or_else(out_of_range)?;
        }
        Ok(acc)
    }

    /// Parses a string literal, handling escapes.
    fn parse_string(&self, span: Span) -> Result<String> {
        let raw = &self.source()[span];
        let inner = &raw[1..raw.len() - 1];
        if !inner.contains('\\') {
            return Ok(inner.to_owned());
        }
        let mut string = String::with_capacity(inner.len());
        let mut chars = inner.char_indices().map(|(i, c)| (span.m + 1 + i, c));
        while let Some((i, c)) = chars.next() {
            if c != '\\' {
                string.push(c);
                continue;
            }
            // The lexer guarantees a backslash is never the last character.
            let (j, esc) = chars.next().unwrap_or((i, '\\'));
            let c = match esc {
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                '\\' => '\\',
                '"' => '"',
                _ => {
                    return Err(Error::syntax(
                        "unknown escape character",
                        self.source(),
                        i..j + esc.len_utf8(),
                    ));
                }
            };
            string.push(c);
        }
        Ok(string)
    }

    fn parse_keyword(&mut self) -> Result<Keyword> {
        let span = self.expect(Token::Ident)?;
        let word = &self.source()[span];
        Keyword::from_str(word).ok_or_else(|| {
            Error::syntax(
                format!("expected keyword, found `{word}`"),
                self.source(),
                span,
            )
        })
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let span = self.expect(Token::Ident)?;
        Ok(Ident { span })
    }

    fn parse(&mut self) -> Result<(Token, Span)> {
        match self.next()? {
            Some(next) => Ok(next),
            None => Err(self.err_unexpected_eof("token")),
        }
    }

    fn expect(&mut self, exp: Token) -> Result<Span> {
        match self.next()? {
            Some((tk, span)) if tk == exp => Ok(span),
            Some((tk, span)) => Err(self.err_unexpected_token(exp.human(), tk, span)),
            None => Err(self.err_unexpected_eof(exp.human())),
        }
    }

    fn is_next(&mut self, token: Token) -> Result<bool> {
        Ok(matches!(self.peek()?, Some((tk, _)) if tk == token))
    }

    fn peek(&mut self) -> Result<Option<(Token, Span)>> {
        match self.peeked {
            Some(peeked) => Ok(peeked),
            None => {
                let next = self.tokens.next()?;
                self.peeked = Some(next);
                Ok(next)
            }
        }
    }

    fn next(&mut self) -> Result<Option<(Token, Span)>> {
        match self.peeked.take() {
            Some(next) => Ok(next),
            None => self.tokens.next(),
        }
    }

    fn source(&self) -> &'a str {
        self.tokens.source
    }

    fn err_unexpected_eof(&self, exp: impl Display) -> Error {
        let n = self.source().len();
        Error::syntax(format!("expected {exp}, found EOF"), self.source(), n..n)
    }

    fn err_unexpected_token(&self, exp: impl Display, got: Token, span: Span) -> Error {
        let got = got.human();
        Error::syntax(format!("expected {exp}, found {got}"), self.source(), span)
    }
}

impl Keyword {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "component" => Some(Self::Component),
            "endcomponent" => Some(Self::EndComponent),
            "slot" => Some(Self::Slot),
            "endslot" => Some(Self::EndSlot),
            "include" => Some(Self::Include),
            _ => None,
        }
    }
}
