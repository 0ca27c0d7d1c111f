//! Defines parsed [`Markup`], a flat sequence of [`Node`]s that the evaluator
//! walks against a render context.
//!
//! Nesting is not represented here. A component open tag and
//! its close tag are separate nodes, matching them up is the job of the
//! component stack at render time.

use crate::types::span::Span;
use crate::Value;

#[cfg_attr(test, derive(Debug))]
pub struct Markup<'source> {
    pub source: &'source str,
    pub nodes: Vec<Node>,
}

#[cfg_attr(test, derive(Debug))]
pub enum Node {
    /// Raw text, e.g. `<div>`
    Raw(Span),

    /// Emit a binding, e.g. `{{ user.name | upper }}`
    Emit(Emit),

    /// Open a component, e.g. `{% component "page" title: "Home" %}`
    Open(Call),

    /// Close a component, e.g. `{% endcomponent "page" %}`
    Close(Name),

    /// Open a named slot, e.g. `{% slot "header" %}`
    OpenSlot(Name),

    /// Close a named slot, e.g. `{% endslot "header" %}`
    CloseSlot(Name),

    /// Render a component with no content, e.g. `{% include "avatar" %}`
    Include(Call),
}

#[cfg_attr(test, derive(Debug))]
pub struct Emit {
    pub var: Var,
    pub formatter: Option<Ident>,
    pub span: Span,
}

/// A component invocation with properties.
#[cfg_attr(test, derive(Debug))]
pub struct Call {
    pub name: Name,
    pub props: Vec<Prop>,
    pub span: Span,
}

/// A component or slot name, always written as a string literal.
#[cfg_attr(test, derive(Debug))]
pub struct Name {
    pub value: String,
    pub span: Span,
}

/// A single `key: expr` property.
#[cfg_attr(test, derive(Debug))]
pub struct Prop {
    pub key: Ident,
    pub value: Expr,
}

#[cfg_attr(test, derive(Debug))]
pub enum Expr {
    Var(Var),
    Literal(Literal),
}

#[cfg_attr(test, derive(Debug))]
pub struct Literal {
    pub value: Value,
}

/// A path into the current scope, e.g. `user.names.0`.
#[cfg_attr(test, derive(Debug))]
pub struct Var {
    pub path: Vec<Member>,
}

#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug))]
pub enum Member {
    Key(Ident),
    Index(Index),
}

#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug))]
pub struct Ident {
    pub span: Span,
}

#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug))]
pub struct Index {
    pub value: usize,
    pub span: Span,
}

impl Var {
    pub fn first(&self) -> &Ident {
        match &self.path[0] {
            Member::Key(ident) => ident,
            Member::Index(_) => unreachable!("paths always start with an identifier"),
        }
    }

    #[cfg(test)]
    pub fn span(&self) -> Span {
        let first = self.path[0].span();
        let last = self.path[self.path.len() - 1].span();
        first.combine(last)
    }
}

impl Member {
    pub fn span(&self) -> Span {
        match self {
            Self::Key(ident) => ident.span,
            Self::Index(index) => index.span,
        }
    }
}
