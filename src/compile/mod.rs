//! Turn markup source into a list of nodes that the evaluator can walk.
//!
//! This happens in two stages:
//! - The lexer chunks the source into tokens.
//! - The parser checks each tag and produces the [`Markup`] nodes.
//!
//! Component and slot nesting is not checked here. Open and close tags are
//! driven through the render context, which owns the stacks.

mod lex;
mod parse;
mod search;

pub use crate::compile::search::Searcher;
use crate::types::markup::Markup;
use crate::Result;

/// Parse markup source.
pub fn markup<'a>(searcher: &'a Searcher, source: &'a str) -> Result<Markup<'a>> {
    parse::Parser::new(searcher, source).parse_markup()
}
