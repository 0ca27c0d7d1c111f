//! Walks parsed markup, turning component and slot tags into calls on the
//! render context.

use crate::fmt::Formatter;
use crate::render::{Binding, Context, Scope};
use crate::types::markup::{Call, Emit, Expr, Markup, Member, Node, Prop, Var};
use crate::value::Map;
use crate::{Error, Result, Value};

/// A variable after following its path.
enum Resolved<'a> {
    Slot(&'a str),
    Value(&'a Value),
}

pub fn evaluate(cx: &mut Context<'_>, markup: &Markup<'_>, scope: &Scope<'_>) -> Result<()> {
    let source = markup.source;
    for node in &markup.nodes {
        match node {
            Node::Raw(span) => cx.push_str(&source[*span]),

            Node::Emit(emit) => emit_var(cx, source, scope, emit)?,

            Node::Open(Call { name, props, span }) => {
                let props = eval_props(source, scope, props)?;
                cx.open(&name.value, Value::Map(props))
                    .map_err(|err| err.with_span(source, *span))?;
            }

            Node::Close(name) => {
                let output = cx
                    .close(&name.value)
                    .map_err(|err| err.with_span(source, name.span))?;
                cx.push_str(&output);
            }

            Node::OpenSlot(name) => {
                cx.open_slot(&name.value)
                    .map_err(|err| err.with_span(source, name.span))?;
            }

            Node::CloseSlot(name) => {
                cx.close_slot(&name.value)
                    .map_err(|err| err.with_span(source, name.span))?;
            }

            Node::Include(Call { name, props, span }) => {
                let props = eval_props(source, scope, props)?;
                let output = cx
                    .simple_component(&name.value, Value::Map(props))
                    .map_err(|err| err.with_span(source, *span))?;
                cx.push_str(&output);
            }
        }
    }
    Ok(())
}

/// Writes a variable to the active buffer.
///
/// Slots are written as is unless a formatter is named, properties always go
/// through a formatter.
fn emit_var(cx: &mut Context<'_>, source: &str, scope: &Scope<'_>, emit: &Emit) -> Result<()> {
    let engine = cx.engine();
    let owned;
    let value = match (lookup(source, scope, &emit.var)?, emit.formatter) {
        (Resolved::Slot(content), None) => {
            cx.push_str(content);
            return Ok(());
        }
        (Resolved::Slot(content), Some(_)) => {
            owned = Value::from(content);
            &owned
        }
        (Resolved::Value(value), _) => value,
    };

    let format = match emit.formatter {
        Some(ident) => {
            let name = &source[ident.span];
            engine.get_formatter(name).ok_or_else(|| {
                Error::render(format!("unknown formatter `{name}`"), source, ident.span)
            })?
        }
        None => engine.default_formatter,
    };

    let mut f = Formatter::with_string(cx.buffer());
    format(&mut f, value).map_err(|err| Error::format(err, source, emit.span))
}

fn eval_props(source: &str, scope: &Scope<'_>, props: &[Prop]) -> Result<Map<String, Value>> {
    props
        .iter()
        .map(|Prop { key, value }| {
            let value = match value {
                Expr::Literal(lit) => lit.value.clone(),
                Expr::Var(var) => match lookup(source, scope, var)? {
                    Resolved::Slot(content) => Value::from(content),
                    Resolved::Value(value) => value.clone(),
                },
            };
            Ok((source[key.span].to_owned(), value))
        })
        .collect()
}

fn lookup<'a>(source: &str, scope: &Scope<'a>, var: &Var) -> Result<Resolved<'a>> {
    let first = var.first();
    let binding = scope
        .lookup(&source[first.span])
        .ok_or_else(|| Error::render("not found in this scope", source, first.span))?;
    let rest = &var.path[1..];
    match binding {
        Binding::Slot(content) => match rest.first() {
            None => Ok(Resolved::Slot(content)),
            Some(member) => Err(Error::render(
                "cannot index into slot content",
                source,
                member.span(),
            )),
        },
        Binding::Property(value) => rest
            .iter()
            .try_fold(value, |value, member| index(source, value, member))
            .map(Resolved::Value),
    }
}

fn index<'a>(source: &str, value: &'a Value, member: &Member) -> Result<&'a Value> {
    match (value, member) {
        (Value::Map(map), Member::Key(ident)) => map
            .get(&source[ident.span])
            .ok_or_else(|| Error::render("not found in map", source, ident.span)),

        (Value::List(list), Member::Index(index)) => list.get(index.value).ok_or_else(|| {
            Error::render(
                format!("index out of bounds, the length is {}", list.len()),
                source,
                index.span,
            )
        }),

        (value, Member::Key(ident)) => Err(Error::render(
            format!("cannot index into {} with identifier", value.human()),
            source,
            ident.span,
        )),

        (value, Member::Index(index)) => Err(Error::render(
            format!("cannot index into {} with integer", value.human()),
            source,
            index.span,
        )),
    }
}
