use std::mem;

use tracing::debug;

use crate::render::Context;
use crate::value::Map;
use crate::{Error, ErrorKind, Result, Value};

/// The name the default slot is bound to inside a component body.
pub const DEFAULT_SLOT: &str = "slot";

/// Everything a component body can see: its properties, the content of its
/// named slots and its default slot.
///
/// Slot names never clash with property names, this is checked before the
/// component is rendered.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    name: &'a str,
    props: &'a Map<String, Value>,
    default_slot: &'a str,
    slots: &'a Map<String, String>,
}

/// A name looked up in a [`Scope`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding<'a> {
    /// A property passed when the component was opened.
    Property(&'a Value),
    /// Rendered slot content, including the default slot.
    Slot(&'a str),
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        name: &'a str,
        props: &'a Map<String, Value>,
        default_slot: &'a str,
        slots: &'a Map<String, String>,
    ) -> Self {
        Self {
            name,
            props,
            default_slot,
            slots,
        }
    }

    /// The name of the component being rendered. Empty for the top level
    /// scope of [`Engine::render_source`][crate::Engine::render_source].
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn property(&self, name: &str) -> Option<&'a Value> {
        self.props.get(name)
    }

    pub fn properties(&self) -> &'a Map<String, Value> {
        self.props
    }

    /// Returns the content of a named slot, or `None` if the caller did not
    /// fill it.
    pub fn slot(&self, name: &str) -> Option<&'a str> {
        self.slots.get(name).map(String::as_str)
    }

    pub fn slots(&self) -> &'a Map<String, String> {
        self.slots
    }

    /// Everything written between the component's open and close that was
    /// not inside a named slot.
    pub fn default_slot(&self) -> &'a str {
        self.default_slot
    }

    /// Looks up a name the way markup does: `slot` is the default slot, then
    /// named slots, then properties.
    pub fn lookup(&self, name: &str) -> Option<Binding<'a>> {
        if name == DEFAULT_SLOT {
            return Some(Binding::Slot(self.default_slot));
        }
        if let Some(slot) = self.slot(name) {
            return Some(Binding::Slot(slot));
        }
        self.property(name).map(Binding::Property)
    }
}

/// Rejects bindings that would make [`Scope::lookup`] ambiguous.
pub(crate) fn check_names(
    component: &str,
    props: &Map<String, Value>,
    slots: &Map<String, String>,
) -> Result<()> {
    if props.contains_key(DEFAULT_SLOT) {
        return Err(Error::name_collision(component, DEFAULT_SLOT));
    }
    match slots
        .keys()
        .find(|name| *name == DEFAULT_SLOT || props.contains_key(*name))
    {
        Some(name) => Err(Error::name_collision(component, name)),
        None => Ok(()),
    }
}

impl Context<'_> {
    /// Renders a closed component by handing it to the resolver.
    ///
    /// The body is rendered into its own buffer behind a boundary, so it can
    /// open and close its own components but cannot touch the caller's.
    pub(crate) fn dispatch(
        &mut self,
        name: &str,
        props: &Map<String, Value>,
        default_slot: &str,
        slots: &Map<String, String>,
    ) -> Result<String> {
        let engine = self.engine();
        if self.renders >= engine.max_depth {
            return Err(Error::max_depth(engine.max_depth));
        }

        let scope = Scope::new(name, props, default_slot, slots);
        let height = self.frames.len();
        let floor = mem::replace(&mut self.floor, height);
        let mark = self.capture.begin();
        self.renders += 1;
        debug!(component = name, renders = self.renders, "render component");

        let result = engine.resolve(name, &scope, self);

        let output = self.capture.end(mark);
        let leftover = self.frames.get(height).map(|frame| frame.name.clone());
        self.frames.truncate(height);
        self.floor = floor;
        self.renders -= 1;
        debug!(component = name, len = output.len(), "rendered component");

        result.map_err(|err| in_component(err, name))?;
        match leftover {
            Some(open) => Err(Error::unclosed_component(&open).with_component(name)),
            None => Ok(output),
        }
    }
}

/// Records the component an error happened in. A component that could not
/// be found is reported against its caller instead.
fn in_component(err: Error, name: &str) -> Error {
    let unknown = matches!(err.kind(), ErrorKind::UnknownComponent { name: n } if n == name);
    if unknown {
        err
    } else {
        err.with_component(name)
    }
}
