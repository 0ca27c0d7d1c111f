//! The render context, which drives the component and slot protocol.

mod capture;
mod dispatch;
mod eval;
mod stack;

use std::fmt;

use tracing::trace;

pub use crate::render::dispatch::{Binding, Scope, DEFAULT_SLOT};
use crate::render::capture::Capture;
use crate::render::stack::Frame;
use crate::{compile, Engine, Error, Result, Value};

/// The state of a single render.
///
/// A context owns the stack of open components, the slots of each open
/// component and the chain of output buffers. It is created with
/// [`Engine::context`] and is not shared between renders.
///
/// Output written to the context goes to the innermost open slot, or if no
/// slot is open, to the default slot of the innermost open component. With
/// nothing open it goes to the top level output returned by
/// [`finish`][Context::finish].
///
/// # Examples
///
/// ```
/// use std::fmt::Write;
/// use slotted::Engine;
///
/// let mut engine = Engine::new();
/// engine.add_template("card", "<div><h2>{{ header }}</h2>{{ slot }}</div>");
///
/// let mut cx = engine.context();
/// cx.open("card", slotted::value! {})?;
/// cx.open_slot("header")?;
/// write!(cx, "Title")?;
/// cx.close_slot("header")?;
/// write!(cx, "Body")?;
/// let html = cx.close("card")?;
///
/// assert_eq!(html, "<div><h2>Title</h2>Body</div>");
/// # Ok::<(), slotted::Error>(())
/// ```
pub struct Context<'render> {
    engine: &'render Engine<'render>,
    frames: Vec<Frame>,
    capture: Capture,

    /// Frames below this height belong to a component whose body is being
    /// rendered and cannot be touched.
    floor: usize,

    /// How many component bodies are currently being rendered.
    renders: usize,
}

impl<'render> Context<'render> {
    pub(crate) fn new(engine: &'render Engine<'render>) -> Self {
        Self {
            engine,
            frames: Vec::new(),
            capture: Capture::new(),
            floor: 0,
            renders: 0,
        }
    }

    /// Opens a component.
    ///
    /// Until the matching [`close`][Context::close] all output is captured as
    /// the component's default slot. `props` must be a [`Value::Map`], or
    /// [`Value::None`] for no properties.
    ///
    /// # Errors
    ///
    /// If `name` is empty or `props` is not a map. Components can be nested
    /// to any depth.
    pub fn open(&mut self, name: &str, props: Value) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_argument("component name cannot be empty"));
        }
        let human = props.human();
        let props = props.into_properties().ok_or_else(|| {
            Error::invalid_argument(format!(
                "properties for `{name}` must be a map, found {human}"
            ))
        })?;
        let mark = self.capture.begin();
        self.frames.push(Frame::new(name, props, mark));
        trace!(
            component = name,
            depth = self.frames.len(),
            buffers = self.capture.depth(),
            "open component"
        );
        Ok(())
    }

    /// Closes the innermost open component and renders it.
    ///
    /// Returns the rendered component. The output is not written anywhere,
    /// the caller decides where it goes.
    ///
    /// # Errors
    ///
    /// - [`StackMismatch`][crate::ErrorKind::StackMismatch] if `name` is not
    ///   the innermost open component.
    /// - [`UnclosedSlot`][crate::ErrorKind::UnclosedSlot] if one of its
    ///   slots is still open.
    /// - [`NameCollision`][crate::ErrorKind::NameCollision] if a slot has the
    ///   same name as a property, or either is named `slot`.
    /// - Any error from rendering the component body.
    ///
    /// In every case the component and its buffers are released.
    pub fn close(&mut self, name: &str) -> Result<String> {
        if self.frames.len() <= self.floor {
            return Err(Error::no_open_component("close", name));
        }
        let Some(frame) = self.frames.pop() else {
            return Err(Error::no_open_component("close", name));
        };
        let default_slot = self.capture.end(frame.mark);
        trace!(component = name, depth = self.frames.len(), "close component");

        if frame.name != name {
            return Err(Error::stack_mismatch(&frame.name, name));
        }
        let Frame { props, slots, .. } = frame;
        let slots = slots.finish(name)?;
        dispatch::check_names(name, &props, &slots)?;
        self.dispatch(name, &props, &default_slot, &slots)
    }

    /// Opens and immediately closes a component, returning the rendered
    /// output.
    pub fn simple_component(&mut self, name: &str, props: Value) -> Result<String> {
        self.open(name, props)?;
        self.close(name)
    }

    /// Opens a named slot in the innermost open component.
    ///
    /// Until the matching [`close_slot`][Context::close_slot] all output is
    /// captured as the slot's content.
    pub fn open_slot(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_argument("slot name cannot be empty"));
        }
        let frame = innermost(&mut self.frames, self.floor)
            .ok_or_else(|| Error::no_open_component("open slot", name))?;
        let mark = self.capture.begin();
        frame.slots.push(name, mark);
        trace!(
            component = frame.name.as_str(),
            slot = name,
            depth = frame.slots.open_len(),
            "open slot"
        );
        Ok(())
    }

    /// Closes the innermost open slot, storing its content in the innermost
    /// open component.
    ///
    /// If the component already has content for this slot it is replaced.
    ///
    /// # Errors
    ///
    /// [`SlotMismatch`][crate::ErrorKind::SlotMismatch] if `name` is not the
    /// innermost open slot. The slot's buffer is released regardless.
    pub fn close_slot(&mut self, name: &str) -> Result<()> {
        let frame = innermost(&mut self.frames, self.floor)
            .ok_or_else(|| Error::no_open_component("end slot", name))?;
        let slot = frame.slots.pop().ok_or_else(|| Error::no_open_slot(name))?;
        let content = self.capture.end(slot.mark);
        trace!(
            component = frame.name.as_str(),
            slot = name,
            depth = frame.slots.open_len(),
            "close slot"
        );
        if slot.name != name {
            return Err(Error::slot_mismatch(&slot.name, name).with_component(&frame.name));
        }
        frame.slots.fill(slot.name, content);
        Ok(())
    }

    /// Writes text to the active buffer.
    pub fn push_str(&mut self, s: &str) {
        self.capture.current().push_str(s);
    }

    /// Evaluates markup against a scope, writing the output to the active
    /// buffer.
    ///
    /// Component and slot tags in the markup drive this context, so a
    /// [`Resolver`][crate::Resolver] can use this to render template source
    /// it loaded itself.
    pub fn evaluate(&mut self, source: &str, scope: &Scope<'_>) -> Result<()> {
        let engine = self.engine;
        let markup = compile::markup(&engine.searcher, source)?;
        eval::evaluate(self, &markup, scope)
    }

    /// Returns the number of open components.
    ///
    /// Every open component carries its own slot group, so this is also the
    /// number of slot groups.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns the top level output.
    ///
    /// # Errors
    ///
    /// If a component is still open.
    pub fn finish(self) -> Result<String> {
        if let Some(frame) = self.frames.first() {
            return Err(Error::unclosed_component(&frame.name));
        }
        Ok(self.capture.into_root())
    }

    pub(crate) fn engine(&self) -> &'render Engine<'render> {
        self.engine
    }

    pub(crate) fn buffer(&mut self) -> &mut String {
        self.capture.current()
    }
}

impl fmt::Write for Context<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("frames", &self.frames)
            .field("capture", &self.capture)
            .field("floor", &self.floor)
            .finish_non_exhaustive()
    }
}

/// The innermost frame above the render boundary.
fn innermost(frames: &mut [Frame], floor: usize) -> Option<&mut Frame> {
    frames.get_mut(floor..).and_then(<[Frame]>::last_mut)
}
