use crate::render::capture::Mark;
use crate::value::Map;
use crate::{Error, Result, Value};

/// An open component together with its slot group.
///
/// Keeping both in one frame means the component stack and the slot group
/// stack can never differ in length.
#[derive(Debug)]
pub struct Frame {
    pub name: String,
    pub props: Map<String, Value>,
    /// The buffer collecting the default slot.
    pub mark: Mark,
    pub slots: SlotGroup,
}

/// The slots of a single component: a stack of slots currently being
/// captured and the content of the slots already closed.
#[derive(Debug, Default)]
pub struct SlotGroup {
    open: Vec<SlotFrame>,
    filled: Map<String, String>,
}

#[derive(Debug)]
pub struct SlotFrame {
    pub name: String,
    pub mark: Mark,
}

impl Frame {
    pub fn new(name: &str, props: Map<String, Value>, mark: Mark) -> Self {
        Self {
            name: name.to_owned(),
            props,
            mark,
            slots: SlotGroup::default(),
        }
    }
}

impl SlotGroup {
    pub fn push(&mut self, name: &str, mark: Mark) {
        self.open.push(SlotFrame {
            name: name.to_owned(),
            mark,
        });
    }

    pub fn pop(&mut self) -> Option<SlotFrame> {
        self.open.pop()
    }

    /// The number of slots currently being captured.
    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// Stores the content of a closed slot. A slot closed again under the
    /// same name replaces the earlier content.
    pub fn fill(&mut self, name: String, content: String) {
        self.filled.insert(name, content);
    }

    /// Consumes the group, returning the filled slots.
    ///
    /// Fails if a slot is still being captured.
    pub fn finish(self, component: &str) -> Result<Map<String, String>> {
        match self.open.last() {
            Some(slot) => Err(Error::unclosed_slot(component, &slot.name)),
            None => Ok(self.filled),
        }
    }
}
