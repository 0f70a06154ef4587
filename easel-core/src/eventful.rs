//! Named event bus used by the input handler and the renderer.
//!
//! Handlers are plain closures; whatever context a handler needs is captured
//! by the closure itself.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ElementId, KeyModifiers};

/// Identifier returned by [`EventBus::on`], used to unbind a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Payload of the `rendered` event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderedEvent {
    /// Wall-clock time spent in the flush that painted.
    pub elapsed: Duration,
}

/// Payload of pointer-originated element events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementEvent {
    /// Element the event is dispatched to, `None` for the empty viewport.
    pub target: Option<ElementId>,
    /// Topmost element under the pointer, ignoring interactivity.
    pub top_target: Option<ElementId>,
    /// X position in viewport coordinates.
    pub x: f32,
    /// Y position in viewport coordinates.
    pub y: f32,
    /// Mouse button, 0 for touch.
    pub button: u8,
}

/// Payload of keyboard events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key name or code.
    pub key: String,
    /// Active modifier keys.
    pub modifiers: KeyModifiers,
}

/// Everything that can be sent through the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum EventPayload {
    /// A frame painted something.
    Rendered(RenderedEvent),
    /// Pointer or touch interaction.
    Element(ElementEvent),
    /// Keyboard interaction.
    Key(KeyEvent),
    /// Application-defined data passed to [`EventBus::trigger`].
    Custom(serde_json::Value),
}

type Callback = Box<dyn FnMut(&EventPayload)>;

/// Name-keyed handler table.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<String, Vec<(HandlerId, Callback)>>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to an event name.
    pub fn on(&mut self, name: &str, handler: impl FnMut(&EventPayload) + 'static) -> HandlerId {
        self.next_id += 1;
        let id = HandlerId(self.next_id);
        self.handlers
            .entry(name.to_string())
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Unbind handlers.
    ///
    /// With no name every handler is dropped; with a name but no id every
    /// handler of that name is dropped.
    pub fn off(&mut self, name: Option<&str>, handler: Option<HandlerId>) {
        match (name, handler) {
            (None, _) => self.handlers.clear(),
            (Some(name), None) => {
                self.handlers.remove(name);
            }
            (Some(name), Some(id)) => {
                if let Some(list) = self.handlers.get_mut(name) {
                    list.retain(|(hid, _)| *hid != id);
                    if list.is_empty() {
                        self.handlers.remove(name);
                    }
                }
            }
        }
    }

    /// Call every handler bound to `name`. Returns how many ran.
    pub fn trigger(&mut self, name: &str, payload: &EventPayload) -> usize {
        let Some(list) = self.handlers.get_mut(name) else {
            return 0;
        };
        for (_, handler) in list.iter_mut() {
            handler(payload);
        }
        list.len()
    }

    /// Whether anything listens to `name`.
    #[must_use]
    pub fn is_silent(&self, name: &str) -> bool {
        self.handlers.get(name).map_or(0, Vec::len) == 0
    }
}
