//! Input events for scene interaction.

use serde::{Deserialize, Serialize};

use crate::ElementId;

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled (e.g., palm rejection).
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Pressure (0.0 to 1.0, if available).
    pub pressure: Option<f32>,
    /// Touch radius in pixels (if available).
    pub radius: Option<f32>,
}

/// A touch event with one or more touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    pub touches: Vec<TouchPoint>,
    /// Timestamp in milliseconds since start.
    pub timestamp_ms: u64,
    /// Element ID that was touched (if any).
    pub target_element: Option<ElementId>,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>, timestamp_ms: u64) -> Self {
        Self {
            phase,
            touches,
            timestamp_ms,
            target_element: None,
        }
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}

/// Phase of a pointer (mouse/pen) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Pointer moved.
    Move,
    /// Button pressed.
    Down,
    /// Button released.
    Up,
    /// Pointer left the viewport.
    Leave,
}

/// All input events the renderer can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Raw touch event.
    Touch(TouchEvent),

    /// Pointer (mouse) event.
    Pointer {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
        /// Mouse button (0 = left, 1 = middle, 2 = right).
        button: u8,
        /// What happened.
        phase: PointerPhase,
    },

    /// Wheel scroll.
    Wheel {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
        /// Vertical scroll delta.
        delta_y: f32,
    },

    /// Keyboard event.
    Key {
        /// Key name or code.
        key: String,
        /// Whether the key is pressed.
        pressed: bool,
        /// Active modifier keys.
        modifiers: KeyModifiers,
    },
}

impl InputEvent {
    /// Primary position of the event, if it has one.
    #[must_use]
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            InputEvent::Touch(touch) => touch.primary_touch().map(|t| (t.x, t.y)),
            InputEvent::Pointer { x, y, .. } | InputEvent::Wheel { x, y, .. } => Some((*x, *y)),
            InputEvent::Key { .. } => None,
        }
    }

    /// Copy of the event with every position shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let mut event = self.clone();
        match &mut event {
            InputEvent::Touch(touch) => {
                for t in &mut touch.touches {
                    t.x += dx;
                    t.y += dy;
                }
            }
            InputEvent::Pointer { x, y, .. } | InputEvent::Wheel { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
            InputEvent::Key { .. } => {}
        }
        event
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translated_shifts_pointer_and_touch() {
        let pointer = InputEvent::Pointer {
            x: 10.0,
            y: 20.0,
            button: 0,
            phase: PointerPhase::Move,
        };
        assert_eq!(pointer.translated(-5.0, -5.0).position(), Some((5.0, 15.0)));

        let touch = InputEvent::Touch(TouchEvent::new(
            TouchPhase::Start,
            vec![TouchPoint {
                id: 0,
                x: 1.0,
                y: 1.0,
                pressure: None,
                radius: None,
            }],
            0,
        ));
        assert_eq!(touch.translated(1.0, 2.0).position(), Some((2.0, 3.0)));
    }

    #[test]
    fn key_events_have_no_position() {
        let key = InputEvent::Key {
            key: "Escape".to_string(),
            pressed: true,
            modifiers: KeyModifiers::default(),
        };
        assert!(key.position().is_none());
        assert_eq!(key.translated(3.0, 3.0), key);
    }
}
