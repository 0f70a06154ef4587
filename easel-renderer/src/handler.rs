//! Input dispatcher: hit testing, hover tracking and element events.
//!
//! Events raised on the bus:
//!
//! | name        | payload                  |
//! |-------------|--------------------------|
//! | `mousemove` | [`EventPayload::Element`] |
//! | `mouseover` | [`EventPayload::Element`] |
//! | `mouseout`  | [`EventPayload::Element`] |
//! | `mousedown` | [`EventPayload::Element`] |
//! | `mouseup`   | [`EventPayload::Element`] |
//! | `click`     | [`EventPayload::Element`] |
//! | `mousewheel`| [`EventPayload::Element`] |
//! | `keydown`   | [`EventPayload::Key`]     |
//! | `keyup`     | [`EventPayload::Key`]     |

use easel_core::{
    ElementEvent, ElementId, EventBus, EventPayload, HandlerId, InputEvent, KeyEvent,
    PointerPhase, Scene, TouchPhase,
};

/// Cursor shown when nothing with its own cursor is hovered.
pub const DEFAULT_CURSOR: &str = "default";

/// Result of a hover lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverResult {
    /// Interactive element that receives events.
    pub target: Option<ElementId>,
    /// Topmost element under the point, interactive or not.
    pub top_target: Option<ElementId>,
}

/// Routes input to elements and owns the event bus.
#[derive(Debug)]
pub struct Handler {
    bus: EventBus,
    pointer_size: Option<f32>,
    default_cursor: String,
    cursor: String,
    hovered: Option<ElementId>,
    last_down: Option<ElementId>,
    disposed: bool,
}

impl Handler {
    /// Create a handler. `pointer_size` enables coarse (touch) hit testing.
    #[must_use]
    pub fn new(pointer_size: Option<f32>) -> Self {
        Self {
            bus: EventBus::new(),
            pointer_size,
            default_cursor: DEFAULT_CURSOR.to_string(),
            cursor: DEFAULT_CURSOR.to_string(),
            hovered: None,
            last_down: None,
            disposed: false,
        }
    }

    /// Coarse pointer size, `None` for precise pointers.
    #[must_use]
    pub fn pointer_size(&self) -> Option<f32> {
        self.pointer_size
    }

    /// Currently hovered element.
    #[must_use]
    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    /// Look up what lies under a viewport point.
    #[must_use]
    pub fn find_hover(&self, scene: &Scene, x: f32, y: f32) -> HoverResult {
        let radius = self.pointer_size.map_or(0.0, |size| size / 2.0);
        let top_target = scene
            .display_list()
            .into_iter()
            .rev()
            .find(|el| el.contains_point(x, y))
            .map(|el| el.id);
        HoverResult {
            target: scene.element_near(x, y, radius),
            top_target,
        }
    }

    /// Dispatch a viewport-local event. Returns whether hover state changed.
    pub fn dispatch(&mut self, scene: &mut Scene, event: &InputEvent) -> bool {
        if self.disposed {
            return false;
        }
        match event {
            InputEvent::Pointer {
                x,
                y,
                button,
                phase,
            } => self.pointer(scene, *x, *y, *button, *phase),
            InputEvent::Touch(touch) => {
                let Some(point) = touch.primary_touch() else {
                    return false;
                };
                let (x, y) = (point.x, point.y);
                match touch.phase {
                    TouchPhase::Start => {
                        let changed = self.pointer(scene, x, y, 0, PointerPhase::Move);
                        self.pointer(scene, x, y, 0, PointerPhase::Down) || changed
                    }
                    TouchPhase::Move => self.pointer(scene, x, y, 0, PointerPhase::Move),
                    TouchPhase::End => self.pointer(scene, x, y, 0, PointerPhase::Up),
                    TouchPhase::Cancel => self.pointer(scene, x, y, 0, PointerPhase::Leave),
                }
            }
            InputEvent::Wheel { x, y, .. } => {
                let hover = self.find_hover(scene, *x, *y);
                self.emit("mousewheel", hover, *x, *y, 0);
                false
            }
            InputEvent::Key {
                key,
                pressed,
                modifiers,
            } => {
                let name = if *pressed { "keydown" } else { "keyup" };
                self.bus.trigger(
                    name,
                    &EventPayload::Key(KeyEvent {
                        key: key.clone(),
                        modifiers: *modifiers,
                    }),
                );
                false
            }
        }
    }

    fn pointer(&mut self, scene: &mut Scene, x: f32, y: f32, button: u8, phase: PointerPhase) -> bool {
        if phase == PointerPhase::Leave {
            self.last_down = None;
            return self.set_hover(scene, HoverResult::default(), x, y);
        }

        let hover = self.find_hover(scene, x, y);
        let changed = self.set_hover(scene, hover, x, y);
        match phase {
            PointerPhase::Move => self.emit("mousemove", hover, x, y, button),
            PointerPhase::Down => {
                self.last_down = hover.target;
                self.emit("mousedown", hover, x, y, button);
            }
            PointerPhase::Up => {
                self.emit("mouseup", hover, x, y, button);
                if self.last_down.take().is_some_and(|down| Some(down) == hover.target) {
                    self.emit("click", hover, x, y, button);
                }
            }
            PointerPhase::Leave => {}
        }
        changed
    }

    fn set_hover(&mut self, scene: &mut Scene, hover: HoverResult, x: f32, y: f32) -> bool {
        if hover.target == self.hovered {
            return false;
        }
        if let Some(old) = self.hovered.take() {
            scene.set_hovered(old, false);
            self.emit(
                "mouseout",
                HoverResult {
                    target: Some(old),
                    top_target: hover.top_target,
                },
                x,
                y,
                0,
            );
        }
        if let Some(new) = hover.target {
            scene.set_hovered(new, true);
            self.hovered = Some(new);
            self.emit("mouseover", hover, x, y, 0);
        }
        self.cursor = hover
            .target
            .and_then(|id| scene.get_element(id))
            .and_then(|el| el.cursor.clone())
            .unwrap_or_else(|| self.default_cursor.clone());
        tracing::trace!(hovered = ?self.hovered, cursor = %self.cursor, "hover changed");
        true
    }

    fn emit(&mut self, name: &str, hover: HoverResult, x: f32, y: f32, button: u8) {
        self.bus.trigger(
            name,
            &EventPayload::Element(ElementEvent {
                target: hover.target,
                top_target: hover.top_target,
                x,
                y,
                button,
            }),
        );
    }

    /// Forget hover state after the viewport changed size.
    pub fn resize(&mut self, scene: &mut Scene) {
        if let Some(old) = self.hovered.take() {
            scene.set_hovered(old, false);
        }
        self.last_down = None;
        self.cursor.clone_from(&self.default_cursor);
    }

    /// Drop hover and press state that points at removed elements.
    pub fn forget(&mut self, removed: &[ElementId]) {
        if self.last_down.is_some_and(|id| removed.contains(&id)) {
            self.last_down = None;
        }
        if self.hovered.is_some_and(|id| removed.contains(&id)) {
            self.hovered = None;
            self.cursor.clone_from(&self.default_cursor);
        }
    }

    /// Set the cursor shown over the empty viewport.
    pub fn set_cursor_style(&mut self, cursor: &str) {
        self.default_cursor = cursor.to_string();
        if self.hovered.is_none() {
            self.cursor = cursor.to_string();
        }
    }

    /// Cursor currently shown.
    #[must_use]
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    /// Bind a handler to an event name.
    pub fn on(&mut self, name: &str, handler: impl FnMut(&EventPayload) + 'static) -> HandlerId {
        self.bus.on(name, handler)
    }

    /// Unbind handlers, see [`EventBus::off`].
    pub fn off(&mut self, name: Option<&str>, handler: Option<HandlerId>) {
        self.bus.off(name, handler);
    }

    /// Raise an event. Returns how many handlers ran.
    pub fn trigger(&mut self, name: &str, payload: &EventPayload) -> usize {
        self.bus.trigger(name, payload)
    }

    /// Whether anything listens to `name`.
    #[must_use]
    pub fn is_silent(&self, name: &str) -> bool {
        self.bus.is_silent(name)
    }

    /// Drop every handler and stop dispatching.
    pub fn dispose(&mut self) {
        self.bus.off(None, None);
        self.hovered = None;
        self.last_down = None;
        self.disposed = true;
    }

    /// Whether [`Handler::dispose`] has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{Element, KeyModifiers, TouchEvent, TouchPoint};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(handler: &mut Handler, names: &[&str]) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in names {
            let log = Rc::clone(&log);
            let tag = (*name).to_string();
            handler.on(name, move |_| log.borrow_mut().push(tag.clone()));
        }
        log
    }

    fn pointer(x: f32, y: f32, phase: PointerPhase) -> InputEvent {
        InputEvent::Pointer {
            x,
            y,
            button: 0,
            phase,
        }
    }

    #[test]
    fn hover_enter_and_leave() {
        let mut scene = Scene::new();
        let id = scene.add_root(Element::rect(0.0, 0.0, 10.0, 10.0).with_cursor("pointer"));
        let mut handler = Handler::new(None);
        let log = recorder(&mut handler, &["mouseover", "mouseout", "mousemove"]);

        assert!(handler.dispatch(&mut scene, &pointer(5.0, 5.0, PointerPhase::Move)));
        assert_eq!(handler.hovered(), Some(id));
        assert_eq!(handler.cursor(), "pointer");
        assert!(scene.get_element(id).is_some_and(|el| el.hovered));

        assert!(!handler.dispatch(&mut scene, &pointer(6.0, 6.0, PointerPhase::Move)));

        assert!(handler.dispatch(&mut scene, &pointer(50.0, 50.0, PointerPhase::Move)));
        assert_eq!(handler.hovered(), None);
        assert_eq!(handler.cursor(), DEFAULT_CURSOR);
        assert_eq!(
            *log.borrow(),
            vec!["mouseover", "mousemove", "mousemove", "mouseout", "mousemove"]
        );
    }

    #[test]
    fn click_requires_down_and_up_on_same_target() {
        let mut scene = Scene::new();
        scene.add_root(Element::rect(0.0, 0.0, 10.0, 10.0));
        let mut handler = Handler::new(None);
        let log = recorder(&mut handler, &["click"]);

        handler.dispatch(&mut scene, &pointer(5.0, 5.0, PointerPhase::Down));
        handler.dispatch(&mut scene, &pointer(5.0, 5.0, PointerPhase::Up));
        handler.dispatch(&mut scene, &pointer(5.0, 5.0, PointerPhase::Down));
        handler.dispatch(&mut scene, &pointer(50.0, 50.0, PointerPhase::Up));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn coarse_pointer_grows_hit_area() {
        let mut scene = Scene::new();
        let id = scene.add_root(Element::rect(0.0, 0.0, 10.0, 10.0));
        let precise = Handler::new(None);
        let coarse = Handler::new(Some(44.0));

        assert_eq!(precise.find_hover(&scene, 20.0, 5.0).target, None);
        assert_eq!(coarse.find_hover(&scene, 20.0, 5.0).target, Some(id));
    }

    #[test]
    fn top_target_ignores_interactivity() {
        let mut scene = Scene::new();
        let below = scene.add_root(Element::rect(0.0, 0.0, 10.0, 10.0));
        let cover = scene.add_root(Element::rect(0.0, 0.0, 10.0, 10.0).with_interactive(false));
        let handler = Handler::new(None);
        let hover = handler.find_hover(&scene, 5.0, 5.0);
        assert_eq!(hover.target, Some(below));
        assert_eq!(hover.top_target, Some(cover));
    }

    #[test]
    fn touch_start_hovers_and_presses() {
        let mut scene = Scene::new();
        scene.add_root(Element::rect(0.0, 0.0, 10.0, 10.0));
        let mut handler = Handler::new(Some(44.0));
        let log = recorder(&mut handler, &["mousedown", "mouseover"]);
        let touch = InputEvent::Touch(TouchEvent::new(
            TouchPhase::Start,
            vec![TouchPoint {
                id: 1,
                x: 5.0,
                y: 5.0,
                pressure: None,
                radius: None,
            }],
            0,
        ));
        assert!(handler.dispatch(&mut scene, &touch));
        assert_eq!(*log.borrow(), vec!["mouseover", "mousedown"]);
    }

    #[test]
    fn keys_raise_keydown_and_keyup() {
        let mut scene = Scene::new();
        let mut handler = Handler::new(None);
        let log = recorder(&mut handler, &["keydown", "keyup"]);
        for pressed in [true, false] {
            handler.dispatch(
                &mut scene,
                &InputEvent::Key {
                    key: "Escape".to_string(),
                    pressed,
                    modifiers: KeyModifiers::default(),
                },
            );
        }
        assert_eq!(*log.borrow(), vec!["keydown", "keyup"]);
    }

    #[test]
    fn removed_elements_are_forgotten() {
        let mut scene = Scene::new();
        let id = scene.add_root(Element::rect(0.0, 0.0, 10.0, 10.0).with_cursor("pointer"));
        let mut handler = Handler::new(None);
        let log = recorder(&mut handler, &["mouseout", "click"]);

        handler.dispatch(&mut scene, &pointer(5.0, 5.0, PointerPhase::Down));
        assert_eq!(handler.hovered(), Some(id));

        scene.remove_root(id);
        handler.forget(&[id]);
        assert_eq!(handler.hovered(), None);
        assert_eq!(handler.cursor(), DEFAULT_CURSOR);

        // A replacement under the same point does not complete the old press.
        scene.add_root(Element::rect(0.0, 0.0, 10.0, 10.0));
        handler.dispatch(&mut scene, &pointer(5.0, 5.0, PointerPhase::Up));
        handler.dispatch(&mut scene, &pointer(50.0, 50.0, PointerPhase::Move));
        assert_eq!(*log.borrow(), vec!["mouseout"]);
    }

    #[test]
    fn resize_and_dispose_reset_state() {
        let mut scene = Scene::new();
        let id = scene.add_root(Element::rect(0.0, 0.0, 10.0, 10.0));
        let mut handler = Handler::new(None);
        handler.set_cursor_style("crosshair");
        handler.dispatch(&mut scene, &pointer(5.0, 5.0, PointerPhase::Move));

        handler.resize(&mut scene);
        assert_eq!(handler.hovered(), None);
        assert_eq!(handler.cursor(), "crosshair");
        assert!(scene.get_element(id).is_some_and(|el| !el.hovered));

        handler.on("mousemove", |_| {});
        handler.dispose();
        assert!(handler.is_disposed());
        assert!(handler.is_silent("mousemove"));
        assert!(!handler.dispatch(&mut scene, &pointer(5.0, 5.0, PointerPhase::Move)));
    }
}
