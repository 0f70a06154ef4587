//! The render scheduling coordinator.
//!
//! A [`Renderer`] owns one scene, one backend, the input handler and the
//! animation clock. Mutations only mark dirty flags; painting happens when
//! the host asks for a frame through [`Renderer::tick`] or forces one with
//! [`Renderer::flush`].
//!
//! ```text
//!            refresh()                      nothing painted for
//!   Idle ───────────────► Active-dirty ◄──┐  `sleep_after_still` frames
//!    ▲                        │ flush     │ refresh()       │
//!    │                        ▼           │                 │
//!    └──────────────────  Active-clean ───┘◄────────────────┘
//! ```

use std::time::Duration;

use easel_core::{
    is_dark_background, Background, Element, ElementId, Env, EventPayload, HandlerId,
    InputEvent, InstanceId, RenderedEvent, Scene,
};

use crate::animation::{self, AnimatedProperty, Animation, Clip, ClipSample, Stage};
use crate::backend::{
    BackendKind, BackendRegistry, BackendResolution, HostSurface, LayerConfig, RenderBackend,
};
use crate::handler::{Handler, HoverResult};
use crate::options::RendererOptions;
use crate::proxy::InputProxy;
use crate::RenderResult;

/// One renderer instance: scene, backend, input and frame scheduling.
pub struct Renderer {
    id: InstanceId,
    scene: Scene,
    backend: Box<dyn RenderBackend>,
    resolution: BackendResolution,
    ssr: bool,
    proxy: Option<InputProxy>,
    handler: Handler,
    animation: Animation,
    needs_refresh: bool,
    needs_refresh_hover: bool,
    still_frame_accum: u32,
    sleep_after_still: u32,
    background: Option<Background>,
    dark_mode: bool,
    disposed: bool,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("id", &self.id)
            .field("backend", &self.backend.backend_type())
            .field("ssr", &self.ssr)
            .field("needs_refresh", &self.needs_refresh)
            .field("needs_refresh_hover", &self.needs_refresh_hover)
            .field("still_frames", &self.still_frame_accum)
            .field("animating", &self.animation.is_running())
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Create a renderer.
    ///
    /// Unknown backend names fall back to the first registered backend.
    /// In ssr mode, or when the backend can only serialize, no input proxy is
    /// created and the animation clock is left stopped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RenderError::NoBackend`] if the registry is empty, or
    /// the backend factory's error.
    pub fn new(
        registry: &BackendRegistry,
        env: &Env,
        host: Option<&HostSurface>,
        options: &RendererOptions,
    ) -> RenderResult<Self> {
        let id = InstanceId::next();
        let scene = Scene::new();

        let (resolution, backend) =
            registry.create(&options.backend, host, &options.backend_options(), id)?;
        let ssr = options.ssr || backend.ssr_only();

        let proxy = if ssr || !env.is_interactive() {
            None
        } else {
            backend
                .viewport_root()
                .map(|root| InputProxy::new(root, backend.viewport_root_offset()))
        };

        let handler = Handler::new(options.resolve_pointer_size(env));
        let mut animation = Animation::new(if ssr { Stage::Noop } else { Stage::Flush });
        if !ssr {
            animation.start();
        }

        tracing::info!(
            instance = %id,
            backend = backend.backend_type(),
            ssr,
            input = proxy.is_some(),
            pointer_size = ?handler.pointer_size(),
            "renderer created"
        );

        Ok(Self {
            id,
            scene,
            backend,
            resolution,
            ssr,
            proxy,
            handler,
            animation,
            needs_refresh: true,
            needs_refresh_hover: true,
            still_frame_accum: 0,
            sleep_after_still: options.sleep_after_still,
            background: None,
            dark_mode: false,
            disposed: false,
        })
    }

    /// Instance id.
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    // ---------------------------------------------------------------------
    // Scene mutation
    // ---------------------------------------------------------------------

    /// Add a root element and attach it to this instance.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = self.scene.add_root(element);
        self.scene.attach_subtree(id, self.id);
        self.refresh();
        id
    }

    /// Add an element as the last child of a group.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is missing or not a group.
    pub fn add_to_group(&mut self, parent: ElementId, element: Element) -> RenderResult<ElementId> {
        let id = self.scene.add_child(parent, element)?;
        self.refresh();
        Ok(id)
    }

    /// Remove a root element and its subtree, detached from this instance.
    ///
    /// Unknown ids are ignored without scheduling a repaint.
    pub fn remove(&mut self, id: ElementId) -> Vec<Element> {
        let mut removed = self.scene.remove_root(id);
        if removed.is_empty() {
            return removed;
        }
        for el in &mut removed {
            el.detach();
            self.animation.remove_clips_for(el.id);
        }
        let ids: Vec<ElementId> = removed.iter().map(|el| el.id).collect();
        self.handler.forget(&ids);
        self.refresh();
        removed
    }

    /// Remove every root and clear the backend.
    ///
    /// Groups are detached recursively while the scene still holds them.
    pub fn clear(&mut self) {
        let groups: Vec<ElementId> = self
            .scene
            .root_elements()
            .filter(|el| el.is_group())
            .map(|el| el.id)
            .collect();
        let mut forgotten = Vec::new();
        for group in groups {
            for id in self.scene.detach_subtree(group) {
                self.animation.remove_clips_for(id);
                forgotten.push(id);
            }
        }
        for el in self.scene.remove_all_roots() {
            self.animation.remove_clips_for(el.id);
            forgotten.push(el.id);
        }
        self.handler.forget(&forgotten);
        self.backend.clear();
        tracing::debug!(instance = %self.id, "scene cleared");
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    // ---------------------------------------------------------------------
    // Frame scheduling
    // ---------------------------------------------------------------------

    /// Schedule a full repaint and wake the clock.
    pub fn refresh(&mut self) {
        self.needs_refresh = true;
        self.animation.start();
    }

    /// Schedule a hover overlay repaint. Does not wake the clock.
    pub fn refresh_hover(&mut self) {
        self.needs_refresh_hover = true;
    }

    /// Repaint now, regardless of the dirty flag.
    pub fn refresh_immediately(&mut self) {
        self.advance_silently();
        self.needs_refresh = false;
        self.paint();
    }

    /// Repaint the hover overlay now, regardless of the dirty flag.
    pub fn refresh_hover_immediately(&mut self) {
        self.needs_refresh_hover = false;
        self.paint_hover();
    }

    /// Force a flush outside the clock. Returns whether anything painted.
    pub fn flush(&mut self) -> bool {
        self.flush_inner(false)
    }

    /// The host wants a frame. Returns whether anything painted.
    ///
    /// Does nothing while the clock is stopped.
    pub fn tick(&mut self) -> bool {
        if self.disposed || !self.animation.is_running() {
            return false;
        }
        let update = self.animation.update(false);
        self.apply_samples(&update.samples);
        update.flush_stage && self.flush_inner(true)
    }

    /// Keep the clock running without scheduling a repaint.
    pub fn wake_up(&mut self) {
        self.animation.start();
        self.still_frame_accum = 0;
    }

    /// Set how many clean frames stop the clock; 0 never stops it.
    pub fn set_sleep_after_still(&mut self, frames: u32) {
        self.sleep_after_still = frames;
    }

    /// Whether the clock is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_running()
    }

    /// Whether a full repaint is pending.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    /// Whether a hover repaint is pending.
    #[must_use]
    pub fn needs_refresh_hover(&self) -> bool {
        self.needs_refresh_hover
    }

    /// Consecutive frames that painted nothing.
    #[must_use]
    pub fn still_frames(&self) -> u32 {
        self.still_frame_accum
    }

    fn flush_inner(&mut self, from_inside: bool) -> bool {
        if !from_inside {
            self.advance_silently();
        }

        let start = animation::now();
        let mut rendered = false;

        if self.needs_refresh {
            // Cleared first: a refresh requested while painting must survive.
            self.needs_refresh = false;
            self.paint();
            rendered = true;
        }
        if self.needs_refresh_hover {
            self.needs_refresh_hover = false;
            self.paint_hover();
            rendered = true;
        }

        let elapsed = start.map_or(Duration::ZERO, |s| s.elapsed());

        if rendered {
            self.still_frame_accum = 0;
            self.handler
                .trigger("rendered", &EventPayload::Rendered(RenderedEvent { elapsed }));
            tracing::trace!(instance = %self.id, ?elapsed, "frame rendered");
        } else if self.sleep_after_still > 0 {
            self.still_frame_accum += 1;
            if self.still_frame_accum > self.sleep_after_still {
                self.animation.stop();
                tracing::debug!(
                    instance = %self.id,
                    still_frames = self.still_frame_accum,
                    "animation clock idle"
                );
            }
        }
        rendered
    }

    fn advance_silently(&mut self) {
        let update = self.animation.update(true);
        self.apply_samples(&update.samples);
    }

    fn paint(&mut self) {
        if let Err(err) = self.backend.refresh(&self.scene) {
            tracing::warn!(instance = %self.id, error = %err, "backend refresh failed");
        }
    }

    fn paint_hover(&mut self) {
        let overlay = self.backend.capabilities().hover_overlay
            && self.backend.kind() == BackendKind::Raster;
        if !overlay {
            return;
        }
        if let Err(err) = self.backend.refresh_hover(&self.scene) {
            tracing::warn!(instance = %self.id, error = %err, "backend hover refresh failed");
        }
    }

    // ---------------------------------------------------------------------
    // Animation
    // ---------------------------------------------------------------------

    /// Start animating an element property.
    pub fn animate(&mut self, clip: Clip) {
        self.animation.add_clip(clip);
        self.wake_up();
    }

    /// Stop the clock and drop every clip.
    pub fn clear_animation(&mut self) {
        self.animation.clear();
    }

    fn apply_samples(&mut self, samples: &[ClipSample]) {
        if samples.is_empty() {
            return;
        }
        for sample in samples {
            let Some(el) = self.scene.get_element_mut(sample.target) else {
                continue;
            };
            let value = sample.value;
            match sample.property {
                AnimatedProperty::X => el.transform.x = value,
                AnimatedProperty::Y => el.transform.y = value,
                AnimatedProperty::Width => el.transform.width = value,
                AnimatedProperty::Height => el.transform.height = value,
                AnimatedProperty::Rotation => el.transform.rotation = value,
                AnimatedProperty::Opacity => el.style.opacity = value.clamp(0.0, 1.0),
            }
        }
        self.needs_refresh = true;
    }

    // ---------------------------------------------------------------------
    // Surface
    // ---------------------------------------------------------------------

    /// Resize the surface; `None` re-reads the host size. The input proxy
    /// picks up the viewport's new client offset.
    ///
    /// # Errors
    ///
    /// Returns the backend's resize error.
    pub fn resize(&mut self, width: Option<f32>, height: Option<f32>) -> RenderResult<()> {
        self.backend.resize(width, height)?;
        if let Some(proxy) = self.proxy.as_mut() {
            proxy.set_offset(self.backend.viewport_root_offset());
        }
        self.handler.resize(&mut self.scene);
        tracing::debug!(
            instance = %self.id,
            width = self.backend.width(),
            height = self.backend.height(),
            "renderer resized"
        );
        self.refresh();
        Ok(())
    }

    /// Surface width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.backend.width()
    }

    /// Surface height.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.backend.height()
    }

    /// Set the scene background and reclassify dark mode.
    pub fn set_background_color(&mut self, background: impl Into<Background>) {
        let background = background.into();
        if self.backend.capabilities().background {
            self.backend.set_background(Some(&background));
        }
        self.refresh();
        self.dark_mode = is_dark_background(Some(&background));
        tracing::debug!(instance = %self.id, dark_mode = self.dark_mode, "background set");
        self.background = Some(background);
    }

    /// The last background set.
    #[must_use]
    pub fn background_color(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Override the dark mode flag.
    pub fn set_dark_mode(&mut self, dark: bool) {
        self.dark_mode = dark;
    }

    /// Whether the background is dark.
    #[must_use]
    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Configure a backend layer.
    pub fn config_layer(&mut self, z_level: i32, config: &LayerConfig) {
        if self.backend.capabilities().layer_config {
            self.backend.configure_layer(z_level, config);
        }
        self.refresh();
    }

    /// Serialize the scene.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RenderError::Unsupported`] if the backend cannot.
    pub fn render_to_string(&self) -> RenderResult<String> {
        self.backend.render_to_string(&self.scene)
    }

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// How the backend name was resolved.
    #[must_use]
    pub fn backend_resolution(&self) -> &BackendResolution {
        &self.resolution
    }

    /// Whether the renderer runs in server-side rendering mode.
    #[must_use]
    pub fn is_ssr(&self) -> bool {
        self.ssr
    }

    // ---------------------------------------------------------------------
    // Input and events
    // ---------------------------------------------------------------------

    /// Whether a live input proxy is attached.
    #[must_use]
    pub fn has_input_proxy(&self) -> bool {
        self.proxy.is_some()
    }

    /// Deliver an input event. Returns whether hover state changed.
    ///
    /// With a proxy the event is in client coordinates; without one it is
    /// taken as viewport-local. Ignored in ssr mode.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if self.ssr || self.disposed {
            return false;
        }
        let local = match &self.proxy {
            Some(proxy) => match proxy.translate(event) {
                Some(local) => local,
                None => return false,
            },
            None => event.clone(),
        };
        let changed = self.handler.dispatch(&mut self.scene, &local);
        if changed {
            self.refresh_hover();
            self.wake_up();
        }
        changed
    }

    /// Look up what lies under a viewport point.
    #[must_use]
    pub fn find_hover(&self, x: f32, y: f32) -> HoverResult {
        self.handler.find_hover(&self.scene, x, y)
    }

    /// Set the default cursor.
    pub fn set_cursor_style(&mut self, cursor: &str) {
        self.handler.set_cursor_style(cursor);
    }

    /// Cursor currently shown.
    #[must_use]
    pub fn cursor(&self) -> &str {
        self.handler.cursor()
    }

    /// Bind an event handler.
    pub fn on(&mut self, name: &str, handler: impl FnMut(&EventPayload) + 'static) -> HandlerId {
        self.handler.on(name, handler)
    }

    /// Unbind event handlers.
    pub fn off(&mut self, name: Option<&str>, handler: Option<HandlerId>) {
        self.handler.off(name, handler);
    }

    /// Raise an event. Returns how many handlers ran.
    pub fn trigger(&mut self, name: &str, payload: &EventPayload) -> usize {
        self.handler.trigger(name, payload)
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Tear down the instance and release everything it holds.
    pub fn dispose(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.disposed {
            return;
        }
        self.animation.stop();
        self.clear();
        self.scene.dispose();
        self.backend.dispose();
        if let Some(proxy) = self.proxy.as_mut() {
            proxy.dispose();
        }
        self.handler.dispose();
        self.disposed = true;
        tracing::info!(instance = %self.id, "renderer disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CoarsePointer;
    use easel_core::PointerPhase;
    use std::cell::Cell;
    use std::rc::Rc;

    fn headless(options: &RendererOptions) -> Renderer {
        Renderer::new(
            &BackendRegistry::with_defaults(),
            &Env::headless(),
            Some(&HostSurface::new(200.0, 100.0)),
            options,
        )
        .expect("renderer")
    }

    fn browser_env() -> Env {
        Env::from_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0",
        )
    }

    #[test]
    fn starts_dirty_and_running() {
        let renderer = headless(&RendererOptions::default());
        assert!(renderer.needs_refresh());
        assert!(renderer.needs_refresh_hover());
        assert!(renderer.is_animating());
        assert!(!renderer.is_ssr());
        assert_eq!(renderer.backend().backend_type(), "canvas");
        assert!((renderer.width() - 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn flush_clears_both_flags() {
        let mut renderer = headless(&RendererOptions::default());
        assert!(renderer.flush());
        assert!(!renderer.needs_refresh());
        assert!(!renderer.needs_refresh_hover());
        assert!(!renderer.flush());
        assert_eq!(renderer.still_frames(), 1);
    }

    #[test]
    fn clock_sleeps_after_threshold() {
        let mut renderer = headless(&RendererOptions {
            sleep_after_still: 2,
            ..RendererOptions::default()
        });
        assert!(renderer.flush());
        for _ in 0..2 {
            renderer.flush();
            assert!(renderer.is_animating());
        }
        renderer.flush();
        assert!(!renderer.is_animating());

        renderer.refresh();
        assert!(renderer.is_animating());
        assert_eq!(renderer.still_frames(), 3);
        assert!(renderer.flush());
        assert_eq!(renderer.still_frames(), 0);
    }

    #[test]
    fn zero_threshold_never_sleeps() {
        let mut renderer = headless(&RendererOptions {
            sleep_after_still: 0,
            ..RendererOptions::default()
        });
        for _ in 0..50 {
            renderer.flush();
        }
        assert!(renderer.is_animating());
        assert_eq!(renderer.still_frames(), 0);
    }

    #[test]
    fn refresh_hover_does_not_wake_clock() {
        let mut renderer = headless(&RendererOptions {
            sleep_after_still: 1,
            ..RendererOptions::default()
        });
        renderer.flush();
        renderer.flush();
        renderer.flush();
        assert!(!renderer.is_animating());

        renderer.refresh_hover();
        assert!(!renderer.is_animating());
        assert!(renderer.needs_refresh_hover());

        renderer.wake_up();
        assert!(renderer.is_animating());
        assert!(!renderer.needs_refresh());
        assert_eq!(renderer.still_frames(), 0);
    }

    #[test]
    fn tick_is_inert_while_stopped() {
        let mut renderer = headless(&RendererOptions::default());
        assert!(renderer.tick());
        renderer.set_sleep_after_still(1);
        assert!(!renderer.tick());
        assert!(!renderer.tick());
        assert!(!renderer.is_animating());

        renderer.refresh_hover();
        assert!(!renderer.tick());
        assert!(renderer.needs_refresh_hover());

        renderer.refresh();
        assert!(renderer.tick());
        assert!(!renderer.needs_refresh_hover());
    }

    #[test]
    fn rendered_event_fires_on_paint_only() {
        let mut renderer = headless(&RendererOptions::default());
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        renderer.on("rendered", move |payload| {
            assert!(matches!(payload, EventPayload::Rendered(_)));
            seen.set(seen.get() + 1);
        });
        renderer.flush();
        renderer.flush();
        renderer.add(Element::rect(0.0, 0.0, 5.0, 5.0));
        renderer.flush();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn add_attaches_and_remove_detaches() {
        let mut renderer = headless(&RendererOptions::default());
        renderer.flush();
        let group = renderer.add(Element::group());
        let child = renderer
            .add_to_group(group, Element::rect(0.0, 0.0, 1.0, 1.0))
            .expect("group");
        assert_eq!(
            renderer.scene().get_element(child).and_then(Element::owner),
            Some(renderer.id())
        );
        renderer.flush();

        let removed = renderer.remove(group);
        assert_eq!(removed.len(), 2);
        assert!(removed.iter().all(|el| el.owner().is_none()));
        assert!(renderer.needs_refresh());

        renderer.flush();
        assert!(renderer.remove(ElementId::new()).is_empty());
        assert!(!renderer.needs_refresh());
    }

    #[test]
    fn clear_empties_scene_and_clips() {
        let mut renderer = headless(&RendererOptions::default());
        let group = renderer.add(Element::group());
        let child = renderer
            .add_to_group(group, Element::rect(0.0, 0.0, 1.0, 1.0))
            .expect("group");
        renderer.animate(Clip::new(
            child,
            AnimatedProperty::X,
            0.0,
            10.0,
            Duration::from_millis(100),
        ));
        renderer.clear();
        assert!(renderer.scene().is_empty());
        assert_eq!(renderer.animation.clip_count(), 0);
    }

    #[test]
    fn ssr_has_no_proxy_and_no_clock() {
        let renderer = Renderer::new(
            &BackendRegistry::with_defaults(),
            &browser_env(),
            Some(&HostSurface::new(100.0, 100.0)),
            &RendererOptions {
                ssr: true,
                ..RendererOptions::default()
            },
        )
        .expect("renderer");
        assert!(renderer.is_ssr());
        assert!(!renderer.has_input_proxy());
        assert!(!renderer.is_animating());
        assert_eq!(renderer.animation.stage(), Stage::Noop);
    }

    #[test]
    fn ssr_only_backend_implies_ssr() {
        let renderer = Renderer::new(
            &BackendRegistry::with_defaults(),
            &browser_env(),
            None,
            &RendererOptions::with_backend("svg"),
        )
        .expect("renderer");
        assert!(renderer.is_ssr());
        assert!(!renderer.has_input_proxy());
        assert!(renderer.render_to_string().is_ok());
    }

    #[test]
    fn interactive_host_gets_proxy() {
        let renderer = Renderer::new(
            &BackendRegistry::with_defaults(),
            &browser_env(),
            Some(&HostSurface::new(100.0, 100.0)),
            &RendererOptions::default(),
        )
        .expect("renderer");
        assert!(renderer.has_input_proxy());

        let headless = headless(&RendererOptions::default());
        assert!(!headless.has_input_proxy());
    }

    #[test]
    fn coarse_pointer_reaches_handler() {
        let renderer = headless(&RendererOptions {
            use_coarse_pointer: CoarsePointer::On,
            ..RendererOptions::default()
        });
        assert_eq!(renderer.handler.pointer_size(), Some(44.0));
    }

    #[test]
    fn hover_change_schedules_hover_repaint() {
        let mut renderer = headless(&RendererOptions::default());
        let id = renderer.add(Element::rect(0.0, 0.0, 10.0, 10.0).with_cursor("pointer"));
        renderer.flush();
        let changed = renderer.handle_input(&InputEvent::Pointer {
            x: 5.0,
            y: 5.0,
            button: 0,
            phase: PointerPhase::Move,
        });
        assert!(changed);
        assert!(renderer.needs_refresh_hover());
        assert!(!renderer.needs_refresh());
        assert_eq!(renderer.cursor(), "pointer");
        assert_eq!(renderer.find_hover(5.0, 5.0).target, Some(id));
    }

    #[test]
    fn removing_hovered_element_resets_cursor() {
        let mut renderer = headless(&RendererOptions::default());
        let id = renderer.add(Element::rect(0.0, 0.0, 10.0, 10.0).with_cursor("pointer"));
        let outs = Rc::new(Cell::new(0));
        let seen = Rc::clone(&outs);
        renderer.on("mouseout", move |_| seen.set(seen.get() + 1));

        renderer.handle_input(&InputEvent::Pointer {
            x: 5.0,
            y: 5.0,
            button: 0,
            phase: PointerPhase::Move,
        });
        assert_eq!(renderer.cursor(), "pointer");

        renderer.remove(id);
        assert_eq!(renderer.cursor(), crate::handler::DEFAULT_CURSOR);
        renderer.handle_input(&InputEvent::Pointer {
            x: 50.0,
            y: 50.0,
            button: 0,
            phase: PointerPhase::Move,
        });
        assert_eq!(outs.get(), 0);
    }

    #[test]
    fn background_sets_dark_mode() {
        let mut renderer = headless(&RendererOptions::default());
        renderer.flush();
        renderer.set_background_color("#101010");
        assert!(renderer.is_dark_mode());
        assert!(renderer.needs_refresh());
        assert_eq!(
            renderer.background_color(),
            Some(&Background::Color("#101010".to_string()))
        );
        renderer.set_dark_mode(false);
        assert!(!renderer.is_dark_mode());
        renderer.set_background_color("white");
        assert!(!renderer.is_dark_mode());
    }

    #[test]
    fn resize_marks_refresh() {
        let mut renderer = headless(&RendererOptions::default());
        renderer.flush();
        renderer.resize(Some(320.0), Some(240.0)).expect("resize");
        assert!((renderer.width() - 320.0).abs() < f32::EPSILON);
        assert!((renderer.height() - 240.0).abs() < f32::EPSILON);
        assert!(renderer.needs_refresh());
    }

    #[test]
    fn animation_samples_mark_refresh() {
        let mut renderer = headless(&RendererOptions::default());
        let id = renderer.add(Element::rect(0.0, 0.0, 10.0, 10.0));
        renderer.animate(Clip::new(
            id,
            AnimatedProperty::Opacity,
            1.0,
            0.0,
            Duration::ZERO,
        ));
        renderer.flush();
        assert!(renderer
            .scene()
            .get_element(id)
            .is_some_and(|el| el.style.opacity.abs() < f32::EPSILON));
        assert_eq!(renderer.animation.clip_count(), 0);
    }

    #[test]
    fn teardown_is_complete_and_idempotent() {
        let mut renderer = Renderer::new(
            &BackendRegistry::with_defaults(),
            &browser_env(),
            Some(&HostSurface::new(100.0, 100.0)),
            &RendererOptions::default(),
        )
        .expect("renderer");
        renderer.add(Element::rect(0.0, 0.0, 1.0, 1.0));
        renderer.on("click", |_| {});
        renderer.teardown();
        renderer.teardown();

        assert!(renderer.scene().is_disposed());
        assert!(renderer.scene().is_empty());
        assert!(!renderer.is_animating());
        assert!(renderer.proxy.as_ref().is_some_and(InputProxy::is_disposed));
        assert!(renderer.handler.is_disposed());
        assert!(!renderer.tick());
    }
}
