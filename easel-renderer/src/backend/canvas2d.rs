//! Raster backend painting into per-layer 2D canvases.
//!
//! Pixels are out of scope here: painting is traced per element and counted,
//! which is enough to drive layers, the hover overlay and dirty rectangles.

use std::collections::{BTreeMap, HashMap};

use easel_core::{Background, Bounds, Element, ElementId, ElementKind, InstanceId, Scene};

use super::{
    resolve_size, BackendCapabilities, BackendKind, BackendOptions, HostSurface, LayerConfig,
    RenderBackend, ViewportOffset, ViewportRoot,
};
use crate::RenderResult;

/// Above this many dirty regions they are merged into one.
const MAX_DIRTY_REGIONS: usize = 5;

/// Counters for the last painted frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Elements painted.
    pub painted: usize,
    /// Elements skipped because they were outside every dirty region.
    pub skipped: usize,
    /// Regions repainted, empty for full repaints.
    pub dirty_regions: Vec<Bounds>,
    /// Layers touched.
    pub layers: usize,
}

#[derive(Debug, Default)]
struct Layer {
    config: LayerConfig,
    painted: usize,
}

/// 2D canvas renderer.
#[derive(Debug)]
pub struct Canvas2DBackend {
    instance: InstanceId,
    host: Option<HostSurface>,
    width: f32,
    height: f32,
    dpr: f32,
    use_dirty_rect: bool,
    layers: BTreeMap<i32, Layer>,
    background: Option<Background>,
    /// Elements as painted in the previous frame, for dirty tracking.
    previous: HashMap<ElementId, Element>,
    force_full: bool,
    last_frame: FrameStats,
    hover_painted: usize,
    frames: u64,
    disposed: bool,
}

impl Canvas2DBackend {
    /// Registered type name.
    pub const NAME: &'static str = "canvas";

    /// Create a new 2D canvas backend.
    #[must_use]
    pub fn new(host: Option<&HostSurface>, options: &BackendOptions, instance: InstanceId) -> Self {
        let (width, height) = resolve_size(options.width, options.height, host);
        let dpr = options
            .device_pixel_ratio
            .or_else(|| host.map(|h| h.device_pixel_ratio))
            .unwrap_or(1.0);
        tracing::debug!(
            %instance,
            width,
            height,
            dpr,
            dirty_rect = options.use_dirty_rect,
            "Canvas2D backend created"
        );
        Self {
            instance,
            host: host.copied(),
            width,
            height,
            dpr,
            use_dirty_rect: options.use_dirty_rect,
            layers: BTreeMap::new(),
            background: None,
            previous: HashMap::new(),
            force_full: true,
            last_frame: FrameStats::default(),
            hover_painted: 0,
            frames: 0,
            disposed: false,
        }
    }

    /// Statistics of the last full refresh.
    #[must_use]
    pub fn last_frame(&self) -> &FrameStats {
        &self.last_frame
    }

    /// Elements painted into the hover layer by the last hover refresh.
    #[must_use]
    pub fn hover_painted(&self) -> usize {
        self.hover_painted
    }

    /// Number of full refreshes so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Configuration of a layer, if it exists.
    #[must_use]
    pub fn layer_config(&self, z_level: i32) -> Option<&LayerConfig> {
        self.layers.get(&z_level).map(|l| &l.config)
    }

    /// Device pixel ratio in use.
    #[must_use]
    pub fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }

    /// Whether [`RenderBackend::dispose`] ran.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Regions that changed since the previous frame.
    fn dirty_regions(&self, list: &[&Element]) -> Vec<Bounds> {
        let mut regions = Vec::new();
        for el in list {
            match self.previous.get(&el.id) {
                Some(prev) if prev == *el => {}
                Some(prev) => {
                    regions.push(prev.bounds());
                    regions.push(el.bounds());
                }
                None => regions.push(el.bounds()),
            }
        }
        for (id, prev) in &self.previous {
            if !list.iter().any(|el| el.id == *id) {
                regions.push(prev.bounds());
            }
        }
        if regions.len() > MAX_DIRTY_REGIONS {
            let merged = regions
                .iter()
                .skip(1)
                .fold(regions[0], |acc, r| acc.union(r));
            regions = vec![merged];
        }
        regions
    }

    /// Render a single element to its layer.
    fn render_element(element: &Element) {
        let t = &element.transform;
        let (kind_name, details) = Self::element_description(&element.kind);

        tracing::trace!(
            "Render {kind_name} at ({}, {}) size {}x{} layer {}{details}",
            t.x,
            t.y,
            t.width,
            t.height,
            t.z_level
        );
    }

    /// Get a description of an element kind for logging.
    fn element_description(kind: &ElementKind) -> (&'static str, String) {
        match kind {
            ElementKind::Rect { corner_radius } => ("rect", format!(" radius={corner_radius}")),
            ElementKind::Circle => ("circle", String::new()),
            ElementKind::Text {
                content,
                font_size,
                color,
            } => (
                "text",
                format!(" content='{content}' font={font_size} color={color}"),
            ),
            ElementKind::Image { src, format } => {
                ("image", format!(" src={src} format={format:?}"))
            }
            ElementKind::Group { children } => {
                let count = children.len();
                ("group", format!(" children={count}"))
            }
        }
    }
}

impl RenderBackend for Canvas2DBackend {
    fn backend_type(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Raster
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            hover_overlay: true,
            layer_config: true,
            background: true,
            render_to_string: false,
        }
    }

    fn resize(&mut self, width: Option<f32>, height: Option<f32>) -> RenderResult<()> {
        let (w, h) = resolve_size(width, height, self.host.as_ref());
        if (w - self.width).abs() > f32::EPSILON || (h - self.height).abs() > f32::EPSILON {
            self.width = w;
            self.height = h;
            self.force_full = true;
        }
        tracing::debug!("Canvas2D resized to {}x{}", self.width, self.height);
        Ok(())
    }

    fn refresh(&mut self, scene: &Scene) -> RenderResult<()> {
        let list = scene.display_list();
        let regions = if self.use_dirty_rect && !self.force_full {
            Some(self.dirty_regions(&list))
        } else {
            None
        };

        tracing::trace!(
            background = self.background.is_some(),
            "Canvas2D refresh: {} elements, viewport {}x{}",
            list.len(),
            self.width,
            self.height
        );

        for layer in self.layers.values_mut() {
            layer.painted = 0;
        }

        let mut stats = FrameStats::default();
        for element in &list {
            if let Some(regions) = &regions {
                let bounds = element.bounds();
                if !regions.iter().any(|r| r.intersects(&bounds)) {
                    stats.skipped += 1;
                    continue;
                }
            }
            Self::render_element(element);
            self.layers
                .entry(element.transform.z_level)
                .or_default()
                .painted += 1;
            stats.painted += 1;
        }
        stats.layers = self.layers.values().filter(|l| l.painted > 0).count();
        stats.dirty_regions = regions.unwrap_or_default();

        self.previous = list.into_iter().map(|el| (el.id, el.clone())).collect();
        self.force_full = false;
        self.last_frame = stats;
        self.frames += 1;
        Ok(())
    }

    fn refresh_hover(&mut self, scene: &Scene) -> RenderResult<()> {
        let hovered = scene.hovered_elements();
        for element in &hovered {
            Self::render_element(element);
        }
        self.hover_painted = hovered.len();
        tracing::trace!("Canvas2D hover layer: {} elements", self.hover_painted);
        Ok(())
    }

    fn clear(&mut self) {
        for layer in self.layers.values_mut() {
            layer.painted = 0;
        }
        self.previous.clear();
        self.hover_painted = 0;
        self.force_full = true;
    }

    fn dispose(&mut self) {
        self.layers.clear();
        self.previous.clear();
        self.disposed = true;
        tracing::debug!(instance = %self.instance, "Canvas2D backend disposed");
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn viewport_root(&self) -> Option<ViewportRoot> {
        self.host.map(|_| ViewportRoot {
            instance: self.instance,
            kind: BackendKind::Raster,
        })
    }

    fn viewport_root_offset(&self) -> ViewportOffset {
        self.host
            .map(|h| ViewportOffset {
                offset_left: h.offset_left,
                offset_top: h.offset_top,
            })
            .unwrap_or_default()
    }

    fn configure_layer(&mut self, z_level: i32, config: &LayerConfig) {
        self.layers.entry(z_level).or_default().config = config.clone();
        self.force_full = true;
    }

    fn set_background(&mut self, background: Option<&Background>) {
        self.background = background.cloned();
        self.force_full = true;
    }
}
