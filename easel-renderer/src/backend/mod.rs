//! Rendering backend contract and implementations.
//!
//! A backend is the rasterization target bound to exactly one renderer
//! instance. Optional operations are advertised through
//! [`BackendCapabilities`] instead of being probed for.

pub mod canvas2d;
pub mod registry;
pub mod svg;

use easel_core::{Background, InstanceId, Scene};
use serde::{Deserialize, Serialize};

use crate::{RenderError, RenderResult};

pub use registry::{BackendFactory, BackendRegistry, BackendResolution};

/// Broad family a backend belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Pixel surface with separately composited layers.
    Raster,
    /// Retained vector markup.
    Vector,
}

/// Optional operations a backend supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BackendCapabilities {
    /// Can repaint the hover overlay independently of the scene.
    pub hover_overlay: bool,
    /// Accepts per-layer configuration.
    pub layer_config: bool,
    /// Paints a scene background.
    pub background: bool,
    /// Can serialize the scene to a string.
    pub render_to_string: bool,
}

/// The host container a renderer draws into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostSurface {
    /// Container width in CSS pixels.
    pub width: f32,
    /// Container height in CSS pixels.
    pub height: f32,
    /// Physical pixels per CSS pixel.
    #[serde(default = "default_dpr")]
    pub device_pixel_ratio: f32,
    /// Container left edge in client coordinates.
    #[serde(default)]
    pub offset_left: f32,
    /// Container top edge in client coordinates.
    #[serde(default)]
    pub offset_top: f32,
}

fn default_dpr() -> f32 {
    1.0
}

impl HostSurface {
    /// Container of the given size at the client origin.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio: 1.0,
            offset_left: 0.0,
            offset_top: 0.0,
        }
    }
}

/// Handle to the element input is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportRoot {
    /// Instance owning the viewport.
    pub instance: InstanceId,
    /// Kind of backend that created it.
    pub kind: BackendKind,
}

/// Position of the viewport root in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportOffset {
    /// Left edge.
    pub offset_left: f32,
    /// Top edge.
    pub offset_top: f32,
}

/// Per-layer settings for raster backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Color the layer is cleared with before each paint.
    pub clear_color: Option<Background>,
    /// Keep a fading copy of the previous frame.
    pub motion_blur: bool,
    /// Opacity of the previous frame when motion blur is on.
    pub last_frame_alpha: f32,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            clear_color: None,
            motion_blur: false,
            last_frame_alpha: 0.7,
        }
    }
}

/// Options handed to backend factories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendOptions {
    /// Explicit width, otherwise the host width.
    pub width: Option<f32>,
    /// Explicit height, otherwise the host height.
    pub height: Option<f32>,
    /// Overrides the host device pixel ratio.
    pub device_pixel_ratio: Option<f32>,
    /// Repaint only regions that changed.
    pub use_dirty_rect: bool,
    /// Server-side rendering requested.
    pub ssr: bool,
}

/// Fallback surface size when neither options nor host give one.
pub const DEFAULT_WIDTH: f32 = 800.0;
/// Fallback surface size when neither options nor host give one.
pub const DEFAULT_HEIGHT: f32 = 600.0;

/// Resolve a surface size from explicit values, the host, then defaults.
#[must_use]
pub fn resolve_size(
    width: Option<f32>,
    height: Option<f32>,
    host: Option<&HostSurface>,
) -> (f32, f32) {
    let w = width
        .or_else(|| host.map(|h| h.width))
        .unwrap_or(DEFAULT_WIDTH);
    let h = height
        .or_else(|| host.map(|h| h.height))
        .unwrap_or(DEFAULT_HEIGHT);
    (w, h)
}

/// Trait for rendering backends.
pub trait RenderBackend {
    /// Registered type name, e.g. `"canvas"`.
    fn backend_type(&self) -> &'static str;

    /// Backend family.
    fn kind(&self) -> BackendKind;

    /// Optional operations this backend supports.
    fn capabilities(&self) -> BackendCapabilities;

    /// Whether this backend can only serialize, never present.
    fn ssr_only(&self) -> bool {
        false
    }

    /// Resize the surface; `None` re-reads the size from the host.
    ///
    /// # Errors
    ///
    /// Returns an error if resizing fails.
    fn resize(&mut self, width: Option<f32>, height: Option<f32>) -> RenderResult<()>;

    /// Repaint the whole scene.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn refresh(&mut self, scene: &Scene) -> RenderResult<()>;

    /// Repaint the hover overlay only.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn refresh_hover(&mut self, _scene: &Scene) -> RenderResult<()> {
        Ok(())
    }

    /// Erase everything painted so far.
    fn clear(&mut self);

    /// Release all resources. Must not fail.
    fn dispose(&mut self);

    /// Surface width in CSS pixels.
    fn width(&self) -> f32;

    /// Surface height in CSS pixels.
    fn height(&self) -> f32;

    /// Element input is delivered to, `None` without a host.
    fn viewport_root(&self) -> Option<ViewportRoot>;

    /// Position of the viewport root in client coordinates.
    fn viewport_root_offset(&self) -> ViewportOffset;

    /// Configure a layer.
    fn configure_layer(&mut self, _z_level: i32, _config: &LayerConfig) {}

    /// Set the scene background.
    fn set_background(&mut self, _background: Option<&Background>) {}

    /// Serialize the scene.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Unsupported`] unless the backend advertises
    /// [`BackendCapabilities::render_to_string`].
    fn render_to_string(&self, _scene: &Scene) -> RenderResult<String> {
        Err(RenderError::Unsupported {
            backend: self.backend_type().to_string(),
            operation: "render_to_string".to_string(),
        })
    }
}
