//! Construction options for a renderer instance.

use easel_core::Env;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::backend::BackendOptions;

/// Backend used when none is named.
pub const DEFAULT_BACKEND: &str = "canvas";

/// Touch target size used when coarse pointer mode is on without an explicit size.
pub const DEFAULT_POINTER_SIZE: f32 = 44.0;

/// Idle frames after which the animation clock stops.
pub const DEFAULT_SLEEP_AFTER_STILL: u32 = 10;

/// Coarse pointer (touch) hit-testing mode.
///
/// Serialized as `"auto"`, `true` or `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoarsePointer {
    /// On when the host delivers touch events.
    #[default]
    Auto,
    /// Always on.
    On,
    /// Always off.
    Off,
}

impl CoarsePointer {
    /// Resolve against the host environment.
    #[must_use]
    pub fn resolve(self, env: &Env) -> bool {
        match self {
            CoarsePointer::Auto => env.touch_events_supported,
            CoarsePointer::On => true,
            CoarsePointer::Off => false,
        }
    }
}

impl Serialize for CoarsePointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CoarsePointer::Auto => serializer.serialize_str("auto"),
            CoarsePointer::On => serializer.serialize_bool(true),
            CoarsePointer::Off => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for CoarsePointer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Word(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(CoarsePointer::On),
            Raw::Flag(false) => Ok(CoarsePointer::Off),
            Raw::Word(word) if word.eq_ignore_ascii_case("auto") => Ok(CoarsePointer::Auto),
            Raw::Word(other) => Err(serde::de::Error::custom(format!(
                "expected \"auto\", true or false, got \"{other}\""
            ))),
        }
    }
}

/// Options accepted by [`crate::Renderer::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RendererOptions {
    /// Backend name; unknown names fall back to the first registered backend.
    pub backend: String,
    /// Repaint only regions that changed.
    pub use_dirty_rect: bool,
    /// Coarse pointer mode.
    pub use_coarse_pointer: CoarsePointer,
    /// Touch target size in pixels.
    pub pointer_size: Option<f32>,
    /// Render for serialization only: no input, no animation loop.
    pub ssr: bool,
    /// Explicit surface width.
    pub width: Option<f32>,
    /// Explicit surface height.
    pub height: Option<f32>,
    /// Explicit device pixel ratio.
    pub device_pixel_ratio: Option<f32>,
    /// Idle frames before the animation clock stops, 0 to never stop.
    pub sleep_after_still: u32,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            use_dirty_rect: false,
            use_coarse_pointer: CoarsePointer::Auto,
            pointer_size: None,
            ssr: false,
            width: None,
            height: None,
            device_pixel_ratio: None,
            sleep_after_still: DEFAULT_SLEEP_AFTER_STILL,
        }
    }
}

impl RendererOptions {
    /// Options selecting `backend`.
    #[must_use]
    pub fn with_backend(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            ..Self::default()
        }
    }

    /// Pointer size to hand the input handler: set only in coarse pointer mode.
    #[must_use]
    pub fn resolve_pointer_size(&self, env: &Env) -> Option<f32> {
        self.use_coarse_pointer
            .resolve(env)
            .then(|| self.pointer_size.unwrap_or(DEFAULT_POINTER_SIZE))
    }

    /// The subset of options backends see.
    #[must_use]
    pub fn backend_options(&self) -> BackendOptions {
        BackendOptions {
            width: self.width,
            height: self.height,
            device_pixel_ratio: self.device_pixel_ratio,
            use_dirty_rect: self.use_dirty_rect,
            ssr: self.ssr,
        }
    }
}
