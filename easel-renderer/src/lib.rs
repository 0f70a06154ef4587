//! # Easel Renderer
//!
//! Frame scheduling for 2D scenes: decides *when* a backend repaints and
//! keeps the backend, the input handler and the animation clock in step.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 InstanceRegistry                     │
//! │        InstanceId ──► Renderer (coordinator)         │
//! ├──────────────┬──────────────┬────────────────────────┤
//! │ Scene        │ Handler      │ Animation clock        │
//! │ (easel-core) │ + InputProxy │ (host-driven ticks)    │
//! ├──────────────┴──────────────┴────────────────────────┤
//! │           RenderBackend (from BackendRegistry)       │
//! │      canvas (raster, layers)  │  svg (vector, ssr)   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations mark dirty flags; the host calls [`Renderer::tick`] once per
//! display frame and the coordinator flushes what is owed. After
//! `sleep_after_still` clean frames the clock stops until something new
//! is scheduled.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod backend;
pub mod error;
pub mod handler;
pub mod instance;
pub mod options;
pub mod proxy;
pub mod renderer;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use animation::{AnimatedProperty, Animation, Clip, ClipSample, Easing, FrameUpdate, Stage};
pub use backend::{
    BackendCapabilities, BackendKind, BackendOptions, BackendRegistry, BackendResolution,
    HostSurface, LayerConfig, RenderBackend, ViewportOffset, ViewportRoot,
};
pub use error::{RenderError, RenderResult};
pub use handler::{Handler, HoverResult};
pub use instance::InstanceRegistry;
pub use options::{CoarsePointer, RendererOptions, DEFAULT_POINTER_SIZE};
pub use proxy::InputProxy;
pub use renderer::Renderer;
