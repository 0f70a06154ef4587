//! # Easel Core
//!
//! Core types shared by every Easel renderer instance.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 easel-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Scene Container  │  Input                  │
//! │  - Elements       │  - Pointer/touch/keys   │
//! │  - Groups         │  - Event bus            │
//! │  - Hit testing    │                         │
//! ├─────────────────────────────────────────────┤
//! │  Background       │  Environment            │
//! │  - Color/gradient │  - Capability probe     │
//! │  - Dark mode      │                         │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod background;
pub mod color;
pub mod element;
pub mod env;
pub mod error;
pub mod event;
pub mod eventful;
pub mod scene;

pub use background::{
    is_dark_background, Background, ColorStop, Gradient, GradientKind, Pattern, PatternRepeat,
    DARK_MODE_THRESHOLD,
};
pub use color::Rgba;
pub use element::{
    Bounds, Element, ElementId, ElementKind, ImageFormat, InstanceId, Style, Transform,
};
pub use env::{Browser, Env, HostKind};
pub use error::{CanvasError, CanvasResult};
pub use event::{InputEvent, KeyModifiers, PointerPhase, TouchEvent, TouchPhase, TouchPoint};
pub use eventful::{ElementEvent, EventBus, EventPayload, HandlerId, KeyEvent, RenderedEvent};
pub use scene::Scene;

/// Easel core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
