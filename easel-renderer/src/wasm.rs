//! WebAssembly bindings.
//!
//! Exposes a static, serialize-only renderer: the `svg` backend in ssr mode.

use wasm_bindgen::prelude::*;

use easel_core::{Element, ElementKind, Env, Transform};

use crate::backend::{BackendRegistry, HostSurface};
use crate::options::RendererOptions;
use crate::Renderer;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Renderer instance for JavaScript callers.
#[wasm_bindgen]
pub struct WasmEasel {
    renderer: Renderer,
}

#[wasm_bindgen]
impl WasmEasel {
    /// Create a renderer of the given size.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer cannot be constructed.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Result<WasmEasel, JsValue> {
        let options = RendererOptions {
            ssr: true,
            ..RendererOptions::with_backend("svg")
        };
        let renderer = Renderer::new(
            &BackendRegistry::with_defaults(),
            &Env::headless(),
            Some(&HostSurface::new(width, height)),
            &options,
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { renderer })
    }

    /// Add a filled rectangle. Returns its id.
    #[wasm_bindgen(js_name = addRect)]
    pub fn add_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: &str) -> String {
        let element = Element::rect(x, y, width, height).with_fill(fill);
        self.renderer.add(element).to_string()
    }

    /// Add a text label. Returns its id.
    #[wasm_bindgen(js_name = addText)]
    pub fn add_text(&mut self, content: &str, x: f32, y: f32, font_size: f32, color: &str) -> String {
        let element = Element::new(ElementKind::Text {
            content: content.to_string(),
            font_size,
            color: color.to_string(),
        })
        .with_transform(Transform {
            x,
            y,
            height: font_size,
            ..Transform::default()
        });
        self.renderer.add(element).to_string()
    }

    /// Set the background from a color string or a background JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if a JSON object cannot be parsed.
    #[wasm_bindgen(js_name = setBackgroundColor)]
    pub fn set_background_color(&mut self, value: &str) -> Result<(), JsValue> {
        if value.trim_start().starts_with('{') {
            let background: easel_core::Background =
                serde_json::from_str(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
            self.renderer.set_background_color(background);
        } else {
            self.renderer.set_background_color(value);
        }
        Ok(())
    }

    /// Whether the current background is dark.
    #[wasm_bindgen(js_name = isDarkMode)]
    #[must_use]
    pub fn is_dark_mode(&self) -> bool {
        self.renderer.is_dark_mode()
    }

    /// Flush pending repaints. Returns whether anything painted.
    pub fn flush(&mut self) -> bool {
        self.renderer.flush()
    }

    /// Serialize the scene as SVG.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[wasm_bindgen(js_name = renderToString)]
    pub fn render_to_string(&self) -> Result<String, JsValue> {
        self.renderer
            .render_to_string()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
