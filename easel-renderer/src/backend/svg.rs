//! Vector backend producing SVG markup.
//!
//! Refreshing rebuilds the retained document; without a host surface the
//! backend can only serialize and declares itself ssr-only.

use std::fmt::Write;

use easel_core::{Background, Element, ElementKind, GradientKind, InstanceId, PatternRepeat, Scene};

use super::{
    resolve_size, BackendCapabilities, BackendKind, BackendOptions, HostSurface, RenderBackend,
    ViewportOffset, ViewportRoot,
};
use crate::RenderResult;

const BACKGROUND_PAINT_ID: &str = "easel-bg";

/// SVG renderer.
#[derive(Debug)]
pub struct SvgBackend {
    instance: InstanceId,
    host: Option<HostSurface>,
    width: f32,
    height: f32,
    ssr_only: bool,
    background: Option<Background>,
    document: String,
    disposed: bool,
}

impl SvgBackend {
    /// Registered type name.
    pub const NAME: &'static str = "svg";

    /// Create a new SVG backend.
    #[must_use]
    pub fn new(host: Option<&HostSurface>, options: &BackendOptions, instance: InstanceId) -> Self {
        let (width, height) = resolve_size(options.width, options.height, host);
        let ssr_only = options.ssr || host.is_none();
        tracing::debug!(%instance, width, height, ssr_only, "SVG backend created");
        Self {
            instance,
            host: host.copied(),
            width,
            height,
            ssr_only,
            background: None,
            document: String::new(),
            disposed: false,
        }
    }

    /// The document built by the last refresh.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Whether [`RenderBackend::dispose`] ran.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn build(&self, scene: &Scene) -> String {
        let mut svg = String::with_capacity(4096);
        let (w, h) = (self.width, self.height);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        );
        if let Some(background) = &self.background {
            render_background_svg(&mut svg, background);
        }
        for element in scene.display_list() {
            render_element_svg(&mut svg, element);
        }
        svg.push_str("</svg>");
        svg
    }
}

impl RenderBackend for SvgBackend {
    fn backend_type(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Vector
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            hover_overlay: false,
            layer_config: false,
            background: true,
            render_to_string: true,
        }
    }

    fn ssr_only(&self) -> bool {
        self.ssr_only
    }

    fn resize(&mut self, width: Option<f32>, height: Option<f32>) -> RenderResult<()> {
        let (w, h) = resolve_size(width, height, self.host.as_ref());
        self.width = w;
        self.height = h;
        tracing::debug!("SVG resized to {}x{}", w, h);
        Ok(())
    }

    fn refresh(&mut self, scene: &Scene) -> RenderResult<()> {
        self.document = self.build(scene);
        tracing::trace!(
            "SVG refresh: {} elements, {} bytes",
            scene.element_count(),
            self.document.len()
        );
        Ok(())
    }

    fn clear(&mut self) {
        self.document.clear();
    }

    fn dispose(&mut self) {
        self.document = String::new();
        self.background = None;
        self.disposed = true;
        tracing::debug!(instance = %self.instance, "SVG backend disposed");
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn viewport_root(&self) -> Option<ViewportRoot> {
        if self.ssr_only {
            return None;
        }
        self.host.map(|_| ViewportRoot {
            instance: self.instance,
            kind: BackendKind::Vector,
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

    fn set_background(&mut self, background: Option<&Background>) {
        self.background = background.cloned();
    }

    fn render_to_string(&self, scene: &Scene) -> RenderResult<String> {
        Ok(self.build(scene))
    }
}

/// Render the background as a full-size rect, with defs for paint servers.
fn render_background_svg(svg: &mut String, background: &Background) {
    let fill = match background {
        Background::Color(color) if color.is_empty() => return,
        Background::Color(color) => escape_xml(color),
        Background::Gradient(gradient) => {
            svg.push_str("<defs>");
            match gradient.kind {
                GradientKind::Linear { x, y, x2, y2 } => {
                    let _ = write!(
                        svg,
                        "<linearGradient id=\"{BACKGROUND_PAINT_ID}\" x1=\"{x}\" y1=\"{y}\" x2=\"{x2}\" y2=\"{y2}\">",
                    );
                }
                GradientKind::Radial { x, y, r } => {
                    let _ = write!(
                        svg,
                        "<radialGradient id=\"{BACKGROUND_PAINT_ID}\" cx=\"{x}\" cy=\"{y}\" r=\"{r}\">",
                    );
                }
            }
            for stop in &gradient.stops {
                let _ = write!(
                    svg,
                    "<stop offset=\"{}\" stop-color=\"{}\"/>",
                    stop.offset,
                    escape_xml(&stop.color)
                );
            }
            svg.push_str(match gradient.kind {
                GradientKind::Linear { .. } => "</linearGradient>",
                GradientKind::Radial { .. } => "</radialGradient>",
            });
            svg.push_str("</defs>");
            format!("url(#{BACKGROUND_PAINT_ID})")
        }
        Background::Pattern(pattern) => {
            let (pw, ph) = match pattern.repeat {
                PatternRepeat::Repeat => ("64", "64"),
                PatternRepeat::RepeatX => ("64", "100%"),
                PatternRepeat::RepeatY => ("100%", "64"),
                PatternRepeat::NoRepeat => ("100%", "100%"),
            };
            let _ = write!(
                svg,
                "<defs><pattern id=\"{BACKGROUND_PAINT_ID}\" patternUnits=\"userSpaceOnUse\" width=\"{pw}\" height=\"{ph}\"><image href=\"{}\"/></pattern></defs>",
                escape_xml(&pattern.image)
            );
            format!("url(#{BACKGROUND_PAINT_ID})")
        }
    };
    let _ = write!(svg, "<rect width=\"100%\" height=\"100%\" fill=\"{fill}\"/>");
}

/// Render a single element to SVG.
fn render_element_svg(svg: &mut String, element: &Element) {
    let tf = &element.transform;
    let style = &element.style;
    let fill = style
        .fill
        .as_deref()
        .map_or_else(|| "none".to_string(), escape_xml);
    let mut paint = format!("fill=\"{fill}\"");
    if let Some(stroke) = &style.stroke {
        let _ = write!(
            paint,
            " stroke=\"{}\" stroke-width=\"{}\"",
            escape_xml(stroke),
            style.stroke_width
        );
    }
    if style.opacity < 1.0 {
        let _ = write!(paint, " opacity=\"{}\"", style.opacity);
    }
    if tf.rotation.abs() > f32::EPSILON {
        let cx = tf.x + tf.width / 2.0;
        let cy = tf.y + tf.height / 2.0;
        let _ = write!(
            paint,
            " transform=\"rotate({} {cx} {cy})\"",
            tf.rotation.to_degrees()
        );
    }

    match &element.kind {
        ElementKind::Rect { corner_radius } => {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{corner_radius}\" {paint}/>",
                tf.x, tf.y, tf.width, tf.height,
            );
        }

        ElementKind::Circle => {
            let _ = write!(
                svg,
                "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" {paint}/>",
                tf.x + tf.width / 2.0,
                tf.y + tf.height / 2.0,
                tf.width / 2.0,
                tf.height / 2.0,
            );
        }

        ElementKind::Text {
            content,
            font_size,
            color,
        } => {
            let escaped = escape_xml(content);
            let escaped_color = escape_xml(color);
            let text_y = tf.y + font_size;
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{text_y}\" font-size=\"{font_size}\" fill=\"{escaped_color}\" font-family=\"sans-serif\">{escaped}</text>",
                tf.x,
            );
        }

        ElementKind::Image { src, .. } => {
            let escaped_src = escape_xml(src);
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" href=\"{escaped_src}\"/>",
                tf.x, tf.y, tf.width, tf.height,
            );
        }

        // Groups are flattened by the display list.
        ElementKind::Group { .. } => {}
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
