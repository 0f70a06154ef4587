//! # Easel CLI
//!
//! Headless host for the Easel renderer. Loads a scene and renderer options
//! from JSON, drives the animation clock from a timer until it goes idle,
//! and writes the SVG serialization.
//!
//! ## Configuration layering
//!
//! 1. Built-in [`RendererOptions`] defaults
//! 2. `--options <file.json>`
//! 3. Flags, with `EASEL_*` environment fallbacks

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use easel_core::{Background, Element, ElementId};
use easel_renderer::{
    AnimatedProperty, Clip, Easing, HostSurface, InstanceRegistry, Renderer, RendererOptions,
};
use serde::Deserialize;

/// Command-line arguments for `easel`.
#[derive(Debug, Clone, Parser)]
#[command(name = "easel")]
#[command(about = "Render an Easel scene headlessly")]
#[command(version)]
pub struct CliArgs {
    /// Scene file (JSON) with background, elements and animations
    #[arg(long, env = "EASEL_SCENE")]
    pub scene: Option<PathBuf>,

    /// Renderer options file (JSON)
    #[arg(long, env = "EASEL_OPTIONS")]
    pub options: Option<PathBuf>,

    /// Backend name; unknown names fall back to the first registered backend
    #[arg(long, env = "EASEL_BACKEND")]
    pub backend: Option<String>,

    /// Surface width in pixels
    #[arg(long)]
    pub width: Option<f32>,

    /// Surface height in pixels
    #[arg(long)]
    pub height: Option<f32>,

    /// Frames per second requested from the renderer
    #[arg(long, env = "EASEL_FPS", default_value = "60")]
    pub fps: u32,

    /// Stop after this many frames even if the clock is still running
    #[arg(long, default_value = "600")]
    pub max_frames: u64,

    /// Write the SVG serialization here; selects the svg backend unless
    /// `--backend` is given
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Server-side rendering: no frame loop, one flush
    #[arg(long)]
    pub ssr: bool,
}

/// Scene file contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    /// Scene background.
    pub background: Option<Background>,
    /// Root elements.
    pub elements: Vec<SceneNode>,
    /// Property animations.
    pub animations: Vec<AnimationSpec>,
}

/// An element and, for groups, its children.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneNode {
    /// The element itself.
    #[serde(flatten)]
    pub element: Element,
    /// Children added to the element when it is a group.
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

/// A property animation in a scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimationSpec {
    /// Id of the animated element.
    pub target: ElementId,
    /// Animated property.
    pub property: AnimatedProperty,
    /// Start value.
    pub from: f32,
    /// End value.
    pub to: f32,
    /// Run length in milliseconds.
    pub duration_ms: u64,
    /// Start delay in milliseconds.
    #[serde(default)]
    pub delay_ms: u64,
    /// Restart after finishing.
    #[serde(default)]
    pub looping: bool,
    /// Timing curve.
    #[serde(default)]
    pub easing: Easing,
}

impl AnimationSpec {
    /// Convert to a clip.
    #[must_use]
    pub fn to_clip(&self) -> Clip {
        let clip = Clip::new(
            self.target,
            self.property,
            self.from,
            self.to,
            Duration::from_millis(self.duration_ms),
        )
        .with_delay(Duration::from_millis(self.delay_ms))
        .with_easing(self.easing);
        if self.looping {
            clip.looping()
        } else {
            clip
        }
    }
}

impl SceneFile {
    /// Read a scene file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading scene {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing scene {}", path.display()))
    }

    /// Add everything to a renderer. Returns how many elements were added.
    ///
    /// # Errors
    ///
    /// Returns an error if a child is declared under a non-group element.
    pub fn apply(self, renderer: &mut Renderer) -> anyhow::Result<usize> {
        if let Some(background) = self.background {
            renderer.set_background_color(background);
        }
        let mut added = 0;
        for node in self.elements {
            let SceneNode { element, children } = node;
            let id = renderer.add(element);
            added += 1 + add_children(renderer, id, children)?;
        }
        for spec in &self.animations {
            renderer.animate(spec.to_clip());
        }
        Ok(added)
    }
}

fn add_children(
    renderer: &mut Renderer,
    parent: ElementId,
    children: Vec<SceneNode>,
) -> anyhow::Result<usize> {
    let mut added = 0;
    for SceneNode { element, children } in children {
        let id = renderer
            .add_to_group(parent, element)
            .with_context(|| format!("adding child of {parent}"))?;
        added += 1 + add_children(renderer, id, children)?;
    }
    Ok(added)
}

/// Backend that can serialize the scene for `--output`.
const SVG_BACKEND: &str = "svg";

/// Merge the options file with command-line overrides.
///
/// # Errors
///
/// Returns an error if the options file cannot be read or parsed.
pub async fn resolve_options(args: &CliArgs) -> anyhow::Result<RendererOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading options {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing options {}", path.display()))?
        }
        None => RendererOptions::default(),
    };
    if let Some(backend) = &args.backend {
        options.backend.clone_from(backend);
    } else if args.output.is_some() && options.backend != SVG_BACKEND {
        tracing::info!(requested = %options.backend, "output requested, using svg backend");
        options.backend = SVG_BACKEND.to_string();
    }
    if args.width.is_some() {
        options.width = args.width;
    }
    if args.height.is_some() {
        options.height = args.height;
    }
    options.ssr |= args.ssr;
    Ok(options)
}

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames requested from the renderer.
    pub frames: u64,
    /// Frames that painted something.
    pub rendered: u64,
    /// Elements loaded from the scene.
    pub elements: usize,
    /// Bytes written to the output file.
    pub output_bytes: Option<usize>,
}

/// Run the frame loop until the renderer goes idle or `max_frames` is hit.
///
/// # Errors
///
/// Returns an error if configuration, construction, scene loading or
/// writing the output fails.
pub async fn run(args: &CliArgs) -> anyhow::Result<RunSummary> {
    let options = resolve_options(args).await?;
    let host = HostSurface::new(
        options.width.unwrap_or(easel_renderer::backend::DEFAULT_WIDTH),
        options.height.unwrap_or(easel_renderer::backend::DEFAULT_HEIGHT),
    );

    let mut instances = InstanceRegistry::with_defaults();
    let id = instances.init(Some(&host), &options)?;
    let result = match instances.get_instance_mut(id) {
        Some(renderer) => session(renderer, args).await,
        None => Err(anyhow::anyhow!("instance {id} vanished after init")),
    };
    instances.dispose(id);
    result
}

/// Load the scene, run frames and write output for one live instance.
async fn session(renderer: &mut Renderer, args: &CliArgs) -> anyhow::Result<RunSummary> {
    let rendered = Rc::new(Cell::new(0_u64));
    let counter = Rc::clone(&rendered);
    renderer.on("rendered", move |payload| {
        counter.set(counter.get() + 1);
        tracing::debug!(?payload, "rendered");
    });

    let elements = match &args.scene {
        Some(path) => SceneFile::load(path).await?.apply(renderer)?,
        None => 0,
    };
    tracing::info!(
        instance = %renderer.id(),
        backend = renderer.backend().backend_type(),
        elements,
        ssr = renderer.is_ssr(),
        "scene loaded"
    );

    let frames = if renderer.is_ssr() {
        renderer.flush();
        0
    } else {
        drive(renderer, args.fps, args.max_frames).await
    };

    let output_bytes = match &args.output {
        Some(path) => {
            let svg = renderer.render_to_string()?;
            tokio::fs::write(path, svg.as_bytes())
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = svg.len(), "output written");
            Some(svg.len())
        }
        None => None,
    };

    Ok(RunSummary {
        frames,
        rendered: rendered.get(),
        elements,
        output_bytes,
    })
}

/// Host frame loop: one [`Renderer::tick`] per timer tick.
async fn drive(renderer: &mut Renderer, fps: u32, max_frames: u64) -> u64 {
    let period = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut frames = 0;
    while renderer.is_animating() && frames < max_frames {
        interval.tick().await;
        renderer.tick();
        frames += 1;
    }
    tracing::info!(
        frames,
        idle = !renderer.is_animating(),
        still_frames = renderer.still_frames(),
        "frame loop finished"
    );
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r##"{
        "background": "#202020",
        "elements": [
            {
                "id": "6f1f0b1e-0000-4000-8000-000000000001",
                "kind": {"type": "rect", "data": {"corner_radius": 2}},
                "transform": {"x": 10, "y": 10, "width": 50, "height": 20},
                "style": {"fill": "#ff0000"}
            },
            {
                "kind": {"type": "group", "data": {}},
                "children": [
                    {"kind": {"type": "circle"}},
                    {"kind": {"type": "text", "data": {"content": "hi", "font_size": 12, "color": "#fff"}}}
                ]
            }
        ],
        "animations": [
            {
                "target": "6f1f0b1e-0000-4000-8000-000000000001",
                "property": "x",
                "from": 10,
                "to": 40,
                "duration_ms": 30,
                "easing": "cubic-out"
            }
        ]
    }"##;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["easel"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).expect("args")
    }

    #[test]
    fn parses_flags() {
        let args = args(&["--backend", "svg", "--width", "320", "--ssr", "-o", "out.svg"]);
        assert_eq!(args.backend.as_deref(), Some("svg"));
        assert_eq!(args.width, Some(320.0));
        assert!(args.ssr);
        assert_eq!(args.fps, 60);
        assert_eq!(args.output, Some(PathBuf::from("out.svg")));
    }

    #[tokio::test]
    async fn flags_override_options_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"backend": "canvas", "sleepAfterStill": 3, "width": 100}"#)
            .expect("write");

        let path_arg = path.to_string_lossy().to_string();
        let options = resolve_options(&args(&["--options", &path_arg, "--backend", "svg"]))
            .await
            .expect("options");
        assert_eq!(options.backend, "svg");
        assert_eq!(options.sleep_after_still, 3);
        assert_eq!(options.width, Some(100.0));
        assert!(!options.ssr);
    }

    #[tokio::test]
    async fn output_selects_svg_unless_backend_given() {
        let options = resolve_options(&args(&["-o", "out.svg"])).await.expect("options");
        assert_eq!(options.backend, "svg");

        let options = resolve_options(&args(&["-o", "out.svg", "--backend", "canvas"]))
            .await
            .expect("options");
        assert_eq!(options.backend, "canvas");

        let options = resolve_options(&args(&[])).await.expect("options");
        assert_eq!(options.backend, "canvas");
    }

    #[tokio::test]
    async fn unserializable_backend_fails_after_running() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out_path = dir.path().join("out.svg");
        let out_arg = out_path.to_string_lossy().to_string();

        let err = run(&args(&["--backend", "canvas", "--ssr", "-o", &out_arg]))
            .await
            .expect_err("canvas cannot serialize");
        assert!(format!("{err:#}").contains("canvas"), "{err:#}");
        assert!(!out_path.exists());
    }

    #[test]
    fn scene_file_parses_nested_groups() {
        let scene: SceneFile = serde_json::from_str(SCENE).expect("scene");
        assert_eq!(scene.elements.len(), 2);
        assert_eq!(scene.elements[1].children.len(), 2);
        assert_eq!(scene.animations[0].easing, Easing::CubicOut);
    }

    #[tokio::test]
    async fn ssr_run_writes_svg() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scene_path = dir.path().join("scene.json");
        let out_path = dir.path().join("out.svg");
        std::fs::write(&scene_path, SCENE).expect("write scene");

        let scene_arg = scene_path.to_string_lossy().to_string();
        let out_arg = out_path.to_string_lossy().to_string();
        let summary = run(&args(&[
            "--scene", &scene_arg, "--backend", "svg", "--ssr", "--output", &out_arg,
        ]))
        .await
        .expect("run");

        assert_eq!(summary.elements, 4);
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.rendered, 1);
        let svg = std::fs::read_to_string(&out_path).expect("output");
        assert!(svg.starts_with("<svg"));
        assert_eq!(summary.output_bytes, Some(svg.len()));
    }

    #[tokio::test]
    async fn live_run_goes_idle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scene_path = dir.path().join("scene.json");
        std::fs::write(&scene_path, SCENE).expect("write scene");
        let scene_arg = scene_path.to_string_lossy().to_string();

        let summary = run(&args(&["--scene", &scene_arg, "--fps", "1000", "--max-frames", "500"]))
            .await
            .expect("run");
        assert!(summary.frames < 500);
        assert!(summary.rendered >= 1);
        assert_eq!(summary.output_bytes, None);
    }
}
