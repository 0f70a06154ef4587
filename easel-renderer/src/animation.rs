//! Animation clock.
//!
//! The host decides when a frame happens and calls into the renderer; the
//! clock only tracks whether frames are wanted, advances time, samples
//! property clips and reports whether the stage callback should run.
//!
//! ```text
//!  host frame ──► Renderer::tick ──► Animation::update ──► clip samples
//!                                          │
//!                                          └──► Stage::Flush ──► flush
//! ```

use std::time::{Duration, Instant};

use easel_core::ElementId;
use serde::{Deserialize, Serialize};

/// Monotonic time, `None` where the target has no clock (`wasm32`).
pub(crate) fn now() -> Option<Instant> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        Some(Instant::now())
    }
    #[cfg(target_arch = "wasm32")]
    {
        None
    }
}

/// How to map clip time into a normalized `[0, 1]` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Constant speed.
    #[default]
    Linear,
    /// Quadratic ease in.
    QuadIn,
    /// Quadratic ease out.
    QuadOut,
    /// Quadratic ease in and out.
    QuadInOut,
    /// Cubic ease in.
    CubicIn,
    /// Cubic ease out.
    CubicOut,
    /// Cubic ease in and out.
    CubicInOut,
}

impl Easing {
    /// Sample the curve at `x`, clamped to `[0, 1]`.
    #[must_use]
    pub fn sample(self, x: f32) -> f32 {
        let t = x.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) * 0.5
                }
            }
        }
    }
}

/// Element property a clip drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimatedProperty {
    /// `transform.x`.
    X,
    /// `transform.y`.
    Y,
    /// `transform.width`.
    Width,
    /// `transform.height`.
    Height,
    /// `transform.rotation`.
    Rotation,
    /// `style.opacity`.
    Opacity,
}

/// A tween of one element property.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Element being animated.
    pub target: ElementId,
    /// Property being animated.
    pub property: AnimatedProperty,
    /// Start value.
    pub from: f32,
    /// End value.
    pub to: f32,
    /// Length of one run.
    pub duration: Duration,
    /// Wait before the first run.
    pub delay: Duration,
    /// Restart after finishing.
    pub looping: bool,
    /// Timing curve.
    pub easing: Easing,
}

impl Clip {
    /// Linear, non-looping clip without delay.
    #[must_use]
    pub fn new(
        target: ElementId,
        property: AnimatedProperty,
        from: f32,
        to: f32,
        duration: Duration,
    ) -> Self {
        Self {
            target,
            property,
            from,
            to,
            duration,
            delay: Duration::ZERO,
            looping: false,
            easing: Easing::Linear,
        }
    }

    /// Set the start delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the easing curve.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Make the clip loop forever.
    #[must_use]
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    fn value_at(&self, progress: f32) -> f32 {
        self.from + (self.to - self.from) * self.easing.sample(progress)
    }
}

/// A property value produced by a clip this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSample {
    /// Element to update.
    pub target: ElementId,
    /// Property to update.
    pub property: AnimatedProperty,
    /// New value.
    pub value: f32,
}

/// What the clock calls once per frame after stepping clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Run the renderer's flush.
    Flush,
    /// Do nothing; used when repainting is not applicable.
    Noop,
}

/// Result of advancing the clock by one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameUpdate {
    /// Property values to apply.
    pub samples: Vec<ClipSample>,
    /// Whether the stage flush should run.
    pub flush_stage: bool,
}

#[derive(Debug)]
struct ActiveClip {
    clip: Clip,
    elapsed: Duration,
}

/// The animation clock.
#[derive(Debug)]
pub struct Animation {
    stage: Stage,
    running: bool,
    clips: Vec<ActiveClip>,
    last_frame: Option<Instant>,
    time: Duration,
    frames: u64,
}

impl Animation {
    /// Create a stopped clock with the given per-frame stage.
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            running: false,
            clips: Vec::new(),
            last_frame: None,
            time: Duration::ZERO,
            frames: 0,
        }
    }

    /// The per-frame stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Start requesting frames. Starting a running clock is a no-op.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        // Time spent stopped does not advance clips.
        self.last_frame = None;
        tracing::trace!("animation clock started");
    }

    /// Stop requesting frames. Stopping a stopped clock is a no-op.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            tracing::trace!(frames = self.frames, "animation clock stopped");
        }
    }

    /// Whether the clock wants frames.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames advanced so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Total clock time advanced.
    #[must_use]
    pub fn time(&self) -> Duration {
        self.time
    }

    /// Add a clip; it starts at the next update.
    pub fn add_clip(&mut self, clip: Clip) {
        self.clips.push(ActiveClip {
            clip,
            elapsed: Duration::ZERO,
        });
    }

    /// Drop every clip animating `target`. Returns how many were dropped.
    pub fn remove_clips_for(&mut self, target: ElementId) -> usize {
        let before = self.clips.len();
        self.clips.retain(|c| c.clip.target != target);
        before - self.clips.len()
    }

    /// Number of live clips.
    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Stop the clock and drop all clips immediately.
    pub fn clear(&mut self) {
        self.stop();
        self.clips.clear();
    }

    /// Advance to now. See [`Animation::update_at`].
    pub fn update(&mut self, silent: bool) -> FrameUpdate {
        match now() {
            Some(now) => self.update_at(now, silent),
            None => self.advance(Duration::ZERO, silent),
        }
    }

    /// Advance the clock to `now` and sample clips.
    ///
    /// With `silent` set the stage is not requested, so an external flush can
    /// move time forward without scheduling a second flush.
    pub fn update_at(&mut self, now: Instant, silent: bool) -> FrameUpdate {
        let delta = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_frame = Some(now);
        self.advance(delta, silent)
    }

    fn advance(&mut self, delta: Duration, silent: bool) -> FrameUpdate {
        self.time += delta;
        self.frames += 1;

        let mut samples = Vec::with_capacity(self.clips.len());
        self.clips.retain_mut(|active| {
            active.elapsed += delta;
            let clip = &active.clip;
            // Pending clips hold their start value so the frame stays dirty.
            let Some(run_time) = active.elapsed.checked_sub(clip.delay) else {
                samples.push(ClipSample {
                    target: clip.target,
                    property: clip.property,
                    value: clip.from,
                });
                return true;
            };
            let progress = if clip.duration.is_zero() {
                1.0
            } else {
                run_time.as_secs_f32() / clip.duration.as_secs_f32()
            };
            if progress < 1.0 {
                samples.push(ClipSample {
                    target: clip.target,
                    property: clip.property,
                    value: clip.value_at(progress),
                });
                return true;
            }
            if clip.looping && !clip.duration.is_zero() {
                let wrapped = run_time.as_secs_f32() % clip.duration.as_secs_f32();
                active.elapsed = clip.delay + Duration::from_secs_f32(wrapped);
                samples.push(ClipSample {
                    target: clip.target,
                    property: clip.property,
                    value: clip.value_at(wrapped / clip.duration.as_secs_f32()),
                });
                return true;
            }
            samples.push(ClipSample {
                target: clip.target,
                property: clip.property,
                value: clip.to,
            });
            false
        });

        FrameUpdate {
            samples,
            flush_stage: !silent && self.stage == Stage::Flush,
        }
    }
}
