//! Capability probe: static facts about the host environment.

use serde::{Deserialize, Serialize};

/// What kind of host the renderer runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKind {
    /// Interactive browser-like host with a DOM.
    Browser,
    /// Native or server process without a display.
    #[default]
    Headless,
    /// Background worker without a DOM.
    Worker,
    /// Embedded mini-program host (touch only).
    MiniProgram,
}

/// Browser identification parsed from a user agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Browser {
    /// Firefox.
    pub firefox: bool,
    /// Internet Explorer (MSIE or Trident).
    pub ie: bool,
    /// Edge, legacy or Chromium based.
    pub edge: bool,
    /// Chromium-based Edge (major version above 18).
    pub new_edge: bool,
    /// WeChat embedded browser.
    pub we_chat: bool,
    /// Version string of the matched engine.
    pub version: Option<String>,
}

/// Environment capabilities, detected once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Env {
    /// Host kind.
    pub host: HostKind,
    /// Browser details, all false outside browsers.
    pub browser: Browser,
    /// SVG output is available.
    pub svg_supported: bool,
    /// Touch events are delivered.
    pub touch_events_supported: bool,
    /// Pointer events are delivered.
    pub pointer_events_supported: bool,
    /// A DOM is available.
    pub dom_supported: bool,
    /// 2D CSS transforms work.
    pub transform_supported: bool,
    /// 3D CSS transforms work.
    pub transform3d_supported: bool,
}

impl Default for Env {
    fn default() -> Self {
        Self::headless()
    }
}

impl Env {
    /// Probe the current process.
    ///
    /// Native builds have no DOM, so this reports a headless host.
    #[must_use]
    pub fn detect() -> Self {
        let env = Self::headless();
        tracing::debug!(host = ?env.host, "environment detected");
        env
    }

    /// Headless host: SVG serialization only, no input.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            host: HostKind::Headless,
            browser: Browser::default(),
            svg_supported: true,
            touch_events_supported: false,
            pointer_events_supported: false,
            dom_supported: false,
            transform_supported: false,
            transform3d_supported: false,
        }
    }

    /// Worker host: no DOM, no input.
    #[must_use]
    pub fn worker() -> Self {
        Self {
            host: HostKind::Worker,
            svg_supported: false,
            ..Self::headless()
        }
    }

    /// Mini-program host: touch input without a DOM.
    #[must_use]
    pub fn mini_program() -> Self {
        Self {
            host: HostKind::MiniProgram,
            svg_supported: false,
            touch_events_supported: true,
            ..Self::headless()
        }
    }

    /// Browser host identified by its user agent string.
    #[must_use]
    pub fn from_user_agent(ua: &str) -> Self {
        let mut browser = Browser::default();

        if let Some(v) = version_after(ua, "Firefox/") {
            browser.firefox = true;
            browser.version = Some(v);
        }
        let ie = version_after(ua, "MSIE ").or_else(|| {
            ua.contains("Trident/")
                .then(|| version_after(ua, "rv:"))
                .flatten()
        });
        if let Some(v) = ie {
            browser.ie = true;
            browser.version = Some(v);
        }
        let edge = version_after(ua, "Edge/").or_else(|| version_after(ua, "Edg/"));
        if let Some(v) = edge {
            browser.edge = true;
            browser.new_edge = major(&v).is_some_and(|m| m > 18);
            browser.version = Some(v);
        }
        browser.we_chat = ua.to_ascii_lowercase().contains("micromessenger");

        let ie_version = if browser.ie {
            browser.version.as_deref().and_then(major)
        } else {
            None
        };
        let is_mobile = ["Mobile", "Android", "iPhone", "iPad"]
            .iter()
            .any(|m| ua.contains(m));

        let transform3d_supported = match ie_version {
            Some(v) => v >= 10,
            None => true,
        };

        Self {
            host: HostKind::Browser,
            svg_supported: true,
            touch_events_supported: is_mobile && !browser.ie && !browser.edge,
            pointer_events_supported: browser.edge || ie_version.is_some_and(|v| v >= 11),
            dom_supported: true,
            transform3d_supported,
            transform_supported: transform3d_supported || ie_version.is_some_and(|v| v >= 9),
            browser,
        }
    }

    /// Whether a live input proxy can be attached in this host.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        !matches!(self.host, HostKind::Headless | HostKind::Worker)
    }
}

/// Version token following `marker`, made of digits and dots.
fn version_after(ua: &str, marker: &str) -> Option<String> {
    let start = ua.find(marker)? + marker.len();
    let version: String = ua[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    (!version.is_empty()).then_some(version)
}

fn major(version: &str) -> Option<u32> {
    version.split('.').next()?.parse().ok()
}
