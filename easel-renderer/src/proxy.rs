//! Live input source bound to a backend viewport.

use easel_core::InputEvent;

use crate::backend::{ViewportOffset, ViewportRoot};

/// Converts host client-space events into viewport-local ones.
///
/// Only created for interactive hosts whose backend exposes a viewport root.
#[derive(Debug)]
pub struct InputProxy {
    root: ViewportRoot,
    offset: ViewportOffset,
    disposed: bool,
}

impl InputProxy {
    /// Bind to a viewport root at the given client offset.
    #[must_use]
    pub fn new(root: ViewportRoot, offset: ViewportOffset) -> Self {
        tracing::debug!(
            instance = %root.instance,
            kind = ?root.kind,
            offset_left = offset.offset_left,
            offset_top = offset.offset_top,
            "input proxy attached"
        );
        Self {
            root,
            offset,
            disposed: false,
        }
    }

    /// The viewport root events are delivered to.
    #[must_use]
    pub fn root(&self) -> ViewportRoot {
        self.root
    }

    /// Update the viewport offset after the host layout moved.
    pub fn set_offset(&mut self, offset: ViewportOffset) {
        self.offset = offset;
    }

    /// Translate a client-space event. Returns `None` once disposed.
    #[must_use]
    pub fn translate(&self, event: &InputEvent) -> Option<InputEvent> {
        if self.disposed {
            return None;
        }
        Some(event.translated(-self.offset.offset_left, -self.offset.offset_top))
    }

    /// Stop delivering events.
    pub fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            tracing::debug!(instance = %self.root.instance, "input proxy disposed");
        }
    }

    /// Whether [`InputProxy::dispose`] has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendKind;
    use easel_core::{InstanceId, PointerPhase};

    fn proxy() -> InputProxy {
        InputProxy::new(
            ViewportRoot {
                instance: InstanceId::next(),
                kind: BackendKind::Raster,
            },
            ViewportOffset {
                offset_left: 10.0,
                offset_top: 20.0,
            },
        )
    }

    #[test]
    fn translates_into_viewport_space() {
        let proxy = proxy();
        let event = InputEvent::Pointer {
            x: 15.0,
            y: 25.0,
            button: 0,
            phase: PointerPhase::Move,
        };
        let local = proxy.translate(&event).expect("live proxy");
        assert_eq!(local.position(), Some((5.0, 5.0)));
    }

    #[test]
    fn disposed_proxy_drops_events() {
        let mut proxy = proxy();
        proxy.dispose();
        assert!(proxy.is_disposed());
        let event = InputEvent::Wheel {
            x: 0.0,
            y: 0.0,
            delta_y: 1.0,
        };
        assert!(proxy.translate(&event).is_none());
    }
}
