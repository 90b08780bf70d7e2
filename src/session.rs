use crate::hit::hit_test;
use crate::model::{AnnotationFrame, HoveredAnnotation, ImageSize};
use crate::render::{render, OverlaySurface};
use crate::scale::ScaleFactors;

/// One displayed image's interactive overlay.
///
/// Owns the frame, the drawing surface and the hover descriptor, and reacts
/// to the two host trigger classes: image-load/resize events (full render)
/// and pointer-move/leave events (hit test, then re-render only when the
/// hover identity changed). Single-threaded and event-driven; every pointer
/// move supersedes the previous hover unconditionally, so there is nothing to
/// debounce or cancel. The host is responsible for pairing listener
/// registration with teardown; dropping the session drops the surface.
pub struct OverlaySession {
    frame: AnnotationFrame,
    image_size: ImageSize,
    surface: OverlaySurface,
    hovered: Option<HoveredAnnotation>,
    pointer: (f64, f64),
}

impl OverlaySession {
    /// Starts a session for one frame. `image_size` comes from the payload
    /// and falls back to the fixed default when absent; it is never
    /// recomputed mid-session. The surface stays empty until the first
    /// `resize` reports the displayed image box.
    pub fn new(frame: AnnotationFrame, image_size: Option<ImageSize>) -> Self {
        Self {
            frame,
            image_size: image_size.unwrap_or_default(),
            surface: OverlaySurface::new(0, 0),
            hovered: None,
            pointer: (0.0, 0.0),
        }
    }

    fn scale(&self) -> ScaleFactors {
        let (width, height) = self.surface.size();
        ScaleFactors::compute(self.image_size, f64::from(width), f64::from(height))
    }

    /// Image-load / container-resize trigger: size the surface to the
    /// displayed image box and repaint everything.
    pub fn resize(&mut self, display_width: u32, display_height: u32) {
        self.surface.resize(display_width, display_height);
        tracing::debug!(display_width, display_height, "overlay surface resized");
        let scale = self.scale();
        render(&mut self.surface, &self.frame, scale, self.hovered.as_ref());
    }

    /// Pointer-move trigger, in display-space coordinates. Recomputes the
    /// scale factors, resolves the hover target and repaints only when the
    /// hover identity changed. The pointer position is recorded on every
    /// move for the tooltip collaborator.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<&HoveredAnnotation> {
        let scale = self.scale();
        let next = hit_test(&self.frame, scale, x, y);
        self.pointer = (x, y);
        if next != self.hovered {
            tracing::debug!(hovered = ?next, "hover target changed");
            self.hovered = next;
            render(&mut self.surface, &self.frame, scale, self.hovered.as_ref());
        }
        self.hovered.as_ref()
    }

    /// Pointer-leave trigger: always resets the hover state, repainting only
    /// if something was hovered.
    pub fn pointer_leave(&mut self) {
        if self.hovered.take().is_some() {
            tracing::debug!("hover cleared on pointer leave");
            let scale = self.scale();
            render(&mut self.surface, &self.frame, scale, None);
        }
    }

    pub fn hovered(&self) -> Option<&HoveredAnnotation> {
        self.hovered.as_ref()
    }

    /// Last pointer screen position, read together with `hovered` by the
    /// tooltip collaborator to place its popup.
    pub fn pointer_position(&self) -> (f64, f64) {
        self.pointer
    }

    pub fn surface(&self) -> &OverlaySurface {
        &self.surface
    }

    pub fn frame(&self) -> &AnnotationFrame {
        &self.frame
    }

    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }
}
