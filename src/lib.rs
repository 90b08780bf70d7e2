pub mod color;
pub mod hit;
pub mod logging;
pub mod model;
pub mod payload;
pub mod render;
pub mod scale;
pub mod session;
pub mod snapshot;

pub use color::{anomaly_color, Color};
pub use hit::{associate_structural, hit_test, point_in_polygon};
pub use model::{
    AnnotationFrame, DamageAnomaly, Element, HoveredAnnotation, ImageSize, MaskId,
    OpenWorldDetection, Severity,
};
pub use payload::AnnotationPayload;
pub use render::{render, OverlaySurface};
pub use scale::ScaleFactors;
pub use session::OverlaySession;
