use crate::model::{AnnotationFrame, Element, ImageSize};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// A deserialized annotation payload: the frame plus the optional original
/// image size it was authored against. How the bytes were obtained (network,
/// disk, fixture) is the data-fetching layer's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationPayload {
    pub frame: AnnotationFrame,
    pub image_size: Option<ImageSize>,
}

impl AnnotationPayload {
    /// The payload's image size, or the fixed default when absent.
    pub fn image_size_or_default(&self) -> ImageSize {
        self.image_size.unwrap_or_default()
    }
}

// The wire format is either a bare element array or an object that wraps the
// array together with an `image_size` pair.
#[derive(Deserialize)]
#[serde(untagged)]
enum WirePayload {
    Wrapped {
        #[serde(default)]
        image_size: Option<[u32; 2]>,
        annotations: Vec<Element>,
    },
    Bare(Vec<Element>),
}

pub fn from_json_str(json: &str) -> Result<AnnotationPayload> {
    let wire: WirePayload =
        serde_json::from_str(json).context("deserialize annotation payload")?;
    Ok(match wire {
        WirePayload::Wrapped {
            image_size,
            annotations,
        } => AnnotationPayload {
            frame: AnnotationFrame::new(annotations),
            image_size: image_size.map(|[width, height]| ImageSize { width, height }),
        },
        WirePayload::Bare(elements) => AnnotationPayload {
            frame: AnnotationFrame::new(elements),
            image_size: None,
        },
    })
}

pub fn load_from_path(path: &Path) -> Result<AnnotationPayload> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read annotation payload file {}", path.display()))?;
    from_json_str(&content)
        .with_context(|| format!("parse annotation payload file {}", path.display()))
}
