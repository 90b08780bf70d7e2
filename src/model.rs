use serde::Deserialize;

/// Full-resolution source image dimensions used when the payload carries none.
pub const DEFAULT_IMAGE_SIZE: ImageSize = ImageSize {
    width: 5184,
    height: 3888,
};

/// Size of the original image in pixels. All annotation coordinates are
/// authored in this space and only ever scaled at draw/hit-test time. Fixed
/// for the lifetime of one displayed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        DEFAULT_IMAGE_SIZE
    }
}

/// An ordered vertex list in original-image pixel space. Fewer than three
/// vertices cannot enclose area and is treated as invalid geometry.
pub type Polygon = Vec<[f64; 2]>;

/// Severity as delivered by the detector: either a numeric level or a
/// free-text label. The display default (level 1) is applied only when
/// building a hover descriptor; the stored value is never rewritten.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Severity {
    Level(f64),
    Label(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DamageAnomaly {
    /// Free-text class label. Compound labels such as `"crack_2"` are kept
    /// intact; the core never re-parses them.
    #[serde(default)]
    pub damage_class: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default, rename = "damage_masks_original_frame")]
    pub masks: Vec<Polygon>,
}

impl DamageAnomaly {
    /// Masks that are drawable and hit-testable. Short polygons are skipped,
    /// never reported as errors.
    pub fn valid_masks(&self) -> impl Iterator<Item = &Polygon> {
        self.masks.iter().filter(|polygon| polygon.len() >= 3)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OpenWorldDetection {
    #[serde(default)]
    pub boxes: Option<Vec<f64>>,
    #[serde(default)]
    pub label: Option<String>,
}

impl OpenWorldDetection {
    /// The detection box, only when it carries exactly four numbers.
    pub fn valid_box(&self) -> Option<[f64; 4]> {
        match self.boxes.as_deref() {
            Some(&[x1, y1, x2, y2]) => Some([x1, y1, x2, y2]),
            _ => None,
        }
    }

    pub fn label_or_unknown(&self) -> &str {
        self.label.as_deref().unwrap_or("unknown")
    }
}

/// One structural region plus the detections tied to it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Element {
    #[serde(default, rename = "structural_bbox_original_frame")]
    pub structural_box: Option<[f64; 4]>,
    #[serde(default)]
    pub structural_class: Option<String>,
    #[serde(default)]
    pub yolo_anomalies: Vec<DamageAnomaly>,
    #[serde(default)]
    pub mask_rcnn_anomalies: Vec<DamageAnomaly>,
    #[serde(default)]
    pub unmatched_anomalies: Vec<DamageAnomaly>,
    #[serde(default)]
    pub open_world_detections: Vec<OpenWorldDetection>,
}

impl Element {
    /// The element's full anomaly set: yolo, then mask r-cnn, then unmatched.
    /// This concatenation order is part of the hover precedence contract.
    pub fn anomalies(&self) -> impl Iterator<Item = &DamageAnomaly> {
        self.yolo_anomalies
            .iter()
            .chain(self.mask_rcnn_anomalies.iter())
            .chain(self.unmatched_anomalies.iter())
    }

    /// Box and class of the structural region, when both are present.
    pub fn structural_region(&self) -> Option<([f64; 4], &str)> {
        match (self.structural_box, self.structural_class.as_deref()) {
            (Some(bounds), Some(class)) => Some((bounds, class)),
            _ => None,
        }
    }
}

/// The annotation payload for one image. Immutable once received; the
/// renderer and hit tester only ever borrow it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AnnotationFrame {
    pub elements: Vec<Element>,
}

impl AnnotationFrame {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }
}

/// Identity of one anomaly's mask sequence within a frame: the element index
/// plus the index into that element's concatenated anomaly set. Used to ask
/// "is this the anomaly currently hovered" during redraw; never a value
/// comparison of the polygons themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskId {
    pub element: usize,
    pub anomaly: usize,
}

/// The annotation under the pointer, as handed to the tooltip collaborator.
/// At most one is active per overlay session.
#[derive(Debug, Clone, PartialEq)]
pub enum HoveredAnnotation {
    OpenWorld {
        label: String,
    },
    Damage {
        damage_class: Option<String>,
        severity: Severity,
        confidence_score: Option<f64>,
        mask_id: MaskId,
        structural_class: Option<String>,
    },
}

impl HoveredAnnotation {
    pub fn mask_id(&self) -> Option<MaskId> {
        match self {
            Self::Damage { mask_id, .. } => Some(*mask_id),
            Self::OpenWorld { .. } => None,
        }
    }

    pub fn open_world_label(&self) -> Option<&str> {
        match self {
            Self::OpenWorld { label } => Some(label),
            Self::Damage { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_payload_deserializes_wire_field_names() {
        let json = r#"{
            "structural_bbox_original_frame": [0.0, 0.0, 100.0, 50.0],
            "structural_class": "girder",
            "yolo_anomalies": [{
                "damage_class": "crack_2",
                "severity": 2,
                "confidence_score": 0.92,
                "damage_masks_original_frame": [[[10.0, 10.0], [20.0, 10.0], [20.0, 20.0]]]
            }],
            "open_world_detections": [{ "boxes": [1.0, 2.0, 3.0, 4.0], "label": "vegetation" }]
        }"#;

        let element: Element = serde_json::from_str(json).expect("element json");
        assert_eq!(element.structural_box, Some([0.0, 0.0, 100.0, 50.0]));
        assert_eq!(element.structural_class.as_deref(), Some("girder"));
        assert_eq!(element.yolo_anomalies.len(), 1);
        assert_eq!(
            element.yolo_anomalies[0].severity,
            Some(Severity::Level(2.0))
        );
        assert_eq!(
            element.open_world_detections[0].valid_box(),
            Some([1.0, 2.0, 3.0, 4.0])
        );
    }

    #[test]
    fn missing_optional_fields_deserialize_as_absent() {
        let element: Element = serde_json::from_str("{}").expect("empty element");
        assert_eq!(element.structural_region(), None);
        assert_eq!(element.anomalies().count(), 0);
        assert!(element.open_world_detections.is_empty());
    }

    #[test]
    fn severity_accepts_numeric_and_label_forms() {
        let numeric: Severity = serde_json::from_str("3").expect("numeric severity");
        assert_eq!(numeric, Severity::Level(3.0));

        let label: Severity = serde_json::from_str("\"moderate\"").expect("label severity");
        assert_eq!(label, Severity::Label("moderate".into()));
    }

    #[test]
    fn anomaly_concatenation_order_is_yolo_then_mask_rcnn_then_unmatched() {
        let anomaly = |class: &str| DamageAnomaly {
            damage_class: Some(class.into()),
            ..Default::default()
        };
        let element = Element {
            yolo_anomalies: vec![anomaly("a")],
            mask_rcnn_anomalies: vec![anomaly("b")],
            unmatched_anomalies: vec![anomaly("c")],
            ..Default::default()
        };

        let order: Vec<_> = element
            .anomalies()
            .map(|a| a.damage_class.clone().unwrap())
            .collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn short_polygons_are_excluded_from_valid_masks() {
        let anomaly = DamageAnomaly {
            masks: vec![
                vec![[0.0, 0.0], [1.0, 0.0]],
                vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
            ],
            ..Default::default()
        };
        assert_eq!(anomaly.valid_masks().count(), 1);
    }

    #[test]
    fn detection_box_with_wrong_arity_is_invalid() {
        let detection = OpenWorldDetection {
            boxes: Some(vec![1.0, 2.0, 3.0]),
            label: None,
        };
        assert_eq!(detection.valid_box(), None);
        assert_eq!(detection.label_or_unknown(), "unknown");
    }

    #[test]
    fn structural_region_requires_both_box_and_class() {
        let boxed_only = Element {
            structural_box: Some([0.0, 0.0, 1.0, 1.0]),
            ..Default::default()
        };
        assert_eq!(boxed_only.structural_region(), None);

        let class_only = Element {
            structural_class: Some("deck".into()),
            ..Default::default()
        };
        assert_eq!(class_only.structural_region(), None);
    }
}
