use crate::model::{AnnotationFrame, DamageAnomaly, HoveredAnnotation, MaskId, Polygon, Severity};
use crate::scale::ScaleFactors;

/// Resolves the topmost interactive annotation under a pointer position, in
/// display-space coordinates. Runs on every pointer move.
///
/// Open-world boxes are checked before damage polygons and win wherever both
/// contain the point, even though they are rendered almost invisibly; this
/// keeps the generic-detection layer inspectable and is a user-visible
/// precedence contract, not an optimization. Within each category, later
/// elements take priority (last drawn on top), and within an element's
/// concatenated anomaly set the later anomaly wins.
pub fn hit_test(
    frame: &AnnotationFrame,
    scale: ScaleFactors,
    x: f64,
    y: f64,
) -> Option<HoveredAnnotation> {
    for element in frame.elements.iter().rev() {
        for detection in &element.open_world_detections {
            let Some(bounds) = detection.valid_box() else {
                continue;
            };
            let [x1, y1, x2, y2] = scale.apply_box(bounds);
            if x >= x1 && x <= x2 && y >= y1 && y <= y2 {
                return Some(HoveredAnnotation::OpenWorld {
                    label: detection.label_or_unknown().to_string(),
                });
            }
        }
    }

    for (element_idx, element) in frame.elements.iter().enumerate().rev() {
        let anomalies: Vec<&DamageAnomaly> = element.anomalies().collect();
        for (anomaly_idx, &anomaly) in anomalies.iter().enumerate().rev() {
            let contained = anomaly
                .valid_masks()
                .any(|polygon| point_in_polygon(polygon, scale, x, y));
            if contained {
                return Some(HoveredAnnotation::Damage {
                    damage_class: anomaly.damage_class.clone(),
                    severity: anomaly
                        .severity
                        .clone()
                        .unwrap_or(Severity::Level(1.0)),
                    confidence_score: anomaly.confidence_score,
                    mask_id: MaskId {
                        element: element_idx,
                        anomaly: anomaly_idx,
                    },
                    structural_class: associate_structural(anomaly, frame),
                });
            }
        }
    }

    None
}

/// Even-odd containment test against the scaled vertices, consistent with the
/// renderer's scanline fill of the same polygon. Short polygons never match.
pub fn point_in_polygon(polygon: &Polygon, scale: ScaleFactors, x: f64, y: f64) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (x_i, y_i) = scale.apply(polygon[i]);
        let (x_j, y_j) = scale.apply(polygon[j]);
        if (y_i > y) != (y_j > y) {
            let t = (y - y_i) / (y_j - y_i);
            if x < x_i + t * (x_j - x_i) {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// The structural element enclosing an anomaly, if any. An element matches
/// when any vertex of any of the anomaly's masks lies within its structural
/// box (inclusive bounds, original-image space). The last matching element in
/// frame order wins. Recomputed per hit; never cached across anomalies.
pub fn associate_structural(anomaly: &DamageAnomaly, frame: &AnnotationFrame) -> Option<String> {
    let mut found = None;
    for element in &frame.elements {
        let Some(([x1, y1, x2, y2], class)) = element.structural_region() else {
            continue;
        };
        let inside = anomaly
            .masks
            .iter()
            .flatten()
            .any(|&[px, py]| px >= x1 && px <= x2 && py >= y1 && py <= y2);
        if inside {
            found = Some(class.to_string());
        }
    }
    found
}
