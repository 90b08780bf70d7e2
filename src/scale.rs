use crate::model::ImageSize;

/// Original-image px to display px scale factors.
///
/// Recomputed on every render and every hit test so container resizes are
/// always honored; never cached across calls. A zero or negative display box
/// yields degenerate factors and annotations collapse to a point, which is
/// accepted degraded behavior rather than an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub sx: f64,
    pub sy: f64,
}

impl ScaleFactors {
    pub fn compute(image: ImageSize, display_width: f64, display_height: f64) -> Self {
        Self {
            sx: display_width / image.width as f64,
            sy: display_height / image.height as f64,
        }
    }

    pub fn apply(&self, point: [f64; 2]) -> (f64, f64) {
        (point[0] * self.sx, point[1] * self.sy)
    }

    pub fn apply_box(&self, bounds: [f64; 4]) -> [f64; 4] {
        [
            bounds[0] * self.sx,
            bounds[1] * self.sy,
            bounds[2] * self.sx,
            bounds[3] * self.sy,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::ScaleFactors;
    use crate::model::ImageSize;

    #[test]
    fn factors_are_display_over_original() {
        let image = ImageSize {
            width: 2000,
            height: 1000,
        };
        let scale = ScaleFactors::compute(image, 1000.0, 750.0);
        assert_eq!(scale.sx, 0.5);
        assert_eq!(scale.sy, 0.75);
    }

    #[test]
    fn scale_then_unscale_round_trips_within_tolerance() {
        let image = ImageSize {
            width: 5184,
            height: 3888,
        };
        let scale = ScaleFactors::compute(image, 1337.0, 901.0);

        for point in [[10.0, 10.0], [5184.0, 3888.0], [123.456, 789.012]] {
            let (sx, sy) = scale.apply(point);
            let back = [sx / scale.sx, sy / scale.sy];
            assert!((back[0] - point[0]).abs() < 1e-9);
            assert!((back[1] - point[1]).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_display_box_collapses_annotations_instead_of_failing() {
        let scale = ScaleFactors::compute(ImageSize::default(), 0.0, 0.0);
        assert_eq!(scale.apply([100.0, 200.0]), (0.0, 0.0));
        assert_eq!(
            scale.apply_box([10.0, 20.0, 30.0, 40.0]),
            [0.0, 0.0, 0.0, 0.0]
        );
    }
}
