use crate::color::{anomaly_color, Color};
use crate::model::{AnnotationFrame, HoveredAnnotation, MaskId, Polygon};
use crate::scale::ScaleFactors;

const OPEN_WORLD_RGB: (u8, u8, u8) = (0, 255, 34);

// Structural boxes are an interactive hit region, not a visible highlight:
// the original styling is a fully transparent stroke and a fill far below one
// alpha step, both of which quantize to zero here.
const STRUCTURAL_STROKE: Color = Color::rgba(238, 0, 255, 0);
const STRUCTURAL_FILL: Color = Color::rgba(194, 32, 206, 0);

/// RGBA8 pixel buffer sized to match the displayed image box. The single
/// drawing surface of an overlay session, mutated only by the calling thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlaySurface {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl OverlaySurface {
    pub fn new(width: u32, height: u32) -> Self {
        let mut surface = Self::default();
        surface.resize(width, height);
        surface
    }

    /// Reallocates the backing buffer when the displayed size changes.
    pub fn resize(&mut self, width: u32, height: u32) {
        let target_len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if (self.width, self.height) != (width, height) || self.rgba.len() != target_len {
            self.rgba = vec![0; target_len];
            self.width = width;
            self.height = height;
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = ((y * self.width + x) * 4) as usize;
        Color::rgba(
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        )
    }

    pub fn clear(&mut self) {
        self.rgba.fill(0);
    }

    /// Source-over blend of one pixel; out-of-bounds coordinates are ignored.
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if color.a == 0 || x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        let dst = &mut self.rgba[idx..idx + 4];

        let sa = color.a as f32 / 255.0;
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= f32::EPSILON {
            dst.copy_from_slice(&[0, 0, 0, 0]);
            return;
        }

        let mix = |s: u8, d: u8| -> u8 {
            (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        dst[0] = mix(color.r, dst[0]);
        dst[1] = mix(color.g, dst[1]);
        dst[2] = mix(color.b, dst[2]);
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

/// Clears and repaints the whole surface; there is no partial redraw. The
/// layer order is a hard contract for visual precedence: open-world boxes at
/// the bottom, structural boxes next, damage polygons on top with hover
/// emphasis. Invalid geometry is skipped without error.
pub fn render(
    surface: &mut OverlaySurface,
    frame: &AnnotationFrame,
    scale: ScaleFactors,
    hovered: Option<&HoveredAnnotation>,
) {
    tracing::trace!(
        elements = frame.elements.len(),
        width = surface.width,
        height = surface.height,
        "overlay render pass"
    );
    surface.clear();

    let hovered_label = hovered.and_then(HoveredAnnotation::open_world_label);
    for element in &frame.elements {
        for detection in &element.open_world_detections {
            let Some(bounds) = detection.valid_box() else {
                continue;
            };
            let is_hovered = hovered_label == Some(detection.label_or_unknown());
            let (r, g, b) = OPEN_WORLD_RGB;
            let (stroke, fill, line_width) = if is_hovered {
                (
                    Color::rgb_with_opacity(r, g, b, 0.8),
                    Color::rgb_with_opacity(r, g, b, 0.05),
                    2,
                )
            } else {
                (
                    Color::rgb_with_opacity(r, g, b, 0.2),
                    Color::rgb_with_opacity(r, g, b, 0.001),
                    1,
                )
            };
            let scaled = scale.apply_box(bounds);
            fill_rect(surface, scaled, fill);
            stroke_rect(surface, scaled, stroke, line_width);
        }
    }

    for element in &frame.elements {
        let Some((bounds, _)) = element.structural_region() else {
            continue;
        };
        let scaled = scale.apply_box(bounds);
        fill_rect(surface, scaled, STRUCTURAL_FILL);
        stroke_rect(surface, scaled, STRUCTURAL_STROKE, 1);
    }

    let hovered_mask = hovered.and_then(HoveredAnnotation::mask_id);
    for (element_idx, element) in frame.elements.iter().enumerate() {
        for (anomaly_idx, anomaly) in element.anomalies().enumerate() {
            let id = MaskId {
                element: element_idx,
                anomaly: anomaly_idx,
            };
            let is_hovered = hovered_mask == Some(id);
            let class = anomaly.damage_class.as_deref();
            let fill = anomaly_color(class, if is_hovered { 0.7 } else { 0.4 });
            let stroke = anomaly_color(class, 1.0);
            let line_width = if is_hovered { 2 } else { 1 };

            for polygon in anomaly.valid_masks() {
                fill_polygon(surface, polygon, scale, fill);
                stroke_polygon(surface, polygon, scale, stroke, line_width);
            }
        }
    }
}

fn fill_rect(surface: &mut OverlaySurface, bounds: [f64; 4], color: Color) {
    if color.a == 0 {
        return;
    }
    let (x_min, x_max) = (bounds[0].min(bounds[2]), bounds[0].max(bounds[2]));
    let (y_min, y_max) = (bounds[1].min(bounds[3]), bounds[1].max(bounds[3]));

    // Cover the pixels whose centers fall inside the box.
    let x0 = ((x_min - 0.5).ceil() as i32).max(0);
    let x1 = ((x_max - 0.5).floor() as i32).min(surface.width as i32 - 1);
    let y0 = ((y_min - 0.5).ceil() as i32).max(0);
    let y1 = ((y_max - 0.5).floor() as i32).min(surface.height as i32 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            surface.blend_pixel(x, y, color);
        }
    }
}

fn stroke_rect(surface: &mut OverlaySurface, bounds: [f64; 4], color: Color, line_width: u32) {
    if color.a == 0 {
        return;
    }
    let (x0, y0) = (bounds[0], bounds[1]);
    let (x1, y1) = (bounds[2], bounds[3]);
    draw_segment(surface, (x0, y0), (x1, y0), color, line_width);
    draw_segment(surface, (x1, y0), (x1, y1), color, line_width);
    draw_segment(surface, (x1, y1), (x0, y1), color, line_width);
    draw_segment(surface, (x0, y1), (x0, y0), color, line_width);
}

/// Even-odd scanline fill over the scaled vertices, matching the containment
/// rule the hit tester applies to the same polygon.
fn fill_polygon(surface: &mut OverlaySurface, polygon: &Polygon, scale: ScaleFactors, color: Color) {
    if color.a == 0 || polygon.len() < 3 {
        return;
    }
    let points: Vec<(f64, f64)> = polygon.iter().map(|&p| scale.apply(p)).collect();

    let y_min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let y_max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let y0 = ((y_min - 0.5).ceil() as i32).max(0);
    let y1 = ((y_max - 0.5).floor() as i32).min(surface.height as i32 - 1);

    let mut crossings: Vec<f64> = Vec::new();
    for y in y0..=y1 {
        let sample = y as f64 + 0.5;
        crossings.clear();
        for i in 0..points.len() {
            let (x_a, y_a) = points[i];
            let (x_b, y_b) = points[(i + 1) % points.len()];
            if (y_a > sample) != (y_b > sample) {
                let t = (sample - y_a) / (y_b - y_a);
                crossings.push(x_a + t * (x_b - x_a));
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let x_start = ((span[0] - 0.5).ceil() as i32).max(0);
            let x_end = ((span[1] - 0.5).floor() as i32).min(surface.width as i32 - 1);
            for x in x_start..=x_end {
                surface.blend_pixel(x, y, color);
            }
        }
    }
}

fn stroke_polygon(
    surface: &mut OverlaySurface,
    polygon: &Polygon,
    scale: ScaleFactors,
    color: Color,
    line_width: u32,
) {
    if color.a == 0 || polygon.len() < 3 {
        return;
    }
    let points: Vec<(f64, f64)> = polygon.iter().map(|&p| scale.apply(p)).collect();
    for i in 0..points.len() {
        draw_segment(
            surface,
            points[i],
            points[(i + 1) % points.len()],
            color,
            line_width,
        );
    }
}

/// Bresenham walk stamping a square brush of `line_width` at each step.
fn draw_segment(
    surface: &mut OverlaySurface,
    start: (f64, f64),
    end: (f64, f64),
    color: Color,
    line_width: u32,
) {
    if color.a == 0 {
        return;
    }
    let mut x0 = start.0.round() as i32;
    let mut y0 = start.1.round() as i32;
    let x1 = end.0.round() as i32;
    let y1 = end.1.round() as i32;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        draw_brush(surface, (x0, y0), color, line_width);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_brush(surface: &mut OverlaySurface, center: (i32, i32), color: Color, line_width: u32) {
    let side = line_width.max(1) as i32;
    let radius = (side - 1) / 2;
    let extent = side - 1 - radius;
    for dy in -radius..=extent {
        for dx in -radius..=extent {
            surface.blend_pixel(center.0 + dx, center.1 + dy, color);
        }
    }
}
