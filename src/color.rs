/// Straight (non-premultiplied) RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Quantizes a fractional opacity in `[0, 1]` onto the alpha channel.
    pub fn rgb_with_opacity(r: u8, g: u8, b: u8, opacity: f32) -> Self {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b, a }
    }
}

/// Damage classes mapped by substring, checked in this priority order.
const CLASS_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("crack", (0, 255, 0)),
    ("spalling", (255, 165, 0)),
    ("corrosion", (255, 69, 19)),
    ("stain", (128, 128, 128)),
];

const DEFAULT_RGB: (u8, u8, u8) = (132, 94, 247); // violet

/// Stable color for a damage class label at the given opacity. Matching is a
/// case-insensitive substring check against `CLASS_COLORS`; the first match
/// wins and unmatched labels fall back to the default violet. Pure and
/// deterministic, independent of draw order or data source.
pub fn anomaly_color(label: Option<&str>, opacity: f32) -> Color {
    let lowered = label.map(str::to_lowercase);
    let name = lowered.as_deref().unwrap_or("");
    let mut rgb = DEFAULT_RGB;
    for &(needle, candidate) in CLASS_COLORS {
        if name.contains(needle) {
            rgb = candidate;
            break;
        }
    }
    let (r, g, b) = rgb;
    Color::rgb_with_opacity(r, g, b, opacity)
}
