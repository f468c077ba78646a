use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Continuous scales
// ---------------------------------------------------------------------------

const BLUE: (u8, u8, u8) = (33, 102, 172);
const WHITE: (u8, u8, u8) = (247, 247, 247);
const RED: (u8, u8, u8) = (178, 24, 43);

const GREEN: (u8, u8, u8) = (26, 152, 80);
const YELLOW: (u8, u8, u8) = (254, 224, 139);

const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Blue → white → red for a coefficient in [-1, 1]. Undefined values grey.
pub fn diverging(value: Option<f64>) -> Color32 {
    match value {
        Some(v) if v.is_finite() => {
            let v = v.clamp(-1.0, 1.0) as f32;
            if v < 0.0 {
                blend(WHITE, BLUE, -v)
            } else {
                blend(WHITE, RED, v)
            }
        }
        _ => Color32::GRAY,
    }
}

/// Green → yellow → red for a share in [0, 1] (higher is worse).
pub fn heat(share: f64) -> Color32 {
    let t = share.clamp(0.0, 1.0) as f32;
    if t < 0.5 {
        blend(GREEN, YELLOW, t * 2.0)
    } else {
        blend(YELLOW, RED, (t - 0.5) * 2.0)
    }
}

/// Viridis-like ramp for a position in [0, 1].
pub fn sequential(t: f64) -> Color32 {
    let scaled = t.clamp(0.0, 1.0) as f32 * (VIRIDIS.len() - 1) as f32;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    blend(VIRIDIS[i], VIRIDIS[i + 1], scaled - i as f32)
}

fn blend(from: (u8, u8, u8), to: (u8, u8, u8), t: f32) -> Color32 {
    let a: LinSrgb = Srgb::new(from.0, from.1, from.2).into_format::<f32>().into_linear();
    let b: LinSrgb = Srgb::new(to.0, to.1, to.2).into_format::<f32>().into_linear();
    to_color32(Srgb::from_linear(a.mix(b, t.clamp(0.0, 1.0))))
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}
