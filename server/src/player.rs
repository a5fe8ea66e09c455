/// A connected viewer and the top launched on their behalf.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: u32,
    pub top_id: u32,
    /// Tint for the player's top, 0xRRGGBB
    pub color: u32,
    /// Total spin requested through power-ups
    pub spin_added: f64,
}

impl Player {
    pub fn new(id: u32, top_id: u32) -> Self {
        Self {
            id,
            top_id,
            color: tint_for(id),
            spin_added: 0.0,
        }
    }
}

/// Spread player tints around the hue wheel in 137 degree steps so
/// consecutive players stay easy to tell apart.
pub fn tint_for(id: u32) -> u32 {
    let hue = (id.wrapping_mul(137) % 360) as f64;
    hue_to_rgb(hue, 0.6, 0.9)
}

fn hue_to_rgb(hue: f64, saturation: f64, value: f64) -> u32 {
    let chroma = value * saturation;
    let sector = hue / 60.0;
    let secondary = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let base = value - chroma;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, secondary, 0.0),
        1 => (secondary, chroma, 0.0),
        2 => (0.0, chroma, secondary),
        3 => (0.0, secondary, chroma),
        4 => (secondary, 0.0, chroma),
        _ => (chroma, 0.0, secondary),
    };

    let channel = |c: f64| ((c + base) * 255.0).round() as u32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}
