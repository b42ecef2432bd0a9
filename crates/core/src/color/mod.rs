use serde::{Deserialize, Serialize};

use crate::{config::PaletteConfig, random::RandomSource};

/// Number of colours every firework carries in its palette.
pub const PALETTE_SIZE: usize = 6;

/// Integer RGB triple, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Multiplies every channel by `factor`, truncating toward zero and
    /// saturating at 255.
    pub fn scaled(self, factor: f32) -> Self {
        let scale = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Self(scale(self.0), scale(self.1), scale(self.2))
    }

    pub fn channels(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

/// Converts a hue/saturation/value triple to RGB using the six-sector table.
///
/// Hue is wrapped into `[0, 1)`; saturation and value are expected in
/// `[0, 1]`. Each channel is `255 * component` truncated toward zero.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h = h.rem_euclid(1.0);
    let scaled = h * 6.0;
    let sector = scaled.floor();
    let f = scaled - sector;

    let p = (255.0 * v * (1.0 - s)) as u8;
    let q = (255.0 * v * (1.0 - f * s)) as u8;
    let t = (255.0 * v * (1.0 - (1.0 - f) * s)) as u8;
    let v = (255.0 * v) as u8;

    match (sector as u32) % 6 {
        0 => Rgb(v, t, p),
        1 => Rgb(q, v, p),
        2 => Rgb(p, v, t),
        3 => Rgb(p, q, v),
        4 => Rgb(t, p, v),
        _ => Rgb(v, p, q),
    }
}

/// The fixed set of colours a firework's particles are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette([Rgb; PALETTE_SIZE]);

impl Palette {
    pub fn new(colors: [Rgb; PALETTE_SIZE]) -> Self {
        Self(colors)
    }

    /// Picks one base hue (fixed or random) and jitters it per entry.
    pub fn generate(config: &PaletteConfig, rng: &mut dyn RandomSource) -> Self {
        let base_hue = config.base_hue.unwrap_or_else(|| rng.next_unit());
        let mut colors = [Rgb::BLACK; PALETTE_SIZE];
        for color in &mut colors {
            let hue = base_hue + rng.uniform(-config.hue_jitter, config.hue_jitter);
            let saturation = config.saturation.sample(rng);
            *color = hsv_to_rgb(hue, saturation, config.value);
        }
        Self(colors)
    }

    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.0
    }

    pub fn choose(&self, rng: &mut dyn RandomSource) -> Rgb {
        self.0[rng.index(PALETTE_SIZE)]
    }

    pub fn contains(&self, color: Rgb) -> bool {
        self.0.contains(&color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SampleRange, random::ScriptedSource};

    #[test]
    fn primary_sectors_match_canonical_table() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgb(255, 0, 0));
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), Rgb(0, 255, 0));
        assert_eq!(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), Rgb(0, 0, 255));
        assert_eq!(hsv_to_rgb(0.5, 1.0, 1.0), Rgb(0, 255, 255));
        assert_eq!(hsv_to_rgb(0.0, 0.0, 1.0), Rgb(255, 255, 255));
        assert_eq!(hsv_to_rgb(0.25, 1.0, 0.0), Rgb(0, 0, 0));
    }

    #[test]
    fn golden_hue_is_orange_yellow() {
        // f = 0.72 inside sector 0, so green is 255 * 0.72 truncated.
        let color = hsv_to_rgb(0.12, 1.0, 1.0);
        assert_eq!(color.0, 255);
        assert_eq!(color.1, 183);
        assert_eq!(color.2, 0);
    }

    #[test]
    fn hue_wraps_instead_of_rejecting() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), hsv_to_rgb(1.0, 1.0, 1.0));
        assert_eq!(hsv_to_rgb(0.25, 0.7, 0.9), hsv_to_rgb(1.25, 0.7, 0.9));
        assert_eq!(hsv_to_rgb(-0.25, 0.7, 0.9), hsv_to_rgb(0.75, 0.7, 0.9));
    }

    #[test]
    fn full_value_colours_keep_a_saturated_channel() {
        for step in 0..=240 {
            let h = step as f32 / 120.0 - 0.5;
            for &(s, v) in &[(0.0, 0.0), (0.5, 0.5), (1.0, 1.0), (0.9, 1.0)] {
                let color = hsv_to_rgb(h, s, v);
                if v == 1.0 {
                    assert!(color.channels().contains(&255), "{h} {s} {color:?}");
                }
            }
        }
    }

    #[test]
    fn scaling_truncates_each_channel() {
        assert_eq!(Rgb(255, 100, 3).scaled(0.5), Rgb(127, 50, 1));
        assert_eq!(Rgb(200, 200, 200).scaled(2.0), Rgb(255, 255, 255));
        assert_eq!(Rgb(10, 10, 10).scaled(0.0), Rgb::BLACK);
    }

    #[test]
    fn fixed_base_hue_palette_stays_golden() {
        let config = PaletteConfig {
            base_hue: Some(0.12),
            hue_jitter: 0.02,
            saturation: SampleRange::new(0.9, 1.0),
            value: 1.0,
        };
        let mut rng = ScriptedSource::new(vec![0.0, 0.5, 0.99, 0.25]);
        let palette = Palette::generate(&config, &mut rng);

        for color in palette.colors() {
            assert_eq!(color.0, 255, "golden hues keep red saturated: {color:?}");
            assert!(color.1 > 150 && color.1 < 230, "{color:?}");
            assert!(color.2 < 30, "{color:?}");
        }
    }

    #[test]
    fn choose_only_returns_palette_entries() {
        let palette = Palette::new([
            Rgb(1, 0, 0),
            Rgb(2, 0, 0),
            Rgb(3, 0, 0),
            Rgb(4, 0, 0),
            Rgb(5, 0, 0),
            Rgb(6, 0, 0),
        ]);
        let mut rng = ScriptedSource::new(vec![0.0, 0.17, 0.5, 0.999]);
        assert_eq!(palette.choose(&mut rng), Rgb(1, 0, 0));
        assert_eq!(palette.choose(&mut rng), Rgb(2, 0, 0));
        assert_eq!(palette.choose(&mut rng), Rgb(4, 0, 0));
        assert_eq!(palette.choose(&mut rng), Rgb(6, 0, 0));
    }
}
