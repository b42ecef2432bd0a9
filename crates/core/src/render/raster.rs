use crate::{color::Rgb, config::TrailBlend, Result};

use super::{DrawCommand, Layer, Rect, Renderer};

const OPAQUE: u8 = 255;

/// Source-over blend of one channel.
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let alpha = alpha as u32;
    ((src as u32 * alpha + dst as u32 * (255 - alpha)) / 255) as u8
}

/// Like [`blend_channel`], but a non-zero alpha always moves `dst` at least
/// one step toward `src`, so repeated fades settle exactly on the fade colour.
#[inline]
fn fade_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let blended = blend_channel(src, dst, alpha);
    if alpha == 0 || blended != dst {
        return blended;
    }
    match src.cmp(&dst) {
        std::cmp::Ordering::Greater => dst + 1,
        std::cmp::Ordering::Less => dst - 1,
        std::cmp::Ordering::Equal => dst,
    }
}

#[inline]
fn blend_alpha(src: u8, dst: u8) -> u8 {
    let src = src as u32;
    (src + dst as u32 * (255 - src) / 255) as u8
}

/// RGBA8 pixel buffer with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Raster {
    /// Fully transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn rgb(&self, x: u32, y: u32) -> Option<Rgb> {
        self.pixel(x, y).map(|[r, g, b, _]| Rgb(r, g, b))
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Fills every pixel with an opaque colour.
    pub fn clear(&mut self, color: Rgb) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.0, color.1, color.2, OPAQUE]);
        }
    }

    /// Composites a translucent rectangle, clipped to the buffer. Used for
    /// the per-tick trail fade.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: u8) {
        let x0 = rect.x.max(0) as u32;
        let y0 = rect.y.max(0) as u32;
        let x1 = (rect.x.saturating_add(rect.width as i32)).clamp(0, self.width as i32) as u32;
        let y1 = (rect.y.saturating_add(rect.height as i32)).clamp(0, self.height as i32) as u32;
        let src = color.channels();

        for y in y0..y1 {
            for x in x0..x1 {
                let i = self.index(x, y);
                let px = &mut self.pixels[i..i + 4];
                for c in 0..3 {
                    px[c] = fade_channel(src[c], px[c], alpha);
                }
                px[3] = blend_alpha(alpha, px[3]);
            }
        }
    }

    /// Draws an opaque filled circle of every pixel within `radius` of the
    /// centre, clipped to the buffer.
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: u32, color: Rgb) {
        let (cx, cy) = (i64::from(cx), i64::from(cy));
        let r = i64::from(radius);
        let r2 = i128::from(r) * i128::from(r);
        let y0 = (cy - r).max(0);
        let y1 = (cy + r).min(i64::from(self.height) - 1);
        let x0 = (cx - r).max(0);
        let x1 = (cx + r).min(i64::from(self.width) - 1);
        for y in y0..=y1 {
            let dy = y - cy;
            for x in x0..=x1 {
                let dx = x - cx;
                if i128::from(dx) * i128::from(dx) + i128::from(dy) * i128::from(dy) > r2 {
                    continue;
                }
                let i = self.index(x as u32, y as u32);
                self.pixels[i..i + 4].copy_from_slice(&[color.0, color.1, color.2, OPAQUE]);
            }
        }
    }

    /// Lays `src` over this buffer using `src`'s per-pixel alpha.
    pub fn composite(&mut self, src: &Raster) {
        debug_assert_eq!((self.width, self.height), (src.width, src.height));
        for (dst, src) in self.pixels.chunks_exact_mut(4).zip(src.pixels.chunks_exact(4)) {
            let alpha = src[3];
            for c in 0..3 {
                dst[c] = blend_channel(src[c], dst[c], alpha);
            }
            dst[3] = blend_alpha(alpha, dst[3]);
        }
    }

    pub fn copy_from(&mut self, src: &Raster) {
        debug_assert_eq!((self.width, self.height), (src.width, src.height));
        self.pixels.copy_from_slice(&src.pixels);
    }

    /// Keeps the brighter of the two values per channel.
    pub fn lighten_from(&mut self, src: &Raster) {
        debug_assert_eq!((self.width, self.height), (src.width, src.height));
        for (dst, src) in self.pixels.iter_mut().zip(&src.pixels) {
            *dst = (*dst).max(*src);
        }
    }
}

/// Executes [`DrawCommand`]s against an in-memory trail and frame buffer.
#[derive(Debug, Clone)]
pub struct SoftwareRenderer {
    trail: Raster,
    frame: Raster,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            trail: Raster::new(width, height),
            frame: Raster::new(width, height),
        }
    }

    /// The most recently presented frame.
    pub fn frame(&self) -> &Raster {
        &self.frame
    }

    pub fn trail(&self) -> &Raster {
        &self.trail
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut Raster {
        match layer {
            Layer::Trail => &mut self.trail,
            Layer::Frame => &mut self.frame,
        }
    }

    pub fn apply(&mut self, command: &DrawCommand) {
        match *command {
            DrawCommand::Clear { layer, color } => self.layer_mut(layer).clear(color),
            DrawCommand::FillRect {
                layer,
                rect,
                color,
                alpha,
            } => self.layer_mut(layer).fill_rect(rect, color, alpha),
            DrawCommand::FillCircle {
                x,
                y,
                radius,
                color,
            } => self.frame.fill_circle(x, y, radius, color),
            DrawCommand::CompositeTrail => self.frame.composite(&self.trail),
            DrawCommand::StoreTrail { blend } => match blend {
                TrailBlend::Replace => self.trail.copy_from(&self.frame),
                TrailBlend::Lighten => self.trail.lighten_from(&self.frame),
            },
        }
    }
}

impl Renderer for SoftwareRenderer {
    fn render(&mut self, commands: &[DrawCommand]) -> Result<()> {
        for command in commands {
            self.apply(command);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKGROUND: Rgb = Rgb(4, 6, 10);

    fn full(raster: &Raster) -> Rect {
        Rect::new(0, 0, raster.width(), raster.height())
    }

    #[test]
    fn clear_is_opaque() {
        let mut raster = Raster::new(2, 2);
        assert_eq!(raster.pixel(1, 1), Some([0, 0, 0, 0]));
        raster.clear(Rgb(1, 2, 3));
        assert_eq!(raster.pixel(1, 1), Some([1, 2, 3, 255]));
        assert_eq!(raster.pixel(2, 0), None);
    }

    #[test]
    fn circle_is_clipped_to_the_buffer() {
        let mut raster = Raster::new(5, 5);
        raster.fill_circle(0, 0, 2, Rgb(255, 0, 0));

        assert_eq!(raster.rgb(0, 0), Some(Rgb(255, 0, 0)));
        assert_eq!(raster.rgb(2, 0), Some(Rgb(255, 0, 0)));
        assert_eq!(raster.rgb(1, 1), Some(Rgb(255, 0, 0)));
        // (2, 2) is outside a radius of 2.
        assert_eq!(raster.rgb(2, 2), Some(Rgb::BLACK));

        raster.fill_circle(-100, 300, 3, Rgb(0, 255, 0));
    }

    #[test]
    fn huge_circle_covers_the_buffer_without_overflow() {
        let mut raster = Raster::new(4, 3);
        raster.fill_circle(i32::MIN, i32::MIN, 1_000_000, Rgb(0, 0, 255));
        assert_eq!(raster.rgb(0, 0), Some(Rgb::BLACK));

        raster.fill_circle(1, 1, u32::MAX, Rgb(0, 0, 255));
        assert_eq!(raster.rgb(0, 0), Some(Rgb(0, 0, 255)));
        assert_eq!(raster.rgb(3, 2), Some(Rgb(0, 0, 255)));
    }

    #[test]
    fn fade_moves_toward_the_fade_colour_and_never_brightens() {
        let mut raster = Raster::new(1, 1);
        raster.clear(Rgb(255, 255, 255));
        let rect = full(&raster);

        let mut previous = raster.rgb(0, 0).unwrap();
        for _ in 0..400 {
            raster.fill_rect(rect, BACKGROUND, 22);
            let current = raster.rgb(0, 0).unwrap();
            for (now, before) in current.channels().into_iter().zip(previous.channels()) {
                assert!(now <= before);
            }
            previous = current;
        }
        assert_eq!(previous, BACKGROUND);
    }

    #[test]
    fn fade_lifts_channels_below_the_fade_colour() {
        let mut raster = Raster::new(1, 1);
        raster.clear(Rgb(5, 7, 10));
        let rect = full(&raster);
        for _ in 0..3 {
            raster.fill_rect(rect, BACKGROUND, 30);
        }
        assert_eq!(raster.rgb(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn fade_leaves_the_fade_colour_unchanged() {
        let mut raster = Raster::new(3, 3);
        raster.clear(BACKGROUND);
        let rect = full(&raster);
        raster.fill_rect(rect, BACKGROUND, 30);
        raster.fill_rect(rect, BACKGROUND, 30);
        assert_eq!(raster.rgb(1, 1), Some(BACKGROUND));
    }

    #[test]
    fn fade_raises_alpha_of_a_transparent_buffer() {
        let mut raster = Raster::new(1, 1);
        let rect = full(&raster);
        raster.fill_rect(rect, Rgb::BLACK, 30);
        assert_eq!(raster.pixel(0, 0).unwrap()[3], 30);
        raster.fill_rect(rect, Rgb::BLACK, 30);
        // 30 + 225 * 30 / 255, truncated.
        assert_eq!(raster.pixel(0, 0).unwrap()[3], 56);
    }

    #[test]
    fn composite_respects_source_alpha() {
        let mut frame = Raster::new(1, 1);
        frame.clear(Rgb(100, 100, 100));

        let transparent = Raster::new(1, 1);
        frame.composite(&transparent);
        assert_eq!(frame.rgb(0, 0), Some(Rgb(100, 100, 100)));

        let mut opaque = Raster::new(1, 1);
        opaque.clear(Rgb(7, 8, 9));
        frame.composite(&opaque);
        assert_eq!(frame.rgb(0, 0), Some(Rgb(7, 8, 9)));
    }

    #[test]
    fn lighten_keeps_the_brighter_channel() {
        let mut trail = Raster::new(1, 1);
        trail.clear(Rgb(200, 10, 10));
        let mut frame = Raster::new(1, 1);
        frame.clear(Rgb(20, 150, 5));
        trail.lighten_from(&frame);
        assert_eq!(trail.rgb(0, 0), Some(Rgb(200, 150, 10)));
    }
}
