/// Off-screen grayscale drawing surface backed by a flat `f32` buffer.
///
/// Values live in `[0, 1]`. The simulator owns two of these (front and back)
/// and composites between them each frame; no implicit aliasing, every copy
/// is an explicit read from one buffer into the other.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[f32] {
        &self.data
    }

    /// Resets every pixel to zero.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    #[inline]
    fn sample(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return 0.0;
        }
        self.data[(y as u32 * self.width + x as u32) as usize]
    }

    /// Bilinear sample at fractional coordinates; outside the surface reads 0.
    fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let x0 = x0 as i64;
        let y0 = y0 as i64;

        let top = self.sample(x0, y0) * (1.0 - fx) + self.sample(x0 + 1, y0) * fx;
        let bottom = self.sample(x0, y0 + 1) * (1.0 - fx) + self.sample(x0 + 1, y0 + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }

    /// Paints a soft-edged circular blob, blended source-over with a white
    /// source of the given alpha.
    ///
    /// Coverage is full inside `radius - softness`, fades out by
    /// `radius + softness` with a smoothstep falloff. Pixels outside the
    /// surface clip; nothing is reported.
    pub fn fill_soft_circle(&mut self, cx: f32, cy: f32, radius: f32, softness: f32, alpha: f32) {
        if radius <= 0.0 || alpha <= 0.0 {
            return;
        }
        let reach = radius + softness;
        let min_x = ((cx - reach).floor().max(0.0)) as u32;
        let min_y = ((cy - reach).floor().max(0.0)) as u32;
        let max_x = ((cx + reach).ceil() as i64).clamp(0, i64::from(self.width)) as u32;
        let max_y = ((cy + reach).ceil() as i64).clamp(0, i64::from(self.height)) as u32;

        let inner = (radius - softness).max(0.0);
        for y in min_y..max_y {
            for x in min_x..max_x {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                let coverage = 1.0 - smoothstep(inner, reach, dist);
                if coverage <= 0.0 {
                    continue;
                }
                let a = (alpha * coverage).clamp(0.0, 1.0);
                let idx = (y * self.width + x) as usize;
                // source-over with a white source
                self.data[idx] = a + self.data[idx] * (1.0 - a);
            }
        }
    }

    /// Replaces this surface with `src` scaled by `zoom` about its center and
    /// multiplied by `alpha`. The destination is fully overwritten, matching
    /// a clear-then-draw pass.
    pub fn copy_scaled_from(&mut self, src: &Surface, zoom: f32, alpha: f32) {
        let cx = self.width as f32 * 0.5;
        let cy = self.height as f32 * 0.5;
        let inv = 1.0 / zoom;
        for y in 0..self.height {
            for x in 0..self.width {
                let sx = (x as f32 + 0.5 - cx) * inv + cx;
                let sy = (y as f32 + 0.5 - cy) * inv + cy;
                let value = src.sample_bilinear(sx - 0.5, sy - 0.5) * alpha;
                self.data[(y * self.width + x) as usize] = value.clamp(0.0, 1.0);
            }
        }
    }
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
