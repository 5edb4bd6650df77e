use glam::Vec3;

/// Rec. 709 luma weights.
#[inline]
pub fn luminance(c: Vec3) -> f32 {
    c.dot(Vec3::new(0.2126, 0.7152, 0.0722))
}

/// Linear HDR color buffer, row-major with y down.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<Vec3>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self { width, height, pixels: vec![Vec3::ZERO; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Vec3] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Vec3] {
        &mut self.pixels
    }

    /// Reallocate only when the size changes; contents are cleared.
    pub fn resize(&mut self, width: usize, height: usize) {
        let (width, height) = (width.max(1), height.max(1));
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixels = vec![Vec3::ZERO; width * height];
        } else {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Vec3::ZERO);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Vec3 {
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, c: Vec3) {
        let i = y * self.width + x;
        self.pixels[i] = c;
    }

    /// Add light at integer coordinates; out-of-bounds writes are dropped.
    #[inline]
    pub fn add(&mut self, x: i64, y: i64, c: Vec3) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = y as usize * self.width + x as usize;
        self.pixels[i] += c;
    }

    /// Bilinear sample at UV coordinates, clamped to the edge.
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let x = (u * self.width as f32 - 0.5).clamp(0.0, (self.width - 1) as f32);
        let y = (v * self.height as f32 - 0.5).clamp(0.0, (self.height - 1) as f32);
        let (x0, y0) = (x.floor() as usize, y.floor() as usize);
        let (x1, y1) = ((x0 + 1).min(self.width - 1), (y0 + 1).min(self.height - 1));
        let (fx, fy) = (x - x0 as f32, y - y0 as f32);
        let top = self.get(x0, y0).lerp(self.get(x1, y0), fx);
        let bottom = self.get(x0, y1).lerp(self.get(x1, y1), fx);
        top.lerp(bottom, fy)
    }

    /// UV coordinates of a pixel center.
    #[inline]
    pub fn uv(&self, x: usize, y: usize) -> (f32, f32) {
        ((x as f32 + 0.5) / self.width as f32, (y as f32 + 0.5) / self.height as f32)
    }

    pub fn total_luminance(&self) -> f32 {
        self.pixels.iter().map(|&c| luminance(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_ignores_out_of_bounds() {
        let mut frame = Frame::new(4, 4);
        frame.add(-1, 0, Vec3::ONE);
        frame.add(4, 2, Vec3::ONE);
        frame.add(1, 2, Vec3::ONE);
        assert_eq!(frame.total_luminance(), luminance(Vec3::ONE));
        assert_eq!(frame.get(1, 2), Vec3::ONE);
    }

    #[test]
    fn sample_at_pixel_center_is_exact() {
        let mut frame = Frame::new(4, 2);
        frame.set(2, 1, Vec3::new(1.0, 2.0, 3.0));
        let (u, v) = frame.uv(2, 1);
        assert!((frame.sample(u, v) - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn resize_clears() {
        let mut frame = Frame::new(2, 2);
        frame.set(0, 0, Vec3::ONE);
        frame.resize(2, 2);
        assert_eq!(frame.get(0, 0), Vec3::ZERO);
        frame.resize(3, 1);
        assert_eq!(frame.pixels().len(), 3);
    }
}
