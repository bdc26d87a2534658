/// RGBA8 pixel buffer, row-major, 4 bytes per pixel, stride `width * 4`.
///
/// This is the write target of the rasterizer; it owns no display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Transparent black buffer.
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            data: vec![0u8; width * height * 4],
        }
    }

    /// Wraps existing RGBA8 bytes.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, String> {
        let expected = width * height * 4;
        if data.len() != expected {
            return Err(format!(
                "Buffer of {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            ));
        }
        Ok(FrameBuffer {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Byte offset of pixel (x, y).
    #[inline]
    pub fn pixel_index(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * 4
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if !self.contains(x, y) {
            return None;
        }
        let offset = self.pixel_index(x, y);
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.data[offset..offset + 4]);
        Some(rgba)
    }

    /// Writes one pixel. Callers are expected to bounds-check first; writes
    /// outside the buffer are ignored and reported as `false`.
    #[inline]
    pub fn write_rgba(&mut self, x: usize, y: usize, rgba: [u8; 4]) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        let offset = self.pixel_index(x, y);
        self.data[offset..offset + 4].copy_from_slice(&rgba);
        true
    }

    /// Fills every pixel with `rgba`.
    pub fn clear(&mut self, rgba: [u8; 4]) {
        for pixel in self.data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Nearest-neighbour enlargement: every pixel becomes a `factor x factor` block.
    pub fn upscaled(&self, factor: usize) -> FrameBuffer {
        if factor <= 1 {
            return self.clone();
        }
        let mut out = FrameBuffer::new(self.width * factor, self.height * factor);
        for y in 0..out.height {
            for x in 0..out.width {
                let src = self.pixel_index(x / factor, y / factor);
                let dst = out.pixel_index(x, y);
                out.data[dst..dst + 4].copy_from_slice(&self.data[src..src + 4]);
            }
        }
        out
    }

    /// Number of pixels that differ from `rgba`.
    pub fn count_pixels_not(&self, rgba: [u8; 4]) -> usize {
        self.data
            .chunks_exact(4)
            .filter(|pixel| *pixel != rgba.as_slice())
            .count()
    }
}
