/// 16-bit 5-6-5 color as stored in block files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const WHITE: Rgb565 = Rgb565(0xFFFF);
    pub const BLACK: Rgb565 = Rgb565(0x0000);
    pub const RED: Rgb565 = Rgb565(0xF800);
    pub const GREEN: Rgb565 = Rgb565(0x76EE);
    pub const GREEN_CLEAR: Rgb565 = Rgb565(0x9F93);
    pub const GREEN_CLEAR2: Rgb565 = Rgb565(0xCF6E);
    pub const BLUE: Rgb565 = Rgb565(0x227E);
    pub const BLUE_CLEAR: Rgb565 = Rgb565(0x6D3E);
    pub const CYAN: Rgb565 = Rgb565(0xB7FF);
    pub const VIOLET: Rgb565 = Rgb565(0xAA1F);
    pub const ORANGE: Rgb565 = Rgb565(0xFCC2);
    pub const GRAY: Rgb565 = Rgb565(0x94B2);
    pub const GRAY_CLEAR: Rgb565 = Rgb565(0xAD55);
    pub const GRAY_CLEAR2: Rgb565 = Rgb565(0xD69A);
    pub const BROWN: Rgb565 = Rgb565(0xAB00);
    pub const YELLOW_CLEAR: Rgb565 = Rgb565(0xFFF5);
    pub const BACKGROUND: Rgb565 = Rgb565(0xEF5D);

    /// Expand to 8-bit channels, replicating high bits into the low ones
    pub fn to_rgb888(self) -> (u8, u8, u8) {
        let r = ((self.0 >> 11) & 0x1F) as u8;
        let g = ((self.0 >> 5) & 0x3F) as u8;
        let b = (self.0 & 0x1F) as u8;
        ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }
}

/// Minimal drawing target the map renderer paints onto: background fill,
/// straight lines and filled triangles
pub trait Surface {
    fn fill_background(&mut self, color: Rgb565);
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb565);
    #[allow(clippy::too_many_arguments)]
    fn fill_triangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb565);
}

/// Row-major RGB565 pixel buffer. Writes outside the buffer are dropped.
#[derive(Clone)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate for a new size; contents are reset
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgb565::BLACK; width * height];
    }

    #[inline(always)]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb565> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Set a pixel using signed coordinates (ignores anything off-buffer)
    #[inline(always)]
    pub fn set_pixel_signed(&mut self, x: i32, y: i32, color: Rgb565) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }

    /// Number of pixels holding exactly `color`
    pub fn count(&self, color: Rgb565) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }

    /// Fill a horizontal span, clipped to the buffer
    fn hspan(&mut self, x0: i32, x1: i32, y: i32, color: Rgb565) {
        if y < 0 || y as usize >= self.height || self.width == 0 {
            return;
        }
        let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let max_x = self.width as i32 - 1;
        if hi < 0 || lo > max_x {
            return;
        }
        let row = y as usize * self.width;
        for x in lo.max(0)..=hi.min(max_x) {
            self.pixels[row + x as usize] = color;
        }
    }
}

impl Surface for Framebuffer {
    fn fill_background(&mut self, color: Rgb565) {
        self.pixels.fill(color);
    }

    /// Bresenham's algorithm; horizontal runs take the span fast path
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb565) {
        if y0 == y1 {
            self.hspan(x0, x1, y0, color);
            return;
        }

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel_signed(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;

            if e2 >= dy {
                if x == x1 {
                    break;
                }
                err += dy;
                x += sx;
            }

            if e2 <= dx {
                if y == y1 {
                    break;
                }
                err += dx;
                y += sy;
            }
        }
    }

    /// Edge-function fill over the triangle's clipped bounding box.
    /// Pixels on an edge count as inside.
    fn fill_triangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb565) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let min_x = x0.min(x1).min(x2).max(0);
        let max_x = x0.max(x1).max(x2).min(self.width as i32 - 1);
        let min_y = y0.min(y1).min(y2).max(0);
        let max_y = y0.max(y1).max(y2).min(self.height as i32 - 1);

        let edge = |ax: i32, ay: i32, bx: i32, by: i32, px: i32, py: i32| -> i64 {
            (bx - ax) as i64 * (py - ay) as i64 - (by - ay) as i64 * (px - ax) as i64
        };

        let area = edge(x0, y0, x1, y1, x2, y2);
        if area == 0 {
            // Degenerate: collapse to its outline
            self.draw_line(x0, y0, x1, y1, color);
            self.draw_line(x1, y1, x2, y2, color);
            return;
        }

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let w0 = edge(x1, y1, x2, y2, px, py);
                let w1 = edge(x2, y2, x0, y0, px, py);
                let w2 = edge(x0, y0, x1, y1, px, py);
                let inside = if area > 0 {
                    w0 >= 0 && w1 >= 0 && w2 >= 0
                } else {
                    w0 <= 0 && w1 <= 0 && w2 <= 0
                };
                if inside {
                    self.pixels[py as usize * self.width + px as usize] = color;
                }
            }
        }
    }
}
