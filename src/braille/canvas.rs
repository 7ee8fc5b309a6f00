use crate::surface::{Framebuffer, Rgb565};

/// Braille Unicode canvas for terminal output of a framebuffer.
/// Each character cell covers a 2x4 pixel grid (8 dots).
/// Unicode Braille patterns: U+2800 to U+28FF
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    dots: Vec<Vec<u8>>,
    colors: Vec<Vec<Option<Rgb565>>>,
}

/// Braille dot bit for a pixel inside its cell.
/// ```text
/// (0,0) (1,0)   bits: 0x01 0x08
/// (0,1) (1,1)   bits: 0x02 0x10
/// (0,2) (1,2)   bits: 0x04 0x20
/// (0,3) (1,3)   bits: 0x40 0x80
/// ```
#[inline(always)]
fn dot_bit(x: usize, y: usize) -> u8 {
    match (x % 2, y % 4) {
        (0, 0) => 0x01,
        (1, 0) => 0x08,
        (0, 1) => 0x02,
        (1, 1) => 0x10,
        (0, 2) => 0x04,
        (1, 2) => 0x20,
        (0, 3) => 0x40,
        (1, 3) => 0x80,
        _ => 0,
    }
}

impl BrailleCanvas {
    /// Empty canvas with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dots: vec![vec![0u8; width]; height],
            colors: vec![vec![None; width]; height],
        }
    }

    /// Downsample a framebuffer: every pixel that differs from `background`
    /// raises its dot, and each cell takes the most frequent of those colors.
    pub fn from_framebuffer(fb: &Framebuffer, background: Rgb565) -> Self {
        let mut canvas = Self::new(fb.width().div_ceil(2), fb.height().div_ceil(4));
        let mut tally: Vec<(Rgb565, u8)> = Vec::with_capacity(8);

        for cy in 0..canvas.height {
            for cx in 0..canvas.width {
                tally.clear();
                for y in cy * 4..(cy * 4 + 4).min(fb.height()) {
                    for x in cx * 2..(cx * 2 + 2).min(fb.width()) {
                        let Some(color) = fb.pixel(x, y) else { continue };
                        if color == background {
                            continue;
                        }
                        canvas.dots[cy][cx] |= dot_bit(x, y);
                        match tally.iter_mut().find(|(c, _)| *c == color) {
                            Some((_, n)) => *n += 1,
                            None => tally.push((color, 1)),
                        }
                    }
                }
                // Ties go to the color seen first
                canvas.colors[cy][cx] = tally
                    .iter()
                    .fold(None, |best: Option<(Rgb565, u8)>, &(c, n)| match best {
                        Some((_, m)) if m >= n => best,
                        _ => Some((c, n)),
                    })
                    .map(|(c, _)| c);
            }
        }
        canvas
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raise a single dot, uncolored
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }
        self.dots[cy][cx] |= dot_bit(x, y);
    }

    /// Dominant color of a cell, `None` when all its dots are background
    pub fn color(&self, cx: usize, cy: usize) -> Option<Rgb565> {
        self.colors.get(cy).and_then(|row| row.get(cx)).copied().flatten()
    }

    /// Convert the canvas to a string of Braille characters
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.rows().collect::<Vec<_>>().join("\n")
    }

    /// Get a specific row as a string (for line-by-line rendering)
    pub fn row_to_string(&self, row: usize) -> String {
        if row >= self.height {
            return String::new();
        }
        self.dots[row]
            .iter()
            .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
            .collect()
    }

    /// Get all rows as an iterator of strings
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height).map(|i| self.row_to_string(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.to_string(), "⠁"); // U+2801
    }

    #[test]
    fn test_diagonal() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(0, 0);
        canvas.set_pixel(1, 1);
        canvas.set_pixel(2, 2);
        canvas.set_pixel(3, 3);
        // First char: (0,0) and (1,1) = 0x01 | 0x10 = 0x11
        // Second char: (0,2) and (1,3) = 0x04 | 0x80 = 0x84
        assert_eq!(canvas.to_string(), "⠑⢄");
    }

    #[test]
    fn test_from_framebuffer_dots_and_size() {
        // 5x5 pixels round up to 3x2 cells
        let mut fb = Framebuffer::new(5, 5);
        fb.fill_background(Rgb565::BACKGROUND);
        fb.draw_line(0, 0, 1, 0, Rgb565::BLUE);
        fb.set_pixel_signed(4, 4, Rgb565::RED);

        let canvas = BrailleCanvas::from_framebuffer(&fb, Rgb565::BACKGROUND);
        assert_eq!((canvas.width(), canvas.height()), (3, 2));
        assert_eq!(canvas.row_to_string(0), "⠉⠀⠀");
        assert_eq!(canvas.row_to_string(1), "⠀⠀⠁");
        assert_eq!(canvas.color(0, 0), Some(Rgb565::BLUE));
        assert_eq!(canvas.color(2, 1), Some(Rgb565::RED));
        assert_eq!(canvas.color(1, 0), None);
        assert_eq!(canvas.color(9, 9), None);
    }

    #[test]
    fn test_dominant_color() {
        let mut fb = Framebuffer::new(2, 4);
        fb.fill_background(Rgb565::GREEN);
        fb.set_pixel_signed(0, 0, Rgb565::RED);
        let canvas = BrailleCanvas::from_framebuffer(&fb, Rgb565::BACKGROUND);
        assert_eq!(canvas.to_string(), "⣿");
        assert_eq!(canvas.color(0, 0), Some(Rgb565::GREEN));
    }
}
