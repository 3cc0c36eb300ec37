use super::basics::{DISPLAY_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};

/// The 64x32 monochrome frame buffer, stored row-major. The only mutations are
/// a full clear and XOR sprite drawing.
#[derive(Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    pixels: [bool; DISPLAY_SIZE],
}

impl DisplayBuffer {
    pub fn new() -> DisplayBuffer {
        DisplayBuffer {
            pixels: [false; DISPLAY_SIZE],
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [false; DISPLAY_SIZE];
    }

    pub fn get(&self, x: u8, y: u8) -> bool {
        self.pixels[Self::index(x, y)]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }

    fn index(x: u8, y: u8) -> usize {
        y as usize * SCREEN_WIDTH as usize + x as usize
    }

    /// XORs an 8-pixel-wide sprite onto the buffer with its top-left corner at
    /// `(x, y)` reduced modulo the grid size. Rows and columns past the right
    /// or bottom edge are clipped, not wrapped.
    ///
    /// Returns true if any lit pixel was switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let x0 = x % SCREEN_WIDTH;
        let y0 = y % SCREEN_HEIGHT;
        let mut collision = false;
        for (row_offset, row) in rows.iter().enumerate() {
            let py = y0 as usize + row_offset;
            if py >= SCREEN_HEIGHT as usize {
                break;
            }
            for column in 0..8u8 {
                let px = x0 + column;
                if px >= SCREEN_WIDTH {
                    break;
                }
                if row & (0x80 >> column) == 0 {
                    continue;
                }
                let pixel = &mut self.pixels[Self::index(px, py as u8)];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }
        collision
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        DisplayBuffer::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_draw_and_collision() {
        let mut display = DisplayBuffer::new();
        assert!(!display.draw_sprite(0, 0, &[0xF0]));
        assert_eq!(display.lit_count(), 4);
        assert!(display.get(3, 0));
        assert!(!display.get(4, 0));
        // Overlaps only on x = 2..3.
        assert!(display.draw_sprite(2, 0, &[0xC0]));
        assert!(!display.get(2, 0));
        assert!(display.get(1, 0));
    }

    #[test]
    fn test_non_overlapping_draw_has_no_collision() {
        let mut display = DisplayBuffer::new();
        display.draw_sprite(0, 0, &[0xFF]);
        assert!(!display.draw_sprite(0, 1, &[0xFF]));
    }

    #[test]
    fn test_clip_right_edge() {
        let mut display = DisplayBuffer::new();
        display.draw_sprite(60, 0, &[0xFF]);
        assert_eq!(display.lit_count(), 4);
        for x in 0..4 {
            assert!(!display.get(x, 0));
        }
    }

    #[test]
    fn test_clip_bottom_edge() {
        let mut display = DisplayBuffer::new();
        display.draw_sprite(0, 30, &[0x80, 0x80, 0x80, 0x80]);
        assert_eq!(display.lit_count(), 2);
        assert!(!display.get(0, 0));
    }

    #[test]
    fn test_origin_wraps() {
        let mut display = DisplayBuffer::new();
        display.draw_sprite(64 + 5, 32 + 7, &[0x80]);
        assert!(display.get(5, 7));
    }

    #[test]
    fn test_clear() {
        let mut display = DisplayBuffer::new();
        display.draw_sprite(10, 10, &[0xFF, 0xFF]);
        display.clear();
        assert_eq!(display.lit_count(), 0);
    }
}
