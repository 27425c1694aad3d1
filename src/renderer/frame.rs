use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, RgbColor, Size};

pub const MATRIX_WIDTH: usize = 64;
pub const MATRIX_HEIGHT: usize = 64;

pub type MatrixFrame = Frame<MATRIX_WIDTH, MATRIX_HEIGHT>;

/// Row-major RGB pixel buffer. Draws that fall outside the grid are clipped.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Frame<const W: usize, const H: usize>(Box<[[Rgb888; W]; H]>);

impl<const W: usize, const H: usize> Frame<W, H> {
    #[must_use]
    pub fn new() -> Self {
        Frame(Box::new([[Rgb888::BLACK; W]; H]))
    }

    /// # Panics
    ///
    /// Panics if `x` or `y` lies outside the frame.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb888 {
        assert!(x < W, "x must be within width");
        assert!(y < H, "y must be within height");
        self.0[y][x]
    }

    #[must_use]
    pub fn rows(&self) -> &[[Rgb888; W]; H] {
        &self.0
    }

    #[must_use]
    pub fn lit_pixels(&self) -> usize {
        self.0
            .iter()
            .flatten()
            .filter(|&&color| color != Rgb888::BLACK)
            .count()
    }

    /// Whether any pixel in the given row band is lit.
    #[must_use]
    pub fn band_is_lit(&self, rows: std::ops::Range<usize>) -> bool {
        self.0[rows]
            .iter()
            .flatten()
            .any(|&color| color != Rgb888::BLACK)
    }
}

impl<const W: usize, const H: usize> Default for Frame<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> OriginDimensions for Frame<W, H> {
    #[allow(clippy::cast_possible_truncation)]
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const W: usize, const H: usize> DrawTarget for Frame<W, H> {
    type Color = Rgb888;
    type Error = std::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(coord.x), usize::try_from(coord.y)) else {
                continue;
            };
            if x < W && y < H {
                self.0[y][x] = color;
            }
        }
        Ok(())
    }
}
