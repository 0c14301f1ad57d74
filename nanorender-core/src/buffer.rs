/// Color and depth grids the rasterizer writes into
use serde::{Deserialize, Serialize};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Opaque gray with all three channels set to `level`
    pub const fn gray(level: u8) -> Self {
        Self([level, level, level, 255])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }

    pub fn a(&self) -> u8 {
        self.0[3]
    }

    /// Perceived brightness in `[0, 1]` (Rec. 601 weights)
    pub fn luminance(&self) -> f32 {
        (0.299 * self.r() as f32 + 0.587 * self.g() as f32 + 0.114 * self.b() as f32) / 255.0
    }
}

/// Row-major `width × height` grid; row 0 is the bottom row
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

pub type ColorBuffer = Grid<Rgba>;
pub type DepthBuffer = Grid<f32>;

impl<T: Copy> Grid<T> {
    pub fn new(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y).then(|| y as usize * self.width + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<T> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Write one cell; returns `false` when `(x, y)` is outside the grid
    pub fn set(&mut self, x: i32, y: i32, value: T) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// Cells of row `y`, bottom row first
    pub fn row(&self, y: usize) -> &[T] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    // Contiguous cells of rows `first..=last`.
    fn rows_mut(&mut self, first: usize, last: usize) -> &mut [T] {
        &mut self.cells[first * self.width..(last + 1) * self.width]
    }
}

/// The color and depth buffers of one frame
#[derive(Debug, Clone)]
pub struct FrameBuffers {
    color: ColorBuffer,
    depth: DepthBuffer,
    background: Rgba,
}

impl FrameBuffers {
    /// Depth cells start at −∞ so any drawn pixel wins
    pub fn new(width: usize, height: usize, background: Rgba) -> Self {
        Self {
            color: Grid::new(width, height, background),
            depth: Grid::new(width, height, f32::NEG_INFINITY),
            background,
        }
    }

    pub fn clear(&mut self) {
        self.color.fill(self.background);
        self.depth.fill(f32::NEG_INFINITY);
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width(), self.height()) {
            *self = Self::new(width, height, self.background);
        } else {
            self.clear();
        }
    }

    pub fn set_background(&mut self, background: Rgba) {
        self.background = background;
    }

    pub fn width(&self) -> usize {
        self.color.width()
    }

    pub fn height(&self) -> usize {
        self.color.height()
    }

    pub fn color(&self) -> &ColorBuffer {
        &self.color
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn color_mut(&mut self) -> &mut ColorBuffer {
        &mut self.color
    }

    /// Matching color and depth cells of rows `first..=last`
    pub(crate) fn rows_mut(&mut self, first: usize, last: usize) -> (&mut [Rgba], &mut [f32]) {
        (self.color.rows_mut(first, last), self.depth.rows_mut(first, last))
    }
}
