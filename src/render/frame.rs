use crate::code::grid::{CodeGrid, GRID_SIZE};

pub const DEFAULT_CANVAS_SIZE: u32 = 400;

const GRID_LINE: [u8; 4] = [0xcc, 0xcc, 0xcc, 0xff];

/// The three tones a cell can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shade {
    Black,
    Gray,
    White,
}

impl Shade {
    pub fn for_value(value: f64) -> Self {
        if value > 0.5 {
            Shade::Black
        } else if value > 0.2 {
            Shade::Gray
        } else {
            Shade::White
        }
    }

    pub fn rgba(self) -> [u8; 4] {
        match self {
            Shade::Black => [0x00, 0x00, 0x00, 0xff],
            Shade::Gray => [0x66, 0x66, 0x66, 0xff],
            Shade::White => [0xff, 0xff, 0xff, 0xff],
        }
    }

    /// Terminal preview glyph.
    pub fn glyph(self) -> char {
        match self {
            Shade::Black => '█',
            Shade::Gray => '▒',
            Shade::White => ' ',
        }
    }
}

pub type ShadeMap = [[Shade; GRID_SIZE]; GRID_SIZE];

/// Threshold every cell of the grid.
pub fn shade_map(code: &CodeGrid) -> ShadeMap {
    let mut shades = [[Shade::White; GRID_SIZE]; GRID_SIZE];
    for (i, row) in shades.iter_mut().enumerate() {
        for (j, shade) in row.iter_mut().enumerate() {
            *shade = Shade::for_value(code.cell(i, j));
        }
    }
    shades
}

/// Rasterizes a code onto a square RGBA canvas.
pub struct CodeRenderer {
    pub size: u32,
    pub grid_lines: bool,
}

impl CodeRenderer {
    pub fn new(size: u32, grid_lines: bool) -> Self {
        assert!(size >= GRID_SIZE as u32, "canvas must fit one pixel per cell");
        Self { size, grid_lines }
    }

    pub fn cell_size(&self) -> f64 {
        self.size as f64 / GRID_SIZE as f64
    }

    /// Row-major RGBA pixels, `size * size * 4` bytes.
    pub fn render(&self, code: &CodeGrid) -> Vec<u8> {
        let shades = shade_map(code);
        let cell = self.cell_size();
        let size = self.size as usize;
        let mut pixels = Vec::with_capacity(size * size * 4);

        for y in 0..size {
            let row = ((y as f64 / cell) as usize).min(GRID_SIZE - 1);
            for x in 0..size {
                let col = ((x as f64 / cell) as usize).min(GRID_SIZE - 1);
                let color = if self.grid_lines && self.on_cell_edge(x, y, cell) {
                    GRID_LINE
                } else {
                    shades[row][col].rgba()
                };
                pixels.extend_from_slice(&color);
            }
        }

        pixels
    }

    fn on_cell_edge(&self, x: usize, y: usize, cell: f64) -> bool {
        let starts_cell = |p: usize| {
            let idx = (p as f64 / cell) as usize;
            p == (idx as f64 * cell).ceil() as usize
        };
        starts_cell(x) || starts_cell(y)
    }
}
