use std::sync::Arc;

use crate::drawer::buffer::RgbaBuffer;
use crate::drawer::font::{CharMap, GLYPH_COLUMNS, GLYPH_ROWS};
use crate::drawer::model::{Color, PixelRect};
use crate::drawer::Canvas;

pub const COLUMNS: usize = 80;
pub const ROWS: usize = 24;
pub const CELL_WIDTH: i32 = 11;
pub const CELL_HEIGHT: i32 = 15;
const DOT: i32 = 2;

/// Canvas size that fits the whole character grid.
pub const fn canvas_size() -> (u32, u32) {
    (
        COLUMNS as u32 * CELL_WIDTH as u32,
        ROWS as u32 * CELL_HEIGHT as u32,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConChar {
    pub code: char,
    pub fore: Color,
    pub back: Color,
}

type Grid = Vec<[Option<ConChar>; COLUMNS]>;

/// 80x24 text console drawn onto a canvas back-buffer.
///
/// Writes go to a working grid; `render` repaints only the cells that differ
/// from what was last drawn.
#[derive(Debug)]
pub struct ConsoleManager {
    canvas: Arc<Canvas>,
    working: Grid,
    presented: Grid,
    pos_x: usize,
    pos_y: usize,
    pub fore: Color,
    pub back: Color,
}

impl ConsoleManager {
    pub fn new(canvas: Arc<Canvas>) -> Self {
        Self {
            canvas,
            working: vec![[None; COLUMNS]; ROWS],
            presented: vec![[None; COLUMNS]; ROWS],
            pos_x: 0,
            pos_y: 0,
            fore: Color::WHITE,
            back: Color::BLACK,
        }
    }

    pub fn position(&self) -> (usize, usize) {
        (self.pos_x, self.pos_y)
    }

    pub fn set_pos(&mut self, x: usize, y: usize) {
        self.pos_x = x.min(COLUMNS - 1);
        self.pos_y = y.min(ROWS - 1);
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<ConChar> {
        self.working.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    /// Places `c` at `(x, y)` and redraws. Ignores cells off the grid and
    /// non-ASCII characters.
    pub fn write_char(&mut self, x: usize, y: usize, c: char) -> bool {
        if x >= COLUMNS || y >= ROWS || !c.is_ascii() {
            return false;
        }
        self.working[y][x] = Some(self.styled(c));
        self.render();
        true
    }

    /// Writes `text` at the cursor, wrapping at the right edge and the bottom,
    /// then moves to the start of the next line.
    pub fn write_line(&mut self, text: &str) {
        for c in text.chars() {
            self.working[self.pos_y][self.pos_x] = Some(self.styled(c));
            self.advance();
        }
        self.carriage_return();
        self.render();
    }

    /// Draws changed cells in one back-buffer lock and returns how many.
    pub fn render(&mut self) -> usize {
        let mut changed = Vec::new();
        for (y, (working, presented)) in self.working.iter().zip(self.presented.iter_mut()).enumerate()
        {
            for (x, (cell, shown)) in working.iter().zip(presented.iter_mut()).enumerate() {
                if *cell != *shown {
                    *shown = *cell;
                    if let Some(cell) = cell {
                        changed.push((x, y, *cell));
                    }
                }
            }
        }
        if changed.is_empty() {
            return 0;
        }
        let charmap = CharMap::embedded();
        self.canvas.with_pixels(|pixels| {
            for (x, y, cell) in &changed {
                draw_cell(pixels, charmap, *x, *y, *cell);
            }
        });
        changed.len()
    }

    fn styled(&self, code: char) -> ConChar {
        ConChar {
            code,
            fore: self.fore,
            back: self.back,
        }
    }

    fn advance(&mut self) {
        self.pos_x += 1;
        if self.pos_x >= COLUMNS {
            self.carriage_return();
        }
    }

    fn carriage_return(&mut self) {
        self.pos_x = 0;
        self.pos_y = (self.pos_y + 1) % ROWS;
    }
}

fn draw_cell(pixels: &mut RgbaBuffer, charmap: &CharMap, x: usize, y: usize, cell: ConChar) {
    let glyph = charmap.glyph_or_fallback(cell.code);
    let origin_x = x as i32 * CELL_WIDTH;
    let origin_y = y as i32 * CELL_HEIGHT;
    for row in 0..GLYPH_ROWS {
        for column in 0..GLYPH_COLUMNS {
            let color = if glyph.is_lit(column, row) {
                cell.fore
            } else {
                cell.back
            };
            let dot = PixelRect::new(
                origin_x + column as i32 * DOT,
                origin_y + row as i32 * DOT,
                DOT,
                DOT,
            );
            let _ = pixels.fill_rect(dot, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> ConsoleManager {
        let (width, height) = canvas_size();
        ConsoleManager::new(Arc::new(Canvas::new(width, height).unwrap()))
    }

    #[test]
    fn grid_fits_the_canvas_exactly() {
        assert_eq!(canvas_size(), (880, 360));
    }

    #[test]
    fn write_char_draws_glyph_dots() {
        let mut con = console();
        con.fore = Color::RED;
        assert!(con.write_char(1, 1, 'A'));
        // Row 0 of 'A' is ".***." so dot column 1 is lit and column 0 is not.
        assert_eq!(con.canvas.pixel(11 + 2, 15), Some(Color::RED));
        assert_eq!(con.canvas.pixel(11 + 3, 16), Some(Color::RED));
        assert_eq!(con.canvas.pixel(11, 15), Some(Color::BLACK));
    }

    #[test]
    fn write_char_rejects_cells_off_the_grid() {
        let mut con = console();
        assert!(!con.write_char(80, 0, 'x'));
        assert!(!con.write_char(0, 24, 'x'));
        assert!(!con.write_char(0, 0, 'é'));
    }

    #[test]
    fn render_only_repaints_changed_cells() {
        let mut con = console();
        con.write_line("abc");
        assert_eq!(con.render(), 0);
        con.write_char(0, 0, 'a');
        assert_eq!(con.render(), 0);
        con.fore = Color::BLUE;
        con.working[0][0] = Some(con.styled('a'));
        assert_eq!(con.render(), 1);
    }

    #[test]
    fn write_line_wraps_and_returns_carriage() {
        let mut con = console();
        con.set_pos(78, 23);
        con.write_line("xyz");
        assert_eq!(con.cell(78, 23).map(|c| c.code), Some('x'));
        assert_eq!(con.cell(0, 0).map(|c| c.code), Some('z'));
        assert_eq!(con.position(), (0, 1));
    }
}
