use std::ops::Range;

use crate::{
    colour::{Rgb, Rgba},
    surface::{Point, Rect, Surface, TextAlign},
};

const BLANK: char = ' ';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Cell {
    const fn blank(bg: Rgb) -> Self {
        Self {
            glyph: BLANK,
            fg: Rgb::WHITE,
            bg,
        }
    }
}

/// Rasterises [`Surface`] calls onto a grid of character cells.
///
/// The logical `width x height` space is stretched over the grid; a cell is
/// painted when its centre falls inside the shape being drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    columns: usize,
    rows: usize,
    width: f32,
    height: f32,
    background: Rgb,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(columns: usize, rows: usize, width: f32, height: f32, background: Rgb) -> Self {
        Self {
            columns,
            rows,
            width,
            height,
            background,
            cells: vec![Cell::blank(background); columns * rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<&Cell> {
        (column < self.columns && row < self.rows).then(|| &self.cells[row * self.columns + column])
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        let start = row * self.columns;
        &self.cells[start..start + self.columns]
    }

    pub fn row_iter(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.columns.max(1))
    }

    /// The glyphs of one row, mostly useful for assertions.
    pub fn row_text(&self, row: usize) -> String {
        self.row(row).iter().map(|cell| cell.glyph).collect()
    }

    fn cell_width(&self) -> f32 {
        self.width / self.columns as f32
    }

    fn cell_height(&self) -> f32 {
        self.height / self.rows as f32
    }

    fn centre(&self, column: usize, row: usize) -> Point {
        Point::new(
            (column as f32 + 0.5) * self.cell_width(),
            (row as f32 + 0.5) * self.cell_height(),
        )
    }

    fn cell_mut(&mut self, column: usize, row: usize) -> &mut Cell {
        &mut self.cells[row * self.columns + column]
    }

    fn covered(&self, rect: Rect) -> (Range<usize>, Range<usize>) {
        (
            span(rect.x, rect.right(), self.cell_width(), self.columns),
            span(rect.y, rect.bottom(), self.cell_height(), self.rows),
        )
    }

    fn paint(&mut self, column: usize, row: usize, paint: Rgba) {
        let cell = self.cell_mut(column, row);
        cell.bg = cell.bg.blend(paint.colour, paint.alpha);

        if paint.alpha >= 0.5 {
            cell.glyph = BLANK;
        }
    }

    fn stroke_glyph(columns: &Range<usize>, rows: &Range<usize>, column: usize, row: usize) -> Option<char> {
        let left = column == columns.start;
        let right = column + 1 == columns.end;
        let top = row == rows.start;
        let bottom = row + 1 == rows.end;

        match (left, right, top, bottom) {
            (true, false, true, false) => Some('┌'),
            (false, true, true, false) => Some('┐'),
            (true, false, false, true) => Some('└'),
            (false, true, false, true) => Some('┘'),
            (_, _, true, _) | (_, _, _, true) => Some('─'),
            (true, _, _, _) | (_, true, _, _) => Some('│'),
            _ => None,
        }
    }
}

fn span(start: f32, end: f32, unit: f32, count: usize) -> Range<usize> {
    let first = (start / unit - 0.5).ceil().max(0.0);
    let last = (end / unit - 0.5).ceil().min(count as f32);

    if first < last {
        first as usize..last as usize
    } else {
        0..0
    }
}

impl Surface for FrameBuffer {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::blank(self.background));
    }

    fn fill_rect(&mut self, rect: Rect, paint: impl Into<Rgba>) {
        let paint = paint.into();
        let (columns, rows) = self.covered(rect);

        for row in rows {
            for column in columns.clone() {
                self.paint(column, row, paint);
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, paint: impl Into<Rgba>) {
        let paint = paint.into();
        let (columns, rows) = self.covered(rect);

        for row in rows.clone() {
            for column in columns.clone() {
                if let Some(glyph) = Self::stroke_glyph(&columns, &rows, column, row) {
                    let cell = self.cell_mut(column, row);
                    cell.glyph = glyph;
                    cell.fg = cell.bg.blend(paint.colour, paint.alpha);
                }
            }
        }
    }

    fn fill_circle(&mut self, centre: Point, radius: f32, paint: impl Into<Rgba>) {
        let paint = paint.into();
        let bounds = Rect::centred(centre, radius * 2.0, radius * 2.0);
        let (columns, rows) = self.covered(bounds);

        for row in rows {
            for column in columns.clone() {
                let offset = self.centre(column, row) - centre;

                if offset.x * offset.x + offset.y * offset.y <= radius * radius {
                    self.paint(column, row, paint);
                }
            }
        }
    }

    fn fill_text(&mut self, anchor: Point, text: &str, paint: impl Into<Rgba>, align: TextAlign) {
        let paint = paint.into();

        if paint.alpha <= 0.0 || anchor.y < 0.0 || anchor.x.is_nan() {
            return;
        }

        let row = (anchor.y / self.cell_height()) as usize;

        if row >= self.rows {
            return;
        }

        let glyph_count = text.chars().count() as isize;
        let column = (anchor.x / self.cell_width()).floor() as isize;
        let first = match align {
            TextAlign::Left => column,
            TextAlign::Centre => column - glyph_count / 2,
        };

        for (i, glyph) in text.chars().enumerate() {
            let Ok(column) = usize::try_from(first + i as isize) else {
                continue;
            };

            if column >= self.columns {
                break;
            }

            let cell = self.cell_mut(column, row);
            cell.glyph = glyph;
            cell.fg = cell.bg.blend(paint.colour, paint.alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREY: Rgb = Rgb::new(0x44, 0x44, 0x44);

    fn canvas() -> FrameBuffer {
        // One logical unit per cell keeps the arithmetic readable.
        FrameBuffer::new(8, 4, 8.0, 4.0, Rgb::BLACK)
    }

    #[test]
    fn fill_rect_covers_cells_by_centre() {
        let mut fb = canvas();
        fb.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), GREY);

        for row in 0..4 {
            for column in 0..8 {
                let inside = (1..3).contains(&column) && (1..3).contains(&row);
                let expected = if inside { GREY } else { Rgb::BLACK };
                assert_eq!(fb.cell(column, row).unwrap().bg, expected, "({column}, {row})");
            }
        }
    }

    #[test]
    fn rect_missing_every_centre_paints_nothing() {
        let mut fb = canvas();
        fb.fill_rect(Rect::new(1.6, 0.0, 0.5, 4.0), GREY);

        assert!(fb.row_iter().flatten().all(|cell| cell.bg == Rgb::BLACK));
    }

    #[test]
    fn clipped_rect_stays_in_bounds() {
        let mut fb = canvas();
        fb.fill_rect(Rect::new(-10.0, -10.0, 100.0, 100.0), GREY);

        assert!(fb.row_iter().flatten().all(|cell| cell.bg == GREY));
    }

    #[test]
    fn translucent_fill_blends_and_keeps_glyphs() {
        let mut fb = canvas();
        fb.fill_text(Point::new(0.0, 0.0), "ab", Rgb::WHITE, TextAlign::Left);
        fb.fill_rect(Rect::new(0.0, 0.0, 8.0, 1.0), Rgb::WHITE.with_alpha(0.1));

        assert_eq!(fb.row_text(0), "ab      ");
        assert_eq!(fb.cell(0, 0).unwrap().bg, Rgb::new(26, 26, 26));

        fb.fill_rect(Rect::new(0.0, 0.0, 8.0, 1.0), Rgb::BLACK.with_alpha(0.85));
        assert_eq!(fb.row_text(0), "        ");
    }

    #[test]
    fn centred_text_is_clipped_at_edges() {
        let mut fb = canvas();
        fb.fill_text(Point::new(4.5, 2.5), "2048", Rgb::WHITE, TextAlign::Centre);
        assert_eq!(fb.row_text(2), "  2048  ");

        fb.fill_text(Point::new(0.5, 1.5), "Score", Rgb::WHITE, TextAlign::Centre);
        assert_eq!(fb.row_text(1), "ore     ");
    }

    #[test]
    fn stroke_rect_draws_a_box() {
        let mut fb = canvas();
        fb.stroke_rect(Rect::new(0.0, 0.0, 4.0, 3.0), Rgb::WHITE);

        assert_eq!(fb.row_text(0), "┌──┐    ");
        assert_eq!(fb.row_text(1), "│  │    ");
        assert_eq!(fb.row_text(2), "└──┘    ");
    }

    #[test]
    fn circle_covers_nearby_centres() {
        let mut fb = canvas();
        fb.fill_circle(Point::new(4.0, 2.0), 1.0, GREY);

        let painted: Vec<_> = (0..4)
            .flat_map(|row| (0..8).map(move |column| (column, row)))
            .filter(|&(column, row)| fb.cell(column, row).unwrap().bg == GREY)
            .collect();

        assert_eq!(painted, [(3, 1), (4, 1), (3, 2), (4, 2)]);
    }

    #[test]
    fn clear_resets_to_background() {
        let mut fb = canvas();
        fb.fill_rect(Rect::new(0.0, 0.0, 8.0, 4.0), GREY);
        fb.clear();

        assert!(fb.row_iter().flatten().all(|cell| *cell == Cell::blank(Rgb::BLACK)));
    }
}
