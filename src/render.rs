//! ASCII rendering of a packed roll for the CLI `--layout` flag.
//!
//! The roll runs left to right (length axis); pieces stack top to
//! bottom across the roll width. Marker boundaries at 5900 mm multiples
//! are drawn as `:` columns.

use crate::types::{Layout, MARKER_LENGTH_MM, Piece};

const MAX_COLS: f64 = 120.0;
const MAX_ROWS: f64 = 32.0;

pub fn render_roll(layout: &Layout, pieces: &[Piece]) -> String {
    if layout.used_length_mm == 0 || layout.roll_width_mm == 0 {
        return String::new();
    }

    let scale = f64::min(
        MAX_COLS / layout.used_length_mm as f64,
        MAX_ROWS / layout.roll_width_mm as f64,
    );
    let cols = (layout.used_length_mm as f64 * scale).round() as usize;
    let rows = (layout.roll_width_mm as f64 * scale).round() as usize;
    if cols == 0 || rows == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; cols + 1]; rows + 1];
    draw_box(&mut grid, 0, 0, cols, rows);

    for shelf in &layout.shelves {
        let mut y_mm = 0u64;
        for &idx in &shelf.pieces {
            let piece = pieces[idx];
            let x0 = (shelf.start_mm as f64 * scale).round() as usize;
            let y0 = (y_mm as f64 * scale).round() as usize;
            let w = (piece.drop_mm as f64 * scale).round() as usize;
            let h = (piece.width_mm as f64 * scale).round() as usize;
            y_mm += piece.width_mm as u64;
            if w == 0 || h == 0 {
                continue;
            }
            draw_box(&mut grid, x0, y0, w, h);
            label(&mut grid, x0, y0, w, h, &format!("{}x{}", piece.width_mm, piece.drop_mm));
        }
    }

    // Marker boundary columns, drawn into whatever space the shelf
    // boxes left free.
    let mut boundary = MARKER_LENGTH_MM;
    while boundary < layout.used_length_mm {
        let col = (boundary as f64 * scale).round() as usize;
        for row in grid.iter_mut() {
            if col < row.len() && row[col] == ' ' {
                row[col] = ':';
            }
        }
        boundary += MARKER_LENGTH_MM;
    }

    let mut out = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn put(grid: &mut [Vec<char>], x: usize, y: usize, ch: char) {
    if let Some(row) = grid.get_mut(y)
        && let Some(cell) = row.get_mut(x)
    {
        *cell = match (*cell, ch) {
            ('|', '-') | ('-', '|') | ('+', _) | (_, '+') => '+',
            _ => ch,
        };
    }
}

fn draw_box(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    for i in x..=x + w {
        put(grid, i, y, '-');
        put(grid, i, y + h, '-');
    }
    for j in y..=y + h {
        put(grid, x, j, '|');
        put(grid, x + w, j, '|');
    }
    for &(cx, cy) in &[(x, y), (x + w, y), (x, y + h), (x + w, y + h)] {
        put(grid, cx, cy, '+');
    }
}

fn label(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize, text: &str) {
    let chars: Vec<char> = text.chars().collect();
    if w <= chars.len() + 1 || h < 2 {
        return;
    }
    let cy = y + h / 2;
    let start = x + (w - chars.len()) / 2;
    for (i, &ch) in chars.iter().enumerate() {
        let cx = start + i;
        if cx > x && cx < x + w && cy > y && cy < y + h {
            grid[cy][cx] = ch;
        }
    }
}
