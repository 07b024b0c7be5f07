//! The playfield grid.
//!
//! Cells are stored row-major in a flat vector and hold a color id: `0` is
//! empty, `1..=7` is a locked piece. Rows grow downwards, row 0 is the top.
//!
//! # Collision policy
//!
//! Collision checks are deliberately asymmetric. A piece cell collides when it
//! is left or right of the board, below the bottom row, or on an occupied
//! cell. A piece cell *above* row 0 never collides, which lets a piece sit
//! partly above the visible field.

use crate::piece::Shape;

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 20;
pub const MAX_COLOR_ID: u8 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<u8>,
    width: usize,
    height: usize,
}

impl Default for Board {
    fn default() -> Self {
        Board::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Board {
            cells: vec![0; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Returns the cell at `(x, y)`, or `None` outside the board.
    pub fn get(&self, x: isize, y: isize) -> Option<u8> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Writes a color id. Returns false for out-of-range coordinates or colors.
    pub fn set(&mut self, x: isize, y: isize, color: u8) -> bool {
        if color > MAX_COLOR_ID {
            return false;
        }
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = color;
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.cells.chunks(self.width)
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }

    pub fn collides(&self, shape: &Shape, x: isize, y: isize) -> bool {
        shape.blocks().any(|(dx, dy, _)| {
            let (bx, by) = (x + dx, y + dy);
            if bx < 0 || bx >= self.width as isize || by >= self.height as isize {
                return true;
            }
            by >= 0 && self.cells[by as usize * self.width + bx as usize] != 0
        })
    }

    /// Locks a shape into the grid. Cells above the top row are dropped.
    pub fn merge(&mut self, shape: &Shape, x: isize, y: isize) {
        for (dx, dy, color) in shape.blocks() {
            if let Some(i) = self.index(x + dx, y + dy) {
                self.cells[i] = color;
            }
        }
    }

    /// Removes every full row and returns how many were removed. Surviving
    /// rows keep their order and settle at the bottom; the freed rows come
    /// back empty at the top.
    pub fn sweep_completed_rows(&mut self) -> usize {
        let mut rebuilt = vec![0; self.width * self.height];
        let mut cleared = 0;
        let mut dest = self.height;

        for y in (0..self.height).rev() {
            let start = y * self.width;
            let row = &self.cells[start..start + self.width];
            if row.iter().all(|&cell| cell != 0) {
                cleared += 1;
            } else {
                dest -= 1;
                let dest_start = dest * self.width;
                rebuilt[dest_start..dest_start + self.width].copy_from_slice(row);
            }
        }

        self.cells = rebuilt;
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{PieceKind, Shape};

    fn fill_row(board: &mut Board, y: isize, except: Option<isize>) {
        for x in 0..board.width() as isize {
            if Some(x) != except {
                board.set(x, y, 1);
            }
        }
    }

    #[test]
    fn merged_piece_collides_with_itself() {
        let mut board = Board::default();
        for kind in PieceKind::ALL {
            let shape = Shape::new(kind);
            board.clear();
            assert!(!board.collides(&shape, 3, 5));
            board.merge(&shape, 3, 5);
            assert!(board.collides(&shape, 3, 5));
        }
    }

    #[test]
    fn walls_and_floor_collide_but_ceiling_does_not() {
        let board = Board::default();
        let o = Shape::new(PieceKind::O);
        assert!(board.collides(&o, -1, 0));
        assert!(board.collides(&o, 9, 0));
        assert!(board.collides(&o, 4, 19));
        assert!(!board.collides(&o, 4, -1));
        assert!(!board.collides(&o, 4, -10));
        assert!(!board.collides(&o, 8, 18));
    }

    #[test]
    fn merge_skips_cells_above_the_top() {
        let mut board = Board::default();
        board.merge(&Shape::new(PieceKind::O), 0, -1);
        assert_eq!(board.get(0, 0), Some(4));
        assert_eq!(board.get(1, 0), Some(4));
        assert_eq!(board.rows().flatten().filter(|&&c| c != 0).count(), 2);
    }

    #[test]
    fn set_rejects_invalid_colors_and_positions() {
        let mut board = Board::default();
        assert!(!board.set(0, 0, 8));
        assert!(!board.set(10, 0, 1));
        assert!(!board.set(0, -1, 1));
        assert!(board.set(9, 19, 7));
        assert_eq!(board.get(9, 19), Some(7));
        assert_eq!(board.get(-1, 0), None);
    }

    #[test]
    fn sweep_single_full_row() {
        let mut board = Board::default();
        fill_row(&mut board, 19, None);
        board.set(2, 18, 3);
        board.set(5, 17, 6);

        assert_eq!(board.sweep_completed_rows(), 1);
        assert_eq!(board.height(), 20);
        assert!(board.rows().next().unwrap().iter().all(|&c| c == 0));
        assert_eq!(board.get(2, 19), Some(3));
        assert_eq!(board.get(5, 18), Some(6));
        assert_eq!(board.rows().flatten().filter(|&&c| c != 0).count(), 2);
    }

    #[test]
    fn sweep_non_adjacent_rows_keeps_order() {
        let mut board = Board::default();
        fill_row(&mut board, 19, None);
        fill_row(&mut board, 17, None);
        board.set(0, 18, 2);
        board.set(0, 16, 5);
        board.set(0, 15, 7);

        assert_eq!(board.sweep_completed_rows(), 2);
        assert_eq!(board.get(0, 19), Some(2));
        assert_eq!(board.get(0, 18), Some(5));
        assert_eq!(board.get(0, 17), Some(7));
        assert_eq!(board.get(0, 16), Some(0));
    }

    #[test]
    fn sweep_ignores_partial_rows() {
        let mut board = Board::default();
        fill_row(&mut board, 19, Some(5));
        let before = board.clone();
        assert_eq!(board.sweep_completed_rows(), 0);
        assert_eq!(board, before);
    }
}
