use log::trace;

use crate::board::Board;
use crate::piece::{PieceKind, PieceQueue, Shape};

/// The falling piece: its current orientation and grid anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    pub shape: Shape,
    pub x: isize,
    pub y: isize,
}

impl ActivePiece {
    /// Places a fresh piece horizontally centred on the top row.
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let shape = Shape::new(kind);
        let x = (board_width / 2) as isize - (shape.width() / 2) as isize;
        ActivePiece { shape, x, y: 0 }
    }

    pub fn collides(&self, board: &Board) -> bool {
        board.collides(&self.shape, self.x, self.y)
    }

    /// Absolute board coordinates of the occupied cells.
    pub fn blocks(&self) -> impl Iterator<Item = (isize, isize, u8)> + '_ {
        self.shape
            .blocks()
            .map(move |(dx, dy, color)| (self.x + dx, self.y + dy, color))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The piece moved down one row.
    Moved,
    /// The piece locked. `topped_out` is set when its replacement could not
    /// be placed.
    Locked { cleared: usize, topped_out: bool },
    /// Nothing to drop.
    Idle,
}

/// Owns the active piece and the queue it is fed from.
pub struct Player {
    active: Option<ActivePiece>,
    queue: PieceQueue,
}

impl Player {
    pub fn new(seed: Option<u64>) -> Self {
        Player {
            active: None,
            queue: PieceQueue::new(seed),
        }
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn next(&self) -> Option<PieceKind> {
        self.queue.peek()
    }

    /// Forgets the active and preview pieces so the next spawn draws afresh.
    pub fn reset(&mut self) {
        self.active = None;
        self.queue.reset();
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Promotes the preview piece. Returns false when the new piece overlaps
    /// the stack, which ends the game; the piece is left in place for display.
    pub fn spawn(&mut self, board: &Board) -> bool {
        let kind = self.queue.take();
        let piece = ActivePiece::spawn(kind, board.width());
        let fits = !piece.collides(board);
        trace!("spawned {kind:?} at x={} fits={fits}", piece.x);
        self.active = Some(piece);
        fits
    }

    pub fn move_by(&mut self, board: &Board, direction: isize) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        piece.x += direction;
        if piece.collides(board) {
            piece.x -= direction;
            return false;
        }
        true
    }

    /// Rotates with a horizontal kick search. Offsets accumulate onto x as
    /// +1, -2, +3, -4, ... and the search gives up, restoring the original
    /// orientation, as soon as the next offset is larger than the rotated
    /// shape's width. The position just shifted to is not tested then.
    pub fn rotate(&mut self, board: &Board) -> bool {
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let original = piece.clone();
        piece.shape = original.shape.rotated();
        let limit = piece.shape.width() as isize;

        let mut offset: isize = 1;
        while piece.collides(board) {
            piece.x += offset;
            offset = -(offset + offset.signum());
            if offset > limit {
                trace!("rotation of {:?} blocked", original.shape.kind());
                *piece = original;
                return false;
            }
        }
        true
    }

    /// Moves the piece down one row, locking it when it cannot move.
    pub fn soft_drop(&mut self, board: &mut Board) -> DropOutcome {
        let Some(piece) = self.active.as_mut() else {
            return DropOutcome::Idle;
        };
        piece.y += 1;
        if !piece.collides(board) {
            return DropOutcome::Moved;
        }
        piece.y -= 1;
        board.merge(&piece.shape, piece.x, piece.y);
        let cleared = board.sweep_completed_rows();
        let topped_out = !self.spawn(board);
        DropOutcome::Locked { cleared, topped_out }
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, kind: PieceKind, x: isize, y: isize) {
        let mut piece = ActivePiece::spawn(kind, 0);
        piece.x = x;
        piece.y = y;
        self.active = Some(piece);
    }

    #[cfg(test)]
    pub(crate) fn set_next(&mut self, kind: PieceKind) {
        self.queue.set_next(kind);
    }
}
