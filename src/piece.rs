use rand::{rngs::StdRng, Rng, SeedableRng};

/// A shape or board matrix: rows of color ids, 0 meaning empty.
pub type Matrix = Vec<Vec<u8>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

struct Template {
    size: usize,
    cells: &'static [u8],
    color: Color,
}

// Indexed by color id - 1.
static TEMPLATES: [Template; 7] = [
    // I-Block
    Template { size: 4, cells: &[0,0,0,0, 1,1,1,1, 0,0,0,0, 0,0,0,0], color: Color(255, 13, 114) },
    // J-Block
    Template { size: 3, cells: &[2,0,0, 2,2,2, 0,0,0], color: Color(13, 194, 255) },
    // L-Block
    Template { size: 3, cells: &[0,0,3, 3,3,3, 0,0,0], color: Color(13, 255, 114) },
    // O-Block
    Template { size: 2, cells: &[4,4, 4,4], color: Color(245, 56, 255) },
    // S-Block
    Template { size: 3, cells: &[0,5,5, 5,5,0, 0,0,0], color: Color(255, 142, 13) },
    // T-Block
    Template { size: 3, cells: &[0,6,0, 6,6,6, 0,0,0], color: Color(255, 225, 56) },
    // Z-Block
    Template { size: 3, cells: &[7,7,0, 0,7,7, 0,0,0], color: Color(56, 119, 255) },
];

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// The color id this kind writes into the board, in `1..=7`.
    pub fn color_id(self) -> u8 {
        self as u8 + 1
    }

    pub fn color(self) -> Color {
        TEMPLATES[self as usize].color
    }

    pub fn from_color_id(id: u8) -> Option<PieceKind> {
        match id {
            1..=7 => Some(Self::ALL[id as usize - 1]),
            _ => None,
        }
    }

    pub fn random<R: Rng>(rng: &mut R) -> PieceKind {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Palette lookup for a board or shape cell. Empty cells have no color.
pub fn color_of(cell: u8) -> Option<Color> {
    PieceKind::from_color_id(cell).map(PieceKind::color)
}

/// Quarter turn of a square matrix: transpose, then reverse the row order.
/// The input is left untouched.
pub fn rotate_clockwise(matrix: &[Vec<u8>]) -> Matrix {
    let n = matrix.len();
    let mut out: Matrix = (0..n)
        .map(|y| (0..n).map(|x| matrix[x][y]).collect())
        .collect();
    out.reverse();
    out
}

/// A piece's current orientation. Rotating never changes its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    kind: PieceKind,
    cells: Matrix,
}

impl Shape {
    pub fn new(kind: PieceKind) -> Self {
        let t = &TEMPLATES[kind as usize];
        let cells = t.cells.chunks(t.size).map(<[u8]>::to_vec).collect();
        Shape { kind, cells }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn cells(&self) -> &[Vec<u8>] {
        &self.cells
    }

    /// Width of the first row, used for centring and the kick search bound.
    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn rotated(&self) -> Shape {
        Shape {
            kind: self.kind,
            cells: rotate_clockwise(&self.cells),
        }
    }

    /// Iterates the occupied cells as `(dx, dy, color)` offsets from the anchor.
    pub fn blocks(&self) -> impl Iterator<Item = (isize, isize, u8)> + '_ {
        self.cells.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &cell)| cell != 0)
                .map(move |(dx, &cell)| (dx as isize, dy as isize, cell))
        })
    }
}

/// Uniform random piece source that keeps one draw ahead for the preview.
pub struct PieceQueue {
    rng: StdRng,
    next: Option<PieceKind>,
}

impl PieceQueue {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        PieceQueue { rng, next: None }
    }

    pub fn peek(&self) -> Option<PieceKind> {
        self.next
    }

    /// Hands out the precomputed piece and draws its successor.
    pub fn take(&mut self) -> PieceKind {
        let current = match self.next {
            Some(kind) => kind,
            None => PieceKind::random(&mut self.rng),
        };
        self.next = Some(PieceKind::random(&mut self.rng));
        current
    }

    pub fn reset(&mut self) {
        self.next = None;
    }

    #[cfg(test)]
    pub(crate) fn set_next(&mut self, kind: PieceKind) {
        self.next = Some(kind);
    }
}
