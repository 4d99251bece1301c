use std::fmt;

use rand::prelude::*;
use rand::rngs::StdRng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::board::Color;

/// Largest matrix a placement request may carry.
pub const MAX_SHAPE_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ShapeKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::L,
        ShapeKind::J,
        ShapeKind::S,
        ShapeKind::Z,
    ];

    fn pattern(self) -> &'static [&'static str] {
        match self {
            ShapeKind::I => &["####"],
            ShapeKind::O => &["##", "##"],
            ShapeKind::T => &["###", ".#."],
            ShapeKind::L => &["#.", "#.", "##"],
            ShapeKind::J => &[".#", ".#", "##"],
            ShapeKind::S => &[".##", "##."],
            ShapeKind::Z => &["##.", ".##"],
        }
    }

    /// The canonical, unrotated prototype.
    pub fn shape(self) -> Shape {
        Shape::from_rows(self.pattern()).expect("shape prototypes are well formed")
    }
}

/// Rectangular occupancy matrix, `cells[row][column]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    cells: Vec<Vec<bool>>,
}

impl Shape {
    /// Builds a shape from rows of `#` (occupied) and `.` (empty).
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let cells = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| match c {
                        '#' => Some(true),
                        '.' => Some(false),
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()
            })
            .collect::<Option<Vec<_>>>()?;
        Self::from_cells(cells)
    }

    /// Builds a shape from a wire matrix of `0`/`1` values.
    pub fn from_matrix(matrix: &[Vec<u8>]) -> Option<Self> {
        let cells = matrix
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| match v {
                        0 => Some(false),
                        1 => Some(true),
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()
            })
            .collect::<Option<Vec<_>>>()?;
        Self::from_cells(cells)
    }

    fn from_cells(cells: Vec<Vec<bool>>) -> Option<Self> {
        let width = cells.first()?.len();
        let well_formed = width > 0
            && width <= MAX_SHAPE_SIZE
            && cells.len() <= MAX_SHAPE_SIZE
            && cells.iter().all(|row| row.len() == width)
            && cells.iter().flatten().any(|occupied| *occupied);
        well_formed.then_some(Self { cells })
    }

    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|occupied| u8::from(*occupied)).collect())
            .collect()
    }

    pub fn width(&self) -> usize {
        self.cells[0].len()
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    /// Occupied `(dx, dy)` offsets from the top-left origin.
    pub fn offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, occupied)| **occupied)
                .map(move |(dx, _)| (dx, dy))
        })
    }

    /// Rotates clockwise by `quarter_turns`, taken modulo 4. Negative counts
    /// rotate counter-clockwise.
    pub fn rotate(&self, quarter_turns: i32) -> Shape {
        let mut shape = self.clone();
        for _ in 0..quarter_turns.rem_euclid(4) {
            shape = shape.rotate_once();
        }
        shape
    }

    // transpose, then reverse each row
    fn rotate_once(&self) -> Shape {
        let (width, height) = (self.width(), self.height());
        let cells = (0..width)
            .map(|column| {
                (0..height)
                    .rev()
                    .map(|row| self.cells[row][column])
                    .collect()
            })
            .collect();
        Shape { cells }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct PieceId(String);

impl PieceId {
    fn fresh() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A colored instance of a prototype. Always stored unrotated; the placer
/// chooses the rotation when placing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub kind: ShapeKind,
    pub shape: Shape,
    pub color: Color,
}

/// Random piece generator. Holds only its random source.
pub struct PieceSupply {
    rng: StdRng,
}

impl Default for PieceSupply {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl PieceSupply {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn random_piece(&mut self) -> Piece {
        let kind = *ShapeKind::ALL
            .choose(&mut self.rng)
            .expect("shape table is not empty");
        let color = *Color::PALETTE
            .choose(&mut self.rng)
            .expect("palette is not empty");

        Piece {
            id: PieceId::fresh(),
            kind,
            shape: kind.shape(),
            color,
        }
    }
}
