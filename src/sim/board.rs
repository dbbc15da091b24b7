//! Board graph: two node grids and the connectivity rules over them
//!
//! All queries here are pure. Resolvers consult them before changing any
//! ball's grid position.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ball::BallId;
use crate::mirror_column;

/// One printable side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    #[default]
    Front,
    Rear,
}

impl Face {
    pub fn opposite(self) -> Face {
        match self {
            Face::Front => Face::Rear,
            Face::Rear => Face::Front,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Face::Front => f.write_str("front"),
            Face::Rear => f.write_str("rear"),
        }
    }
}

/// Which balls may travel a path node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lane {
    /// Any ball (`p0`, `v0`, `h0`)
    Any,
    /// Only the ball with this id (`p1`, `v2`, ...)
    Ball(u8),
}

/// Drawing hint for path nodes; the engine treats all orientations alike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Free,
    Vertical,
    Horizontal,
}

/// An inert decorative code (teleport, switch, collectible, sticker, ...)
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decor([u8; 2]);

impl Decor {
    pub fn as_str(&self) -> &str {
        // Codes are validated as ASCII on construction
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Debug for Decor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decor({})", self.as_str())
    }
}

/// Cell type of a board grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeType {
    #[default]
    Empty,
    Path {
        lane: Lane,
        orientation: Orientation,
    },
    Well,
    Wall,
    Decor(Decor),
}

impl NodeType {
    /// Parse a 2-character level code
    pub fn from_code(code: &str) -> Option<NodeType> {
        let bytes = code.as_bytes();
        let &[kind, digit] = bytes else {
            return None;
        };
        if code == "__" {
            return Some(NodeType::Empty);
        }
        if !kind.is_ascii_alphanumeric() || !digit.is_ascii_alphanumeric() {
            return None;
        }

        let orientation = match kind {
            b'p' => Some(Orientation::Free),
            b'v' => Some(Orientation::Vertical),
            b'h' => Some(Orientation::Horizontal),
            _ => None,
        };
        if let (Some(orientation), true) = (orientation, digit.is_ascii_digit()) {
            let lane = match digit - b'0' {
                0 => Lane::Any,
                n => Lane::Ball(n),
            };
            return Some(NodeType::Path { lane, orientation });
        }

        Some(match (kind, digit) {
            (b'w', b'0') => NodeType::Well,
            (b'x', b'0') => NodeType::Wall,
            _ => NodeType::Decor(Decor([kind, digit])),
        })
    }

    /// Level code for this node
    pub fn code(self) -> String {
        match self {
            NodeType::Empty => "__".to_string(),
            NodeType::Path { lane, orientation } => {
                let kind = match orientation {
                    Orientation::Free => 'p',
                    Orientation::Vertical => 'v',
                    Orientation::Horizontal => 'h',
                };
                let lane = match lane {
                    Lane::Any => 0,
                    Lane::Ball(n) => n,
                };
                format!("{kind}{lane}")
            }
            NodeType::Well => "w0".to_string(),
            NodeType::Wall => "x0".to_string(),
            NodeType::Decor(decor) => decor.as_str().to_string(),
        }
    }

    /// Whether the given ball may rest on this node
    pub fn accessible_to(self, ball: BallId) -> bool {
        match self {
            NodeType::Well => true,
            NodeType::Path {
                lane: Lane::Any, ..
            } => true,
            NodeType::Path {
                lane: Lane::Ball(n),
                ..
            } => u32::from(n) == ball.0,
            NodeType::Empty | NodeType::Wall | NodeType::Decor(_) => false,
        }
    }
}

/// Rectangular grid stored row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    /// Build from rows; `None` if empty or ragged
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return None;
        }
        let height = rows.len();
        Some(Self {
            width: i32::try_from(width).ok()?,
            height: i32::try_from(height).ok()?,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn get(&self, pos: IVec2) -> Option<T> {
        if !self.contains(pos) {
            return None;
        }
        let index = (pos.y * self.width + pos.x) as usize;
        self.cells.get(index).copied()
    }

    /// All cell positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = IVec2> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| IVec2::new(x, y)))
    }

    /// Rows for rendering
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width.max(1) as usize)
    }
}

/// Rear face does not match the front face's dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rear face is {rear_width}x{rear_height}, front face is {front_width}x{front_height}")]
pub struct FaceMismatch {
    pub front_width: i32,
    pub front_height: i32,
    pub rear_width: i32,
    pub rear_height: i32,
}

/// Four-way neighbor offsets
const NEIGHBORS: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

/// Front grid plus optional rear grid of identical size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    front: Grid<NodeType>,
    rear: Option<Grid<NodeType>>,
}

impl Board {
    pub fn new(front: Grid<NodeType>, rear: Option<Grid<NodeType>>) -> Result<Self, FaceMismatch> {
        if let Some(rear) = &rear {
            if rear.width() != front.width() || rear.height() != front.height() {
                return Err(FaceMismatch {
                    front_width: front.width(),
                    front_height: front.height(),
                    rear_width: rear.width(),
                    rear_height: rear.height(),
                });
            }
        }
        Ok(Self { front, rear })
    }

    pub fn width(&self) -> i32 {
        self.front.width()
    }

    pub fn height(&self) -> i32 {
        self.front.height()
    }

    pub fn has_rear(&self) -> bool {
        self.rear.is_some()
    }

    /// Grid for a face; `None` for the rear of a single-face board
    pub fn grid(&self, face: Face) -> Option<&Grid<NodeType>> {
        match face {
            Face::Front => Some(&self.front),
            Face::Rear => self.rear.as_ref(),
        }
    }

    pub fn node_type(&self, face: Face, pos: IVec2) -> Option<NodeType> {
        self.grid(face)?.get(pos)
    }

    pub fn accessible_to(&self, ball: BallId, face: Face, pos: IVec2) -> bool {
        self.node_type(face, pos)
            .is_some_and(|node| node.accessible_to(ball))
    }

    /// Manhattan-adjacent and both ends accessible to the ball
    pub fn connected(&self, ball: BallId, face: Face, a: IVec2, b: IVec2) -> bool {
        let delta = (a - b).abs();
        delta.x + delta.y == 1
            && self.accessible_to(ball, face, a)
            && self.accessible_to(ball, face, b)
    }

    /// In-bounds four-way neighbors of a cell
    pub fn neighbors(&self, pos: IVec2) -> impl Iterator<Item = IVec2> + '_ {
        NEIGHBORS
            .iter()
            .map(move |offset| pos + *offset)
            .filter(|next| self.front.contains(*next))
    }

    /// Well destination cell on the opposite face
    pub fn mirror(&self, pos: IVec2) -> IVec2 {
        IVec2::new(mirror_column(self.width(), pos.x), pos.y)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Build a grid from space-separated code rows (test helper)
    pub(crate) fn grid(rows: &[&str]) -> Grid<NodeType> {
        let rows = rows
            .iter()
            .map(|row| {
                row.split_whitespace()
                    .map(|code| NodeType::from_code(code).expect("valid code"))
                    .collect()
            })
            .collect();
        Grid::from_rows(rows).expect("rectangular grid")
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!(NodeType::from_code("__"), Some(NodeType::Empty));
        assert_eq!(NodeType::from_code("w0"), Some(NodeType::Well));
        assert_eq!(NodeType::from_code("x0"), Some(NodeType::Wall));
        assert_eq!(
            NodeType::from_code("h2"),
            Some(NodeType::Path {
                lane: Lane::Ball(2),
                orientation: Orientation::Horizontal
            })
        );
        assert!(matches!(NodeType::from_code("t1"), Some(NodeType::Decor(_))));
        assert_eq!(NodeType::from_code("p"), None);
        assert_eq!(NodeType::from_code("p00"), None);
        assert_eq!(NodeType::from_code("p!"), None);
        for code in ["__", "p0", "v3", "h1", "w0", "x0", "c2"] {
            assert_eq!(NodeType::from_code(code).unwrap().code(), code);
        }
    }

    #[test]
    fn test_accessibility() {
        let one = BallId(1);
        let two = BallId(2);
        let p1 = NodeType::from_code("p1").unwrap();
        assert!(p1.accessible_to(one));
        assert!(!p1.accessible_to(two));
        assert!(NodeType::Well.accessible_to(two));
        assert!(!NodeType::Wall.accessible_to(one));
        assert!(!NodeType::Empty.accessible_to(one));
        assert!(!NodeType::from_code("s0").unwrap().accessible_to(one));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![NodeType::Empty; 3], vec![NodeType::Empty; 2]];
        assert!(Grid::from_rows(rows).is_none());
        assert!(Grid::<NodeType>::from_rows(Vec::new()).is_none());
    }

    #[test]
    fn test_rear_mismatch_rejected() {
        let err = Board::new(grid(&["p0 p0"]), Some(grid(&["p0 p0 p0"]))).unwrap_err();
        assert_eq!(err.rear_width, 3);
    }

    #[test]
    fn test_connected_requires_adjacency() {
        let board = Board::new(grid(&["p0 p0 p0", "x0 __ p0"]), None).unwrap();
        let ball = BallId(1);
        assert!(board.connected(ball, Face::Front, IVec2::new(0, 0), IVec2::new(1, 0)));
        assert!(!board.connected(ball, Face::Front, IVec2::new(0, 0), IVec2::new(2, 0)));
        assert!(!board.connected(ball, Face::Front, IVec2::new(0, 0), IVec2::new(0, 1)));
        assert!(!board.connected(ball, Face::Front, IVec2::new(1, 0), IVec2::new(1, 1)));
        assert!(board.connected(ball, Face::Front, IVec2::new(2, 0), IVec2::new(2, 1)));
        // Single-face board has nothing on the rear
        assert!(!board.accessible_to(ball, Face::Rear, IVec2::new(0, 0)));
    }

    #[test]
    fn test_mirror() {
        let board = Board::new(grid(&["p0 p0 w0"]), Some(grid(&["p0 p0 p0"]))).unwrap();
        assert_eq!(board.mirror(IVec2::new(2, 0)), IVec2::new(0, 0));
        assert_eq!(board.neighbors(IVec2::new(0, 0)).count(), 1);
    }

    fn code_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["__", "p0", "p1", "p2", "v0", "h1", "w0", "x0", "t0"])
    }

    proptest! {
        #[test]
        fn connectivity_is_symmetric(
            codes in prop::collection::vec(code_strategy(), 16),
            ball in 1u32..3,
            ax in 0i32..4, ay in 0i32..4,
            dir in 0usize..4,
        ) {
            let rows: Vec<Vec<NodeType>> = codes
                .chunks(4)
                .map(|row| row.iter().map(|c| NodeType::from_code(c).unwrap()).collect())
                .collect();
            let board = Board::new(Grid::from_rows(rows).unwrap(), None).unwrap();
            let a = IVec2::new(ax, ay);
            let b = a + NEIGHBORS[dir];
            let ball = BallId(ball);
            prop_assert_eq!(
                board.connected(ball, Face::Front, a, b),
                board.connected(ball, Face::Front, b, a)
            );
        }
    }
}
