//! Level documents and load-time validation
//!
//! A level is either fully valid and playable or refused as a whole.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::ball::SignedCoord;
use crate::sim::board::{Board, Face, FaceMismatch, Grid, NodeType};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed level document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("front face has no rows")]
    EmptyFront,

    #[error("{face} row {row} is empty")]
    EmptyRow { face: Face, row: usize },

    #[error("{face} row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        face: Face,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown node code `{code}` on {face} at ({column}, {row})")]
    BadCode {
        face: Face,
        row: usize,
        column: usize,
        code: String,
    },

    #[error(transparent)]
    FaceMismatch(#[from] FaceMismatch),

    #[error("level has no balls")]
    NoBalls,

    #[error("ball {ball} has no start position")]
    MissingStart { ball: usize },

    #[error("ball {ball} has no end position")]
    MissingEnd { ball: usize },

    #[error("ball {ball} {what} {x},{y} on {face} is outside the {width}x{height} board")]
    OutOfBounds {
        ball: usize,
        what: &'static str,
        face: Face,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("ball {ball} {what} is on the rear face but the board has only a front face")]
    NoRearFace { ball: usize, what: &'static str },

    #[error("balls {first} and {second} both start on {face} at {x},{y}")]
    SharedStart {
        first: usize,
        second: usize,
        face: Face,
        x: i32,
        y: i32,
    },

    #[error("level pack has no levels")]
    EmptyPack,

    #[error("level {index} does not exist ({count} levels)")]
    NoSuchLevel { index: usize, count: usize },

    #[error("level {index}: {source}")]
    InPack {
        index: usize,
        #[source]
        source: Box<LevelError>,
    },
}

/// Raw level document as authored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub board: BoardDoc,
    #[serde(default)]
    pub balls: Vec<BallDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardDoc {
    #[serde(default)]
    pub front: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rear: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallDoc {
    #[serde(default)]
    pub start: Option<SignedCoord>,
    #[serde(default)]
    pub end: Option<GoalDoc>,
    #[serde(default)]
    pub color: u32,
}

/// One goal or a list of goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GoalDoc {
    One(SignedCoord),
    Many(Vec<SignedCoord>),
}

impl GoalDoc {
    fn into_vec(self) -> Vec<SignedCoord> {
        match self {
            GoalDoc::One(goal) => vec![goal],
            GoalDoc::Many(goals) => goals,
        }
    }
}

/// Validated ball description
#[derive(Debug, Clone, PartialEq)]
pub struct BallSpec {
    pub color: u32,
    pub start: SignedCoord,
    /// Never empty; the first entry is the primary goal
    pub goals: Vec<SignedCoord>,
}

/// A validated, playable level
#[derive(Debug, Clone)]
pub struct Level {
    pub name: Option<String>,
    pub board: Board,
    pub balls: Vec<BallSpec>,
}

impl Level {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let doc: LevelDoc = serde_json::from_str(json)?;
        Self::from_doc(doc)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_doc(doc: LevelDoc) -> Result<Self, LevelError> {
        if doc.board.front.is_empty() {
            return Err(LevelError::EmptyFront);
        }
        let front = parse_face(Face::Front, &doc.board.front)?;
        let rear = doc
            .board
            .rear
            .as_deref()
            .map(|rows| parse_face(Face::Rear, rows))
            .transpose()?;
        let board = Board::new(front, rear)?;

        if doc.balls.is_empty() {
            return Err(LevelError::NoBalls);
        }
        let balls = doc
            .balls
            .into_iter()
            .enumerate()
            .map(|(i, ball)| parse_ball(&board, i + 1, ball))
            .collect::<Result<Vec<_>, _>>()?;

        for (i, a) in balls.iter().enumerate() {
            if let Some(j) = balls[i + 1..].iter().position(|b| b.start == a.start) {
                return Err(LevelError::SharedStart {
                    first: i + 1,
                    second: i + j + 2,
                    face: a.start.face,
                    x: a.start.pos.x,
                    y: a.start.pos.y,
                });
            }
        }

        let level = Self {
            name: doc.name,
            board,
            balls,
        };
        level.warn_suspicious();
        Ok(level)
    }

    /// Loadable but probably unintended content
    fn warn_suspicious(&self) {
        for (i, ball) in self.balls.iter().enumerate() {
            let id = crate::sim::BallId(i as u32 + 1);
            if !self.board.accessible_to(id, ball.start.face, ball.start.pos) {
                log::warn!("{id} starts on a node it cannot travel");
            }
            if let Some(goal) = ball.goals.first() {
                if !self.board.accessible_to(id, goal.face, goal.pos) {
                    log::warn!("{id} primary goal is on a node it cannot reach");
                }
            }
        }

        if !self.board.has_rear() {
            return;
        }
        for face in [Face::Front, Face::Rear] {
            let Some(grid) = self.board.grid(face) else {
                continue;
            };
            for pos in grid.positions() {
                if grid.get(pos) != Some(NodeType::Well) {
                    continue;
                }
                let to = self.board.mirror(pos);
                let lands = self
                    .board
                    .node_type(face.opposite(), to)
                    .is_some_and(|node| {
                        !matches!(node, NodeType::Empty | NodeType::Wall | NodeType::Decor(_))
                    });
                if !lands {
                    log::warn!("well on {face} at {pos} leads to a dead cell at {to}");
                }
            }
        }
    }

    /// Export back to a document
    pub fn to_doc(&self) -> LevelDoc {
        let rows = |face: Face| {
            self.board.grid(face).map(|grid| {
                grid.rows()
                    .map(|row| row.iter().map(|n| n.code()).collect::<Vec<_>>().join(" "))
                    .collect::<Vec<_>>()
            })
        };
        LevelDoc {
            name: self.name.clone(),
            board: BoardDoc {
                front: rows(Face::Front).unwrap_or_default(),
                rear: rows(Face::Rear),
            },
            balls: self
                .balls
                .iter()
                .map(|b| BallDoc {
                    start: Some(b.start),
                    end: Some(match b.goals.as_slice() {
                        [goal] => GoalDoc::One(*goal),
                        goals => GoalDoc::Many(goals.to_vec()),
                    }),
                    color: b.color,
                })
                .collect(),
        }
    }
}

fn parse_face(face: Face, rows: &[String]) -> Result<Grid<NodeType>, LevelError> {
    let mut cells = Vec::with_capacity(rows.len());
    let mut width = None;
    for (row, line) in rows.iter().enumerate() {
        let parsed = line
            .split_whitespace()
            .enumerate()
            .map(|(column, code)| {
                NodeType::from_code(code).ok_or_else(|| LevelError::BadCode {
                    face,
                    row,
                    column,
                    code: code.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if parsed.is_empty() {
            return Err(LevelError::EmptyRow { face, row });
        }
        let expected = *width.get_or_insert(parsed.len());
        if parsed.len() != expected {
            return Err(LevelError::RaggedRow {
                face,
                row,
                expected,
                found: parsed.len(),
            });
        }
        cells.push(parsed);
    }
    match face {
        Face::Front => Grid::from_rows(cells).ok_or(LevelError::EmptyFront),
        Face::Rear => Grid::from_rows(cells).ok_or(LevelError::EmptyRow { face, row: 0 }),
    }
}

fn parse_ball(board: &Board, ball: usize, doc: BallDoc) -> Result<BallSpec, LevelError> {
    let start = doc.start.ok_or(LevelError::MissingStart { ball })?;
    let goals = doc
        .end
        .map(GoalDoc::into_vec)
        .filter(|goals| !goals.is_empty())
        .ok_or(LevelError::MissingEnd { ball })?;

    check_coord(board, ball, "start", start)?;
    for goal in &goals {
        check_coord(board, ball, "goal", *goal)?;
    }
    Ok(BallSpec {
        color: doc.color,
        start,
        goals,
    })
}

fn check_coord(
    board: &Board,
    ball: usize,
    what: &'static str,
    coord: SignedCoord,
) -> Result<(), LevelError> {
    let Some(grid) = board.grid(coord.face) else {
        return Err(LevelError::NoRearFace { ball, what });
    };
    if !grid.contains(coord.pos) {
        return Err(LevelError::OutOfBounds {
            ball,
            what,
            face: coord.face,
            x: coord.pos.x,
            y: coord.pos.y,
            width: board.width(),
            height: board.height(),
        });
    }
    Ok(())
}

/// Ordered list of levels
#[derive(Debug, Clone)]
pub struct LevelPack {
    pub levels: Vec<Level>,
}

#[derive(Debug, Deserialize)]
struct LevelPackDoc {
    levels: Vec<LevelDoc>,
}

impl LevelPack {
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::EmptyPack);
        }
        Ok(Self { levels })
    }

    /// Parse `{ "levels": [...] }`; any invalid level refuses the whole pack
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let doc: LevelPackDoc = serde_json::from_str(json)?;
        let levels = doc
            .levels
            .into_iter()
            .enumerate()
            .map(|(index, level)| {
                Level::from_doc(level).map_err(|source| LevelError::InPack {
                    index,
                    source: Box::new(source),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("Loaded level pack with {} levels", levels.len());
        Self::new(levels)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }
}
