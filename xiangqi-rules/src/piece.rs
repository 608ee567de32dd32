//! 棋子定义

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::constants::ROW_COUNT;
use crate::moves::MoveGenerator;
use crate::player::Player;
use crate::position::{Direction, Position};

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    /// 将/帅
    General,
    /// 士/仕
    Advisor,
    /// 象/相
    Elephant,
    /// 马/傌
    Horse,
    /// 车/俥
    Chariot,
    /// 炮/砲
    Cannon,
    /// 兵/卒
    Soldier,
}

impl PieceKind {
    /// 全部棋子类型
    pub const ALL: [PieceKind; 7] = [
        PieceKind::General,
        PieceKind::Advisor,
        PieceKind::Elephant,
        PieceKind::Horse,
        PieceKind::Chariot,
        PieceKind::Cannon,
        PieceKind::Soldier,
    ];

    /// 每方开局时的数量
    pub fn starting_count(&self) -> usize {
        match self {
            PieceKind::General => 1,
            PieceKind::Soldier => 5,
            _ => 2,
        }
    }

    /// 获取 FEN 字符（红方大写，黑方小写）
    pub fn to_fen_char(&self, side: Side) -> char {
        let c = match self {
            PieceKind::General => 'k',
            PieceKind::Advisor => 'a',
            PieceKind::Elephant => 'b',
            PieceKind::Horse => 'n',
            PieceKind::Chariot => 'r',
            PieceKind::Cannon => 'c',
            PieceKind::Soldier => 'p',
        };
        match side {
            Side::Red => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }

    /// 从 FEN 字符解析（同时接受 e/h 的写法）
    pub fn from_fen_char(c: char) -> Option<(PieceKind, Side)> {
        let side = if c.is_ascii_uppercase() {
            Side::Red
        } else {
            Side::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'k' => PieceKind::General,
            'a' => PieceKind::Advisor,
            'b' | 'e' => PieceKind::Elephant,
            'n' | 'h' => PieceKind::Horse,
            'r' => PieceKind::Chariot,
            'c' => PieceKind::Cannon,
            'p' => PieceKind::Soldier,
            _ => return None,
        };
        Some((kind, side))
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// 红方（先手，在下方）
    Red,
    /// 黑方（后手，在上方）
    Black,
}

impl Side {
    /// 获取对方阵营
    pub fn opponent(&self) -> Side {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }

    /// 双方表中的下标
    pub fn index(&self) -> usize {
        match self {
            Side::Red => 0,
            Side::Black => 1,
        }
    }

    /// 本方底线所在行
    pub fn home_row(&self) -> i8 {
        match self {
            Side::Red => ROW_COUNT as i8 - 1,
            Side::Black => 0,
        }
    }

    /// 前进方向
    pub fn forward(&self) -> Direction {
        match self {
            Side::Red => Direction::UP,
            Side::Black => Direction::DOWN,
        }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Side::Red => 'r',
            Side::Black => 'b',
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Side> {
        match c {
            'r' | 'R' | 'w' | 'W' => Some(Side::Red),
            'b' | 'B' => Some(Side::Black),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Red => write!(f, "red"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// 棋子在棋盘棋子表中的编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub(crate) usize);

impl PieceId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// 棋子
///
/// 所属阵营在创建时确定，之后不会改变。每次走子压入新位置，悔棋时弹出；
/// 初始位置永远保留，因此被吃掉的棋子仍记得最后所在的格子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    owner: Side,
    start: Position,
    history: Vec<Position>,
}

impl Piece {
    /// 创建新棋子
    pub fn new(kind: PieceKind, owner: Side, start: Position) -> Self {
        Self {
            kind,
            owner,
            start,
            history: Vec::new(),
        }
    }

    /// 棋子类型
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// 所属阵营
    pub fn owner(&self) -> Side {
        self.owner
    }

    /// 当前位置（位置栈栈顶）
    pub fn position(&self) -> Position {
        self.history.last().copied().unwrap_or(self.start)
    }

    /// 初始位置
    pub fn start_position(&self) -> Position {
        self.start
    }

    /// 位置栈深度（含初始位置）
    pub fn history_len(&self) -> usize {
        self.history.len() + 1
    }

    pub(crate) fn push_position(&mut self, pos: Position) {
        self.history.push(pos);
    }

    /// 退回上一个位置，返回退回后的位置；只剩初始位置时返回 None
    pub(crate) fn pop_position(&mut self) -> Option<Position> {
        self.history.pop().map(|_| self.position())
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        self.kind.to_fen_char(self.owner)
    }

    /// 可走到的所有位置（已排除己方棋子占据的格子）
    pub fn get_moves(&self, board: &Board, opponent: &Player) -> HashSet<Position> {
        MoveGenerator::get_moves(board, self, opponent)
    }

    /// 实际威胁到的所有位置
    pub fn get_threats(&self, board: &Board) -> HashSet<Position> {
        MoveGenerator::get_threats(board, self)
    }
}
