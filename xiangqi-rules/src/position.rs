//! 坐标与方向

use serde::{Deserialize, Serialize};

use crate::constants::{COL_COUNT, ROW_COUNT};

/// 棋盘位置
///
/// 行号 0 为黑方底线，9 为红方底线。允许保存棋盘外的坐标，
/// 由 [`Board::validate_bounds`](crate::Board::validate_bounds) 负责校验。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// 行 (0-9)
    pub row: i8,
    /// 列 (0-8)
    pub col: i8,
}

impl Position {
    /// 创建新位置（不检查边界）
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// 检查位置是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (0..ROW_COUNT as i8).contains(&self.row) && (0..COL_COUNT as i8).contains(&self.col)
    }

    /// 沿方向移动若干步后的位置（可能越界，分量饱和而不溢出）
    pub fn step(&self, direction: Direction, distance: i8) -> Position {
        Position {
            row: self.row.saturating_add(direction.dr.saturating_mul(distance)),
            col: self.col.saturating_add(direction.dc.saturating_mul(distance)),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// 单位方向，分量取值于 {-1, 0, 1}，且不为 (0, 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    dr: i8,
    dc: i8,
}

impl Direction {
    /// 朝黑方底线
    pub const UP: Direction = Direction { dr: -1, dc: 0 };
    /// 朝红方底线
    pub const DOWN: Direction = Direction { dr: 1, dc: 0 };
    /// 朝 a 列（红方左手）
    pub const LEFT: Direction = Direction { dr: 0, dc: -1 };
    /// 朝 i 列
    pub const RIGHT: Direction = Direction { dr: 0, dc: 1 };
    pub const UP_LEFT: Direction = Direction { dr: -1, dc: -1 };
    pub const UP_RIGHT: Direction = Direction { dr: -1, dc: 1 };
    pub const DOWN_LEFT: Direction = Direction { dr: 1, dc: -1 };
    pub const DOWN_RIGHT: Direction = Direction { dr: 1, dc: 1 };

    /// 四个直线方向
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::UP,
        Direction::DOWN,
        Direction::LEFT,
        Direction::RIGHT,
    ];

    /// 四个斜线方向
    pub const DIAGONAL: [Direction; 4] = [
        Direction::UP_LEFT,
        Direction::UP_RIGHT,
        Direction::DOWN_LEFT,
        Direction::DOWN_RIGHT,
    ];

    /// 创建方向，分量非法或为 (0, 0) 时返回 None
    pub fn new(dr: i8, dc: i8) -> Option<Self> {
        let unit = |v: i8| (-1..=1).contains(&v);
        if unit(dr) && unit(dc) && (dr, dc) != (0, 0) {
            Some(Self { dr, dc })
        } else {
            None
        }
    }

    /// 行分量
    pub fn dr(&self) -> i8 {
        self.dr
    }

    /// 列分量
    pub fn dc(&self) -> i8 {
        self.dc
    }

    /// 是否为直线方向
    pub fn is_orthogonal(&self) -> bool {
        self.dr == 0 || self.dc == 0
    }

    /// 是否为斜线方向
    pub fn is_diagonal(&self) -> bool {
        self.dr != 0 && self.dc != 0
    }

    /// 反方向
    pub fn reverse(&self) -> Direction {
        Direction {
            dr: -self.dr,
            dc: -self.dc,
        }
    }

    /// 马走完直线一步后可接的两个斜向（不含回头方向）
    ///
    /// 斜向输入返回 None。
    pub fn horse_directions(&self) -> Option<[Direction; 2]> {
        match (self.dr, self.dc) {
            (0, dc) if dc != 0 => Some([Direction { dr: -1, dc }, Direction { dr: 1, dc }]),
            (dr, 0) if dr != 0 => Some([Direction { dr, dc: -1 }, Direction { dr, dc: 1 }]),
            _ => None,
        }
    }
}
