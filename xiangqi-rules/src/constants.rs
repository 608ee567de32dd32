//! 规则常量定义

use crate::piece::PieceKind;

/// 棋盘行数（第 0 行为黑方底线，第 9 行为红方底线）
pub const ROW_COUNT: usize = 10;

/// 棋盘列数
pub const COL_COUNT: usize = 9;

/// 离开底线多少行即视为过河
pub const RIVER_DISTANCE: i8 = 5;

/// 九宫格最左列
pub const CASTLE_MIN_COL: i8 = 3;

/// 九宫格最右列
pub const CASTLE_MAX_COL: i8 = 5;

/// 九宫格纵深（含底线）
pub const CASTLE_DEPTH: i8 = 3;

/// 初始局面 FEN（首段从黑方底线开始）
pub const INITIAL_FEN: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR r";

/// 开局布置：棋子类型、距本方底线的行数、所在列
pub const STARTING_LAYOUT: [(PieceKind, i8, &[i8]); 7] = [
    (PieceKind::General, 0, &[4]),
    (PieceKind::Advisor, 0, &[3, 5]),
    (PieceKind::Elephant, 0, &[2, 6]),
    (PieceKind::Horse, 0, &[1, 7]),
    (PieceKind::Chariot, 0, &[0, 8]),
    (PieceKind::Cannon, 2, &[1, 7]),
    (PieceKind::Soldier, 3, &[0, 2, 4, 6, 8]),
];
