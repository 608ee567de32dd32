//! 错误类型定义

use thiserror::Error;

use crate::piece::{PieceId, PieceKind, Side};
use crate::position::Position;

/// 代数记谱法解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// 长度必须为 2 到 3 个字符
    #[error("Algebraic string must be between 2 and 3 characters long, got {0:?}")]
    Length(String),

    /// 列字母必须在 a-i 之间
    #[error("Algebraic column letter must be in \"abcdefghi\", got {0:?}")]
    Letter(char),

    /// 行号不是整数
    #[error("Algebraic row number must be a valid integer, got {0:?}")]
    NumberFormat(String),

    /// 行号超出 1-10
    #[error("Algebraic row number must fall between 1 and 10 inclusive, got {0}")]
    RowOutOfRange(i64),
}

/// 棋盘几何错误（出现即说明调用方有缺陷）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// 位置超出棋盘
    #[error("Position out of bounds: {0}")]
    OutOfBounds(Position),

    /// 两个端点相同
    #[error("Same position given for both endpoints: {0}")]
    SamePosition(Position),

    /// 目标格已有棋子
    #[error("Position already occupied: {0}")]
    Occupied(Position),

    /// 没有可以撤销的走法
    #[error("No move to undo")]
    NothingToUndo,

    /// 撤销时记录的落点没有棋子
    #[error("No piece at recorded destination {0}")]
    EmptyDestination(Position),

    /// 撤销时棋子已在初始位置
    #[error("Piece at {0} has no earlier position")]
    NoEarlierPosition(Position),

    /// 棋子编号不属于这张棋盘
    #[error("Unknown piece {0:?}")]
    UnknownPiece(PieceId),
}

/// 棋子归属错误（悔棋路径上的一致性检查）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// 棋子已属于该玩家
    #[error("{kind:?} {id:?} is already owned by {side}")]
    AlreadyOwned {
        id: PieceId,
        kind: PieceKind,
        side: Side,
    },

    /// 棋子不属于该玩家
    #[error("{kind:?} {id:?} is not owned by {side}")]
    NotOwned {
        id: PieceId,
        kind: PieceKind,
        side: Side,
    },
}

/// 非法走法
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// 游戏已结束
    #[error("Game is already over")]
    GameOver,

    /// 起点没有棋子
    #[error("No piece at position {0}")]
    NoPieceAtStart(Position),

    /// 不是走子方的棋子
    #[error("Piece at {pos} belongs to {owner}, not to {mover}")]
    WrongOwner {
        pos: Position,
        owner: Side,
        mover: Side,
    },

    /// 目标不在棋子的可走范围内
    #[error("Invalid move: from {from} to {to}")]
    NotInMoveList { from: Position, to: Position },

    /// 走法会导致己方被将军
    #[error("Move from {from} to {to} would leave the general in check")]
    SelfCheck { from: Position, to: Position },

    /// 没有可以悔的棋
    #[error("No move to take back")]
    NothingToTakeBack,

    /// 悔棋功能已关闭
    #[error("Takeback is disabled")]
    TakebackDisabled,

    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),
}

impl MoveError {
    /// 是否为内部一致性故障（而非玩家的非法走法）
    pub fn is_fault(&self) -> bool {
        matches!(self, MoveError::Board(_) | MoveError::Roster(_))
    }
}

/// 规则引擎错误
#[derive(Error, Debug)]
pub enum XiangqiError {
    #[error("Notation error: {0}")]
    Notation(#[from] NotationError),

    #[error("Move error: {0}")]
    Move(#[from] MoveError),

    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// JSON 序列化错误
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 规则引擎操作结果类型
pub type Result<T> = std::result::Result<T, XiangqiError>;

/// 走子操作结果类型
pub type MoveResult<T> = std::result::Result<T, MoveError>;
