//! 棋盘状态与路径几何

use tracing::trace;

use crate::constants::{
    CASTLE_DEPTH, CASTLE_MAX_COL, CASTLE_MIN_COL, COL_COUNT, RIVER_DISTANCE, ROW_COUNT,
    STARTING_LAYOUT,
};
use crate::error::{BoardError, MoveError};
use crate::piece::{Piece, PieceId, PieceKind, Side};
use crate::player::Player;
use crate::position::{Direction, Position};

/// 两点之间的棋子情况
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intervening {
    /// 两点既不同行也不同列
    NoCommonAxis,
    /// 中间没有棋子
    Clear,
    /// 中间的棋子，按从起点到终点的顺序
    Blocked(Vec<PieceId>),
}

/// 棋盘
///
/// 格子里记录棋子编号，棋子本身保存在 `pieces` 中且从不删除；
/// 被吃掉的棋子只是离开了格子，悔棋时可以原样放回。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: [[Option<PieceId>; COL_COUNT]; ROW_COUNT],
    pieces: Vec<Piece>,
    castles: [[Position; 9]; 2],
    /// 每步走法的落点
    last_moves: Vec<Position>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            grid: [[None; COL_COUNT]; ROW_COUNT],
            pieces: Vec::new(),
            castles: [Self::build_castle(Side::Red), Self::build_castle(Side::Black)],
            last_moves: Vec::new(),
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();
        for side in [Side::Red, Side::Black] {
            let forward = side.forward();
            for (kind, offset, cols) in STARTING_LAYOUT {
                for &col in cols {
                    let pos = Position::new(side.home_row(), col).step(forward, offset);
                    let id = PieceId(board.pieces.len());
                    board.grid[pos.row as usize][pos.col as usize] = Some(id);
                    board.pieces.push(Piece::new(kind, side, pos));
                }
            }
        }
        board
    }

    fn build_castle(side: Side) -> [Position; 9] {
        let mut castle = [Position::new(0, 0); 9];
        let forward = side.forward();
        let mut i = 0;
        for depth in 0..CASTLE_DEPTH {
            for col in CASTLE_MIN_COL..=CASTLE_MAX_COL {
                castle[i] = Position::new(side.home_row(), col).step(forward, depth);
                i += 1;
            }
        }
        castle
    }

    /// 放置一枚新棋子
    pub fn place(
        &mut self,
        kind: PieceKind,
        owner: Side,
        pos: Position,
    ) -> Result<PieceId, BoardError> {
        self.validate_bounds(pos)?;
        if self.get_piece(pos).is_some() {
            return Err(BoardError::Occupied(pos));
        }
        let id = PieceId(self.pieces.len());
        self.pieces.push(Piece::new(kind, owner, pos));
        self.set(pos, Some(id));
        Ok(id)
    }

    /// 检查位置是否在棋盘内
    pub fn validate_bounds(&self, pos: Position) -> Result<(), BoardError> {
        if pos.is_valid() {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds(pos))
        }
    }

    /// 获取指定位置的棋子编号（越界视为空）
    pub fn get_piece(&self, pos: Position) -> Option<PieceId> {
        if pos.is_valid() {
            self.grid[pos.row as usize][pos.col as usize]
        } else {
            None
        }
    }

    /// 获取指定位置的棋子
    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        self.get_piece(pos).and_then(|id| self.piece(id))
    }

    /// 按编号获取棋子（包括已被吃掉的），编号不属于这张棋盘时返回 None
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0)
    }

    /// 当前在棋盘上的所有棋子
    pub fn pieces_on_board(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| (PieceId(i), piece))
            .filter(move |(id, piece)| self.get_piece(piece.position()) == Some(*id))
    }

    /// 已走步数
    pub fn move_count(&self) -> usize {
        self.last_moves.len()
    }

    fn set(&mut self, pos: Position, occupant: Option<PieceId>) {
        if pos.is_valid() {
            self.grid[pos.row as usize][pos.col as usize] = occupant;
        }
    }

    /// 获取指定阵营的九宫格
    pub fn get_castle(&self, side: Side) -> &[Position; 9] {
        &self.castles[side.index()]
    }

    /// 检查位置是否在指定阵营的九宫格内
    pub fn is_in_castle(&self, pos: Position, side: Side) -> bool {
        self.castles[side.index()].contains(&pos)
    }

    /// 检查位置对指定阵营而言是否已过河
    pub fn is_across_river(&self, pos: Position, side: Side) -> bool {
        (pos.row - side.home_row()).abs() >= RIVER_DISTANCE
    }

    /// 沿直线方向寻路，直到棋盘边缘或第一个棋子（包含该棋子所在格）
    pub fn find_ortho_path(
        &self,
        from: Position,
        direction: Direction,
        max_steps: Option<usize>,
    ) -> Vec<Position> {
        let mut path = Vec::new();
        let mut current = from.step(direction, 1);
        while current.is_valid() && max_steps.map_or(true, |max| path.len() < max) {
            path.push(current);
            if self.get_piece(current).is_some() {
                break;
            }
            current = current.step(direction, 1);
        }
        path
    }

    /// 斜线方向上指定距离的位置，越界或方向不是斜向时返回 None
    pub fn find_diag(
        &self,
        from: Position,
        direction: Direction,
        distance: i8,
    ) -> Option<Position> {
        if !direction.is_diagonal() {
            return None;
        }
        let pos = from.step(direction, distance);
        pos.is_valid().then_some(pos)
    }

    /// 查找同一行或同一列上两点之间（不含端点）的棋子
    pub fn find_intervening_piece(
        &self,
        a: Position,
        b: Position,
    ) -> Result<Intervening, BoardError> {
        if a == b {
            return Err(BoardError::SamePosition(a));
        }
        let (direction, distance) = if a.row == b.row {
            let dc = (b.col - a.col).signum();
            (Direction::new(0, dc), (b.col - a.col).abs())
        } else if a.col == b.col {
            let dr = (b.row - a.row).signum();
            (Direction::new(dr, 0), (b.row - a.row).abs())
        } else {
            return Ok(Intervening::NoCommonAxis);
        };
        let Some(direction) = direction else {
            return Ok(Intervening::NoCommonAxis);
        };

        let blockers: Vec<PieceId> = (1..distance)
            .filter_map(|step| self.get_piece(a.step(direction, step)))
            .collect();
        if blockers.is_empty() {
            Ok(Intervening::Clear)
        } else {
            Ok(Intervening::Blocked(blockers))
        }
    }

    /// 走子
    ///
    /// 校验起点、归属与走法范围后才会修改棋盘，失败时棋盘不变。
    /// 返回落点原有的棋子；被吃的棋子不会从其玩家的名单中移除。
    pub fn make_move(
        &mut self,
        from: Position,
        to: Position,
        mover: Side,
        opponent: &Player,
    ) -> Result<Option<PieceId>, MoveError> {
        let id = self.get_piece(from).ok_or(MoveError::NoPieceAtStart(from))?;
        let piece = self.piece(id).ok_or(BoardError::UnknownPiece(id))?;
        if piece.owner() != mover {
            return Err(MoveError::WrongOwner {
                pos: from,
                owner: piece.owner(),
                mover,
            });
        }
        if !piece.get_moves(self, opponent).contains(&to) {
            return Err(MoveError::NotInMoveList { from, to });
        }

        let kind = piece.kind();
        let captured = self.get_piece(to);
        self.set(from, None);
        self.set(to, Some(id));
        self.pieces[id.0].push_position(to);
        self.last_moves.push(to);
        trace!("{:?} {} moved {} -> {}, captured {:?}", kind, mover, from, to, captured);
        Ok(captured)
    }

    /// 撤销最后一步
    ///
    /// 有吃子时需把被吃的棋子传回来，它会被放回落点；
    /// 调用方还需自行把它加回所属玩家的名单。
    pub fn undo_move(&mut self, captured: Option<PieceId>) -> Result<PieceId, BoardError> {
        let to = *self.last_moves.last().ok_or(BoardError::NothingToUndo)?;
        let id = self.get_piece(to).ok_or(BoardError::EmptyDestination(to))?;
        let prior = self
            .pieces
            .get_mut(id.0)
            .ok_or(BoardError::UnknownPiece(id))?
            .pop_position()
            .ok_or(BoardError::NoEarlierPosition(to))?;
        self.last_moves.pop();

        self.set(prior, Some(id));
        self.set(to, captured);
        trace!("undo {} -> {}, restored {:?}", prior, to, captured);
        Ok(id)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "   ")?;
        for col in 0..COL_COUNT {
            write!(f, " {}", col)?;
        }
        writeln!(f)?;
        for row in 0..ROW_COUNT {
            write!(f, "{:>2} ", row)?;
            for col in 0..COL_COUNT {
                let c = self
                    .piece_at(Position::new(row as i8, col as i8))
                    .map_or('.', |piece| piece.to_fen_char());
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
