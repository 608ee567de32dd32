//! 走法生成
//!
//! 每种棋子一条走子规则。将与炮另有一套“威胁”计算：
//! 将的威胁是对面九宫中与其同列、视线无阻的格子（飞将），
//! 炮的威胁只包括隔子可吃的目标，平移可达的空格并不受炮威胁。

use std::collections::HashSet;

use crate::board::{Board, Intervening};
use crate::piece::{Piece, PieceKind, Side};
use crate::player::Player;
use crate::position::{Direction, Position};

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 生成棋子的所有可走位置（不考虑走后是否被将军）
    pub fn get_moves(board: &Board, piece: &Piece, opponent: &Player) -> HashSet<Position> {
        let pos = piece.position();
        let side = piece.owner();
        match piece.kind() {
            PieceKind::General => Self::general_moves(board, pos, side, opponent),
            PieceKind::Advisor => Self::advisor_moves(board, pos, side),
            PieceKind::Elephant => Self::elephant_moves(board, pos, side),
            PieceKind::Horse => Self::horse_moves(board, pos, side),
            PieceKind::Chariot => Self::chariot_moves(board, pos, side),
            PieceKind::Cannon => Self::cannon_moves(board, pos, side),
            PieceKind::Soldier => Self::soldier_moves(board, pos, side),
        }
    }

    /// 生成棋子实际威胁的位置
    ///
    /// 除将和炮外，威胁范围与走子范围一致。
    pub fn get_threats(board: &Board, piece: &Piece) -> HashSet<Position> {
        let pos = piece.position();
        let side = piece.owner();
        match piece.kind() {
            PieceKind::General => Self::enemy_castle_sight(board, pos, side),
            PieceKind::Cannon => Self::cannon_targets(board, pos, side),
            PieceKind::Advisor => Self::advisor_moves(board, pos, side),
            PieceKind::Elephant => Self::elephant_moves(board, pos, side),
            PieceKind::Horse => Self::horse_moves(board, pos, side),
            PieceKind::Chariot => Self::chariot_moves(board, pos, side),
            PieceKind::Soldier => Self::soldier_moves(board, pos, side),
        }
    }

    /// 将/帅：九宫内直走一步，且不走进对方当前威胁的格子
    fn general_moves(
        board: &Board,
        pos: Position,
        side: Side,
        opponent: &Player,
    ) -> HashSet<Position> {
        let threatened = opponent.get_threatened_squares(board);
        Direction::ORTHOGONAL
            .iter()
            .flat_map(|&dir| board.find_ortho_path(pos, dir, Some(1)))
            .filter(|&to| board.is_in_castle(to, side))
            .filter(|&to| !Self::is_friendly(board, to, side))
            .filter(|to| !threatened.contains_key(to))
            .collect()
    }

    /// 飞将：对面九宫中与将同列、且中间只可能隔着对方将的格子
    pub fn enemy_castle_sight(board: &Board, pos: Position, side: Side) -> HashSet<Position> {
        let enemy = side.opponent();
        board
            .get_castle(enemy)
            .iter()
            .copied()
            .filter(|&target| target.col == pos.col && target != pos)
            .filter(|&target| match board.find_intervening_piece(pos, target) {
                Ok(Intervening::Clear) => true,
                Ok(Intervening::Blocked(blockers)) => blockers.iter().all(|&id| {
                    board.piece(id).is_some_and(|piece| {
                        piece.kind() == PieceKind::General && piece.owner() == enemy
                    })
                }),
                _ => false,
            })
            .collect()
    }

    /// 士/仕：九宫内斜走一步
    fn advisor_moves(board: &Board, pos: Position, side: Side) -> HashSet<Position> {
        Direction::DIAGONAL
            .iter()
            .filter_map(|&dir| board.find_diag(pos, dir, 1))
            .filter(|&to| board.is_in_castle(to, side))
            .filter(|&to| !Self::is_friendly(board, to, side))
            .collect()
    }

    /// 象/相：斜走两步，象眼被堵不能走，不能过河
    fn elephant_moves(board: &Board, pos: Position, side: Side) -> HashSet<Position> {
        Direction::DIAGONAL
            .iter()
            .filter(|&&dir| {
                board
                    .find_diag(pos, dir, 1)
                    .is_some_and(|eye| board.get_piece(eye).is_none())
            })
            .filter_map(|&dir| board.find_diag(pos, dir, 2))
            .filter(|&to| !board.is_across_river(to, side))
            .filter(|&to| !Self::is_friendly(board, to, side))
            .collect()
    }

    /// 马/傌：直走一步（马腿须空）再向外斜走一步
    fn horse_moves(board: &Board, pos: Position, side: Side) -> HashSet<Position> {
        let mut moves = HashSet::new();
        for dir in Direction::ORTHOGONAL {
            let leg = pos.step(dir, 1);
            if !leg.is_valid() || board.get_piece(leg).is_some() {
                continue;
            }
            let Some(diagonals) = dir.horse_directions() else {
                continue;
            };
            for diag in diagonals {
                if let Some(to) = board.find_diag(leg, diag, 1) {
                    if !Self::is_friendly(board, to, side) {
                        moves.insert(to);
                    }
                }
            }
        }
        moves
    }

    /// 车/俥：直线滑行到边缘或第一个棋子，可以吃对方棋子
    fn chariot_moves(board: &Board, pos: Position, side: Side) -> HashSet<Position> {
        Direction::ORTHOGONAL
            .iter()
            .flat_map(|&dir| board.find_ortho_path(pos, dir, None))
            .filter(|&to| !Self::is_friendly(board, to, side))
            .collect()
    }

    /// 炮/砲：平移到第一个棋子之前的空格，外加隔子可吃的目标
    fn cannon_moves(board: &Board, pos: Position, side: Side) -> HashSet<Position> {
        let mut moves: HashSet<Position> = Direction::ORTHOGONAL
            .iter()
            .flat_map(|&dir| board.find_ortho_path(pos, dir, None))
            .filter(|&to| board.get_piece(to).is_none())
            .collect();
        moves.extend(Self::cannon_targets(board, pos, side));
        moves
    }

    /// 炮隔一子（炮架）可吃的对方棋子
    pub fn cannon_targets(board: &Board, pos: Position, side: Side) -> HashSet<Position> {
        let mut targets = HashSet::new();
        for dir in Direction::ORTHOGONAL {
            let Some(&platform) = board.find_ortho_path(pos, dir, None).last() else {
                continue;
            };
            if board.get_piece(platform).is_none() {
                continue;
            }
            if let Some(&target) = board.find_ortho_path(platform, dir, None).last() {
                let hostile = board
                    .piece_at(target)
                    .is_some_and(|piece| piece.owner() != side);
                if hostile {
                    targets.insert(target);
                }
            }
        }
        targets
    }

    /// 兵/卒：向前一步，过河后可以左右一步，不能后退
    fn soldier_moves(board: &Board, pos: Position, side: Side) -> HashSet<Position> {
        let mut directions = vec![side.forward()];
        if board.is_across_river(pos, side) {
            directions.extend([Direction::LEFT, Direction::RIGHT]);
        }
        directions
            .into_iter()
            .map(|dir| pos.step(dir, 1))
            .filter(|to| to.is_valid())
            .filter(|&to| !Self::is_friendly(board, to, side))
            .collect()
    }

    /// 目标格是否被己方棋子占据
    fn is_friendly(board: &Board, pos: Position, side: Side) -> bool {
        board.piece_at(pos).is_some_and(|piece| piece.owner() == side)
    }
}
