//! 玩家与棋子名单

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::{Index, IndexMut};

use crate::board::Board;
use crate::error::RosterError;
use crate::piece::{PieceId, PieceKind, Side};
use crate::position::Position;

/// 玩家
///
/// 名单按棋子类型分组，组内按编号排序，先移除再加回可以得到完全相同的名单。
/// 将军标记由对局控制维护，读取时不会重新计算。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    side: Side,
    roster: BTreeMap<PieceKind, Vec<PieceId>>,
    in_check: bool,
}

impl Player {
    /// 创建没有棋子的玩家
    pub fn new(side: Side) -> Self {
        Self {
            side,
            roster: PieceKind::ALL.iter().map(|&kind| (kind, Vec::new())).collect(),
            in_check: false,
        }
    }

    /// 以棋盘上属于该阵营的棋子建立名单
    pub fn from_board(side: Side, board: &Board) -> Self {
        let mut player = Self::new(side);
        for (id, piece) in board.pieces_on_board() {
            if piece.owner() == side {
                player.roster.entry(piece.kind()).or_default().push(id);
            }
        }
        player
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// 对手阵营
    pub fn opponent(&self) -> Side {
        self.side.opponent()
    }

    pub fn in_check(&self) -> bool {
        self.in_check
    }

    pub(crate) fn set_in_check(&mut self, in_check: bool) {
        self.in_check = in_check;
    }

    /// 按类型分组的名单
    pub fn roster(&self) -> &BTreeMap<PieceKind, Vec<PieceId>> {
        &self.roster
    }

    /// 名单中的全部棋子
    pub fn pieces(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.roster.values().flatten().copied()
    }

    /// 指定类型的棋子
    pub fn pieces_of(&self, kind: PieceKind) -> &[PieceId] {
        self.roster.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 本方的将
    pub fn general(&self) -> Option<PieceId> {
        self.pieces_of(PieceKind::General).first().copied()
    }

    pub fn owns(&self, id: PieceId, kind: PieceKind) -> bool {
        self.pieces_of(kind).binary_search(&id).is_ok()
    }

    /// 从名单移除棋子（被吃）
    pub fn remove_piece(&mut self, id: PieceId, kind: PieceKind) -> Result<(), RosterError> {
        let list = self.roster.entry(kind).or_default();
        match list.binary_search(&id) {
            Ok(i) => {
                list.remove(i);
                Ok(())
            }
            Err(_) => Err(RosterError::NotOwned {
                id,
                kind,
                side: self.side,
            }),
        }
    }

    /// 把棋子加回名单（悔棋）
    pub fn add_piece(&mut self, id: PieceId, kind: PieceKind) -> Result<(), RosterError> {
        let list = self.roster.entry(kind).or_default();
        match list.binary_search(&id) {
            Ok(_) => Err(RosterError::AlreadyOwned {
                id,
                kind,
                side: self.side,
            }),
            Err(i) => {
                list.insert(i, id);
                Ok(())
            }
        }
    }

    /// 本方所有棋子威胁到的格子，以及威胁每个格子的棋子
    pub fn get_threatened_squares(&self, board: &Board) -> HashMap<Position, HashSet<PieceId>> {
        let mut threatened: HashMap<Position, HashSet<PieceId>> = HashMap::new();
        for id in self.pieces() {
            let Some(piece) = board.piece(id) else {
                continue;
            };
            for pos in piece.get_threats(board) {
                threatened.entry(pos).or_default().insert(id);
            }
        }
        threatened
    }

    /// 本方的将是否被对手威胁
    ///
    /// 对手已被标记为被将军时直接返回 false：双方不会同时被将军。
    /// 因此只有在对手标记为未被将军时，结果才反映真实局面。
    pub fn is_in_check(&self, board: &Board, opponent: &Player) -> bool {
        if opponent.in_check {
            return false;
        }
        let Some(general) = self.general().and_then(|id| board.piece(id)) else {
            return false;
        };
        opponent
            .get_threatened_squares(board)
            .contains_key(&general.position())
    }
}

/// 双方玩家，按阵营下标存放
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Players([Player; 2]);

impl Players {
    /// 以棋盘上的棋子建立双方名单
    pub fn from_board(board: &Board) -> Self {
        Self([
            Player::from_board(Side::Red, board),
            Player::from_board(Side::Black, board),
        ])
    }

    pub fn get(&self, side: Side) -> &Player {
        &self.0[side.index()]
    }

    pub fn get_mut(&mut self, side: Side) -> &mut Player {
        &mut self.0[side.index()]
    }

    /// 指定阵营的对手
    pub fn opponent_of(&self, side: Side) -> &Player {
        self.get(side.opponent())
    }

    /// 指定阵营是否被将军（实时计算）
    pub fn is_in_check(&self, side: Side, board: &Board) -> bool {
        self.get(side).is_in_check(board, self.opponent_of(side))
    }

    /// 双方的将军标记，按阵营下标排列
    pub fn check_flags(&self) -> [bool; 2] {
        [self.0[0].in_check, self.0[1].in_check]
    }

    pub(crate) fn restore_check_flags(&mut self, flags: [bool; 2]) {
        self.0[0].in_check = flags[0];
        self.0[1].in_check = flags[1];
    }
}

impl Index<Side> for Players {
    type Output = Player;

    fn index(&self, side: Side) -> &Player {
        self.get(side)
    }
}

impl IndexMut<Side> for Players {
    fn index_mut(&mut self, side: Side) -> &mut Player {
        self.get_mut(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;

    #[test]
    fn test_initial_roster() {
        let board = Board::initial();
        let red = Player::from_board(Side::Red, &board);
        for kind in PieceKind::ALL {
            assert_eq!(red.pieces_of(kind).len(), kind.starting_count());
        }
        assert_eq!(red.pieces().count(), 16);
        let general = red.general().unwrap();
        assert_eq!(board.piece(general).unwrap().position(), Position::new(9, 4));
    }

    #[test]
    fn test_remove_and_add_piece() {
        let board = Board::initial();
        let mut black = Player::from_board(Side::Black, &board);
        let before = black.clone();
        let horse = black.pieces_of(PieceKind::Horse)[0];

        black.remove_piece(horse, PieceKind::Horse).unwrap();
        assert!(!black.owns(horse, PieceKind::Horse));
        assert_eq!(
            black.remove_piece(horse, PieceKind::Horse),
            Err(RosterError::NotOwned {
                id: horse,
                kind: PieceKind::Horse,
                side: Side::Black,
            })
        );

        black.add_piece(horse, PieceKind::Horse).unwrap();
        assert_eq!(black, before);
        assert_eq!(
            black.add_piece(horse, PieceKind::Horse),
            Err(RosterError::AlreadyOwned {
                id: horse,
                kind: PieceKind::Horse,
                side: Side::Black,
            })
        );
    }

    #[test]
    fn test_initial_threatened_squares() {
        let board = Board::initial();
        let red = Player::from_board(Side::Red, &board);
        let threatened = red.get_threatened_squares(&board);

        // 两门炮都能隔子打马
        assert!(threatened.contains_key(&Position::new(0, 1)));
        assert!(threatened.contains_key(&Position::new(0, 7)));
        // 炮的平移格不算威胁，但车、马可到的格子算
        assert!(threatened.contains_key(&Position::new(8, 0)));
        assert!(threatened.contains_key(&Position::new(7, 2)));
        assert!(!threatened.contains_key(&Position::new(4, 1)));
        // 将被己方兵挡住，看不到对面九宫
        assert!(!threatened.contains_key(&Position::new(0, 4)));
    }

    #[test]
    fn test_attackers_recorded() {
        // 黑将 (0,4) 同时被车和炮威胁
        let (board, _) = Fen::parse("4k4/9/9/9/4R4/9/9/4C4/9/3K5 b").unwrap();
        let red = Player::from_board(Side::Red, &board);
        let threatened = red.get_threatened_squares(&board);
        let chariot = board.get_piece(Position::new(4, 4)).unwrap();
        let cannon = board.get_piece(Position::new(7, 4)).unwrap();
        let attackers = &threatened[&Position::new(0, 4)];
        assert_eq!(attackers.len(), 2);
        assert!(attackers.contains(&chariot));
        assert!(attackers.contains(&cannon));
    }

    #[test]
    fn test_is_in_check() {
        let (board, _) = Fen::parse("4k4/9/9/9/4R4/9/9/9/9/3K5 b").unwrap();
        let players = Players::from_board(&board);
        assert!(players.is_in_check(Side::Black, &board));
        assert!(!players.is_in_check(Side::Red, &board));
    }

    #[test]
    fn test_is_in_check_short_circuit() {
        let (board, _) = Fen::parse("4k4/9/9/9/4R4/9/9/9/9/3K5 b").unwrap();
        let mut players = Players::from_board(&board);
        players[Side::Red].set_in_check(true);
        // 对手已被标记为被将军时不再计算
        assert!(!players.is_in_check(Side::Black, &board));
    }

    #[test]
    fn test_flying_general_check() {
        let (board, _) = Fen::parse("4k4/9/9/9/9/9/9/9/9/4K4 r").unwrap();
        let players = Players::from_board(&board);
        assert!(players.is_in_check(Side::Red, &board));
        assert!(players.is_in_check(Side::Black, &board));
    }
}
