//! 对局控制
//!
//! 走子流程：棋盘校验并执行走法 → 移除被吃棋子 → 检查走子方是否被将军，
//! 是则完整撤销并拒绝 → 清除走子方的将军标记，再计算对方的将军标记 →
//! 逐一模拟对方所有走法判断对局是否结束 → 交换走子方。

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::{BoardError, MoveError, MoveResult, Result, XiangqiError};
use crate::fen::Fen;
use crate::notation::Notation;
use crate::piece::{PieceId, PieceKind, Side};
use crate::player::{Player, Players};
use crate::position::Position;

/// 对局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    Unfinished,
    RedWon,
    BlackWon,
}

impl GameState {
    /// 指定阵营获胜
    pub fn won_by(side: Side) -> Self {
        match side {
            Side::Red => GameState::RedWon,
            Side::Black => GameState::BlackWon,
        }
    }

    pub fn is_finished(&self) -> bool {
        *self != GameState::Unfinished
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GameState::Unfinished => "UNFINISHED",
            GameState::RedWon => "RED_WON",
            GameState::BlackWon => "BLACK_WON",
        };
        write!(f, "{}", s)
    }
}

/// 一步已接受走法的悔棋信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TurnRecord {
    mover: Side,
    captured: Option<PieceId>,
    check_flags: [bool; 2],
    state: GameState,
}

/// 对局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    players: Players,
    mover: Side,
    state: GameState,
    history: Vec<TurnRecord>,
    allow_takeback: bool,
}

impl Game {
    /// 标准开局，红方先走
    pub fn new() -> Self {
        let board = Board::initial();
        Self {
            players: Players::from_board(&board),
            board,
            mover: Side::Red,
            state: GameState::Unfinished,
            history: Vec::new(),
            allow_takeback: true,
        }
    }

    /// 从 FEN 局面开始
    pub fn from_fen(fen: &str) -> Result<Self> {
        let (board, mover) = Fen::parse(fen)?;
        Self::from_position(board, mover)
    }

    /// 按配置创建对局
    pub fn with_config(config: &GameConfig) -> Result<Self> {
        let mut game = Self::from_fen(&config.starting_fen)?;
        game.allow_takeback = config.allow_takeback;
        Ok(game)
    }

    fn from_position(board: Board, mover: Side) -> Result<Self> {
        let mut game = Self {
            players: Players::from_board(&board),
            board,
            mover,
            state: GameState::Unfinished,
            history: Vec::new(),
            allow_takeback: true,
        };

        let inactive = mover.opponent();
        if game.players.is_in_check(inactive, &game.board) {
            return Err(XiangqiError::InvalidFen {
                reason: format!("{} is in check but it is {}'s turn", inactive, mover),
            });
        }
        let in_check = game.players.is_in_check(mover, &game.board);
        game.players[mover].set_in_check(in_check);

        if game.moves_for(mover)?.is_empty() {
            game.state = GameState::won_by(inactive);
            info!("position loaded with no legal move for {}: {}", mover, game.state);
        }
        Ok(game)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &Players {
        &self.players
    }

    pub fn player(&self, side: Side) -> &Player {
        &self.players[side]
    }

    /// 当前走子方
    pub fn mover(&self) -> Side {
        self.mover
    }

    pub fn get_game_state(&self) -> GameState {
        self.state
    }

    /// 指定阵营当前是否被将军
    pub fn is_in_check(&self, side: Side) -> bool {
        self.players[side].in_check()
    }

    /// 当前局面的 FEN
    pub fn to_fen(&self) -> String {
        Fen::to_string(&self.board, self.mover)
    }

    /// 用代数记谱法走子，非法走法返回 false 且局面不变
    pub fn make_move(&mut self, from: &str, to: &str) -> bool {
        match self.play(from, to) {
            Ok(_) => true,
            Err(XiangqiError::Move(err)) if err.is_fault() => {
                error!("internal fault while moving {} -> {}: {}", from, to, err);
                false
            }
            Err(err) => {
                debug!("move {} -> {} rejected: {}", from, to, err);
                false
            }
        }
    }

    /// 用代数记谱法走子，返回被吃的棋子或拒绝原因
    pub fn play(&mut self, from: &str, to: &str) -> Result<Option<PieceId>> {
        if self.state.is_finished() {
            return Err(MoveError::GameOver.into());
        }
        let from = Notation::decode(from)?;
        let to = Notation::decode(to)?;
        Ok(self.try_move(from, to)?)
    }

    /// 走子，返回被吃的棋子或拒绝原因
    ///
    /// 任何错误返回时局面都与调用前一致。
    pub fn try_move(&mut self, from: Position, to: Position) -> MoveResult<Option<PieceId>> {
        if self.state.is_finished() {
            return Err(MoveError::GameOver);
        }
        let mover = self.mover;
        let check_flags = self.players.check_flags();

        let captured = self.move_mover(from, to)?;

        // 先清除走子方标记，再计算对方，保证双方不会同时被将军
        self.players[mover].set_in_check(false);
        let opponent = mover.opponent();
        let opponent_in_check = self.players.is_in_check(opponent, &self.board);
        self.players[opponent].set_in_check(opponent_in_check);

        let state = match self.evaluate_state() {
            Ok(state) => state,
            Err(err) => {
                self.revert(mover, captured)?;
                self.players.restore_check_flags(check_flags);
                return Err(err);
            }
        };

        if self.allow_takeback {
            self.history.push(TurnRecord {
                mover,
                captured,
                check_flags,
                state: self.state,
            });
        }
        info!(
            "{} moved {} -> {}{}{}",
            mover,
            Notation::encode(from).unwrap_or_default(),
            Notation::encode(to).unwrap_or_default(),
            if captured.is_some() { ", capture" } else { "" },
            if opponent_in_check { ", check" } else { "" }
        );
        if state.is_finished() {
            info!(
                "{} has no legal move{}: {}",
                opponent,
                if opponent_in_check { " (checkmate)" } else { "" },
                state
            );
        }

        self.state = state;
        self.mover = opponent;
        Ok(captured)
    }

    fn move_mover(&mut self, from: Position, to: Position) -> MoveResult<Option<PieceId>> {
        self.apply(self.mover, from, to)
    }

    /// 对方无合法走法时判定走子方获胜（将死与困毙不作区分）
    fn evaluate_state(&mut self) -> MoveResult<GameState> {
        let inactive = self.mover.opponent();
        if self.moves_for(inactive)?.is_empty() {
            Ok(GameState::won_by(self.mover))
        } else {
            Ok(self.state)
        }
    }

    /// 当前走子方所有不会导致己方被将军的走法
    ///
    /// 逐一在棋盘上执行并撤销，结束后局面与调用前完全一致。
    pub fn legal_moves(&mut self) -> MoveResult<Vec<(Position, Position)>> {
        self.moves_for(self.mover)
    }

    /// 指定阵营的合法走法
    ///
    /// 只对对手未被标记为被将军的一方有意义：`Player::is_in_check`
    /// 在对手已被将军时直接返回 false，自将的走法会被漏判。
    fn moves_for(&mut self, side: Side) -> MoveResult<Vec<(Position, Position)>> {
        let opponent = self.players.opponent_of(side);
        let mut candidates = Vec::new();
        for id in self.players[side].pieces() {
            let piece = self.board.piece(id).ok_or(BoardError::UnknownPiece(id))?;
            let from = piece.position();
            let mut targets: Vec<Position> =
                piece.get_moves(&self.board, opponent).into_iter().collect();
            targets.sort();
            candidates.extend(targets.into_iter().map(|to| (from, to)));
        }

        let mut legal = Vec::new();
        for (from, to) in candidates {
            match self.apply(side, from, to) {
                Ok(captured) => {
                    self.revert(side, captured)?;
                    legal.push((from, to));
                }
                Err(MoveError::SelfCheck { .. }) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(legal)
    }

    fn piece_kind(&self, id: PieceId) -> MoveResult<PieceKind> {
        let piece = self.board.piece(id).ok_or(BoardError::UnknownPiece(id))?;
        Ok(piece.kind())
    }

    /// 执行走法；走后己方被将军则撤销并返回 SelfCheck
    fn apply(&mut self, side: Side, from: Position, to: Position) -> MoveResult<Option<PieceId>> {
        let opponent = side.opponent();
        let captured = self.board.make_move(from, to, side, &self.players[opponent])?;
        if let Some(id) = captured {
            let removed = match self.piece_kind(id) {
                Ok(kind) => self.players[opponent]
                    .remove_piece(id, kind)
                    .map_err(MoveError::from),
                Err(err) => Err(err),
            };
            if let Err(err) = removed {
                self.board.undo_move(captured)?;
                return Err(err);
            }
        }

        if self.players.is_in_check(side, &self.board) {
            self.revert(side, captured)?;
            return Err(MoveError::SelfCheck { from, to });
        }
        Ok(captured)
    }

    /// 撤销 `apply` 执行的走法，并把被吃的棋子加回对方名单
    fn revert(&mut self, side: Side, captured: Option<PieceId>) -> MoveResult<()> {
        self.board.undo_move(captured)?;
        if let Some(id) = captured {
            let kind = self.piece_kind(id)?;
            self.players[side.opponent()].add_piece(id, kind)?;
        }
        Ok(())
    }

    /// 悔一步棋，恢复棋盘、名单、将军标记、走子方与对局状态
    pub fn take_back(&mut self) -> MoveResult<()> {
        if !self.allow_takeback {
            return Err(MoveError::TakebackDisabled);
        }
        let record = *self.history.last().ok_or(MoveError::NothingToTakeBack)?;
        self.revert(record.mover, record.captured)?;
        self.history.pop();
        self.players.restore_check_flags(record.check_flags);
        self.state = record.state;
        self.mover = record.mover;
        debug!("{} took back a move", record.mover);
        Ok(())
    }

    /// 悔一步棋，无棋可悔时返回 false
    pub fn undo_last_move(&mut self) -> bool {
        match self.take_back() {
            Ok(()) => true,
            Err(err) if err.is_fault() => {
                error!("internal fault while taking back: {}", err);
                false
            }
            Err(err) => {
                debug!("takeback rejected: {}", err);
                false
            }
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::INITIAL_FEN;

    fn pos(text: &str) -> Position {
        Notation::decode(text).unwrap()
    }

    #[test]
    fn test_new_game() {
        let game = Game::new();
        assert_eq!(game.get_game_state(), GameState::Unfinished);
        assert_eq!(game.mover(), Side::Red);
        assert!(!game.is_in_check(Side::Red));
        assert!(!game.is_in_check(Side::Black));
    }

    #[test]
    fn test_initial_legal_moves() {
        let mut game = Game::new();
        let before = game.clone();
        assert_eq!(game.legal_moves().unwrap().len(), 44);
        assert_eq!(game, before);

        let mut game = Game::from_fen(&INITIAL_FEN.replace(" r", " b")).unwrap();
        assert_eq!(game.legal_moves().unwrap().len(), 44);
    }

    #[test]
    fn test_turn_alternation() {
        let mut game = Game::new();
        assert!(game.make_move("a1", "a3"));
        assert_eq!(game.mover(), Side::Black);

        // 黑方不能动红方棋子
        assert!(!game.make_move("a3", "a2"));
        assert_eq!(game.mover(), Side::Black);

        assert!(game.make_move("a10", "a8"));
        assert_eq!(game.mover(), Side::Red);
    }

    #[test]
    fn test_chariot_slide() {
        let mut game = Game::new();
        // a4 上是己方兵
        assert_eq!(
            game.try_move(pos("a1"), pos("a4")),
            Err(MoveError::NotInMoveList {
                from: pos("a1"),
                to: pos("a4"),
            })
        );

        assert!(game.make_move("a4", "a5"));
        assert!(game.make_move("a7", "a6"));
        assert_eq!(game.try_move(pos("a1"), pos("a4")), Ok(None));
        assert_eq!(game.board().piece_at(pos("a4")).unwrap().kind(), PieceKind::Chariot);
    }

    #[test]
    fn test_bad_notation_rejected() {
        let mut game = Game::new();
        let before = game.clone();
        assert!(!game.make_move("z1", "a2"));
        assert!(!game.make_move("a1", "a11"));
        assert!(!game.make_move("a", "a2"));
        assert!(matches!(
            game.play("a1", "a0"),
            Err(XiangqiError::Notation(_))
        ));
        assert_eq!(game, before);
    }

    #[test]
    fn test_empty_start_rejected() {
        let mut game = Game::new();
        assert_eq!(
            game.try_move(pos("e5"), pos("e6")),
            Err(MoveError::NoPieceAtStart(pos("e5")))
        );
    }

    #[test]
    fn test_self_check_rejected() {
        // 红车挡在两车之间，平走会暴露红帅
        let mut game = Game::from_fen("4k4/9/9/9/9/9/9/4r4/4R4/4K4 r").unwrap();
        let before = game.clone();
        assert_eq!(
            game.try_move(pos("e2"), pos("a2")),
            Err(MoveError::SelfCheck {
                from: pos("e2"),
                to: pos("a2"),
            })
        );
        assert_eq!(game, before);
        assert!(!game.make_move("e2", "a2"));
        assert_eq!(game.mover(), Side::Red);
    }

    #[test]
    fn test_general_cannot_capture_defended_piece() {
        // e2 的黑车有 e5 的黑车保护
        let mut game = Game::from_fen("3k5/9/9/9/9/4r4/9/9/4r4/4K4 r").unwrap();
        assert!(game.is_in_check(Side::Red));
        let general = game.board().piece_at(pos("e1")).unwrap();
        assert!(general
            .get_moves(game.board(), game.player(Side::Black))
            .contains(&pos("e2")));

        let before = game.clone();
        assert_eq!(
            game.try_move(pos("e1"), pos("e2")),
            Err(MoveError::SelfCheck {
                from: pos("e1"),
                to: pos("e2"),
            })
        );
        assert_eq!(game, before);
        assert_eq!(game.legal_moves().unwrap(), vec![(pos("e1"), pos("f1"))]);
    }

    #[test]
    fn test_general_cannot_retreat_along_checking_file() {
        let mut game = Game::from_fen("3k5/9/9/9/9/4r4/9/9/4K4/9 r").unwrap();
        assert!(game.is_in_check(Side::Red));
        let general = game.board().piece_at(pos("e2")).unwrap();
        assert!(general
            .get_moves(game.board(), game.player(Side::Black))
            .contains(&pos("e1")));

        let before = game.clone();
        assert_eq!(
            game.try_move(pos("e2"), pos("e1")),
            Err(MoveError::SelfCheck {
                from: pos("e2"),
                to: pos("e1"),
            })
        );
        assert_eq!(game, before);
        assert_eq!(game.legal_moves().unwrap(), vec![(pos("e2"), pos("f2"))]);
    }

    #[test]
    fn test_legal_moves_answer_check() {
        let mut game = Game::from_fen("4k4/9/9/9/9/9/9/4r4/4R4/4K4 r").unwrap();
        assert!(game.make_move("e2", "e3"));
        assert!(game.is_in_check(Side::Black));

        let legal = game.legal_moves().unwrap();
        assert!(!legal.is_empty());
        for (from, to) in legal {
            let mut copy = game.clone();
            assert!(copy.try_move(from, to).is_ok(), "{from} -> {to}");
            assert!(!copy.is_in_check(Side::Black));
        }
    }

    #[test]
    fn test_fault_during_evaluation_rolls_back() {
        let mut game = Game::new();
        // 红炮不在红方名单中，模拟黑车吃炮时名单校验失败
        let cannon = game.board().get_piece(pos("b3")).unwrap();
        game.players[Side::Red]
            .remove_piece(cannon, PieceKind::Cannon)
            .unwrap();
        let before = game.clone();

        assert!(matches!(
            game.try_move(pos("b3"), pos("b10")),
            Err(MoveError::Roster(_))
        ));
        assert_eq!(game, before);
        assert!(!game.make_move("b3", "b10"));
        assert_eq!(game, before);
    }

    #[test]
    fn test_capture_gives_check() {
        let mut game = Game::from_fen("4k4/9/9/9/9/9/9/4r4/4R4/4K4 r").unwrap();
        let captured = game.try_move(pos("e2"), pos("e3")).unwrap();
        let captured = captured.unwrap();
        assert_eq!(game.board().piece(captured).unwrap().kind(), PieceKind::Chariot);
        assert_eq!(game.player(Side::Black).pieces_of(PieceKind::Chariot).len(), 0);
        assert!(game.is_in_check(Side::Black));
        assert!(!game.is_in_check(Side::Red));
        assert_eq!(game.get_game_state(), GameState::Unfinished);
    }

    #[test]
    fn test_checkmate() {
        let mut game = Game::from_fen("4k4/R8/9/9/9/9/9/9/9/3K4R r").unwrap();
        assert_eq!(game.get_game_state(), GameState::Unfinished);

        assert!(game.make_move("i1", "i10"));
        assert!(game.is_in_check(Side::Black));
        assert_eq!(game.get_game_state(), GameState::RedWon);

        // 对局结束后一律拒绝
        assert!(!game.make_move("e10", "f10"));
        assert_eq!(game.try_move(pos("e10"), pos("f10")), Err(MoveError::GameOver));
    }

    #[test]
    fn test_stalemate_loses() {
        let mut game = Game::from_fen("4k4/5P3/9/9/9/8R/9/9/9/3K5 r").unwrap();
        assert!(game.make_move("i5", "h5"));
        assert!(!game.is_in_check(Side::Black));
        assert_eq!(game.get_game_state(), GameState::RedWon);
    }

    #[test]
    fn test_from_fen_rejects_inactive_in_check() {
        assert!(matches!(
            Game::from_fen("4k4/9/9/9/4R4/9/9/9/9/3K5 r"),
            Err(XiangqiError::InvalidFen { .. })
        ));
        // 两将对脸
        assert!(matches!(
            Game::from_fen("4k4/9/9/9/9/9/9/9/9/4K4 r"),
            Err(XiangqiError::InvalidFen { .. })
        ));
    }

    #[test]
    fn test_from_fen_already_mated() {
        let game = Game::from_fen("R3k4/8R/9/9/9/9/9/9/9/5K3 b").unwrap();
        assert!(game.is_in_check(Side::Black));
        assert_eq!(game.get_game_state(), GameState::RedWon);
    }

    #[test]
    fn test_take_back_restores_everything() {
        let mut game = Game::from_fen("4k4/9/9/9/9/9/9/4r4/4R4/4K4 r").unwrap();
        let before = game.clone();

        assert!(game.make_move("e2", "e3"));
        assert!(game.is_in_check(Side::Black));
        assert_ne!(game, before);

        assert!(game.undo_last_move());
        assert_eq!(game, before);
        assert!(!game.undo_last_move());
    }

    #[test]
    fn test_take_back_after_game_over() {
        let mut game = Game::from_fen("4k4/R8/9/9/9/9/9/9/9/3K4R r").unwrap();
        let before = game.clone();
        assert!(game.make_move("i1", "i10"));
        assert_eq!(game.get_game_state(), GameState::RedWon);
        assert!(game.undo_last_move());
        assert_eq!(game, before);
        assert_eq!(game.get_game_state(), GameState::Unfinished);
    }

    #[test]
    fn test_take_back_disabled() {
        let config = GameConfig {
            allow_takeback: false,
            ..GameConfig::default()
        };
        let mut game = Game::with_config(&config).unwrap();
        assert!(game.make_move("b3", "e3"));
        assert_eq!(game.take_back(), Err(MoveError::TakebackDisabled));
        assert_eq!(game.mover(), Side::Black);
    }

    #[test]
    fn test_game_state_display() {
        assert_eq!(GameState::Unfinished.to_string(), "UNFINISHED");
        assert_eq!(GameState::RedWon.to_string(), "RED_WON");
        assert_eq!(GameState::BlackWon.to_string(), "BLACK_WON");
        assert_eq!(serde_json::to_string(&GameState::RedWon).unwrap(), "\"RED_WON\"");
    }

    #[test]
    fn test_to_fen_tracks_moves() {
        let mut game = Game::new();
        assert!(game.make_move("h3", "e3"));
        assert_eq!(
            game.to_fen(),
            "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RNBAKABNR b"
        );
    }
}
