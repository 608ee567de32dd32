//! 中国象棋规则引擎
//!
//! 包含:
//! - 棋盘、棋子、位置等核心数据结构
//! - 走法生成、将军判定和自将校验
//! - 对局控制（轮流走子、胜负判定、悔棋）
//! - 代数记谱法与 FEN 局面
//! - 对局配置

mod board;
mod config;
mod constants;
mod error;
mod fen;
mod game;
mod moves;
mod notation;
mod piece;
mod player;
mod position;

pub use board::{Board, Intervening};
pub use config::GameConfig;
pub use constants::*;
pub use error::{
    BoardError, MoveError, MoveResult, NotationError, Result, RosterError, XiangqiError,
};
pub use fen::Fen;
pub use game::{Game, GameState};
pub use moves::MoveGenerator;
pub use notation::Notation;
pub use piece::{Piece, PieceId, PieceKind, Side};
pub use player::{Player, Players};
pub use position::{Direction, Position};
