//! FEN 格式解析和生成
//!
//! 中国象棋 FEN 格式，只使用前两段：
//! `<棋盘> <走子方>`
//!
//! 棋盘段从黑方底线（第 0 行）开始，红方大写、黑方小写，数字表示连续空格。
//!
//! 示例：
//! `rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR r`

use crate::board::Board;
use crate::constants::{COL_COUNT, ROW_COUNT};
use crate::error::XiangqiError;
use crate::piece::{PieceKind, Side};
use crate::position::Position;

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为棋盘和走子方
    pub fn parse(fen: &str) -> Result<(Board, Side), XiangqiError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.is_empty() {
            return Err(Self::invalid("Empty FEN string"));
        }

        let board = Self::parse_board(parts[0])?;

        // 走子方（默认红方）
        let side = match parts.get(1) {
            Some(field) => {
                let mut chars = field.chars();
                match (chars.next().and_then(Side::from_fen_char), chars.next()) {
                    (Some(side), None) => side,
                    _ => return Err(Self::invalid(format!("Invalid side to move: {}", field))),
                }
            }
            None => Side::Red,
        };

        Ok((board, side))
    }

    /// 解析棋盘部分
    fn parse_board(board_str: &str) -> Result<Board, XiangqiError> {
        let mut board = Board::empty();
        let rows: Vec<&str> = board_str.split('/').collect();

        if rows.len() != ROW_COUNT {
            return Err(Self::invalid(format!(
                "Expected {} rows, got {}",
                ROW_COUNT,
                rows.len()
            )));
        }

        for (row, text) in rows.iter().enumerate() {
            let mut col = 0usize;

            for c in text.chars() {
                if col >= COL_COUNT {
                    return Err(Self::invalid(format!("Row {} has too many columns", row)));
                }

                if let Some(empty_count) = c.to_digit(10) {
                    col += empty_count as usize;
                } else if let Some((kind, side)) = PieceKind::from_fen_char(c) {
                    board.place(kind, side, Position::new(row as i8, col as i8))?;
                    col += 1;
                } else {
                    return Err(Self::invalid(format!("Invalid piece character: {}", c)));
                }
            }

            if col != COL_COUNT {
                return Err(Self::invalid(format!(
                    "Row {} has {} columns, expected {}",
                    row, col, COL_COUNT
                )));
            }
        }

        for side in [Side::Red, Side::Black] {
            let generals = board
                .pieces_on_board()
                .filter(|(_, piece)| piece.owner() == side && piece.kind() == PieceKind::General)
                .count();
            if generals != 1 {
                return Err(Self::invalid(format!(
                    "Expected exactly one {} general, got {}",
                    side, generals
                )));
            }
        }

        Ok(board)
    }

    /// 将棋盘和走子方转换为 FEN 字符串
    pub fn to_string(board: &Board, side: Side) -> String {
        format!("{} {}", Self::board_to_string(board), side.to_fen_char())
    }

    /// 棋盘部分转换为 FEN
    fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(ROW_COUNT);

        for row in 0..ROW_COUNT {
            let mut row_str = String::new();
            let mut empty_count = 0;

            for col in 0..COL_COUNT {
                match board.piece_at(Position::new(row as i8, col as i8)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            row_str.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        row_str.push(piece.to_fen_char());
                    }
                    None => empty_count += 1,
                }
            }

            if empty_count > 0 {
                row_str.push_str(&empty_count.to_string());
            }

            rows.push(row_str);
        }

        rows.join("/")
    }

    fn invalid(reason: impl Into<String>) -> XiangqiError {
        XiangqiError::InvalidFen {
            reason: reason.into(),
        }
    }
}
