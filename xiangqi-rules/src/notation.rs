//! 代数记谱法
//!
//! 列用字母 a-i 表示（a 为红方左手第一列），行用 1-10 表示（1 为红方底线）。
//! 内部坐标第 0 行是黑方底线，所以 "a1" 对应 (9, 0)，"a10" 对应 (0, 0)。

use crate::constants::{COL_COUNT, ROW_COUNT};
use crate::error::NotationError;
use crate::position::Position;

/// 行号最多两位
const MAX_LEN: usize = 3;

/// 代数记谱法
pub struct Notation;

impl Notation {
    /// 将 "e1"、"a10" 形式的字符串解析为棋盘位置
    pub fn decode(text: &str) -> Result<Position, NotationError> {
        let len = text.chars().count();
        if !(2..=MAX_LEN).contains(&len) {
            return Err(NotationError::Length(text.to_string()));
        }

        let mut chars = text.chars();
        let letter = chars.next().ok_or_else(|| NotationError::Length(text.to_string()))?;
        let col = Self::column_index(letter).ok_or(NotationError::Letter(letter))?;

        let digits = chars.as_str();
        let number: i64 = digits
            .parse()
            .map_err(|_| NotationError::NumberFormat(digits.to_string()))?;
        if !(1..=ROW_COUNT as i64).contains(&number) {
            return Err(NotationError::RowOutOfRange(number));
        }

        Ok(Position::new(ROW_COUNT as i8 - number as i8, col))
    }

    /// 将棋盘位置转换为代数记谱法字符串，越界时返回 None
    pub fn encode(pos: Position) -> Option<String> {
        if !pos.is_valid() {
            return None;
        }
        let letter = (b'a' + pos.col as u8) as char;
        Some(format!("{}{}", letter, ROW_COUNT as i8 - pos.row))
    }

    fn column_index(letter: char) -> Option<i8> {
        if !letter.is_ascii_lowercase() {
            return None;
        }
        let index = letter as u8 - b'a';
        ((index as usize) < COL_COUNT).then_some(index as i8)
    }
}
