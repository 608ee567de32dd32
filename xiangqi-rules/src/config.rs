//! 对局配置

use serde::{Deserialize, Serialize};

use crate::constants::INITIAL_FEN;
use crate::error::Result;

/// 对局配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// 开局局面（FEN）
    pub starting_fen: String,
    /// 是否允许悔棋
    pub allow_takeback: bool,
}

impl GameConfig {
    /// 从 JSON 字符串加载
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 序列化为 JSON 字符串
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_fen: INITIAL_FEN.to_string(),
            allow_takeback: true,
        }
    }
}
